//! Panels grouping controls and their own model values.

use click_controls::{ActionLink, PageLink, Panel};
use click_core::{Context, Page, PageState, Result};

use crate::data::{find_customer, sample_customers};

/// Two panels: navigation links, and a customer summary with a refresh link.
#[derive(Debug)]
pub struct PanelPage {
    state: PageState,
}

impl PanelPage {
    pub fn new() -> Self {
        Self {
            state: PageState::new().with_title("Panels"),
        }
    }

    fn links() -> Result<Panel> {
        let mut panel = Panel::new("links").with_label("Navigation");
        panel.add(PageLink::new("home", "/home.htm").with_label("Home"))?;
        panel.add(PageLink::new("customers", "/customers.htm").with_label("Customers"))?;
        Ok(panel)
    }

    fn details() -> Result<Panel> {
        let customers = sample_customers();
        let total: f64 = customers.iter().map(|c| c.investments).sum();

        let mut panel = Panel::new("details").with_label("Portfolio");
        panel.add_model("customers", customers.len())?;
        panel.add_model("investments", format!("{:.2}", total))?;
        panel.add(ActionLink::new("refresh").with_value("1").with_listener("on_refresh"))?;
        Ok(panel)
    }
}

impl Default for PanelPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for PanelPage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_init(&mut self, _ctx: &mut Context) -> Result<()> {
        self.state.add_control(Self::links()?)?;
        self.state.add_control(Self::details()?)
    }

    fn on_action(&mut self, listener: &str, source: &str, _ctx: &mut Context) -> Result<bool> {
        match listener {
            "on_refresh" => {
                let id = self
                    .state
                    .control::<Panel>("details")
                    .and_then(|panel| panel.control::<ActionLink>(source))
                    .and_then(ActionLink::value_integer)
                    .and_then(|id| u32::try_from(id).ok())
                    .unwrap_or(1);
                let name = find_customer(id)
                    .map(|c| c.name)
                    .unwrap_or_else(|| "unknown".to_string());
                self.state.add_model("refreshed", name)?;
                Ok(true)
            }
            _ => Err(self.unknown_listener(listener)),
        }
    }
}
