//! Action links driving a session counter.

use click_controls::ActionLink;
use click_core::{Context, Page, PageState, Result};
use serde_json::Value;

/// Session attribute holding the counter.
pub const COUNT_ATTRIBUTE: &str = "count";

/// Counter stored in the session, changed by action links.
#[derive(Debug)]
pub struct CounterPage {
    state: PageState,
}

impl CounterPage {
    pub fn new() -> Self {
        Self {
            state: PageState::new().with_title("Action Links"),
        }
    }

    fn count(ctx: &Context) -> i64 {
        ctx.session_attribute(COUNT_ATTRIBUTE)
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
    }
}

impl Default for CounterPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for CounterPage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_init(&mut self, _ctx: &mut Context) -> Result<()> {
        self.state
            .add_control(ActionLink::new("increment").with_label("+1").with_listener("on_change"))?;
        self.state
            .add_control(ActionLink::new("decrement").with_label("-1").with_listener("on_change"))?;
        self.state.add_control(
            ActionLink::new("addTen")
                .with_label("+10")
                .with_value("10")
                .with_listener("on_change"),
        )?;
        self.state
            .add_control(ActionLink::new("reset").with_listener("on_reset"))
    }

    fn on_action(&mut self, listener: &str, source: &str, ctx: &mut Context) -> Result<bool> {
        let count = match listener {
            "on_change" => {
                let step = match source {
                    "decrement" => -1,
                    _ => self
                        .state
                        .control::<ActionLink>(source)
                        .and_then(ActionLink::value_integer)
                        .unwrap_or(1),
                };
                Self::count(ctx) + step
            }
            "on_reset" => 0,
            _ => return Err(self.unknown_listener(listener)),
        };
        ctx.set_session_attribute(COUNT_ATTRIBUTE, Value::from(count));
        Ok(true)
    }

    fn on_render(&mut self, ctx: &Context) -> Result<()> {
        self.state.add_model("count", Self::count(ctx))
    }
}
