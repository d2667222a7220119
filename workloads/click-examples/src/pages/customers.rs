//! Paged, sortable customer table.

use click_controls::{Column, Table};
use click_core::{Context, Page, PageState, Result};

use crate::data::sample_customers;

/// Rows shown per table page.
pub const CUSTOMERS_PER_PAGE: usize = 5;

/// Lists the sample customers five at a time.
#[derive(Debug)]
pub struct CustomersPage {
    state: PageState,
}

impl CustomersPage {
    pub fn new() -> Self {
        Self {
            state: PageState::new().with_title("Customers"),
        }
    }

    fn table() -> Table {
        Table::new("customers")
            .with_class("simple")
            .with_page_size(CUSTOMERS_PER_PAGE)
            .with_sortable(true)
            .with_banner(true)
            .with_column(Column::new("id").with_header("Id"))
            .with_column(Column::new("name"))
            .with_column(Column::new("email").sortable(false))
            .with_column(
                Column::new("investments")
                    .with_format("${0}")
                    .with_class("numeric"),
            )
            .with_column(Column::new("date_joined").with_header("Joined"))
            .with_column(Column::new("address.city").with_header("City"))
            .with_column(Column::new("active"))
    }
}

impl Default for CustomersPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for CustomersPage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_init(&mut self, _ctx: &mut Context) -> Result<()> {
        let mut table = Self::table();
        table.set_row_objects(&sample_customers())?;
        self.state.add_control(table)
    }

    fn on_render(&mut self, _ctx: &Context) -> Result<()> {
        let Some(table) = self.state.control::<Table>("customers") else {
            return Ok(());
        };
        let total = table.rows().len();
        let page = table.page_number() + 1;
        let pages = table.page_count();
        self.state.add_model("total", total)?;
        self.state.add_model("page", format!("Page {} of {}", page, pages))
    }
}
