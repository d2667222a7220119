//! Numeric fields with range validation.

use click_controls::{Checkbox, DoubleField, FieldBuilder, Form, IntegerField, Select, Submit};
use click_core::{Context, Page, PageState, Result};

/// Flat fee added for express delivery.
pub const EXPRESS_FEE: f64 = 15.0;

/// Order calculator: integer quantity, decimal price, express checkbox and
/// currency select. A valid submission adds the order total to the model.
#[derive(Debug)]
pub struct NumberFormPage {
    state: PageState,
}

impl NumberFormPage {
    pub fn new() -> Self {
        Self {
            state: PageState::new().with_title("Number Fields"),
        }
    }

    fn total(form: &Form) -> Option<(f64, String)> {
        let quantity = form.field::<IntegerField>("quantity")?.integer()?;
        let price = form.field::<DoubleField>("price")?.double()?;
        let express = form
            .field::<Checkbox>("express")
            .map(Checkbox::is_checked)
            .unwrap_or(false);
        let currency = form.field_value("currency").unwrap_or("USD").to_string();

        let mut total = quantity as f64 * price;
        if express {
            total += EXPRESS_FEE;
        }
        Some((total, currency))
    }
}

impl Default for NumberFormPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for NumberFormPage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_init(&mut self, _ctx: &mut Context) -> Result<()> {
        let mut form = Form::new("form");
        form.add(
            IntegerField::new("quantity")
                .with_min_value(1)
                .with_max_value(100)
                .required(true),
        )?;
        form.add(
            DoubleField::new("price")
                .with_min_value(0.01)
                .with_max_value(10_000.0)
                .required(true),
        )?;
        form.add(Checkbox::new("express").with_label("Express Delivery"))?;
        form.add(
            Select::new("currency")
                .with_option("", "-- Select --")
                .with_option("USD", "US Dollar")
                .with_option("EUR", "Euro")
                .with_option("AUD", "Australian Dollar")
                .required(true),
        )?;
        form.add(Submit::new("calculate").with_listener("on_calculate"))?;
        self.state.add_control(form)
    }

    fn on_action(&mut self, listener: &str, _source: &str, _ctx: &mut Context) -> Result<bool> {
        match listener {
            "on_calculate" => {
                let result = self
                    .state
                    .control::<Form>("form")
                    .filter(|form| form.is_valid())
                    .and_then(Self::total);
                if let Some((total, currency)) = result {
                    self.state
                        .add_model("total", format!("{} {:.2}", currency, total))?;
                }
                Ok(true)
            }
            _ => Err(self.unknown_listener(listener)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use click_controls::Field;
    use click_core::mock::MockContext;
    use click_core::PageLifecycle;

    fn submit(params: &[(&str, &str)]) -> NumberFormPage {
        let mut builder = MockContext::post("/number-form.htm")
            .param("form_name", "form")
            .param("calculate", "Calculate");
        for (name, value) in params {
            builder = builder.param(*name, *value);
        }
        let mut ctx = builder.build();
        let mut page = NumberFormPage::new();
        PageLifecycle::new().process(&mut page, &mut ctx).unwrap();
        page
    }

    #[test]
    fn test_valid_order_total() {
        let page = submit(&[
            ("quantity", "3"),
            ("price", "19.99"),
            ("express", "on"),
            ("currency", "AUD"),
        ]);

        assert_eq!(page.state().model()["total"], "AUD 74.97");
    }

    #[test]
    fn test_out_of_range_quantity() {
        let page = submit(&[("quantity", "500"), ("price", "1"), ("currency", "USD")]);
        let form = page.state().control::<Form>("form").unwrap();

        assert!(!form.is_valid());
        assert!(form.field::<IntegerField>("quantity").unwrap().field_state().error().is_some());
        assert!(page.state().model().get("total").is_none());
    }

    #[test]
    fn test_invalid_number_keeps_text() {
        let page = submit(&[("quantity", "two"), ("price", "1.5"), ("currency", "EUR")]);
        let form = page.state().control::<Form>("form").unwrap();

        assert_eq!(form.field_value("quantity"), Some("two"));
        assert!(!form.is_valid());
    }

    #[test]
    fn test_currency_required() {
        let page = submit(&[("quantity", "1"), ("price", "2"), ("currency", "")]);
        let form = page.state().control::<Form>("form").unwrap();

        assert!(form.field::<Select>("currency").unwrap().field_state().error().is_some());
    }
}
