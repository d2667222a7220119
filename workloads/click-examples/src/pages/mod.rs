//! Example pages.

mod counter;
mod customers;
mod home;
mod login;
mod number_form;
mod panel;
mod secure;

pub use counter::*;
pub use customers::*;
pub use home::*;
pub use login::*;
pub use number_form::*;
pub use panel::*;
pub use secure::*;

/// Example pages linked from the home page: link name, path, label.
pub const EXAMPLES: &[(&str, &str, &str)] = &[
    ("loginLink", "/login.htm", "Login"),
    ("secureLink", "/secure.htm", "Secure Page"),
    ("numberFormLink", "/number-form.htm", "Number Fields"),
    ("actionLinkLink", "/action-link.htm", "Action Links"),
    ("customersLink", "/customers.htm", "Customer Table"),
    ("panelLink", "/panel.htm", "Panels"),
];
