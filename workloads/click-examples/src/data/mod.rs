//! Sample data for the example pages.

mod customer;
mod user;

pub use customer::*;
pub use user::*;
