//! Standard controls for the Click component framework.
//!
//! - Fields: `TextField`, `PasswordField`, `TextArea`, `HiddenField`,
//!   `IntegerField`, `DoubleField`, `Checkbox`, `Select`, `Radio`,
//!   `RadioGroup`
//! - `Submit` button
//! - `Form` - Fields and buttons processed together on submission
//! - `FieldSet` - Labelled group of fields inside a form
//! - `ActionLink`, `ActionButton` - Controls that fire a page listener
//! - `PageLink` - Link to another page
//! - `Table` - Paged, sortable data table
//! - `Panel` - Container of child controls

mod button;
mod checkbox;
mod field;
mod fieldset;
mod form;
mod link;
mod number;
mod panel;
mod radio;
mod select;
mod table;
mod text;

pub use button::*;
pub use checkbox::*;
pub use field::*;
pub use fieldset::*;
pub use form::*;
pub use link::*;
pub use number::*;
pub use panel::*;
pub use radio::*;
pub use select::*;
pub use table::*;
pub use text::*;

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        ActionButton, ActionLink, Checkbox, Column, DoubleField, Field, FieldBuilder, FieldSet,
        Form, HiddenField, IntegerField, PageLink, Panel, PasswordField, Radio, RadioGroup,
        Select, Submit, Table, TextArea, TextField,
    };
}
