//! Core abstractions for the Click component framework.
//!
//! This crate provides the fundamental types and traits:
//! - `Context` - Per-request accessor for parameters, headers and session
//! - `Control` trait - A component that binds, processes and renders itself
//! - `ControlRegistry` - Ordered, uniquely named children of a container
//! - `ActionEventDispatcher` - Listener events queued during processing
//! - `Page` trait - The per-request root of the component tree
//! - `LifecyclePhase` - Request lifecycle tracking

mod context;
mod control;
mod dispatcher;
mod error;
mod html;
mod lifecycle;
mod messages;
pub mod mock;
mod page;
mod params;
mod session;
mod util;

pub use context::*;
pub use control::*;
pub use dispatcher::*;
pub use error::*;
pub use html::*;
pub use lifecycle::*;
pub use messages::*;
pub use page::*;
pub use params::*;
pub use session::*;
pub use util::*;
