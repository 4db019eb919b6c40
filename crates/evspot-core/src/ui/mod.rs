//! Headless user interface layer.
//!
//! - `page`: render targets (alert banner, modals, text nodes, `user-only`
//!   visibility)
//! - `bindings`: element ids and the element → event → action table
//! - `controller`: `ViewController`, which runs the handlers

pub mod bindings;
pub mod controller;
pub mod page;

pub use bindings::{elements, Action, EventKind, FormData, StationCard, UiEvent, BINDINGS};
pub use controller::ViewController;
pub use page::{Alert, AlertKind, Page, ALERT_DISMISS_AFTER};
