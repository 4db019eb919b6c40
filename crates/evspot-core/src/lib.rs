//! EV Spot client core.
//!
//! This crate holds everything a front end needs to talk to the EV Spot
//! charging-station service:
//!
//! - `api`: the `ApiClient` and its error taxonomy
//! - `auth`: the `SessionStore` that owns the persisted credential
//! - `ui`: a headless page model, the event-binding table and the
//!   `ViewController` that wires events to API calls
//! - `map`: the map widget description
//! - `utils`: formatting helpers and a debouncer
//! - `config`: on-disk configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod map;
pub mod models;
pub mod ui;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::SessionStore;
pub use config::Config;
pub use map::MapWidget;
pub use ui::{Page, ViewController};
