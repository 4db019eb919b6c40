//! REST API client module for the EV Spot service.
//!
//! This module provides the `ApiClient` for talking to the EV Spot
//! backend: login/registration, profile verification, station search,
//! charging sessions and favorites.
//!
//! Mutating requests carry the CSRF token the server sets in the
//! `csrftoken` cookie. Requests go through a `Transport`, which is
//! reqwest in production.

pub mod client;
pub mod csrf;
pub mod error;
pub mod transport;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ApiClient, LoginSuccess, RegisteredUser};
pub use error::ApiError;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
pub use validation::RegistrationForm;
