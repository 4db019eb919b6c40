//! Data models for EV Spot entities.
//!
//! This module contains the wire types returned by the EV Spot API:
//!
//! - `UserProfile`: The authenticated user as serialized by the server
//! - `Station`, `StationId`: Charging stations and their opaque identifiers
//! - `ChargingSession`, `Favorite`: Per-user records
//!
//! The server serializes decimal columns (coordinates, prices, energy) as
//! JSON strings, so those fields go through `deserialize_decimal`.

pub mod session;
pub mod station;
pub mod user;

pub use session::{ChargingSession, Favorite};
pub use station::{Station, StationId};
pub use user::UserProfile;

use serde::de;

/// Deserialize a decimal sent as either a JSON number or a numeric string.
pub(crate) fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct DecimalVisitor;

    impl<'de> de::Visitor<'de> for DecimalVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number or numeric string")
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(DecimalVisitor)
}
