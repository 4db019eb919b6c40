use std::fmt;

use serde::{de, Deserialize, Serialize};
use serde_json::{Map, Value};

use super::deserialize_decimal;
use crate::utils::{format_currency, format_distance};

/// Opaque station identifier, passed through to endpoint URLs.
///
/// The server uses integer primary keys but the page treated identifiers as
/// strings read from the DOM, so both forms are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for StationId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for StationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StationId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl Serialize for StationId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Numeric ids go back out as numbers so primary-key fields validate
        match self.0.parse::<i64>() {
            Ok(n) => serializer.serialize_i64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for StationId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StationIdVisitor;

        impl<'de> de::Visitor<'de> for StationIdVisitor {
            type Value = StationId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a station id as string or integer")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(StationId::new(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(StationId::from(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                Ok(StationId(v.to_string()))
            }
        }

        deserializer.deserialize_any(StationIdVisitor)
    }
}

/// A charging station record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub charging_type: Option<String>,
    /// Power output in kW
    #[serde(default)]
    pub power_output: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub price_per_kwh: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_ports: Option<i64>,
    #[serde(default)]
    pub available_ports: Option<i64>,
    /// Distance from the search point in km, only set by the nearby search
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub total_reviews: Option<i64>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Station {
    pub fn is_available(&self) -> bool {
        self.status.as_deref() == Some("active") && self.available_ports.unwrap_or(0) > 0
    }

    pub fn ports_display(&self) -> String {
        match (self.available_ports, self.total_ports) {
            (Some(available), Some(total)) => format!("{}/{} ports free", available, total),
            (Some(available), None) => format!("{} ports free", available),
            _ => "Ports unknown".to_string(),
        }
    }

    /// One-line summary used for station lists.
    pub fn summary_line(&self) -> String {
        let mut parts = vec![self.name.clone()];
        if let Some(distance) = self.distance {
            parts.push(format_distance(distance));
        }
        if let Some(price) = self.price_per_kwh {
            parts.push(format!("{}/kWh", format_currency(price)));
        }
        parts.push(self.ports_display());
        parts.join(" · ")
    }
}
