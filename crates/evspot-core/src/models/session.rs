use serde::{Deserialize, Serialize};

use super::deserialize_decimal;
use super::station::{Station, StationId};
use crate::utils::{format_currency, format_time};

/// A charging session, as returned by start/stop charging and the session
/// list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargingSession {
    pub id: i64,
    pub station: StationId,
    #[serde(default)]
    pub station_name: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Energy delivered in kWh
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub energy_consumed: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ChargingSession {
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }

    pub fn summary_line(&self) -> String {
        let station = self
            .station_name
            .clone()
            .unwrap_or_else(|| format!("Station {}", self.station));
        let started = self
            .start_time
            .as_deref()
            .map(format_time)
            .unwrap_or_else(|| "unknown start".to_string());
        let status = self.status.as_deref().unwrap_or("unknown");
        match self.total_cost {
            Some(cost) => format!("{} · {} · {} · {}", station, started, status, format_currency(cost)),
            None => format!("{} · {} · {}", station, started, status),
        }
    }
}

/// A favorited station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    #[serde(default)]
    pub id: Option<i64>,
    pub station: StationId,
    #[serde(default)]
    pub station_details: Option<Station>,
    #[serde(default)]
    pub created_at: Option<String>,
}
