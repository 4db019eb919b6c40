//! Event-binding table.
//!
//! Every interactive element maps to exactly one action. Events are plain
//! data (`UiEvent`) so the table can be driven without a live DOM.

use std::collections::HashMap;

use crate::models::StationId;

/// Element identifiers of the page's render targets and controls
pub mod elements {
    pub const LOGIN_FORM: &str = "loginForm";
    pub const LOGIN_USERNAME: &str = "loginUsername";
    pub const LOGIN_PASSWORD: &str = "loginPassword";
    pub const LOGIN_MODAL: &str = "loginModal";

    pub const REGISTER_FORM: &str = "registerForm";
    pub const REGISTER_USERNAME: &str = "registerUsername";
    pub const REGISTER_EMAIL: &str = "registerEmail";
    pub const REGISTER_PASSWORD: &str = "registerPassword";
    pub const REGISTER_PASSWORD_CONFIRM: &str = "registerPassword2";
    pub const REGISTER_MODAL: &str = "registerModal";

    pub const LOGOUT_BUTTON: &str = "logout-btn";

    pub const SEARCH_RADIUS: &str = "searchRadius";
    pub const RADIUS_VALUE: &str = "radiusValue";
    pub const FIND_STATIONS_BUTTON: &str = "find-stations";
    pub const STATION_LIST: &str = "stationList";

    /// Delegated: matches any element inside a station card
    pub const STATION_CARD: &str = ".station-card";
    pub const STATION_DETAILS_MODAL: &str = "stationDetailsModal";
    pub const STATION_NAME: &str = "stationName";
    pub const STATION_ADDRESS: &str = "stationAddress";

    pub const START_CHARGING_BUTTON: &str = "startChargingBtn";
    pub const STOP_CHARGING_BUTTON: &str = "stopChargingBtn";
    pub const FAVORITE_BUTTON: &str = "favoriteBtn";
    pub const SESSIONS_BUTTON: &str = "sessionsBtn";
    pub const SESSION_LIST: &str = "sessionList";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Submit,
    Click,
    Input,
    /// Click anywhere inside a matching ancestor
    DelegatedClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Register,
    Logout,
    UpdateRadius,
    ShowStationDetails,
    FindStations,
    StartCharging,
    StopCharging,
    AddFavorite,
    ShowSessions,
}

#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub target: &'static str,
    pub event: EventKind,
    pub action: Action,
}

pub const BINDINGS: &[Binding] = &[
    Binding { target: elements::LOGIN_FORM, event: EventKind::Submit, action: Action::Login },
    Binding { target: elements::REGISTER_FORM, event: EventKind::Submit, action: Action::Register },
    Binding { target: elements::LOGOUT_BUTTON, event: EventKind::Click, action: Action::Logout },
    Binding { target: elements::SEARCH_RADIUS, event: EventKind::Input, action: Action::UpdateRadius },
    Binding { target: elements::STATION_CARD, event: EventKind::DelegatedClick, action: Action::ShowStationDetails },
    Binding { target: elements::FIND_STATIONS_BUTTON, event: EventKind::Click, action: Action::FindStations },
    Binding { target: elements::START_CHARGING_BUTTON, event: EventKind::Click, action: Action::StartCharging },
    Binding { target: elements::STOP_CHARGING_BUTTON, event: EventKind::Click, action: Action::StopCharging },
    Binding { target: elements::FAVORITE_BUTTON, event: EventKind::Click, action: Action::AddFavorite },
    Binding { target: elements::SESSIONS_BUTTON, event: EventKind::Click, action: Action::ShowSessions },
];

/// Action bound to `target` for `event`, if any
pub fn lookup(target: &str, event: EventKind) -> Option<Action> {
    BINDINGS
        .iter()
        .find(|b| b.target == target && b.event == event)
        .map(|b| b.action)
}

/// Submitted form values keyed by input element id
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, element: &str, value: impl Into<String>) -> Self {
        self.fields.insert(element.to_string(), value.into());
        self
    }

    /// Value of an input; missing inputs read as empty like a blank field
    pub fn value(&self, element: &str) -> &str {
        self.fields.get(element).map(String::as_str).unwrap_or("")
    }
}

/// What a station card exposes when clicked
#[derive(Debug, Clone)]
pub struct StationCard {
    pub id: Option<StationId>,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    Submit(FormData),
    Click,
    Input(String),
    CardClick(StationCard),
}

impl UiEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            UiEvent::Submit(_) => EventKind::Submit,
            UiEvent::Click => EventKind::Click,
            UiEvent::Input(_) => EventKind::Input,
            UiEvent::CardClick(_) => EventKind::DelegatedClick,
        }
    }
}
