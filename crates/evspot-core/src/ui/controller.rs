//! View controller.
//!
//! Owns the API client, the session store and the page, and runs the handler
//! selected by the binding table for each incoming event. Handlers validate,
//! make at most one API call, then write to a single render target. Every
//! failure ends in an alert; nothing propagates out of `dispatch`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::bindings::{elements, lookup, Action, FormData, StationCard, UiEvent};
use super::page::{AlertKind, Page};
use crate::api::{ApiClient, ApiError, RegistrationForm};
use crate::auth::{AuthState, CredentialStorage, SessionStore};
use crate::map::{LatLng, MapWidget};
use crate::models::StationId;

/// Radius the search slider starts at
pub const DEFAULT_RADIUS_KM: u32 = 10;

pub const MSG_LOGIN_SUCCESS: &str = "Login successful!";
pub const MSG_REGISTER_SUCCESS: &str = "Registration successful! Please log in.";
pub const MSG_LOGOUT_SUCCESS: &str = "Logout successful!";
pub const MSG_LOGIN_FAILED: &str = "An error occurred during login";
pub const MSG_REGISTER_FAILED: &str = "An error occurred during registration";
pub const MSG_SEARCHING: &str = "Finding nearby charging stations...";
pub const MSG_NO_STATION_SELECTED: &str = "Please select a station first";
pub const MSG_REQUEST_FAILED: &str = "An error occurred. Please try again.";

pub struct ViewController {
    api: ApiClient,
    session: SessionStore,
    page: Page,
    map: MapWidget,
    radius_km: u32,
    selected_station: Option<StationId>,
}

impl ViewController {
    /// Wire a controller to `api` with credentials kept in `storage`.
    /// The page is subscribed to the session store before anything else
    /// happens, so it starts out rendering the guest state.
    pub fn new(api: ApiClient, storage: Box<dyn CredentialStorage>) -> Self {
        let page = Page::new();
        let mut session = SessionStore::new(storage);
        session.subscribe(Arc::new(page.clone()));

        Self {
            api,
            session,
            page,
            map: MapWidget::init(),
            radius_km: DEFAULT_RADIUS_KM,
            selected_station: None,
        }
    }

    /// Restore the stored session, if any, and point the client at its token
    pub async fn init(&mut self) -> AuthState {
        let state = self.session.restore(&self.api).await;
        self.sync_token();
        debug!(authenticated = state.is_authenticated(), "View initialised");
        state
    }

    /// Detach the page from the session. Stored credentials are kept.
    pub fn teardown(&mut self) {
        self.session.teardown();
        self.api.clear_token();
        self.selected_station = None;
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn map(&self) -> &MapWidget {
        &self.map
    }

    pub fn radius_km(&self) -> u32 {
        self.radius_km
    }

    pub fn selected_station(&self) -> Option<&StationId> {
        self.selected_station.as_ref()
    }

    /// Make `station` the target of the charging and favorite buttons
    pub fn select_station(&mut self, station: StationId) {
        self.selected_station = Some(station);
    }

    /// Run the handler bound to `target` for `event`. Returns false when
    /// nothing is bound there.
    pub async fn dispatch(&mut self, target: &str, event: UiEvent) -> bool {
        let Some(action) = lookup(target, event.kind()) else {
            debug!(target = target, kind = ?event.kind(), "No binding for event");
            return false;
        };
        debug!(target = target, action = ?action, "Dispatching");

        match (action, event) {
            (Action::Login, UiEvent::Submit(form)) => self.handle_login(&form).await,
            (Action::Register, UiEvent::Submit(form)) => self.handle_register(&form).await,
            (Action::Logout, _) => self.handle_logout().await,
            (Action::UpdateRadius, UiEvent::Input(value)) => self.handle_radius(&value),
            (Action::ShowStationDetails, UiEvent::CardClick(card)) => self.handle_card(card),
            (Action::FindStations, _) => {
                let center = self.map.center;
                self.search_nearby(center).await;
            }
            (Action::StartCharging, _) => self.handle_start_charging().await,
            (Action::StopCharging, _) => self.handle_stop_charging().await,
            (Action::AddFavorite, _) => self.handle_add_favorite().await,
            (Action::ShowSessions, _) => self.handle_sessions().await,
            (action, event) => {
                warn!(action = ?action, kind = ?event.kind(), "Event payload does not fit its action");
                return false;
            }
        }
        true
    }

    // ===== Authentication =====

    async fn handle_login(&mut self, form: &FormData) {
        let username = form.value(elements::LOGIN_USERNAME);
        let password = form.value(elements::LOGIN_PASSWORD);

        match self.api.login(username, password).await {
            Ok(success) => {
                self.session.set_credential(success.token, success.user);
                self.sync_token();
                self.page.hide_modal(elements::LOGIN_MODAL);
                self.page.show_alert(MSG_LOGIN_SUCCESS, AlertKind::Success);
            }
            Err(e) => self.show_error(&e, MSG_LOGIN_FAILED),
        }
    }

    async fn handle_register(&mut self, form: &FormData) {
        let form = RegistrationForm {
            username: form.value(elements::REGISTER_USERNAME).to_string(),
            email: form.value(elements::REGISTER_EMAIL).to_string(),
            password: form.value(elements::REGISTER_PASSWORD).to_string(),
            password_confirm: form.value(elements::REGISTER_PASSWORD_CONFIRM).to_string(),
        };

        match self.api.register(&form).await {
            Ok(_) => {
                self.page.hide_modal(elements::REGISTER_MODAL);
                self.page.show_modal(elements::LOGIN_MODAL);
                self.page.show_alert(MSG_REGISTER_SUCCESS, AlertKind::Success);
            }
            Err(e) => self.show_error(&e, MSG_REGISTER_FAILED),
        }
    }

    /// Local state is cleared whatever the server says
    async fn handle_logout(&mut self) {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "Server logout failed, clearing local session anyway");
        }
        self.session.clear_credential();
        self.sync_token();
        self.selected_station = None;
        self.page.show_alert(MSG_LOGOUT_SUCCESS, AlertKind::Success);
    }

    // ===== Stations =====

    fn handle_radius(&mut self, value: &str) {
        match value.trim().parse::<u32>() {
            Ok(radius) if radius > 0 => {
                self.radius_km = radius;
                self.page.set_text(elements::RADIUS_VALUE, format!("{}km", radius));
            }
            _ => debug!(value = value, "Ignoring invalid radius"),
        }
    }

    fn handle_card(&mut self, card: StationCard) {
        self.page.set_text(elements::STATION_NAME, card.name);
        self.page.set_text(elements::STATION_ADDRESS, card.address);
        self.page.show_modal(elements::STATION_DETAILS_MODAL);
        self.selected_station = card.id;
    }

    /// Search around `center` with the current radius and render the
    /// results into the station list. The map is recentred on `center`.
    pub async fn search_nearby(&mut self, center: LatLng) {
        self.page.show_alert(MSG_SEARCHING, AlertKind::Info);
        let zoom = self.map.zoom;
        self.map.set_view(center, zoom);

        match self
            .api
            .find_nearby_stations(center.lat, center.lng, self.radius_km)
            .await
        {
            Ok(stations) => {
                let text = if stations.is_empty() {
                    format!("No stations found within {}km", self.radius_km)
                } else {
                    stations
                        .iter()
                        .map(|s| format!("[{}] {}", s.id, s.summary_line()))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                info!(count = stations.len(), radius_km = self.radius_km, "Stations listed");
                self.page.set_text(elements::STATION_LIST, text);
            }
            Err(e) => self.show_error(&e, MSG_REQUEST_FAILED),
        }
    }

    fn require_station(&self) -> Option<StationId> {
        let station = self.selected_station.clone();
        if station.is_none() {
            self.page.show_alert(MSG_NO_STATION_SELECTED, AlertKind::Warning);
        }
        station
    }

    async fn handle_start_charging(&mut self) {
        let Some(station) = self.require_station() else {
            return;
        };
        match self.api.start_charging(&station).await {
            Ok(session) => {
                let name = session.station_name.clone().unwrap_or_else(|| station.to_string());
                self.page.show_alert(
                    format!("Charging started at {}", name),
                    AlertKind::Success,
                );
            }
            Err(e) => self.show_error(&e, MSG_REQUEST_FAILED),
        }
    }

    async fn handle_stop_charging(&mut self) {
        let Some(station) = self.require_station() else {
            return;
        };
        match self.api.stop_charging(&station).await {
            Ok(session) => {
                self.page.show_alert(
                    format!("Charging stopped: {}", session.summary_line()),
                    AlertKind::Success,
                );
            }
            Err(e) => self.show_error(&e, MSG_REQUEST_FAILED),
        }
    }

    async fn handle_add_favorite(&mut self) {
        let Some(station) = self.require_station() else {
            return;
        };
        match self.api.add_favorite(&station).await {
            Ok(_) => {
                self.page.show_alert("Station added to favorites", AlertKind::Success);
            }
            Err(e) => self.show_error(&e, MSG_REQUEST_FAILED),
        }
    }

    async fn handle_sessions(&mut self) {
        match self.api.list_user_sessions().await {
            Ok(sessions) => {
                let text = if sessions.is_empty() {
                    "No charging sessions yet".to_string()
                } else {
                    sessions
                        .iter()
                        .map(|s| s.summary_line())
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                self.page.set_text(elements::SESSION_LIST, text);
            }
            Err(e) => self.show_error(&e, MSG_REQUEST_FAILED),
        }
    }

    // ===== Helpers =====

    fn sync_token(&mut self) {
        match self.session.token() {
            Some(token) => self.api.set_token(token.to_string()),
            None => self.api.clear_token(),
        }
    }

    /// Alert for a failed handler. Transport and decoding failures get the
    /// generic `fallback`; everything else carries its own message.
    fn show_error(&self, error: &ApiError, fallback: &str) {
        let message = match error {
            ApiError::Network(_) | ApiError::InvalidResponse(_) | ApiError::InvalidUrl(_) => {
                warn!(error = %error, "Request failed");
                fallback.to_string()
            }
            other => {
                debug!(error = %other, "Request refused");
                other.user_message()
            }
        };
        self.page.show_alert(message, AlertKind::Danger);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::SESSION_AUTH_TOKEN;
    use crate::api::testing::{
        header, mock_client, mock_client_over, set_cookies, MockTransport, BASE_URL,
    };
    use crate::auth::{CookieFile, FileStorage, MemoryStorage, AUTH_TOKEN_KEY};
    use crate::models::UserProfile;

    const LOGIN_OK: &str = r#"{"token": "t1", "user": {"id": 1, "username": "a"}}"#;

    fn controller(csrf: Option<&str>) -> (ViewController, Arc<MockTransport>) {
        let (api, transport) = mock_client(csrf);
        (ViewController::new(api, Box::new(MemoryStorage::new())), transport)
    }

    fn login_form(username: &str, password: &str) -> UiEvent {
        UiEvent::Submit(
            FormData::new()
                .with(elements::LOGIN_USERNAME, username)
                .with(elements::LOGIN_PASSWORD, password),
        )
    }

    fn register_form(password: &str, confirm: &str) -> UiEvent {
        UiEvent::Submit(
            FormData::new()
                .with(elements::REGISTER_USERNAME, "a")
                .with(elements::REGISTER_EMAIL, "a@example.com")
                .with(elements::REGISTER_PASSWORD, password)
                .with(elements::REGISTER_PASSWORD_CONFIRM, confirm),
        )
    }

    fn alert_message(vc: &ViewController) -> Option<String> {
        vc.page().alert().map(|a| a.message)
    }

    fn card(id: &str) -> UiEvent {
        UiEvent::CardClick(StationCard {
            id: Some(StationId::new(id)),
            name: "Mission St Hub".to_string(),
            address: "1 Mission St".to_string(),
        })
    }

    #[tokio::test]
    async fn test_login_scenario() {
        let path = std::env::temp_dir()
            .join(format!("evspot-controller-test-{}", std::process::id()))
            .join("login.json");
        let _ = std::fs::remove_file(&path);

        let (api, transport) = mock_client(Some("xyz"));
        let storage = FileStorage::open(&path).unwrap();
        let mut vc = ViewController::new(api, Box::new(storage));
        vc.page().show_modal(elements::LOGIN_MODAL);
        transport.respond(200, LOGIN_OK);

        assert!(vc.dispatch("loginForm", login_form("a", "b")).await);

        let request = &transport.requests()[0];
        assert_eq!(request.url.path(), "/api/users/login/");
        assert_eq!(header(request, "x-csrftoken"), Some("xyz"));
        assert_eq!(header(request, "accept"), Some("application/json"));
        assert_eq!(
            request.body,
            Some(serde_json::json!({"username": "a", "password": "b"}))
        );

        assert!(vc.page().user_only_visible());
        assert_eq!(vc.page().nav_label().as_deref(), Some("a"));
        assert!(!vc.page().is_modal_visible(elements::LOGIN_MODAL));
        assert_eq!(alert_message(&vc).as_deref(), Some("Login successful!"));
        assert_eq!(vc.api().token(), Some("t1"));

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("t1"));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_login_with_empty_field_sends_nothing() {
        let (mut vc, transport) = controller(Some("xyz"));

        vc.dispatch("loginForm", login_form("a", "")).await;
        assert_eq!(transport.request_count(), 0);
        assert_eq!(alert_message(&vc).as_deref(), Some("Please fill in all fields"));
        assert!(!vc.page().user_only_visible());
    }

    #[tokio::test]
    async fn test_login_rejected_shows_server_message() {
        let (mut vc, transport) = controller(Some("xyz"));
        transport.respond(400, r#"{"error": "Invalid credentials"}"#);

        vc.dispatch("loginForm", login_form("a", "wrong")).await;
        assert_eq!(alert_message(&vc).as_deref(), Some("Invalid credentials"));
        assert!(!vc.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_login_network_failure_shows_generic_message() {
        let (mut vc, transport) = controller(Some("xyz"));
        transport.fail("connection refused");

        vc.dispatch("loginForm", login_form("a", "b")).await;
        assert_eq!(
            alert_message(&vc).as_deref(),
            Some("An error occurred during login")
        );
    }

    #[tokio::test]
    async fn test_register_network_failure_shows_generic_message() {
        let (mut vc, transport) = controller(Some("xyz"));
        transport.fail("connection refused");

        vc.dispatch("registerForm", register_form("password1", "password1")).await;
        assert_eq!(transport.request_count(), 1);
        assert_eq!(
            alert_message(&vc).as_deref(),
            Some("An error occurred during registration")
        );
    }

    #[tokio::test]
    async fn test_missing_csrf_alerts_without_request() {
        let (mut vc, transport) = controller(None);

        vc.dispatch("loginForm", login_form("a", "b")).await;
        assert_eq!(transport.request_count(), 0);
        assert_eq!(
            alert_message(&vc).as_deref(),
            Some("CSRF token not found. Please refresh the page.")
        );
    }

    #[tokio::test]
    async fn test_register_password_mismatch() {
        let (mut vc, transport) = controller(Some("xyz"));

        vc.dispatch("registerForm", register_form("abcdefgh", "abcdefgi")).await;
        assert_eq!(transport.request_count(), 0);
        assert_eq!(alert_message(&vc).as_deref(), Some("Passwords do not match"));
    }

    #[tokio::test]
    async fn test_register_password_length_boundary() {
        let (mut vc, transport) = controller(Some("xyz"));

        vc.dispatch("registerForm", register_form("abcdefg", "abcdefg")).await;
        assert_eq!(transport.request_count(), 0);
        assert_eq!(
            alert_message(&vc).as_deref(),
            Some("Password must be at least 8 characters long")
        );

        transport.respond(201, r#"{"username": "a", "email": "a@example.com"}"#);
        vc.page().show_modal(elements::REGISTER_MODAL);
        vc.dispatch("registerForm", register_form("abcdefgh", "abcdefgh")).await;
        assert_eq!(transport.request_count(), 1);
        assert_eq!(
            alert_message(&vc).as_deref(),
            Some("Registration successful! Please log in.")
        );
        assert!(!vc.page().is_modal_visible(elements::REGISTER_MODAL));
        assert!(vc.page().is_modal_visible(elements::LOGIN_MODAL));
        // Registration does not log in
        assert!(!vc.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_unreachable() {
        let (mut vc, transport) = controller(Some("xyz"));
        transport.respond(200, LOGIN_OK);
        vc.dispatch("loginForm", login_form("a", "b")).await;
        assert!(vc.page().user_only_visible());

        transport.fail("connection refused");
        vc.dispatch("logout-btn", UiEvent::Click).await;

        assert!(!vc.session().is_authenticated());
        assert!(!vc.page().user_only_visible());
        assert_eq!(vc.api().token(), None);
        assert_eq!(alert_message(&vc).as_deref(), Some("Logout successful!"));
    }

    #[tokio::test]
    async fn test_logout_success() {
        let (mut vc, transport) = controller(Some("xyz"));
        transport.respond(200, LOGIN_OK);
        vc.dispatch("loginForm", login_form("a", "b")).await;

        transport.respond(200, r#"{"message": "Logout successful"}"#);
        vc.dispatch("logout-btn", UiEvent::Click).await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].url.path(), "/api/users/logout/");
        assert_eq!(header(&requests[1], "x-csrftoken"), Some("xyz"));

        assert!(!vc.session().is_authenticated());
        assert_eq!(vc.session().token(), None);
        assert_eq!(vc.session().stored_profile(), None);
        assert_eq!(vc.api().token(), None);
        assert!(!vc.page().user_only_visible());
        assert_eq!(alert_message(&vc).as_deref(), Some("Logout successful!"));
    }

    #[tokio::test]
    async fn test_logout_without_csrf_clears_locally() {
        let (api, transport) = mock_client(None);
        let mut storage = MemoryStorage::new();
        storage.set(AUTH_TOKEN_KEY, "t1").unwrap();
        let mut vc = ViewController::new(api, Box::new(storage));
        transport.respond(200, r#"{"username": "a"}"#);
        assert!(vc.init().await.is_authenticated());
        assert_eq!(transport.request_count(), 1);

        vc.dispatch("logout-btn", UiEvent::Click).await;

        // No token to send, so no logout request
        assert_eq!(transport.request_count(), 1);
        assert!(!vc.session().is_authenticated());
        assert_eq!(vc.session().token(), None);
        assert_eq!(vc.session().stored_profile(), None);
        assert_eq!(vc.api().token(), None);
        assert!(!vc.page().user_only_visible());
        assert_eq!(alert_message(&vc).as_deref(), Some("Logout successful!"));
    }

    #[tokio::test]
    async fn test_cookie_session_survives_restart() {
        let dir = std::env::temp_dir().join(format!("evspot-restart-test-{}", std::process::id()));
        let storage_path = dir.join("storage.json");
        let cookies_path = dir.join("cookies.json");
        let _ = std::fs::remove_file(&storage_path);
        let _ = std::fs::remove_file(&cookies_path);
        let url = reqwest::Url::parse(BASE_URL).unwrap();

        // First run: the server answers login with a session cookie, no token
        {
            let cookies = CookieFile::open(&cookies_path).unwrap();
            set_cookies(&*cookies.store(), "csrftoken=xyz; Path=/", &url);
            let (api, transport) = mock_client_over(BASE_URL, cookies.store());
            let storage = FileStorage::open(&storage_path).unwrap();
            let mut vc = ViewController::new(api, Box::new(storage));
            transport.respond_with_cookie(
                200,
                r#"{"message": "Login successful", "user": {"username": "a"}}"#,
                "sessionid=abc; Path=/; HttpOnly",
            );

            vc.dispatch("loginForm", login_form("a", "b")).await;
            assert!(vc.session().is_authenticated());
            assert_eq!(vc.api().token(), Some(SESSION_AUTH_TOKEN));
            vc.teardown();
            cookies.save().unwrap();
        }

        // Second run: both files reloaded from disk
        let cookies = CookieFile::open(&cookies_path).unwrap();
        let (api, transport) = mock_client_over(BASE_URL, cookies.store());
        let storage = FileStorage::open(&storage_path).unwrap();
        let mut vc = ViewController::new(api, Box::new(storage));
        transport.respond(200, r#"{"username": "a"}"#);

        assert!(vc.init().await.is_authenticated());
        assert!(vc.page().user_only_visible());
        assert_eq!(vc.api().csrf_token().as_deref(), Some("xyz"));

        let request = &transport.requests()[0];
        assert_eq!(request.url.path(), "/api/users/profile/");
        let cookie = header(request, "cookie").unwrap();
        assert!(cookie.contains("sessionid=abc"));
        assert!(cookie.contains("csrftoken=xyz"));

        let _ = std::fs::remove_file(&storage_path);
        let _ = std::fs::remove_file(&cookies_path);
    }

    #[tokio::test]
    async fn test_init_with_rejected_token_shows_guest() {
        let (api, transport) = mock_client(Some("xyz"));
        let mut storage = MemoryStorage::new();
        storage.set(AUTH_TOKEN_KEY, "stale").unwrap();
        let mut vc = ViewController::new(api, Box::new(storage));
        transport.respond(401, r#"{"detail": "Invalid token."}"#);

        let state = vc.init().await;
        assert_eq!(state, AuthState::Guest);
        assert!(!vc.page().user_only_visible());
        assert_eq!(vc.api().token(), None);
    }

    #[tokio::test]
    async fn test_init_with_valid_token_shows_user() {
        let (api, transport) = mock_client(Some("xyz"));
        let mut storage = MemoryStorage::new();
        storage.set(AUTH_TOKEN_KEY, "t1").unwrap();
        let mut vc = ViewController::new(api, Box::new(storage));
        transport.respond(200, r#"{"username": "a"}"#);

        let state = vc.init().await;
        assert_eq!(state, AuthState::Authenticated(UserProfile::new("a")));
        assert!(vc.page().user_only_visible());
        assert_eq!(vc.api().token(), Some("t1"));
    }

    #[tokio::test]
    async fn test_consecutive_alerts_leave_one() {
        let (mut vc, _transport) = controller(Some("xyz"));
        vc.dispatch("loginForm", login_form("", "")).await;
        vc.dispatch("registerForm", register_form("abcdefgh", "x")).await;

        assert_eq!(vc.page().alert_count(), 1);
        assert_eq!(alert_message(&vc).as_deref(), Some("Passwords do not match"));
    }

    #[tokio::test]
    async fn test_start_charging_not_found() {
        let (mut vc, transport) = controller(Some("xyz"));
        vc.dispatch(".station-card", card("42")).await;
        transport.respond(404, r#"{"error": "not found"}"#);

        vc.dispatch("startChargingBtn", UiEvent::Click).await;

        let request = &transport.requests()[0];
        assert_eq!(request.url.path(), "/api/stations/42/start_charging/");
        assert_eq!(header(request, "x-csrftoken"), Some("xyz"));
        let alert = vc.page().alert().unwrap();
        assert_eq!(alert.message, "not found");
        assert_eq!(alert.kind, AlertKind::Danger);
    }

    #[tokio::test]
    async fn test_start_charging_success() {
        let (mut vc, transport) = controller(Some("xyz"));
        vc.select_station(StationId::from(7));
        transport.respond(
            201,
            r#"{"id": 3, "station": 7, "station_name": "Mission St Hub", "status": "active"}"#,
        );

        vc.dispatch("startChargingBtn", UiEvent::Click).await;
        assert_eq!(
            alert_message(&vc).as_deref(),
            Some("Charging started at Mission St Hub")
        );
    }

    #[tokio::test]
    async fn test_station_action_without_selection() {
        let (mut vc, transport) = controller(Some("xyz"));

        vc.dispatch("favoriteBtn", UiEvent::Click).await;
        assert_eq!(transport.request_count(), 0);
        let alert = vc.page().alert().unwrap();
        assert_eq!(alert.message, "Please select a station first");
        assert_eq!(alert.kind, AlertKind::Warning);
    }

    #[tokio::test]
    async fn test_add_favorite_posts_selected_station() {
        let (mut vc, transport) = controller(Some("xyz"));
        vc.select_station(StationId::from(7));
        transport.respond(201, r#"{"id": 1, "station": 7}"#);

        vc.dispatch("favoriteBtn", UiEvent::Click).await;
        assert_eq!(
            transport.requests()[0].body,
            Some(serde_json::json!({"station": 7}))
        );
        assert_eq!(alert_message(&vc).as_deref(), Some("Station added to favorites"));
    }

    #[test]
    fn test_radius_input_updates_label() {
        let (mut vc, _transport) = controller(Some("xyz"));
        assert_eq!(vc.radius_km(), DEFAULT_RADIUS_KM);

        vc.handle_radius("25");
        assert_eq!(vc.radius_km(), 25);
        assert_eq!(vc.page().text("radiusValue").as_deref(), Some("25km"));

        vc.handle_radius("abc");
        assert_eq!(vc.radius_km(), 25);
    }

    #[tokio::test]
    async fn test_radius_dispatch() {
        let (mut vc, _transport) = controller(Some("xyz"));
        assert!(vc.dispatch("searchRadius", UiEvent::Input("5".to_string())).await);
        assert_eq!(vc.page().text("radiusValue").as_deref(), Some("5km"));
    }

    #[tokio::test]
    async fn test_card_click_fills_details() {
        let (mut vc, _transport) = controller(Some("xyz"));
        assert!(vc.dispatch(".station-card", card("42")).await);

        assert_eq!(vc.page().text("stationName").as_deref(), Some("Mission St Hub"));
        assert_eq!(vc.page().text("stationAddress").as_deref(), Some("1 Mission St"));
        assert!(vc.page().is_modal_visible("stationDetailsModal"));
        assert_eq!(vc.selected_station().map(|s| s.as_str()), Some("42"));
    }

    #[tokio::test]
    async fn test_find_stations_renders_list() {
        let (mut vc, transport) = controller(Some("xyz"));
        transport.respond(
            200,
            r#"[{"id": 1, "name": "Mission St Hub", "available_ports": 2, "total_ports": 4}]"#,
        );

        assert!(vc.dispatch("find-stations", UiEvent::Click).await);

        let request = &transport.requests()[0];
        assert_eq!(request.url.path(), "/api/stations/nearby/");
        assert_eq!(
            request.body,
            Some(serde_json::json!({"latitude": 37.7749, "longitude": -122.4194, "radius": 10}))
        );
        let list = vc.page().text("stationList").unwrap();
        assert!(list.starts_with("[1] Mission St Hub"));
        // The searching notice stays up on success
        assert_eq!(alert_message(&vc).as_deref(), Some(MSG_SEARCHING));
    }

    #[tokio::test]
    async fn test_search_nearby_recenters_map() {
        let (mut vc, transport) = controller(Some("xyz"));
        transport.respond(200, "[]");
        let center = LatLng { lat: 40.7128, lng: -74.006 };

        vc.search_nearby(center).await;
        assert_eq!(vc.map().center, center);
        assert_eq!(
            vc.page().text("stationList").as_deref(),
            Some("No stations found within 10km")
        );
    }

    #[tokio::test]
    async fn test_sessions_render() {
        let (mut vc, transport) = controller(Some("xyz"));
        transport.respond(200, r#"{"results": []}"#);

        vc.dispatch("sessionsBtn", UiEvent::Click).await;
        assert_eq!(
            vc.page().text("sessionList").as_deref(),
            Some("No charging sessions yet")
        );
    }

    #[tokio::test]
    async fn test_unknown_target_is_ignored() {
        let (mut vc, transport) = controller(Some("xyz"));
        assert!(!vc.dispatch("nope", UiEvent::Click).await);
        // Bound element, wrong event
        assert!(!vc.dispatch("loginForm", UiEvent::Click).await);
        assert_eq!(transport.request_count(), 0);
        assert_eq!(vc.page().alert_count(), 0);
    }

    #[tokio::test]
    async fn test_teardown_keeps_stored_credential() {
        let (mut vc, transport) = controller(Some("xyz"));
        transport.respond(200, LOGIN_OK);
        vc.dispatch("loginForm", login_form("a", "b")).await;

        assert!(vc.page().user_only_visible());

        vc.teardown();
        assert!(!vc.session().is_authenticated());
        assert!(!vc.page().user_only_visible());
        assert_eq!(vc.page().nav_label(), None);
        assert_eq!(vc.session().stored_profile().map(|p| p.username), Some("a".to_string()));
    }
}
