//! API client for communicating with the EV Spot REST API.
//!
//! Every operation issues exactly one request (no retries, no timeout) and
//! reports every failure as an `ApiError`. Mutating requests are abandoned
//! before any I/O when no CSRF token can be found.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::csrf::{self, CSRF_HEADER_NAME};
use super::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use super::validation::{
    validate_login, validate_registration, validate_search, validate_station, RegistrationForm,
};
use super::ApiError;
use crate::models::{ChargingSession, Favorite, Station, StationId, UserProfile};

// ============================================================================
// Constants
// ============================================================================

// Relative to the base URL so a path prefix on it is kept
const LOGIN_PATH: &str = "api/users/login/";
const REGISTER_PATH: &str = "api/users/register/";
const LOGOUT_PATH: &str = "api/users/logout/";
const PROFILE_PATH: &str = "api/users/profile/";
const STATIONS_PATH: &str = "api/stations/";
const NEARBY_STATIONS_PATH: &str = "api/stations/nearby/";
const FAVORITES_PATH: &str = "api/favorites/";
const SESSIONS_PATH: &str = "api/sessions/";

/// Token recorded when the server authenticates through its session cookie
/// and returns no bearer token. Profile verification then succeeds or fails
/// on the cookie alone.
pub const SESSION_AUTH_TOKEN: &str = "session";

/// Coordinates are stored with 6 decimal places server-side and more are
/// rejected.
const COORDINATE_SCALE: f64 = 1_000_000.0;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct Paginated<T> {
    results: Vec<T>,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub token: String,
    pub user: UserProfile,
}

/// What the server echoes back after registration. No session is created.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisteredUser {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Whether a request may go out without a CSRF token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Csrf {
    Required,
    IfPresent,
}

/// API client for EV Spot.
/// Clone is cheap - the transport and cookie store are shared.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    cookies: Arc<dyn CookieStore>,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the API at `base_url` with its own in-memory
    /// cookie jar
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_cookies(base_url, Arc::new(Jar::default()))
    }

    /// Create a client whose session and CSRF cookies live in `cookies`,
    /// e.g. a store that is saved to disk between runs
    pub fn with_cookies<C>(base_url: &str, cookies: Arc<C>) -> Result<Self, ApiError>
    where
        C: CookieStore + 'static,
    {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let transport = Arc::new(HttpTransport::new(cookies.clone())?);
        Ok(Self::with_transport(base_url, transport, cookies))
    }

    /// Create a client over an explicit transport and cookie store
    pub fn with_transport(
        base_url: Url,
        transport: Arc<dyn Transport>,
        cookies: Arc<dyn CookieStore>,
    ) -> Self {
        Self {
            transport,
            cookies,
            base_url,
            token: None,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Current CSRF token, read from the cookie store on every call
    pub fn csrf_token(&self) -> Option<String> {
        csrf::read_token(self.cookies.as_ref(), &self.base_url)
    }

    // ===== Request plumbing =====

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// `api/stations/{id}/{action}/`, with the id as one percent-encoded
    /// path segment
    fn station_endpoint(&self, station: &StationId, action: &str) -> Result<Url, ApiError> {
        let mut url = self.endpoint(STATIONS_PATH)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend([station.as_str(), action, ""]);
        Ok(url)
    }

    fn build_request(
        &self,
        method: Method,
        url: Url,
        csrf: Csrf,
        body: Option<Value>,
    ) -> Result<ApiRequest, ApiError> {
        let mut headers = HeaderMap::new();

        match self.csrf_token() {
            Some(token) => {
                let value = HeaderValue::from_str(&token).map_err(|_| ApiError::CsrfMissing)?;
                headers.insert(HeaderName::from_static(CSRF_HEADER_NAME), value);
            }
            None if csrf == Csrf::Required => {
                warn!(path = url.path(), "CSRF token not found, request not sent");
                return Err(ApiError::CsrfMissing);
            }
            None => {}
        }

        if method == Method::POST {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        if let Some(ref token) = self.token {
            headers.insert(header::AUTHORIZATION, bearer(token)?);
        }

        Ok(ApiRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Check if response is successful, returning an error built from the body if not.
    fn check_response(response: ApiResponse, fallback: &str) -> Result<ApiResponse, ApiError> {
        if response.is_success() {
            Ok(response)
        } else {
            debug!(
                status = %response.status,
                body = %ApiError::truncate_body(&response.body),
                "Request failed"
            );
            Err(ApiError::from_status(response.status, &response.body, fallback))
        }
    }

    async fn send(&self, request: ApiRequest, fallback: &str) -> Result<ApiResponse, ApiError> {
        let path = request.url.path().to_string();
        let response = self.transport.execute(request).await.map_err(|e| {
            warn!(path = %path, error = %e, "Request could not be sent");
            e
        })?;
        Self::check_response(response, fallback)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let path = request.url.path().to_string();
        let response = self.send(request, fallback).await?;
        parse(&path, &response.body)
    }

    async fn call_list<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        fallback: &str,
    ) -> Result<Vec<T>, ApiError> {
        let path = request.url.path().to_string();
        let response = self.send(request, fallback).await?;

        // Try parsing as direct array first, then as a paginated page
        if let Ok(items) = serde_json::from_str::<Vec<T>>(&response.body) {
            return Ok(items);
        }
        let page: Paginated<T> = parse(&path, &response.body)?;
        Ok(page.results)
    }

    // ===== Authentication =====

    /// Ask the server for the page at the API root so it sets the CSRF
    /// cookie. Returns whether a token is available afterwards.
    pub async fn prime_csrf(&self) -> bool {
        if self.csrf_token().is_some() {
            return true;
        }
        let request = self
            .endpoint("")
            .and_then(|url| self.build_request(Method::GET, url, Csrf::IfPresent, None));
        match request {
            Ok(request) => {
                if let Err(e) = self.transport.execute(request).await {
                    warn!(error = %e, "Could not fetch CSRF cookie");
                }
            }
            Err(e) => warn!(error = %e, "Could not build CSRF request"),
        }
        self.csrf_token().is_some()
    }

    /// Log in and return the bearer token and user profile
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginSuccess, ApiError> {
        validate_login(username, password)?;

        let body = json!({ "username": username, "password": password });
        let url = self.endpoint(LOGIN_PATH)?;
        let mut request = self.build_request(Method::POST, url, Csrf::Required, Some(body))?;
        request
            .headers
            .insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let response: LoginResponse = self.call(request, "Login failed").await?;
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| SESSION_AUTH_TOKEN.to_string());

        info!(username = %response.user.username, "Login successful");
        Ok(LoginSuccess {
            token,
            user: response.user,
        })
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, form: &RegistrationForm) -> Result<RegisteredUser, ApiError> {
        validate_registration(form)?;

        let body = json!({
            "username": form.username,
            "email": form.email,
            "password": form.password,
            "password2": form.password_confirm,
        });
        let url = self.endpoint(REGISTER_PATH)?;
        let request = self.build_request(Method::POST, url, Csrf::Required, Some(body))?;
        let registered: RegisteredUser = self.call(request, "Registration failed").await?;

        info!(username = %form.username, "Registration successful");
        Ok(registered)
    }

    /// Tell the server to end its session. Callers clear local state
    /// whatever this returns.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.endpoint(LOGOUT_PATH)?;
        let mut request = self.build_request(Method::POST, url, Csrf::Required, None)?;
        request
            .headers
            .insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        self.send(request, "Logout failed").await?;
        info!("Logged out");
        Ok(())
    }

    /// Check `token` against the profile endpoint. Any non-2xx answer means
    /// the token is no longer valid.
    pub async fn verify_profile(&self, token: &str) -> Result<UserProfile, ApiError> {
        if token.is_empty() {
            return Err(ApiError::InvalidToken);
        }

        let url = self.endpoint(PROFILE_PATH)?;
        let mut request = self.build_request(Method::GET, url, Csrf::IfPresent, None)?;
        request.headers.insert(header::AUTHORIZATION, bearer(token)?);

        let path = request.url.path().to_string();
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            warn!(status = %response.status, "Stored token rejected");
            return Err(ApiError::InvalidToken);
        }
        parse(&path, &response.body)
    }

    // ===== Stations =====

    /// Find active stations within `radius_km` of a point, nearest first
    pub async fn find_nearby_stations(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: u32,
    ) -> Result<Vec<Station>, ApiError> {
        validate_search(latitude, longitude, radius_km)?;

        let body = json!({
            "latitude": round_coordinate(latitude),
            "longitude": round_coordinate(longitude),
            "radius": radius_km,
        });
        let url = self.endpoint(NEARBY_STATIONS_PATH)?;
        let request = self.build_request(Method::POST, url, Csrf::Required, Some(body))?;
        let stations: Vec<Station> = self.call_list(request, "Failed to fetch stations").await?;

        debug!(count = stations.len(), radius_km = radius_km, "Nearby stations fetched");
        Ok(stations)
    }

    pub async fn start_charging(&self, station: &StationId) -> Result<ChargingSession, ApiError> {
        validate_station(station)?;

        let url = self.station_endpoint(station, "start_charging")?;
        let request = self.build_request(Method::POST, url, Csrf::Required, None)?;
        let session: ChargingSession = self.call(request, "Failed to start charging").await?;

        info!(station = %station, session = session.id, "Charging started");
        Ok(session)
    }

    pub async fn stop_charging(&self, station: &StationId) -> Result<ChargingSession, ApiError> {
        validate_station(station)?;

        let url = self.station_endpoint(station, "stop_charging")?;
        let request = self.build_request(Method::POST, url, Csrf::Required, None)?;
        let session: ChargingSession = self.call(request, "Failed to stop charging").await?;

        info!(station = %station, session = session.id, "Charging stopped");
        Ok(session)
    }

    // ===== Favorites & sessions =====

    pub async fn add_favorite(&self, station: &StationId) -> Result<Favorite, ApiError> {
        validate_station(station)?;

        let body = json!({ "station": station });
        let url = self.endpoint(FAVORITES_PATH)?;
        let request = self.build_request(Method::POST, url, Csrf::Required, Some(body))?;
        self.call(request, "Failed to add to favorites").await
    }

    pub async fn list_favorites(&self) -> Result<Vec<Favorite>, ApiError> {
        let url = self.endpoint(FAVORITES_PATH)?;
        let request = self.build_request(Method::GET, url, Csrf::IfPresent, None)?;
        self.call_list(request, "Failed to fetch favorites").await
    }

    /// Charging sessions of the logged-in user
    pub async fn list_user_sessions(&self) -> Result<Vec<ChargingSession>, ApiError> {
        let url = self.endpoint(SESSIONS_PATH)?;
        let request = self.build_request(Method::GET, url, Csrf::IfPresent, None)?;
        self.call_list(request, "Failed to fetch sessions").await
    }
}

fn bearer(token: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| ApiError::InvalidToken)
}

fn parse<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e)))
}

fn round_coordinate(value: f64) -> f64 {
    (value * COORDINATE_SCALE).round() / COORDINATE_SCALE
}
