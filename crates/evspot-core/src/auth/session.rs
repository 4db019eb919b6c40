use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::storage::CredentialStorage;
use crate::api::ApiClient;
use crate::models::UserProfile;

/// Storage key for the bearer token
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Storage key for the serialized user profile
pub const USER_DATA_KEY: &str = "userData";

/// Bearer token plus the profile snapshot it was issued for
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub token: String,
    pub profile: UserProfile,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Guest,
    Authenticated(UserProfile),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            AuthState::Authenticated(profile) => Some(profile),
            AuthState::Guest => None,
        }
    }
}

/// Notified after every credential change with the resulting state
pub trait SessionObserver: Send + Sync {
    fn session_changed(&self, state: &AuthState);
}

/// Owner of the current credential.
///
/// Nothing else reads or writes the credential keys in storage. Every
/// change is pushed to the observers before the method returns, so views
/// never see a state that disagrees with `current`.
pub struct SessionStore {
    storage: Box<dyn CredentialStorage>,
    current: Option<Credential>,
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn CredentialStorage>) -> Self {
        Self {
            storage,
            current: None,
            observers: Vec::new(),
        }
    }

    /// Register an observer. It is told the current state immediately.
    pub fn subscribe(&mut self, observer: Arc<dyn SessionObserver>) {
        observer.session_changed(&self.state());
        self.observers.push(observer);
    }

    pub fn state(&self) -> AuthState {
        match self.current {
            Some(ref credential) => AuthState::Authenticated(credential.profile.clone()),
            None => AuthState::Guest,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.current.as_ref().map(|c| &c.profile)
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.token.as_str())
    }

    /// Make `token`/`profile` the current credential and persist it.
    /// Supersedes any previous credential.
    pub fn set_credential(&mut self, token: String, profile: UserProfile) {
        if let Err(e) = self.storage.set(AUTH_TOKEN_KEY, &token) {
            error!(error = %e, "Failed to persist auth token");
        }
        match serde_json::to_string(&profile) {
            Ok(user_data) => {
                if let Err(e) = self.storage.set(USER_DATA_KEY, &user_data) {
                    error!(error = %e, "Failed to persist user data");
                }
            }
            Err(e) => error!(error = %e, "Failed to serialize user data"),
        }

        debug!(username = %profile.username, "Credential set");
        self.current = Some(Credential { token, profile });
        self.notify();
    }

    /// Forget the credential, in memory and in storage. Never fails.
    pub fn clear_credential(&mut self) {
        for key in [AUTH_TOKEN_KEY, USER_DATA_KEY] {
            if let Err(e) = self.storage.remove(key) {
                error!(key = key, error = %e, "Failed to remove stored credential");
            }
        }

        debug!("Credential cleared");
        self.current = None;
        self.notify();
    }

    /// Re-authenticate from a stored token.
    ///
    /// No stored token leaves a guest. A stored token is checked against the
    /// profile endpoint; any failure (rejected token or unreachable server)
    /// clears the credential.
    pub async fn restore(&mut self, api: &ApiClient) -> AuthState {
        let token = match self.stored_token() {
            Some(token) => token,
            None => {
                debug!("No stored token, starting as guest");
                self.current = None;
                self.notify();
                return AuthState::Guest;
            }
        };

        match api.verify_profile(&token).await {
            Ok(profile) => {
                info!(username = %profile.username, "Session restored");
                self.set_credential(token, profile);
            }
            Err(e) => {
                warn!(error = %e, "Stored token could not be verified");
                self.clear_credential();
            }
        }
        self.state()
    }

    /// Profile snapshot from the last login, if one is stored
    pub fn stored_profile(&self) -> Option<UserProfile> {
        let raw = match self.storage.get(USER_DATA_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read stored user data");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "Stored user data is not a valid profile");
                None
            }
        }
    }

    fn stored_token(&self) -> Option<String> {
        match self.storage.get(AUTH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                None
            }
        }
    }

    /// Drop the in-memory identity, tell observers they now show a guest,
    /// then detach them. Storage is kept so the next `restore` can pick the
    /// credential up again.
    pub fn teardown(&mut self) {
        self.current = None;
        self.notify();
        self.observers.clear();
    }

    fn notify(&self) {
        let state = self.state();
        for observer in &self.observers {
            observer.session_changed(&state);
        }
    }
}
