//! Headless page model.
//!
//! `Page` holds the render targets the handlers write to: the alert banner,
//! modal visibility, text nodes by element id, and the visibility of
//! `user-only` elements. It is a cheap clonable handle; alert timers keep a
//! clone to dismiss the banner later.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::auth::{AuthState, SessionObserver};

/// Alerts dismiss themselves after this long
pub const ALERT_DISMISS_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Info,
    Warning,
    Danger,
}

impl AlertKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            AlertKind::Success => "alert-success",
            AlertKind::Info => "alert-info",
            AlertKind::Warning => "alert-warning",
            AlertKind::Danger => "alert-danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: u64,
    pub message: String,
    pub kind: AlertKind,
}

#[derive(Debug, Default)]
struct PageState {
    alert: Option<Alert>,
    next_alert_id: u64,
    texts: HashMap<String, String>,
    visible_modals: HashSet<String>,
    user_only_visible: bool,
    nav_label: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    state: Arc<Mutex<PageState>>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== Alerts =====

    /// Show `message`, replacing any alert on screen. Inside a Tokio runtime
    /// the alert is dismissed after `ALERT_DISMISS_AFTER`.
    pub fn show_alert(&self, message: impl Into<String>, kind: AlertKind) -> u64 {
        let message = message.into();
        let id = {
            let mut state = self.lock();
            state.next_alert_id += 1;
            let id = state.next_alert_id;
            state.alert = Some(Alert {
                id,
                message: message.clone(),
                kind,
            });
            id
        };
        debug!(id = id, kind = kind.css_class(), message = %message, "Alert shown");

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let page = self.clone();
            runtime.spawn(async move {
                tokio::time::sleep(ALERT_DISMISS_AFTER).await;
                page.dismiss_alert(id);
            });
        }
        id
    }

    /// Remove the alert with `id` if it is still the one shown
    pub fn dismiss_alert(&self, id: u64) -> bool {
        let mut state = self.lock();
        if state.alert.as_ref().is_some_and(|a| a.id == id) {
            state.alert = None;
            true
        } else {
            false
        }
    }

    pub fn alert(&self) -> Option<Alert> {
        self.lock().alert.clone()
    }

    pub fn alert_count(&self) -> usize {
        usize::from(self.lock().alert.is_some())
    }

    // ===== Text nodes =====

    pub fn set_text(&self, element: &str, text: impl Into<String>) {
        self.lock().texts.insert(element.to_string(), text.into());
    }

    pub fn text(&self, element: &str) -> Option<String> {
        self.lock().texts.get(element).cloned()
    }

    // ===== Modals =====

    pub fn show_modal(&self, modal: &str) {
        self.lock().visible_modals.insert(modal.to_string());
    }

    pub fn hide_modal(&self, modal: &str) {
        self.lock().visible_modals.remove(modal);
    }

    pub fn is_modal_visible(&self, modal: &str) -> bool {
        self.lock().visible_modals.contains(modal)
    }

    // ===== Session-driven state =====

    pub fn user_only_visible(&self) -> bool {
        self.lock().user_only_visible
    }

    /// Label of the user menu in the navigation bar
    pub fn nav_label(&self) -> Option<String> {
        self.lock().nav_label.clone()
    }
}

impl SessionObserver for Page {
    fn session_changed(&self, state: &AuthState) {
        let mut page = self.lock();
        page.user_only_visible = state.is_authenticated();
        page.nav_label = state.user().map(|user| user.username.clone());
    }
}
