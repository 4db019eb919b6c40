//! Authentication module for the persisted credential.
//!
//! This module provides:
//! - `SessionStore`: The current credential, its persistence and the
//!   guest/authenticated state observers render from
//! - `CookieFile`: The HTTP cookie jar (server session, CSRF token) saved
//!   to disk between runs
//! - `CredentialStorage`: Durable key/value storage for the credential,
//!   file-backed (`FileStorage`) or in memory (`MemoryStorage`)
//!
//! The credential is stored under `authToken` and `userData`.

pub mod cookies;
pub mod session;
pub mod storage;

pub use cookies::CookieFile;
pub use session::{
    AuthState, Credential, SessionObserver, SessionStore, AUTH_TOKEN_KEY, USER_DATA_KEY,
};
pub use storage::{CredentialStorage, FileStorage, MemoryStorage, StorageError};
