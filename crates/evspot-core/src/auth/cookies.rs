//! Cookie jar kept on disk.
//!
//! A backend that authenticates with a session cookie needs that cookie on
//! every later run, the way a browser keeps it between page loads. The jar
//! also carries `csrftoken`, so mutating calls work without priming first.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};

use reqwest_cookie_store::{CookieStore, CookieStoreMutex};
use tracing::debug;

use super::storage::StorageError;

pub struct CookieFile {
    path: PathBuf,
    store: Arc<CookieStoreMutex>,
}

impl CookieFile {
    /// Load the jar saved at `path`. A missing file is an empty jar;
    /// expired cookies are dropped.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let store = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            cookie_store::serde::json::load(reader)
                .map_err(|e| StorageError::Cookies(e.to_string()))?
        } else {
            CookieStore::default()
        };
        debug!(path = %path.display(), cookies = store.iter_unexpired().count(), "Cookie jar opened");

        Ok(Self {
            path,
            store: Arc::new(CookieStoreMutex::new(store)),
        })
    }

    /// The shared jar, to hand to `ApiClient::with_cookies`
    pub fn store(&self) -> Arc<CookieStoreMutex> {
        Arc::clone(&self.store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the jar back, session cookies included
    pub fn save(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&self.path)?;
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut file)
            .map_err(|e| StorageError::Cookies(e.to_string()))?;
        debug!(path = %self.path.display(), "Cookie jar saved");
        Ok(())
    }
}
