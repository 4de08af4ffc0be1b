use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::SessionData;
use crate::error::{ApiError, SessionError};

/// Per-request session handle.
///
/// Clones share the same state. Every mutation that actually changes the
/// data marks the session modified; the middleware reads that flag once the
/// handler has finished.
#[derive(Clone, Debug)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

#[derive(Debug)]
struct SessionState {
    data: SessionData,
    is_new: bool,
    modified: bool,
    cleared: bool,
}

/// What the middleware should do with the cookie after the handler ran.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Unchanged,
    Modified(SessionData),
    Cleared,
}

impl Session {
    /// Fresh, empty session for a visitor without a valid cookie.
    pub fn new() -> Self {
        Self::with_state(SessionData::new(), true)
    }

    /// Session seeded from a verified cookie.
    pub fn from_data(data: SessionData) -> Self {
        Self::with_state(data, false)
    }

    fn with_state(data: SessionData, is_new: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                data,
                is_new,
                modified: false,
                cleared: false,
            })),
        }
    }

    // A handler that panicked mid-update still leaves usable data behind
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_value(key)?;
        serde_json::from_value(value).ok()
    }

    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.state().data.get(key).cloned()
    }

    pub fn insert<T: Serialize>(
        &self,
        key: impl Into<String>,
        value: T,
    ) -> Result<(), SessionError> {
        let value = serde_json::to_value(value)?;
        self.insert_value(key, value);
        Ok(())
    }

    pub fn insert_value(&self, key: impl Into<String>, value: Value) {
        let mut state = self.state();
        state.cleared = false;
        let previous = state.data.insert(key.into(), value.clone());
        if previous.as_ref() != Some(&value) {
            state.modified = true;
        }
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut state = self.state();
        let removed = state.data.remove(key);
        if removed.is_some() {
            state.modified = true;
        }
        removed
    }

    /// Drop the whole session. The client is told to delete its cookie
    /// unless something is inserted again before the response is sent.
    pub fn clear(&self) {
        let mut state = self.state();
        state.data.clear();
        state.cleared = true;
        state.modified = true;
    }

    /// No valid session cookie came with the request.
    pub fn is_new(&self) -> bool {
        self.state().is_new
    }

    pub fn is_changed(&self) -> bool {
        self.state().modified
    }

    pub fn is_populated(&self) -> bool {
        !self.state().data.is_empty()
    }

    pub fn data(&self) -> SessionData {
        self.state().data.clone()
    }

    pub fn outcome(&self) -> SessionOutcome {
        let state = self.state();
        if state.cleared {
            SessionOutcome::Cleared
        } else if state.modified && (!state.is_new || !state.data.is_empty()) {
            SessionOutcome::Modified(state.data.clone())
        } else {
            SessionOutcome::Unchanged
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Session>().cloned().ok_or_else(|| {
            tracing::error!("Session extractor used without the session middleware");
            ApiError::internal_server_error("Session middleware is not installed")
        })
    }
}
