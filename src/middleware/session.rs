use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::config::SessionConfig;
use crate::session::cookie::{self, Cookies, MAX_COOKIE_BYTES};
use crate::session::handle::SessionOutcome;
use crate::session::{Session, SessionCodec};

/// Shared, immutable middleware state built once at startup.
#[derive(Clone, Debug)]
pub struct SessionLayerState {
    inner: Arc<SessionLayerInner>,
}

#[derive(Debug)]
struct SessionLayerInner {
    config: SessionConfig,
    codec: SessionCodec,
}

impl SessionLayerState {
    pub fn new(config: SessionConfig) -> Self {
        let codec = SessionCodec::new(config.secret.clone());
        Self {
            inner: Arc::new(SessionLayerInner { config, codec }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.inner.codec
    }

    /// Session for an incoming request. Bad or foreign cookies yield a fresh session.
    fn load(&self, cookies: &Cookies) -> Session {
        let name = &self.config().cookie_name;
        let Some(value) = cookies.get(name) else {
            return Session::new();
        };

        match self.codec().decode(value) {
            Some(data) => Session::from_data(data),
            None => {
                tracing::debug!("Discarding unverifiable {} cookie", name);
                Session::new()
            }
        }
    }

    /// `Set-Cookie` value to send back, if any.
    fn finalize(&self, session: &Session) -> Option<String> {
        let name = &self.config().cookie_name;
        match session.outcome() {
            SessionOutcome::Unchanged => None,
            SessionOutcome::Cleared => {
                tracing::debug!("Session cleared, expiring {} cookie", name);
                Some(cookie::format_expired_cookie(name))
            }
            SessionOutcome::Modified(data) => match self.codec().encode(&data) {
                Ok(payload) => {
                    let set_cookie =
                        cookie::format_set_cookie(name, &payload, self.config().max_age_secs());
                    if set_cookie.len() > MAX_COOKIE_BYTES {
                        tracing::warn!(
                            "{} cookie is {} bytes, browsers may ignore it",
                            name,
                            set_cookie.len()
                        );
                    }
                    Some(set_cookie)
                }
                Err(e) => {
                    tracing::error!("Failed to encode session: {}", e);
                    None
                }
            },
        }
    }
}

/// Cookie parsing and signed session middleware.
///
/// Injects [`Cookies`] and [`Session`] into the request, runs the rest of the
/// pipeline, then appends `Set-Cookie` when the session changed. Error
/// responses from handlers pass through untouched and are finalized the same
/// way as successful ones.
pub async fn session_middleware(
    State(state): State<SessionLayerState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookies = Cookies::from_headers(request.headers());
    let session = state.load(&cookies);

    request.extensions_mut().insert(cookies);
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    if let Some(set_cookie) = state.finalize(&session) {
        match HeaderValue::from_str(&set_cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Invalid Set-Cookie header value: {}", e),
        }
    }

    response
}
