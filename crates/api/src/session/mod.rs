//! Cookie-backed per-browser session.
//!
//! - [`Session`] -- Axum extractor holding the decoded session values.
//! - [`SavedSession`] -- response part that writes the `Set-Cookie` header.
//! - [`Flash`] -- one-shot status message stored in the session.
//! - [`SessionKey`] -- HMAC key used to sign the cookie.
//!
//! Cookie parsing and serialization go through `axum_extra`'s [`CookieJar`];
//! this module only signs, verifies and interprets the value.
//!
//! Mutations only reach the browser when the handler returns the
//! [`SavedSession`] produced by [`Session::save`]. Every handler that changes
//! the session must include it in its response.

mod cookie;
mod flash;

use std::collections::BTreeMap;
use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use folio_core::types::{DbId, Timestamp};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use cookie::{SessionKey, SessionPayload};
pub use flash::Flash;

use crate::auth::account::SessionGrant;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Lifetime of a session after a successful login (3 hours).
pub const LOGIN_TTL_SECS: i64 = 3 * 60 * 60;

/// Reserved session keys.
pub mod keys {
    pub const IS_LOGIN: &str = "isLogin";
    pub const NAME: &str = "name";
    pub const USER_ID: &str = "id";
    pub const MESSAGE: &str = "message";
    pub const ALERT_STATUS: &str = "alertStatus";
    pub const FLASH_NAME: &str = "flashName";
}

/// Errors from typed session access and cookie encoding.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session key '{0}' is not set")]
    Missing(String),

    #[error("Session key '{key}' has an unexpected type: {source}")]
    WrongType {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode session cookie: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum CookieState {
    #[default]
    Unchanged,
    Modified,
    Invalidated,
}

/// Decoded session state for the current request.
#[derive(Debug, Clone, Default)]
pub struct Session {
    values: BTreeMap<String, Value>,
    expires_at: Option<Timestamp>,
    state: CookieState,
}

impl Session {
    /// An empty, browser-session-scoped session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the session cookie from `jar`, falling back to an empty session
    /// when the cookie is absent, forged, or expired.
    pub fn from_jar(jar: &CookieJar, key: &SessionKey, now: Timestamp) -> Self {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| key.decode(cookie.value(), now))
            .map(Self::from_payload)
            .unwrap_or_default()
    }

    /// [`Session::from_jar`] over raw request headers.
    pub fn from_headers(headers: &HeaderMap, key: &SessionKey, now: Timestamp) -> Self {
        Self::from_jar(&CookieJar::from_headers(headers), key, now)
    }

    fn from_payload(payload: SessionPayload) -> Self {
        Self {
            values: payload.values,
            expires_at: payload.expires_at,
            state: CookieState::Unchanged,
        }
    }

    /// Typed read of a session value.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, SessionError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| SessionError::Missing(key.to_string()))?;
        serde_json::from_value(value.clone()).map_err(|source| SessionError::WrongType {
            key: key.to_string(),
            source,
        })
    }

    /// Typed read that treats a missing or mistyped value as absent.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).ok()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
        self.state = CookieState::Modified;
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.values.remove(key);
        if removed.is_some() {
            self.state = CookieState::Modified;
        }
        removed
    }

    pub fn is_login(&self) -> bool {
        self.get_opt::<bool>(keys::IS_LOGIN).unwrap_or(false)
    }

    /// Display name of the logged-in user.
    pub fn user_name(&self) -> Result<String, SessionError> {
        self.get(keys::NAME)
    }

    /// Name to greet in the page header: `Some` only for a logged-in
    /// session carrying a readable name.
    pub fn display_name(&self) -> Option<String> {
        if !self.is_login() {
            return None;
        }
        match self.user_name() {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::warn!(error = %e, "Logged-in session without a usable name");
                None
            }
        }
    }

    pub fn user_id(&self) -> Result<DbId, SessionError> {
        self.get(keys::USER_ID)
    }

    /// Mark the session as authenticated for `grant`, expiring
    /// [`LOGIN_TTL_SECS`] after `now`.
    pub fn login(&mut self, grant: &SessionGrant, now: Timestamp) {
        self.insert(keys::IS_LOGIN, true);
        self.insert(keys::NAME, grant.name.clone());
        self.insert(keys::USER_ID, grant.user_id);
        self.expires_at = Some(now + Duration::seconds(LOGIN_TTL_SECS));
    }

    /// Drop every value and expire the cookie.
    pub fn invalidate(&mut self) {
        self.values.clear();
        self.expires_at = None;
        self.state = CookieState::Invalidated;
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// Whether the session is still live at `now`. Sessions without an
    /// expiry last for the browser session.
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        self.state != CookieState::Invalidated && self.expires_at.map_or(true, |e| now < e)
    }

    pub fn set_flash(&mut self, flash: Flash) {
        self.insert(keys::MESSAGE, flash.message);
        self.insert(keys::ALERT_STATUS, flash.status);
        match flash.name {
            Some(name) => self.insert(keys::FLASH_NAME, name),
            None => {
                self.remove(keys::FLASH_NAME);
            }
        }
    }

    /// Read and clear the pending flash message.
    ///
    /// The caller must save the session in the same response so a reload
    /// does not repeat the message.
    pub fn take_flash(&mut self) -> Option<Flash> {
        let message = self.remove(keys::MESSAGE);
        let status = self.remove(keys::ALERT_STATUS);
        let name = self.remove(keys::FLASH_NAME);

        let message = message?.as_str()?.to_string();
        Some(Flash {
            message,
            status: status.and_then(|s| s.as_bool()).unwrap_or(false),
            name: name.and_then(|n| n.as_str().map(str::to_string)),
        })
    }

    /// Encode the session into a `Set-Cookie` response part.
    ///
    /// An unchanged session produces no cookie.
    pub fn save(&self, key: &SessionKey) -> Result<SavedSession, SessionError> {
        let cookie = match self.state {
            CookieState::Unchanged => return Ok(SavedSession { cookie: None }),
            CookieState::Invalidated => {
                let mut cookie = session_cookie(String::new());
                cookie.set_max_age(time::Duration::ZERO);
                cookie
            }
            CookieState::Modified => {
                let payload = SessionPayload {
                    values: self.values.clone(),
                    expires_at: self.expires_at,
                };
                let value = key
                    .encode(&payload)
                    .map_err(|e| SessionError::Encode(e.to_string()))?;
                let mut cookie = session_cookie(value);
                if let Some(expires_at) = self.expires_at {
                    let max_age = (expires_at - Utc::now()).num_seconds().max(0);
                    cookie.set_max_age(time::Duration::seconds(max_age));
                }
                cookie
            }
        };

        Ok(SavedSession {
            cookie: Some(cookie),
        })
    }
}

/// `session=<value>; HttpOnly; SameSite=Lax; Path=/`
fn session_cookie(value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Session::from_headers(
            &parts.headers,
            &state.session_key,
            Utc::now(),
        ))
    }
}

/// Session cookie to set on the response. Include it in the handler's
/// response tuple.
#[derive(Debug)]
pub struct SavedSession {
    cookie: Option<Cookie<'static>>,
}

impl SavedSession {
    pub fn cookie(&self) -> Option<&Cookie<'static>> {
        self.cookie.as_ref()
    }
}

impl IntoResponseParts for SavedSession {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        match self.cookie {
            Some(cookie) => CookieJar::new().add(cookie).into_response_parts(res),
            None => Ok(res),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::http::header::COOKIE;
    use axum::http::HeaderValue;
    use chrono::TimeZone;
    use folio_core::validation::MAX_NAME_CHARS;

    use super::*;

    /// Browsers drop any single cookie whose `Set-Cookie` exceeds this.
    const BROWSER_COOKIE_LIMIT: usize = 4096;

    fn key() -> SessionKey {
        SessionKey::new("unit-test-secret-unit-test-secret")
    }

    fn grant() -> SessionGrant {
        SessionGrant {
            user_id: 7,
            name: "alice".into(),
        }
    }

    /// Feed a saved session back in as the next request's cookie header.
    fn round_trip(session: &Session, now: Timestamp) -> Session {
        let saved = session.save(&key()).unwrap();
        let pair = saved.cookie().unwrap().stripped().to_string();

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&pair).unwrap());
        Session::from_headers(&headers, &key(), now)
    }

    #[test]
    fn missing_cookie_yields_empty_session() {
        let session = Session::from_headers(&HeaderMap::new(), &key(), Utc::now());
        assert!(!session.is_login());
        assert_matches!(session.user_name(), Err(SessionError::Missing(_)));
        assert_eq!(session.display_name(), None);
    }

    #[test]
    fn typed_accessor_reports_wrong_type() {
        let mut session = Session::new();
        session.insert(keys::NAME, 42);
        assert_matches!(session.user_name(), Err(SessionError::WrongType { .. }));
        assert_eq!(session.get_opt::<String>(keys::NAME), None);
    }

    #[test]
    fn login_sets_identity_and_ttl() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut session = Session::new();
        session.login(&grant(), now);

        assert!(session.is_login());
        assert_eq!(session.user_name().unwrap(), "alice");
        assert_eq!(session.display_name().as_deref(), Some("alice"));
        assert_eq!(session.user_id().unwrap(), 7);
        assert_eq!(session.expires_at(), Some(now + Duration::hours(3)));
    }

    #[test]
    fn display_name_requires_login() {
        let mut session = Session::new();
        session.insert(keys::NAME, "alice");
        assert_eq!(session.display_name(), None);
    }

    #[test]
    fn login_ttl_boundary_is_three_hours() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut session = Session::new();
        session.login(&grant(), now);

        assert!(session.is_valid_at(now + Duration::hours(2) + Duration::minutes(59)));
        assert!(!session.is_valid_at(now + Duration::hours(3)));
        assert!(!session.is_valid_at(now + Duration::hours(3) + Duration::minutes(1)));
    }

    #[test]
    fn flash_is_read_once() {
        let mut session = Session::new();
        session.set_flash(Flash::success("Login success").with_name("alice"));

        let first = session.take_flash();
        assert_eq!(
            first,
            Some(Flash {
                message: "Login success".into(),
                status: true,
                name: Some("alice".into()),
            })
        );
        assert_eq!(session.take_flash(), None);
    }

    #[test]
    fn drained_flash_survives_cookie_round_trip_as_empty() {
        let now = Utc::now();
        let mut session = Session::new();
        session.set_flash(Flash::failure("Invalid email or password"));
        let mut next = round_trip(&session, now);

        assert_eq!(
            next.take_flash().map(|f| (f.message, f.status)),
            Some(("Invalid email or password".to_string(), false))
        );
        let mut after = round_trip(&next, now);
        assert_eq!(after.take_flash(), None);
    }

    #[test]
    fn flash_does_not_clobber_user_name() {
        let mut session = Session::new();
        session.login(&grant(), Utc::now());
        session.set_flash(Flash::success("Project updated").with_name("Dashboard"));
        session.take_flash();
        assert_eq!(session.user_name().unwrap(), "alice");
    }

    #[test]
    fn login_cookie_carries_max_age() {
        let mut session = Session::new();
        session.login(&grant(), Utc::now());
        let saved = session.save(&key()).unwrap();
        let cookie = saved.cookie().unwrap();

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        let max_age = cookie.max_age().unwrap().whole_seconds();
        assert!(max_age > LOGIN_TTL_SECS - 60 && max_age <= LOGIN_TTL_SECS);
    }

    #[test]
    fn anonymous_cookie_has_no_max_age() {
        let mut session = Session::new();
        session.set_flash(Flash::success("Register success"));
        let saved = session.save(&key()).unwrap();
        assert_eq!(saved.cookie().unwrap().max_age(), None);
    }

    #[test]
    fn logged_in_session_round_trips_until_expiry() {
        let now = Utc::now();
        let mut session = Session::new();
        session.login(&grant(), now);

        let restored = round_trip(&session, now + Duration::minutes(179));
        assert!(restored.is_login());
        assert_eq!(restored.user_name().unwrap(), "alice");

        let expired = round_trip(&session, now + Duration::minutes(181));
        assert!(!expired.is_login());
    }

    #[test]
    fn invalidate_expires_cookie() {
        let mut session = Session::new();
        session.login(&grant(), Utc::now());
        session.invalidate();

        assert!(!session.is_login());
        assert!(!session.is_valid_at(Utc::now()));
        let saved = session.save(&key()).unwrap();
        let cookie = saved.cookie().unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn unchanged_session_writes_no_cookie() {
        let session = Session::new();
        assert!(session.save(&key()).unwrap().cookie().is_none());
    }

    #[test]
    fn other_cookies_are_ignored() {
        let mut session = Session::new();
        session.insert(keys::NAME, "bob");
        let saved = session.save(&key()).unwrap();
        let pair = saved.cookie().unwrap().stripped().to_string();

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {pair}; lang=en")).unwrap(),
        );
        let restored = Session::from_headers(&headers, &key(), Utc::now());
        assert_eq!(restored.user_name().unwrap(), "bob");
    }

    #[test]
    fn oversized_flash_name_keeps_cookie_within_browser_limit() {
        let mut session = Session::new();
        session.set_flash(Flash::success("Project added").with_name("x".repeat(2000)));
        let saved = session.save(&key()).unwrap();
        let header = saved.cookie().unwrap().to_string();

        assert!(header.len() < BROWSER_COOKIE_LIMIT, "{} bytes", header.len());
        let mut restored = round_trip(&session, Utc::now());
        let name = restored.take_flash().unwrap().name.unwrap();
        assert_eq!(name.len(), MAX_NAME_CHARS);
    }

    #[test]
    fn largest_login_session_fits_browser_limit() {
        // Four-byte characters make the widest JSON for a given name length.
        let widest_name = "\u{1D509}".repeat(MAX_NAME_CHARS);
        let mut session = Session::new();
        session.login(
            &SessionGrant {
                user_id: DbId::MAX,
                name: widest_name.clone(),
            },
            Utc::now(),
        );
        session.set_flash(Flash::success("Login success").with_name(widest_name));

        let saved = session.save(&key()).unwrap();
        let header = saved.cookie().unwrap().to_string();
        assert!(header.len() < BROWSER_COOKIE_LIMIT, "{} bytes", header.len());
    }
}
