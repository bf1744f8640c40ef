//! Session custody
//!
//! The session is the pair of bearer tokens issued by the Notes API on login or registration. It is
//! stored in two independent cookies, each living for 24 hours. Every flow receives the session as an
//! explicit [`SessionStore`] parameter, so it can be backed by a request cookie jar in the server or
//! by a [`MemorySession`] in tests.

use std::fmt;

use derivative::Derivative;
use serde::{Deserialize, Serialize};

use crate::Route;
use crate::error::Error;

/// Name of the cookie holding the access token
pub const ACCESS_COOKIE: &str = "access_token";

/// Name of the cookie holding the refresh token
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Lifetime of both session cookies in seconds
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24;

/// Bearer token sent with every authenticated request
///
/// Token value is never printed by the `Debug` implementation.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Token stored alongside the access token, never exchanged by this crate
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(String);

impl RefreshToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshToken(..)")
    }
}

/// Tokens returned by the register and token endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub access: AccessToken,
    pub refresh: RefreshToken,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: AccessToken::new(access),
            refresh: RefreshToken::new(refresh),
        }
    }
}

/// Client side storage of the session tokens between requests
pub trait SessionStore {
    /// Current access token, `None` for anonymous visitors
    fn read(&self) -> Option<AccessToken>;

    /// Stores both tokens, replacing any previous session
    fn establish(&mut self, tokens: TokenPair);

    /// Drops both tokens. Clearing an absent session is a noop.
    fn clear(&mut self);
}

/// In-memory session, used where no cookie jar is available
#[derive(Debug, Clone, PartialEq, Derivative)]
#[derivative(Default(new = "true"))]
pub struct MemorySession {
    access: Option<AccessToken>,
    refresh: Option<RefreshToken>,
}

impl MemorySession {
    /// Session holding only an access token, as seen by a request carrying just that cookie
    pub fn with_access(token: impl Into<String>) -> Self {
        Self {
            access: Some(AccessToken::new(token)),
            refresh: None,
        }
    }

    pub fn refresh(&self) -> Option<&RefreshToken> {
        self.refresh.as_ref()
    }
}

impl SessionStore for MemorySession {
    fn read(&self) -> Option<AccessToken> {
        self.access.clone()
    }

    fn establish(&mut self, tokens: TokenPair) {
        self.access = Some(tokens.access);
        self.refresh = Some(tokens.refresh);
    }

    fn clear(&mut self) {
        self.access = None;
        self.refresh = None;
    }
}

/// Applies the authentication boundary to the failures of a flow
///
/// Returns the route to redirect to if any of the failures is an authentication failure. Session
/// rejected by the API is cleared, so the stale cookies don't outlive the redirect.
pub(crate) fn auth_redirect<'a>(
    session: &mut impl SessionStore,
    failures: impl IntoIterator<Item = Option<&'a Error>>,
) -> Option<Route> {
    let mut redirect = None;
    for failure in failures.into_iter().flatten() {
        match failure {
            Error::SessionInvalidated => {
                tracing::warn!("Session rejected by the Notes API, clearing it");
                session.clear();
                return Some(Route::Login);
            }
            Error::Unauthenticated => redirect = Some(Route::Login),
            _ => (),
        }
    }

    redirect
}
