//! Session guard for protected routes.
//!
//! The guard reads the session cookie from an injected [`CredentialStore`],
//! decodes the token payload and compares its `exp` claim to the current time.
//! Every failure collapses to a redirect to the login route; the specific
//! [`DenyReason`] only shows up in logs.

use std::fmt;

use chrono::Utc;
use tracing::debug;

use super::credentials::CredentialStore;
use super::token::{decode_claims, TokenClaims, TokenError};
use crate::router::{Decision, Middleware, Route};

/// Cookie holding the session token
pub const SESSION_COOKIE: &str = "recipe_token";

/// Where unauthenticated navigations are sent
pub const LOGIN_PATH: &str = "/login";

/// Source of wall-clock time in Unix seconds.
pub trait Clock {
    fn now_unix(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.0
    }
}

/// Why a session was rejected. Never shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    Missing,
    Empty,
    Undecodable(TokenError),
    NoExpiry,
    Expired { exp: i64, now: i64 },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::Missing => write!(f, "no session cookie"),
            DenyReason::Empty => write!(f, "empty session cookie"),
            DenyReason::Undecodable(e) => write!(f, "undecodable token ({})", e),
            DenyReason::NoExpiry => write!(f, "token has no exp claim"),
            DenyReason::Expired { exp, now } => {
                write!(f, "token expired at {} (now {})", exp, now)
            }
        }
    }
}

pub struct SessionGuard<S, C = SystemClock> {
    store: S,
    clock: C,
    cookie_name: String,
    login_path: String,
}

impl<S: CredentialStore> SessionGuard<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: CredentialStore, C: Clock> SessionGuard<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            cookie_name: SESSION_COOKIE.to_string(),
            login_path: LOGIN_PATH.to_string(),
        }
    }

    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Validate the stored session, returning its claims or the reason it was rejected.
    pub fn check(&self) -> Result<TokenClaims, DenyReason> {
        let token = self
            .store
            .get(&self.cookie_name)
            .ok_or(DenyReason::Missing)?;
        if token.is_empty() {
            return Err(DenyReason::Empty);
        }

        let claims = decode_claims(&token).map_err(DenyReason::Undecodable)?;
        let exp = claims.exp.ok_or(DenyReason::NoExpiry)?;

        let now = self.clock.now_unix();
        if exp > now {
            Ok(claims)
        } else {
            Err(DenyReason::Expired { exp, now })
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.check().is_ok()
    }
}

impl<S: CredentialStore, C: Clock> Middleware for SessionGuard<S, C> {
    /// Allow when the session is fresh, otherwise redirect to login.
    fn decide(&self, to: &Route, _from: Option<&Route>) -> Decision {
        match self.check() {
            Ok(claims) => {
                debug!(route = %to, exp = ?claims.exp, "Session valid");
                Decision::Allow
            }
            Err(reason) => {
                debug!(route = %to, %reason, "Session rejected, redirecting to login");
                Decision::Redirect(self.login_path.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStore;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    const NOW: i64 = 1_760_000_000;

    fn token_with_exp(exp: i64) -> String {
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"7","exp":{}}}"#, exp));
        format!("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{}.sig", payload)
    }

    fn guard(store: MemoryStore) -> SessionGuard<MemoryStore, FixedClock> {
        SessionGuard::with_clock(store, FixedClock(NOW))
    }

    fn login() -> Decision {
        Decision::Redirect(LOGIN_PATH.to_string())
    }

    #[test]
    fn test_missing_cookie_redirects() {
        let g = guard(MemoryStore::new());
        assert_eq!(g.check(), Err(DenyReason::Missing));
        assert_eq!(g.decide(&Route::Recipes, None), login());
    }

    #[test]
    fn test_empty_cookie_redirects() {
        let g = guard(MemoryStore::new().with(SESSION_COOKIE, ""));
        assert_eq!(g.check(), Err(DenyReason::Empty));
        assert_eq!(g.decide(&Route::Recipes, None), login());
    }

    #[test]
    fn test_garbage_token_redirects() {
        let g = guard(MemoryStore::new().with(SESSION_COOKIE, "not-a-real-token"));
        assert!(matches!(g.check(), Err(DenyReason::Undecodable(_))));
        assert_eq!(g.decide(&Route::Recipes, None), login());
    }

    #[test]
    fn test_missing_exp_redirects() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"7"}"#);
        let g = guard(MemoryStore::new().with(SESSION_COOKIE, &format!("h.{}.s", payload)));
        assert_eq!(g.check(), Err(DenyReason::NoExpiry));
        assert_eq!(g.decide(&Route::Recipes, None), login());
    }

    #[test]
    fn test_fresh_token_allows() {
        let g = guard(MemoryStore::new().with(SESSION_COOKIE, &token_with_exp(NOW + 3600)));
        assert_eq!(g.decide(&Route::Recipes, None), Decision::Allow);

        let g = guard(MemoryStore::new().with(SESSION_COOKIE, &token_with_exp(NOW + 120)));
        assert_eq!(g.decide(&Route::Recipe(3), Some(&Route::Home)), Decision::Allow);
    }

    #[test]
    fn test_expired_token_redirects() {
        let g = guard(MemoryStore::new().with(SESSION_COOKIE, &token_with_exp(NOW - 1)));
        assert_eq!(
            g.check(),
            Err(DenyReason::Expired {
                exp: NOW - 1,
                now: NOW
            })
        );
        assert_eq!(g.decide(&Route::Recipes, None), login());

        let g = guard(MemoryStore::new().with(SESSION_COOKIE, &token_with_exp(NOW - 5)));
        assert_eq!(g.decide(&Route::Recipes, None), login());
    }

    #[test]
    fn test_expiry_equal_to_now_redirects() {
        let g = guard(MemoryStore::new().with(SESSION_COOKIE, &token_with_exp(NOW)));
        assert_eq!(g.decide(&Route::Recipes, None), login());
    }

    #[test]
    fn test_decision_is_idempotent() {
        let g = guard(MemoryStore::new().with(SESSION_COOKIE, &token_with_exp(NOW + 10)));
        assert_eq!(g.decide(&Route::Recipes, None), g.decide(&Route::Recipes, None));

        let g = guard(MemoryStore::new().with(SESSION_COOKIE, "garbage"));
        assert_eq!(g.decide(&Route::Recipes, None), g.decide(&Route::Recipes, None));
    }

    #[test]
    fn test_custom_cookie_and_login_path() {
        let g = guard(MemoryStore::new().with("other", &token_with_exp(NOW + 10)))
            .cookie_name("other")
            .login_path("/signin");
        assert!(g.is_authenticated());

        let g = guard(MemoryStore::new()).login_path("/signin");
        assert_eq!(
            g.decide(&Route::Recipes, None),
            Decision::Redirect("/signin".to_string())
        );
    }

    #[test]
    fn test_system_clock_is_current() {
        let now = Utc::now().timestamp();
        assert!((SystemClock.now_unix() - now).abs() <= 1);
    }
}
