//! Session authentication for protected routes.
//!
//! This module provides:
//! - `SessionGuard`: decides whether a navigation may proceed based on the
//!   freshness of the session token
//! - `CredentialStore`: read access to stored credentials, with in-memory and
//!   OS keychain implementations
//! - `decode_claims`: unverified decoding of a JWT payload
//!
//! Tokens are issued and revoked by the login flow; nothing here creates one.

pub mod credentials;
pub mod guard;
pub mod token;

pub use credentials::{CredentialStore, KeyringStore, MemoryStore};
pub use guard::{Clock, DenyReason, FixedClock, SessionGuard, SystemClock, LOGIN_PATH, SESSION_COOKIE};
pub use token::{decode_claims, TokenClaims, TokenError};
