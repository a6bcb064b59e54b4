//! Core library for recipebook.
//!
//! Routes under the configured protected prefixes are gated by a
//! [`SessionGuard`](auth::SessionGuard) that checks the session token's expiry
//! before the [`Router`](router::Router) commits to them. Recipe content comes
//! from the backend [`ApiClient`](api::ApiClient), site content from the
//! [`CmsClient`](cms::CmsClient), and both can be served from the local
//! [`CacheManager`](cache::CacheManager) when offline.

pub mod api;
pub mod auth;
pub mod cache;
pub mod cms;
pub mod config;
pub mod models;
pub mod router;
pub mod utils;

use auth::{Clock, CredentialStore, SessionGuard};
use config::Config;
use router::Router;

/// Router with the session guard installed on every configured protected path.
pub fn session_router<S, C>(config: &Config, store: S, clock: C) -> Router
where
    S: CredentialStore + 'static,
    C: Clock + 'static,
{
    let guard = SessionGuard::with_clock(store, clock)
        .cookie_name(config.cookie_name.as_str())
        .login_path(config.login_path.as_str());

    let router = config
        .protected_paths
        .iter()
        .fold(Router::new().login_path(&config.login_path), |router, prefix| {
            router.protect(prefix)
        });
    router.with_middleware(guard)
}
