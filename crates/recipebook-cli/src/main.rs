//! Recipebook - browse recipes from the command line.
//!
//! Each invocation navigates to one route. Protected routes are checked by
//! the session guard first; an invalid or expired session lands on the login
//! page instead.

mod pages;

use std::io;

use anyhow::Result;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use recipebook_core::api::ApiClient;
use recipebook_core::auth::{CredentialStore, KeyringStore, SessionGuard, SystemClock};
use recipebook_core::cache::CacheManager;
use recipebook_core::cms::CmsClient;
use recipebook_core::config::Config;
use recipebook_core::router::{Navigation, Route};
use recipebook_core::session_router;
use recipebook_core::utils::format_duration_secs;

use pages::Pages;

const USAGE: &str = "\
Usage: recipebook [PATH]
       recipebook --store-token
       recipebook --logout
       recipebook --session

PATH is a route such as /, /recipes or /recipes/12 (default: /).";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr and to a daily file in the cache directory. The returned
/// guard flushes the file writer and must be held until exit.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match config.cache_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir.join("logs"), "recipebook.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    let _log_guard = init_tracing(&config);
    info!(api_url = %config.api_url, "Recipebook starting");

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some("--store-token") => store_token(&config),
        Some("--logout") => logout(&config),
        Some("--session") => show_session(&config),
        Some(flag) if flag.starts_with("--") => {
            anyhow::bail!("Unknown option: {}\n\n{}", flag, USAGE)
        }
        path => open(&config, path.unwrap_or("/")).await,
    }
}

/// Prompt for a session token without echoing it and save it to the keychain
fn store_token(config: &Config) -> Result<()> {
    let token = rpassword::prompt_password("Session token: ")?;
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("No token entered");
    }
    KeyringStore::set(&config.cookie_name, token)?;

    let guard = SessionGuard::new(KeyringStore).cookie_name(config.cookie_name.as_str());
    match guard.check() {
        Ok(_) => println!("Token saved."),
        Err(reason) => println!("Token saved, but it will not be accepted: {}", reason),
    }
    Ok(())
}

/// Forget the session token and any content cached while logged in
fn logout(config: &Config) -> Result<()> {
    let cache = CacheManager::new(config.cache_dir()?)?;
    cache.clear()?;

    if KeyringStore.get(&config.cookie_name).is_none() {
        println!("Not logged in.");
        return Ok(());
    }
    KeyringStore::delete(&config.cookie_name)?;
    println!("Logged out.");
    Ok(())
}

fn show_session(config: &Config) -> Result<()> {
    let guard = SessionGuard::new(KeyringStore).cookie_name(config.cookie_name.as_str());
    match guard.check() {
        Ok(claims) => {
            let remaining = claims
                .seconds_remaining(chrono::Utc::now().timestamp())
                .unwrap_or(0);
            println!("Session valid, expires in {}.", format_duration_secs(remaining));
            if let Some(sub) = claims.sub {
                println!("Subject: {}", sub);
            }
        }
        Err(reason) => println!("No valid session ({}).", reason),
    }
    Ok(())
}

async fn open(config: &Config, path: &str) -> Result<()> {
    let mut router = session_router(config, KeyringStore, SystemClock);
    let navigation = router.navigate(path);

    if let Navigation::Redirected { from, to } = &navigation {
        info!(%from, %to, "Redirected");
        println!("{} requires a valid session.\n", from);
    }

    let api = ApiClient::new(&config.api_url)?;
    let api = match KeyringStore.get(&config.cookie_name).filter(|t| !t.is_empty()) {
        Some(token) => api.with_token(token),
        None => api,
    };
    let cms = CmsClient::new(&config.cms_project_id, &config.cms_dataset)?;
    let cache = match CacheManager::new(config.cache_dir()?) {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!(error = %e, "Cache unavailable");
            None
        }
    };

    let pages = Pages::new(api, cms, cache);
    match navigation.route() {
        Route::Home => pages.home().await,
        Route::Recipes => pages.recipes().await,
        Route::Recipe(id) => pages.recipe(*id).await,
        Route::Login => {
            let guard = SessionGuard::new(KeyringStore).cookie_name(config.cookie_name.as_str());
            pages.login(guard.is_authenticated());
            Ok(())
        }
        Route::NotFound(path) => {
            println!("Page not found: {}", path);
            Ok(())
        }
    }
}
