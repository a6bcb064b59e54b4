//! REST client for the recipe backend.
//!
//! Recipe listings and details are served by the backend API. Requests carry
//! the session token as a bearer credential when one is available; the
//! backend is responsible for actually verifying it.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
