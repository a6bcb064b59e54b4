//! Client for site content held in the headless CMS.
//!
//! Only the site-settings document is read. Queries go to the CMS's public
//! HTTP query endpoint and results arrive wrapped in a `result` envelope.

pub mod client;

pub use client::{CmsClient, DEFAULT_DATASET, DEFAULT_PROJECT_ID};
