//! Local caching module for offline browsing.
//!
//! This module provides the `CacheManager` for storing and retrieving recipe
//! and site content locally. Data is cached in JSON format and considered
//! stale after 60 minutes.
//!
//! Cached data types include:
//! - The recipe listing
//! - Individual recipes with instructions and ingredients
//! - Site settings

pub mod manager;

pub use manager::{CacheManager, CachedData};
