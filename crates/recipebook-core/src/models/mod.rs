//! Data models for recipe and site content.
//!
//! - `Recipe`, `FullRecipe`: recipe summaries and details from the backend API
//! - `RecipeInstruction`, `RecipeIngredient`: the parts of a full recipe
//! - `SiteSettings`, `HeaderLink`, `Image`: site-wide content from the CMS

pub mod recipe;
pub mod site;

pub use recipe::{FullRecipe, Recipe, RecipeIngredient, RecipeInstruction};
pub use site::{HeaderLink, Image, SiteSettings};
