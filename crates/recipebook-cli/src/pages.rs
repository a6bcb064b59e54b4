//! Plain-text pages for each route.
//!
//! Content is fetched fresh and written to the cache; when a fetch fails the
//! cached copy is shown instead, with its age.

use std::future::Future;

use anyhow::Result;
use tracing::warn;

use recipebook_core::api::{ApiClient, ApiError};
use recipebook_core::cache::{CacheManager, CachedData};
use recipebook_core::cms::CmsClient;
use recipebook_core::models::{FullRecipe, Recipe, SiteSettings};
use recipebook_core::utils::truncate;

/// Width of the description column in recipe listings
const DESCRIPTION_WIDTH: usize = 60;

const DEFAULT_TITLE: &str = "Recipebook";

pub struct Pages {
    api: ApiClient,
    cms: CmsClient,
    cache: Option<CacheManager>,
}

/// Where displayed content came from
#[derive(Debug, PartialEq)]
enum Source {
    Live,
    Cached { age: String, stale: bool },
}

/// Fetch fresh data, saving it to the cache, or fall back to the cached copy.
///
/// A rejected session never falls back: the cached copy would hide that the
/// user has to log in again.
async fn fetch_or_cached<T, Fut>(
    cache: Option<&CacheManager>,
    what: &str,
    fetch: Fut,
    load: impl FnOnce(&CacheManager) -> Result<Option<CachedData<T>>>,
    save: impl FnOnce(&CacheManager, &T) -> Result<()>,
) -> Result<(T, Source)>
where
    Fut: Future<Output = Result<T>>,
{
    let e = match fetch.await {
        Ok(data) => {
            if let Some(cache) = cache {
                if let Err(e) = save(cache, &data) {
                    warn!(what, error = %e, "Failed to cache");
                }
            }
            return Ok((data, Source::Live));
        }
        Err(e) => e,
    };

    let session_rejected = e
        .downcast_ref::<ApiError>()
        .map(ApiError::is_auth_failure)
        .unwrap_or(false);
    if session_rejected {
        return Err(e.context("The backend rejected the session; run `recipebook --store-token`"));
    }

    let cached = match cache {
        Some(cache) => load(cache).unwrap_or_else(|load_err| {
            warn!(what, error = %load_err, "Ignoring unreadable cache");
            None
        }),
        None => None,
    };
    match cached {
        Some(cached) => {
            warn!(what, error = %e, "Fetch failed, showing cached copy");
            let source = Source::Cached {
                age: cached.age_display(),
                stale: cached.is_stale(),
            };
            Ok((cached.data, source))
        }
        None => Err(e),
    }
}

impl Pages {
    pub fn new(api: ApiClient, cms: CmsClient, cache: Option<CacheManager>) -> Self {
        Self { api, cms, cache }
    }

    async fn site_settings(&self) -> Result<(SiteSettings, Source)> {
        fetch_or_cached(
            self.cache.as_ref(),
            "site settings",
            async { Ok::<_, anyhow::Error>(self.cms.fetch_site_settings().await?.unwrap_or_default()) },
            CacheManager::load_site_settings,
            CacheManager::save_site_settings,
        )
        .await
    }

    async fn recipe_list(&self) -> Result<(Vec<Recipe>, Source)> {
        fetch_or_cached(
            self.cache.as_ref(),
            "recipes",
            self.api.fetch_recipes(),
            CacheManager::load_recipes,
            |cache, recipes: &Vec<Recipe>| cache.save_recipes(recipes),
        )
        .await
    }

    pub async fn home(&self) -> Result<()> {
        let (settings, recipes) = futures::join!(self.site_settings(), self.recipe_list());

        // Site settings are decoration; a missing CMS should not hide recipes
        let settings = match settings {
            Ok((settings, _)) => settings,
            Err(e) => {
                warn!(error = %e, "Site settings unavailable");
                SiteSettings::default()
            }
        };

        println!("{}", settings.title_or(DEFAULT_TITLE));
        if let Some(description) = settings.description.as_deref().filter(|d| !d.is_empty()) {
            println!("{}", description);
        }
        if !settings.header_links.is_empty() {
            let links: Vec<String> = settings
                .header_links
                .iter()
                .map(|l| format!("{} ({})", l.label, l.url))
                .collect();
            println!("{}", links.join("  |  "));
        }
        println!();

        let (recipes, source) = recipes?;
        print_source(&source);
        print_recipe_list(&recipes);
        Ok(())
    }

    pub async fn recipes(&self) -> Result<()> {
        let (recipes, source) = self.recipe_list().await?;
        print_source(&source);
        print_recipe_list(&recipes);
        Ok(())
    }

    pub async fn recipe(&self, recipe_id: i64) -> Result<()> {
        let (full, source) = fetch_or_cached(
            self.cache.as_ref(),
            "recipe",
            self.api.fetch_recipe(recipe_id),
            |cache| cache.load_recipe(recipe_id),
            CacheManager::save_recipe,
        )
        .await?;
        print_source(&source);
        print_recipe(&full);
        Ok(())
    }

    pub fn login(&self, logged_in: bool) {
        if logged_in {
            println!("You are already logged in. Use `recipebook --logout` to end the session.");
            return;
        }
        println!("Log in through the website, then save your session token with:");
        println!();
        println!("    recipebook --store-token");
    }
}

fn print_source(source: &Source) {
    match source {
        Source::Live => {}
        Source::Cached { age, stale: false } => {
            println!("(offline - showing cached data from {})\n", age);
        }
        Source::Cached { age, stale: true } => {
            println!("(offline - showing cached data from {}, may be out of date)\n", age);
        }
    }
}

fn print_recipe_list(recipes: &[Recipe]) {
    if recipes.is_empty() {
        println!("No recipes yet.");
        return;
    }
    for recipe in recipes {
        println!("{:>5}  {}", recipe.recipe_id, recipe.title);
        let tags = recipe.tags();
        if !tags.is_empty() {
            println!("       {}", tags);
        }
        if !recipe.description.is_empty() {
            println!("       {}", truncate(&recipe.description, DESCRIPTION_WIDTH));
        }
    }
}

fn print_recipe(full: &FullRecipe) {
    let recipe = &full.recipe;
    println!("{}", recipe.title);
    let tags = recipe.tags();
    if !tags.is_empty() {
        println!("{}", tags);
    }
    if !recipe.allergy_name.is_empty() {
        println!("Allergens: {}", recipe.allergy_name);
    }
    if !recipe.description.is_empty() {
        println!("\n{}", recipe.description);
    }

    if !full.ingredients.is_empty() {
        println!("\nIngredients");
        for ingredient in &full.ingredients {
            println!("  - {}", ingredient.display());
        }
    }

    if !full.instructions.is_empty() {
        println!("\nInstructions");
        for step in full.sorted_instructions() {
            println!("  {}. {}", step.step_number, step.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn settings(title: &str) -> SiteSettings {
        SiteSettings {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    fn temp_cache() -> (tempfile::TempDir, CacheManager) {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        (dir, cache)
    }

    async fn site_settings_via(
        cache: Option<&CacheManager>,
        fetched: Result<SiteSettings>,
    ) -> Result<(SiteSettings, Source)> {
        fetch_or_cached(
            cache,
            "site settings",
            async move { fetched },
            CacheManager::load_site_settings,
            CacheManager::save_site_settings,
        )
        .await
    }

    #[tokio::test]
    async fn test_live_fetch_is_cached() {
        let (_dir, cache) = temp_cache();

        let (data, source) = site_settings_via(Some(&cache), Ok(settings("Live"))).await.unwrap();
        assert_eq!(data, settings("Live"));
        assert_eq!(source, Source::Live);

        let cached = cache.load_site_settings().unwrap().expect("live data should be cached");
        assert_eq!(cached.data, settings("Live"));
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_to_cache() {
        let (_dir, cache) = temp_cache();
        cache.save_site_settings(&settings("Cached")).unwrap();

        let failure = Err(ApiError::ServerError("boom".to_string()).into());
        let (data, source) = site_settings_via(Some(&cache), failure).await.unwrap();
        assert_eq!(data, settings("Cached"));
        assert_eq!(
            source,
            Source::Cached {
                age: "just now".to_string(),
                stale: false
            }
        );
    }

    #[tokio::test]
    async fn test_old_cache_is_marked_stale() {
        let (_dir, cache) = temp_cache();
        let old = CachedData {
            data: settings("Old"),
            cached_at: Utc::now() - Duration::hours(3),
        };
        let (data, source) = fetch_or_cached(
            Some(&cache),
            "site settings",
            async { Err(anyhow::anyhow!("offline")) },
            |_| Ok(Some(old)),
            |_, _: &SiteSettings| Ok(()),
        )
        .await
        .unwrap();
        assert_eq!(data, settings("Old"));
        assert!(matches!(source, Source::Cached { stale: true, .. }));
    }

    #[tokio::test]
    async fn test_rejected_session_does_not_use_cache() {
        let (_dir, cache) = temp_cache();
        cache.save_site_settings(&settings("Cached")).unwrap();

        let err = site_settings_via(Some(&cache), Err(ApiError::Unauthorized.into()))
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_failed_fetch_without_cache_is_an_error() {
        let (_dir, cache) = temp_cache();
        let failure = || -> Result<SiteSettings> { Err(ApiError::ServerError("boom".to_string()).into()) };

        let err = site_settings_via(Some(&cache), failure()).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::ServerError(_))));

        let err = site_settings_via(None, failure()).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::ServerError(_))));
    }
}
