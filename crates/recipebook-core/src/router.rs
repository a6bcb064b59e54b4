//! Route parsing and the navigation pipeline.
//!
//! Every navigation goes through [`Router::navigate`]. Routes under a
//! protected prefix are handed to each registered [`Middleware`] before being
//! committed; the first redirect wins and the redirect target is navigated to
//! in turn.

use std::fmt;

use tracing::{debug, warn};

use crate::auth::LOGIN_PATH;

/// Maximum redirects followed for a single navigation before giving up and
/// landing on the login route.
pub const MAX_REDIRECTS: usize = 5;

/// Outcome of a middleware check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(String),
}

/// A pre-navigation hook. Must not panic; failures become redirects.
pub trait Middleware {
    fn decide(&self, to: &Route, from: Option<&Route>) -> Decision;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Recipes,
    Recipe(i64),
    Login,
    NotFound(String),
}

impl Route {
    /// Strip any query string, fragment or trailing slash.
    fn normalize(path: &str) -> &str {
        path.split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/')
    }

    /// Parse a path, ignoring any query string, fragment or trailing slash.
    pub fn parse(path: &str) -> Self {
        let path = Self::normalize(path);

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["recipes"] => Route::Recipes,
            ["recipes", id] => match id.parse::<i64>() {
                Ok(id) => Route::Recipe(id),
                Err(_) => Route::NotFound(format!("/recipes/{}", id)),
            },
            ["login"] => Route::Login,
            _ => Route::NotFound(format!("/{}", segments.join("/"))),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Recipes => "/recipes".to_string(),
            Route::Recipe(id) => format!("/recipes/{}", id),
            Route::Login => LOGIN_PATH.to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Result of a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Committed(Route),
    Redirected { from: Route, to: Route },
}

impl Navigation {
    /// The route the router ended up on
    pub fn route(&self) -> &Route {
        match self {
            Navigation::Committed(route) => route,
            Navigation::Redirected { to, .. } => to,
        }
    }
}

pub struct Router {
    protected: Vec<String>,
    middleware: Vec<Box<dyn Middleware>>,
    login_path: String,
    current: Option<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            protected: Vec::new(),
            middleware: Vec::new(),
            login_path: LOGIN_PATH.to_string(),
            current: None,
        }
    }

    /// Require middleware checks for `prefix` and everything below it.
    pub fn protect(mut self, prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        if !prefix.is_empty() {
            self.protected.push(prefix.to_string());
        }
        self
    }

    pub fn with_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    /// Path served by the login page. Redirect chains that do not settle end here.
    pub fn login_path(mut self, path: &str) -> Self {
        let path = Route::normalize(path);
        self.login_path = if path.is_empty() {
            LOGIN_PATH.to_string()
        } else {
            path.to_string()
        };
        self
    }

    /// Parse a path, mapping the configured login path to [`Route::Login`].
    pub fn resolve(&self, path: &str) -> Route {
        let normalized = Route::normalize(path);
        if normalized == self.login_path {
            return Route::Login;
        }
        match Route::parse(normalized) {
            Route::Login => Route::NotFound(normalized.to_string()),
            route => route,
        }
    }

    /// Path of a route as served by this router
    pub fn path_of(&self, route: &Route) -> String {
        match route {
            Route::Login => self.login_path.clone(),
            other => other.path(),
        }
    }

    pub fn current(&self) -> Option<&Route> {
        self.current.as_ref()
    }

    pub fn is_protected(&self, route: &Route) -> bool {
        let path = self.path_of(route);
        self.protected.iter().any(|prefix| {
            path == *prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .map(|rest| rest.starts_with('/'))
                    .unwrap_or(false)
        })
    }

    fn run_middleware(&self, to: &Route) -> Decision {
        let from = self.current.as_ref();
        for middleware in &self.middleware {
            if let Decision::Redirect(target) = middleware.decide(to, from) {
                return Decision::Redirect(target);
            }
        }
        Decision::Allow
    }

    pub fn navigate(&mut self, path: &str) -> Navigation {
        let requested = self.resolve(path);
        let mut target = requested.clone();
        let mut hops = 0;

        loop {
            if !self.is_protected(&target) {
                break;
            }
            match self.run_middleware(&target) {
                Decision::Allow => break,
                Decision::Redirect(next) => {
                    hops += 1;
                    if hops > MAX_REDIRECTS {
                        warn!(requested = %requested, "Redirect loop detected, falling back to login");
                        target = Route::Login;
                        break;
                    }
                    debug!(from = %target, to = %next, "Navigation redirected");
                    target = self.resolve(&next);
                }
            }
        }

        self.current = Some(target.clone());
        if target == requested {
            Navigation::Committed(target)
        } else {
            Navigation::Redirected {
                from: requested,
                to: target,
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Always(Decision);

    impl Middleware for Always {
        fn decide(&self, _to: &Route, _from: Option<&Route>) -> Decision {
            self.0.clone()
        }
    }

    struct Counting(Rc<Cell<usize>>);

    impl Middleware for Counting {
        fn decide(&self, _to: &Route, _from: Option<&Route>) -> Decision {
            self.0.set(self.0.get() + 1);
            Decision::Allow
        }
    }

    #[test]
    fn test_route_parse() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/recipes"), Route::Recipes);
        assert_eq!(Route::parse("/recipes/"), Route::Recipes);
        assert_eq!(Route::parse("/recipes?page=2"), Route::Recipes);
        assert_eq!(Route::parse("/recipes/42"), Route::Recipe(42));
        assert_eq!(Route::parse("/recipes/42#steps"), Route::Recipe(42));
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/recipes/abc"), Route::NotFound("/recipes/abc".to_string()));
        assert_eq!(Route::parse("/about/team"), Route::NotFound("/about/team".to_string()));
    }

    #[test]
    fn test_route_path_round_trip() {
        for route in [Route::Home, Route::Recipes, Route::Recipe(7), Route::Login] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn test_is_protected_prefix_matching() {
        let router = Router::new().protect("/recipes/");
        assert!(router.is_protected(&Route::Recipes));
        assert!(router.is_protected(&Route::Recipe(1)));
        assert!(!router.is_protected(&Route::Home));
        assert!(!router.is_protected(&Route::Login));
        assert!(!router.is_protected(&Route::NotFound("/recipesx".to_string())));
    }

    #[test]
    fn test_unprotected_route_skips_middleware() {
        let calls = Rc::new(Cell::new(0));
        let mut router = Router::new()
            .protect("/recipes")
            .with_middleware(Counting(calls.clone()));

        assert_eq!(router.navigate("/"), Navigation::Committed(Route::Home));
        assert_eq!(calls.get(), 0);

        assert_eq!(router.navigate("/recipes/3"), Navigation::Committed(Route::Recipe(3)));
        assert_eq!(calls.get(), 1);
        assert_eq!(router.current(), Some(&Route::Recipe(3)));
    }

    #[test]
    fn test_redirect_is_followed() {
        let mut router = Router::new()
            .protect("/recipes")
            .with_middleware(Always(Decision::Redirect("/login".to_string())));

        let nav = router.navigate("/recipes");
        assert_eq!(
            nav,
            Navigation::Redirected {
                from: Route::Recipes,
                to: Route::Login
            }
        );
        assert_eq!(nav.route(), &Route::Login);
        assert_eq!(router.current(), Some(&Route::Login));
    }

    #[test]
    fn test_first_redirect_wins() {
        let calls = Rc::new(Cell::new(0));
        let mut router = Router::new()
            .protect("/recipes")
            .with_middleware(Always(Decision::Redirect("/".to_string())))
            .with_middleware(Counting(calls.clone()));

        assert_eq!(router.navigate("/recipes").route(), &Route::Home);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_custom_login_path() {
        let mut router = Router::new()
            .protect("/recipes")
            .login_path("/signin/")
            .with_middleware(Always(Decision::Redirect("/signin".to_string())));

        assert_eq!(router.resolve("/signin?next=/recipes"), Route::Login);
        assert_eq!(router.resolve("/login"), Route::NotFound("/login".to_string()));
        assert_eq!(router.path_of(&Route::Login), "/signin");
        assert_eq!(
            router.navigate("/recipes"),
            Navigation::Redirected {
                from: Route::Recipes,
                to: Route::Login
            }
        );
        assert_eq!(router.navigate("/signin"), Navigation::Committed(Route::Login));
    }

    #[test]
    fn test_redirect_loop_is_bounded() {
        let mut router = Router::new()
            .protect("/recipes")
            .with_middleware(Always(Decision::Redirect("/recipes".to_string())));

        assert_eq!(
            router.navigate("/recipes/1"),
            Navigation::Redirected {
                from: Route::Recipe(1),
                to: Route::Login
            }
        );
    }
}
