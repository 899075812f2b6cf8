//! Path routing with bounded redirects
//!
//! Paths mirror the upstream site (`/news?p=2`, `/item?id=42`). A path either
//! resolves to a `Route` or redirects to another path; redirect chains are
//! capped at `MAX_REDIRECTS` hops.

use ahash::AHashMap;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Longest redirect chain `Router::resolve` follows
pub const MAX_REDIRECTS: usize = 100;

/// Origin used only to parse relative paths
const PATH_ORIGIN: &str = "http://reader.invalid/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("No route for {0}")]
    NotFound(String),

    #[error("Too many redirects resolving {path} (limit {limit})")]
    TooManyRedirects { path: String, limit: usize },
}

/// Story listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listing {
    Front,
    Newest,
    Ask,
    Show,
}

impl Listing {
    fn from_path(path: &str) -> Option<Self> {
        match path {
            "/news" => Some(Listing::Front),
            "/newest" => Some(Listing::Newest),
            "/ask" => Some(Listing::Ask),
            "/show" => Some(Listing::Show),
            _ => None,
        }
    }

    /// Site path for a zero-based page
    pub fn path(&self, page: u32) -> String {
        let base = match self {
            Listing::Front => "/news",
            Listing::Newest => "/newest",
            Listing::Ask => "/ask",
            Listing::Show => "/show",
        };
        if page == 0 {
            base.to_string()
        } else {
            format!("{}?p={}", base, u64::from(page) + 1)
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Listing::Front => "Front page",
            Listing::Newest => "New",
            Listing::Ask => "Ask HN",
            Listing::Show => "Show HN",
        }
    }

    /// Search endpoint and tag filter
    pub fn endpoint(&self) -> (&'static str, &'static str) {
        match self {
            Listing::Front => ("search", "front_page"),
            Listing::Newest => ("search_by_date", "story"),
            Listing::Ask => ("search", "ask_hn"),
            Listing::Show => ("search", "show_hn"),
        }
    }
}

/// Structured route descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Zero-based page of a listing
    Listing { listing: Listing, page: u32 },
    Item { id: u64 },
}

enum Step {
    Route(Route),
    Redirect(String),
}

/// Path router with a static redirect table
#[derive(Debug, Clone)]
pub struct Router {
    redirects: AHashMap<String, String>,
}

impl Default for Router {
    fn default() -> Self {
        Self::empty().redirect("/", "/news").redirect("/front", "/news")
    }
}

impl Router {
    /// Router with no redirects
    pub fn empty() -> Self {
        Self {
            redirects: AHashMap::new(),
        }
    }

    /// Add a redirect from one path to another
    pub fn redirect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.redirects.insert(from.into(), to.into());
        self
    }

    /// Resolve a path, following at most `MAX_REDIRECTS` redirects
    pub fn resolve(&self, path: &str) -> Result<Route, RouteError> {
        let mut current = path.to_string();
        for hop in 0..=MAX_REDIRECTS {
            match self.step(&current)? {
                Step::Route(route) => {
                    if hop > 0 {
                        debug!(path, hops = hop, "followed redirects");
                    }
                    return Ok(route);
                }
                Step::Redirect(next) => {
                    debug!(from = %current, to = %next, "redirect");
                    current = next;
                }
            }
        }
        Err(RouteError::TooManyRedirects {
            path: path.to_string(),
            limit: MAX_REDIRECTS,
        })
    }

    fn step(&self, path: &str) -> Result<Step, RouteError> {
        let url = Url::parse(PATH_ORIGIN)
            .and_then(|origin| origin.join(path))
            .map_err(|_| RouteError::InvalidPath(path.to_string()))?;
        let route_path = url.path();

        if let Some(target) = self.redirects.get(route_path) {
            let next = match url.query() {
                Some(query) => format!("{}?{}", target, query),
                None => target.clone(),
            };
            return Ok(Step::Redirect(next));
        }

        let param = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };

        if let Some(listing) = Listing::from_path(route_path) {
            let page = match param("p") {
                None => 1,
                Some(p) => p
                    .parse::<u32>()
                    .ok()
                    .filter(|p| *p >= 1)
                    .ok_or_else(|| RouteError::InvalidPath(path.to_string()))?,
            };
            return Ok(Step::Route(Route::Listing {
                listing,
                page: page - 1,
            }));
        }

        if route_path == "/item" {
            let id = param("id")
                .and_then(|id| id.parse().ok())
                .ok_or_else(|| RouteError::InvalidPath(path.to_string()))?;
            return Ok(Step::Route(Route::Item { id }));
        }

        // Short form `/item/42`
        if let Some(id) = route_path.strip_prefix("/item/") {
            if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
                return Ok(Step::Redirect(format!("/item?id={}", id)));
            }
        }

        Err(RouteError::NotFound(path.to_string()))
    }
}
