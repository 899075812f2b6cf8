//! Loader dispatch with request dedup
//!
//! The only concurrency-correctness mechanism in the content model: before a
//! fetch is dispatched for a loader, its `request` link is recorded as in
//! flight, and any other loader with the same request is skipped until the
//! fetch settles. Results are merged into the active page only if it is still
//! the same store generation the fetch started against.

use crate::client::Client;
use crate::link::{Link, LinkKey};
use crate::loader::{Direction, Loader, LoaderRequest, LoaderState};
use crate::page::Page2;
use crate::post::Post;
use crate::store::{Page2Content, ReadLink};
use ahash::AHashSet;
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to a dispatch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The key already resolved; nothing to do
    AlreadyFilled,
    /// Another loader with the same request is being fetched
    InFlight,
    /// Fetched and merged; the value is the number of new links
    Fetched(usize),
    /// Fetch or token failure; the loader key now holds this error
    Failed(String),
    /// The page changed while fetching; the result was dropped
    Stale,
}

/// Removes the request from the in-flight set once the fetch settles
struct InFlightGuard<'a> {
    set: &'a Mutex<AHashSet<LinkKey>>,
    request: LinkKey,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<AHashSet<LinkKey>>, request: &LinkKey) -> Option<Self> {
        if !set.lock().insert(request.clone()) {
            return None;
        }
        Some(Self {
            set,
            request: request.clone(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.request);
    }
}

/// Resolves loaders against the active page of one client
pub struct LoaderDispatcher {
    client: Arc<dyn Client>,
    page: RwLock<Page2>,
    in_flight: Mutex<AHashSet<LinkKey>>,
}

impl LoaderDispatcher {
    /// Create a dispatcher over an initial page
    pub fn new(client: Arc<dyn Client>, page: Page2) -> Self {
        Self {
            client,
            page: RwLock::new(page),
            in_flight: Mutex::new(AHashSet::new()),
        }
    }

    /// Fetch `path` and make it the active page
    pub async fn navigate(&self, path: &str) {
        let page = self.client.get_page(path).await;
        self.replace_page(page);
    }

    /// Swap the active page; fetches started against the old one become stale
    pub fn replace_page(&self, page: Page2) {
        let mut current = self.page.write();
        info!(
            from = current.content.generation(),
            to = page.content.generation(),
            "active page replaced"
        );
        *current = page;
    }

    /// Pivot of the active page
    pub fn pivot(&self) -> Link<Post> {
        self.page.read().pivot.clone()
    }

    /// Run `f` against the active content store
    pub fn with_content<R>(&self, f: impl FnOnce(&Page2Content) -> R) -> R {
        f(&self.page.read().content)
    }

    /// Number of requests currently being fetched
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Resolve `loader` unless it is filled or its request is already in flight
    pub async fn resolve(&self, loader: &dyn Loader) -> DispatchOutcome {
        let request_link = &loader.base().request;

        let (generation, token) = {
            let page = self.page.read();
            if loader.state(&page.content) != LoaderState::Unfilled {
                return DispatchOutcome::AlreadyFilled;
            }
            (page.content.generation(), read_token(&page.content, request_link))
        };

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, request_link.key()) else {
            debug!(request = %request_link.key().describe(), "request already in flight");
            return DispatchOutcome::InFlight;
        };

        let result = match token {
            Ok(token) => {
                let fetched = match loader.direction() {
                    Direction::Horizontal => self.client.load_more(&token).await,
                    Direction::Vertical => self.client.load_more_unmounted(&token).await,
                };
                fetched.map_err(|e| e.to_string())
            }
            Err(message) => Err(message),
        };

        let mut page = self.page.write();
        if page.content.generation() != generation {
            debug!(generation, "dropping result for inactive page");
            return DispatchOutcome::Stale;
        }

        match result {
            Ok(delta) => {
                let added = page.content.merge(delta);
                if loader.state(&page.content) == LoaderState::Unfilled {
                    let message = "loader resolved without filling its key";
                    warn!(key = %loader.key().describe(), "{}", message);
                    page.content.fill_error_key(loader.key(), message);
                    return DispatchOutcome::Failed(message.to_string());
                }
                DispatchOutcome::Fetched(added)
            }
            Err(message) => {
                warn!(key = %loader.key().describe(), error = %message, "loader failed");
                page.content.fill_error_key(loader.key(), message.as_str());
                DispatchOutcome::Failed(message)
            }
        }
    }

    /// Resolve every `autoload` loader concurrently
    pub async fn autoload(&self, loaders: &[&dyn Loader]) -> Vec<DispatchOutcome> {
        let pending = loaders
            .iter()
            .filter(|loader| loader.base().autoload)
            .map(|loader| self.resolve(*loader));
        join_all(pending).await
    }
}

fn read_token(
    content: &Page2Content,
    request: &Link<LoaderRequest>,
) -> std::result::Result<LoaderRequest, String> {
    match content.read_link(request) {
        Some(ReadLink::Value(token)) => Ok(token.clone()),
        Some(ReadLink::Error(message)) => Err(format!("loader cannot be invoked: {}", message)),
        None => Err("loader request token is missing".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContentError;
    use crate::loader::{BaseLoader, HorizontalItem, HorizontalLoaded, HorizontalLoader};
    use crate::opaque::Opaque;
    use crate::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fills the key named in the token after yielding once
    struct CountingClient {
        fetches: AtomicUsize,
        fail: bool,
    }

    impl CountingClient {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fetches: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl Client for CountingClient {
        fn id(&self) -> &str {
            "counting"
        }

        async fn get_page(&self, _path: &str) -> Page2 {
            Page2::from_error(self.id(), "unused", None)
        }

        async fn load_more(&self, request: &LoaderRequest) -> Result<Page2Content> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail {
                return Err(ContentError::Upstream("503".into()));
            }
            let key = request
                .payload::<Link<HorizontalLoaded>>()
                .ok_or(ContentError::ForeignToken)?;
            let mut delta = Page2Content::new();
            delta.fill_link(key, vec![HorizontalItem::Post(Link::create("reply"))]);
            Ok(delta)
        }
    }

    fn page_with_loader(request: &Link<LoaderRequest>, key: &Link<HorizontalLoaded>) -> Page2 {
        let mut page = Page2::from_error("counting", "pivot", None);
        page.content.fill_link(request, Opaque::new(key.clone()));
        page
    }

    fn loader(request: &Link<LoaderRequest>, key: &Link<HorizontalLoaded>) -> HorizontalLoader {
        HorizontalLoader {
            base: BaseLoader {
                load_count: None,
                request: request.clone(),
                client_id: "counting".into(),
                autoload: true,
            },
            key: key.clone(),
        }
    }

    #[tokio::test]
    async fn test_shared_request_fetches_once() {
        let client = CountingClient::new(false);
        let request = Link::create("request");
        let key = Link::create("replies");
        let dispatcher = LoaderDispatcher::new(client.clone(), page_with_loader(&request, &key));

        let a = loader(&request, &key);
        let b = loader(&request, &key);
        let (first, second) = tokio::join!(dispatcher.resolve(&a), dispatcher.resolve(&b));

        assert_eq!(client.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(first, DispatchOutcome::Fetched(1));
        assert_eq!(second, DispatchOutcome::InFlight);
        assert_eq!(dispatcher.in_flight(), 0);
        assert_eq!(dispatcher.with_content(|c| a.state(c)), LoaderState::Filled);
    }

    #[tokio::test]
    async fn test_filled_loader_is_not_refetched() {
        let client = CountingClient::new(false);
        let request = Link::create("request");
        let key = Link::create("replies");
        let dispatcher = LoaderDispatcher::new(client.clone(), page_with_loader(&request, &key));
        let a = loader(&request, &key);

        dispatcher.resolve(&a).await;
        assert_eq!(dispatcher.resolve(&a).await, DispatchOutcome::AlreadyFilled);
        assert_eq!(client.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_fills_key_with_error() {
        let client = CountingClient::new(true);
        let request = Link::create("request");
        let key = Link::create("replies");
        let dispatcher = LoaderDispatcher::new(client.clone(), page_with_loader(&request, &key));
        let a = loader(&request, &key);

        let outcome = dispatcher.resolve(&a).await;
        assert_eq!(outcome, DispatchOutcome::Failed("Upstream error: 503".into()));
        assert_eq!(dispatcher.with_content(|c| a.state(c)), LoaderState::Failed);
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_prefilled_request_is_never_fetched() {
        let client = CountingClient::new(false);
        let mut page = Page2::from_error("counting", "pivot", None);
        let request = page.content.create_link_to_error("sentinel");
        let key = Link::create("replies");
        let dispatcher = LoaderDispatcher::new(client.clone(), page);

        let outcome = dispatcher.resolve(&loader(&request, &key)).await;
        assert!(matches!(outcome, DispatchOutcome::Failed(ref m) if m.contains("sentinel")));
        assert_eq!(client.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_result_for_replaced_page_is_stale() {
        let client = CountingClient::new(false);
        let request = Link::create("request");
        let key = Link::create("replies");
        let dispatcher = LoaderDispatcher::new(client.clone(), page_with_loader(&request, &key));
        let a = loader(&request, &key);

        let replace = async {
            dispatcher.replace_page(Page2::from_error("counting", "elsewhere", None));
        };
        let (outcome, _) = tokio::join!(dispatcher.resolve(&a), replace);

        assert_eq!(outcome, DispatchOutcome::Stale);
        assert_eq!(dispatcher.with_content(|c| a.state(c)), LoaderState::Unfilled);
    }

    #[tokio::test]
    async fn test_autoload_skips_manual_loaders() {
        let client = CountingClient::new(false);
        let request = Link::create("request");
        let key = Link::create("replies");
        let dispatcher = LoaderDispatcher::new(client.clone(), page_with_loader(&request, &key));

        let mut manual = loader(&request, &key);
        manual.base.autoload = false;
        let outcomes = dispatcher.autoload(&[&manual]).await;

        assert!(outcomes.is_empty());
        assert_eq!(client.fetches.load(Ordering::SeqCst), 0);
    }
}
