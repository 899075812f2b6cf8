//! Hacker News client
//!
//! `get_page` resolves a path in four steps: route, fetch, identity pass,
//! materialize pass. Any failure along the way becomes an error page.

use crate::error::AdapterError;
use crate::fetch::{Fetch, HttpFetcher};
use crate::identity::{item_id, IdentityMap, PAGE_HEADER};
use crate::materialize::{LoadRequest, Materializer};
use crate::router::{Listing, Route, Router};
use crate::wire::{self, Hit, Item, SearchResponse};
use crate::Result;
use async_trait::async_trait;
use content::{
    Capability, Client, ContentError, HorizontalItem, HorizontalLoaded, Link, LoaderRequest,
    Page2, Page2Content, Post, VerticalLoaded,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

/// Client id stamped on every node
pub const CLIENT_ID: &str = "hackernews";

const CAPABILITIES: &[Capability] = &[Capability::LoadMore, Capability::LoadMoreUnmounted];

/// Upstream settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HackerNewsConfig {
    /// Algolia API origin
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Stories per listing page
    pub page_size: u32,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hn.algolia.com".to_string(),
            request_timeout_secs: 10,
            user_agent: concat!("threadreader/", env!("CARGO_PKG_VERSION")).to_string(),
            page_size: 30,
        }
    }
}

impl HackerNewsConfig {
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)?;
        if self.request_timeout_secs == 0 {
            return Err(AdapterError::Config("request_timeout_secs must be > 0".into()));
        }
        if self.page_size == 0 || self.page_size > 1000 {
            return Err(AdapterError::Config("page_size must be between 1 and 1000".into()));
        }
        Ok(())
    }
}

/// Source adapter for Hacker News
pub struct HackerNewsClient<F = HttpFetcher> {
    config: HackerNewsConfig,
    router: Router,
    fetcher: F,
}

impl HackerNewsClient<HttpFetcher> {
    /// Client fetching over HTTP
    pub fn new(config: HackerNewsConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: Fetch> HackerNewsClient<F> {
    pub fn with_fetcher(config: HackerNewsConfig, fetcher: F) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            router: Router::default(),
            fetcher,
        })
    }

    /// Replace the router (e.g. to add redirects)
    pub fn with_router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    pub fn config(&self) -> &HackerNewsConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fallible core of `get_page`
    pub async fn fetch_page(&self, path: &str) -> Result<Page2> {
        let route = self.router.resolve(path)?;
        let mut map = IdentityMap::new();

        let pivot_id = match route {
            Route::Item { id } => {
                let item: Item = self.fetch_json(&self.item_url(id)?).await?;
                map.set_up_item(&item, None, true)?;
                item_id(id)
            }
            Route::Listing { listing, page } => {
                let (has_more, stories) = self.fetch_listing(listing, page).await?;
                map.set_up_listing(listing, page, has_more, &stories)?;
                PAGE_HEADER.to_string()
            }
        };

        let mut content = Page2Content::new();
        let mut materializer = Materializer::new(&mut map, &mut content, CLIENT_ID);
        let pivot = materializer.resolve(&pivot_id)?;
        info!(path, nodes = materializer.materialized(), "page materialized");

        Ok(Page2 { pivot, content })
    }

    async fn load_replies(&self, id: u64, key: &Link<HorizontalLoaded>, post: &Link<Post>) -> Result<Page2Content> {
        let item: Item = self.fetch_json(&self.item_url(id)?).await?;

        let own = item_id(id);
        let mut map = IdentityMap::new();
        map.insert_known(own.clone(), post.clone());
        let mut children = Vec::with_capacity(item.children.len());
        for child in &item.children {
            children.push(map.set_up_item(child, Some(own.clone()), true)?);
        }

        let mut delta = Page2Content::new();
        let items = {
            let mut materializer = Materializer::new(&mut map, &mut delta, CLIENT_ID);
            let mut items = Vec::with_capacity(children.len());
            for child in &children {
                items.push(HorizontalItem::Post(materializer.resolve(child)?));
            }
            items
        };
        delta.fill_link(key, items);
        Ok(delta)
    }

    async fn load_next_page(
        &self,
        listing: Listing,
        page: u32,
        key: &Link<HorizontalLoaded>,
        header: &Link<Post>,
    ) -> Result<Page2Content> {
        let (has_more, stories) = self.fetch_listing(listing, page).await?;

        let mut map = IdentityMap::new();
        map.insert_known(PAGE_HEADER, header.clone());
        let mut ids = Vec::with_capacity(stories.len());
        for story in &stories {
            ids.push(map.set_up_item(story, Some(PAGE_HEADER.to_string()), false)?);
        }

        let mut delta = Page2Content::new();
        let items = {
            let mut materializer = Materializer::new(&mut map, &mut delta, CLIENT_ID);
            let mut items = Vec::with_capacity(ids.len() + 1);
            for id in &ids {
                items.push(HorizontalItem::Post(materializer.resolve(id)?));
            }
            if has_more {
                if let Some(next) = materializer.next_page_loader(listing, page, header) {
                    items.push(HorizontalItem::Loader(next));
                }
            }
            items
        };
        delta.fill_link(key, items);
        Ok(delta)
    }

    async fn load_parent(
        &self,
        id: u64,
        key: &Link<VerticalLoaded>,
        child_id: u64,
        child: &Link<Post>,
    ) -> Result<Page2Content> {
        let item: Item = self.fetch_json(&self.item_url(id)?).await?;

        let mut map = IdentityMap::new();
        map.insert_known(item_id(child_id), child.clone());
        let parent_id = map.set_up_item(&item, None, true)?;

        let mut delta = Page2Content::new();
        let parent = Materializer::new(&mut map, &mut delta, CLIENT_ID).resolve(&parent_id)?;
        delta.fill_link(key, Some(parent));
        Ok(delta)
    }

    async fn fetch_listing(&self, listing: Listing, page: u32) -> Result<(bool, Vec<Item>)> {
        let response: SearchResponse = self.fetch_json(&self.search_url(listing, page)?).await?;
        let has_more = response.has_more();
        let stories = response.hits.into_iter().filter_map(Hit::into_item).collect();
        Ok((has_more, stories))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let body = self.fetcher.get(url).await?;
        Ok(wire::from_str(&body)?)
    }

    fn api_url(&self, endpoint: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/api/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        ))?)
    }

    fn item_url(&self, id: u64) -> Result<Url> {
        self.api_url(&format!("items/{}", id))
    }

    fn search_url(&self, listing: Listing, page: u32) -> Result<Url> {
        let (endpoint, tags) = listing.endpoint();
        let mut url = self.api_url(endpoint)?;
        url.query_pairs_mut()
            .append_pair("tags", tags)
            .append_pair("page", &page.to_string())
            .append_pair("hitsPerPage", &self.config.page_size.to_string());
        Ok(url)
    }

    fn request<'r>(&self, token: &'r LoaderRequest) -> content::Result<&'r LoadRequest> {
        token.payload::<LoadRequest>().ok_or(ContentError::ForeignToken)
    }
}

fn upstream(err: AdapterError) -> ContentError {
    warn!(error = %err, "loader request failed");
    ContentError::Upstream(err.to_string())
}

#[async_trait]
impl<F: Fetch> Client for HackerNewsClient<F> {
    fn id(&self) -> &str {
        CLIENT_ID
    }

    async fn get_page(&self, path: &str) -> Page2 {
        match self.fetch_page(path).await {
            Ok(page) => page,
            Err(e) => {
                warn!(path, error = %e, "page failed to load");
                Page2::from_error(CLIENT_ID, e.to_string(), Some(path.to_string()))
            }
        }
    }

    fn capabilities(&self) -> &[Capability] {
        CAPABILITIES
    }

    async fn load_more(&self, request: &LoaderRequest) -> content::Result<Page2Content> {
        match self.request(request)? {
            LoadRequest::Replies { id, key, post } => {
                self.load_replies(*id, key, post).await.map_err(upstream)
            }
            LoadRequest::Page {
                listing,
                page,
                key,
                header,
            } => self
                .load_next_page(*listing, *page, key, header)
                .await
                .map_err(upstream),
            LoadRequest::Parent { .. } => Err(ContentError::InvalidRequest(
                "parent requests resolve through load_more_unmounted".into(),
            )),
        }
    }

    async fn load_more_unmounted(&self, request: &LoaderRequest) -> content::Result<Page2Content> {
        match self.request(request)? {
            LoadRequest::Parent {
                id,
                key,
                child_id,
                child,
            } => self
                .load_parent(*id, key, *child_id, child)
                .await
                .map_err(upstream),
            _ => Err(ContentError::InvalidRequest(
                "only parent requests resolve upwards".into(),
            )),
        }
    }
}
