//! Loaders: descriptions of unresolved edges in the content graph
//!
//! A loader is not a future. It tells the UI how the adapter could resolve
//! `key`, using `request` as the dedup token: two loaders sharing a request
//! link must never be fetched independently (see `dispatch`).
//!
//! State per loader: `Unfilled` -> (one fetch per distinct request) ->
//! `Filled` | `Failed`. Both end states are terminal; "load more" builds a new
//! loader with a new key and request.

use crate::link::{Link, LinkKey};
use crate::opaque::{LoaderTag, Opaque};
use crate::post::Post;
use crate::store::Page2Content;

/// Token the adapter needs to resolve a loader
pub type LoaderRequest = Opaque<LoaderTag>;

/// Parent resolution result; `None` once the root is reached
pub type VerticalLoaded = Option<Link<Post>>;

/// One entry in a resolved reply list
#[derive(Debug, Clone, PartialEq)]
pub enum HorizontalItem {
    Post(Link<Post>),
    Loader(HorizontalLoader),
}

/// Resolved reply list
pub type HorizontalLoaded = Vec<HorizontalItem>;

/// Fields shared by every loader
#[derive(Debug, Clone, PartialEq)]
pub struct BaseLoader {
    /// Expected item count, if known
    pub load_count: Option<u32>,
    /// Dedup token; loaders sharing it are fetched at most once at a time
    pub request: Link<LoaderRequest>,
    pub client_id: String,
    /// Fire without an explicit user gesture
    pub autoload: bool,
}

impl BaseLoader {
    /// Base for a loader that must never be invoked
    fn prefilled(content: &mut Page2Content, client_id: &str) -> Self {
        Self {
            load_count: None,
            request: content.create_link_to_error("prefilled loader must not be invoked"),
            client_id: client_id.to_string(),
            autoload: false,
        }
    }
}

/// Which way a loader points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Up the tree, towards the parent
    Vertical,
    /// Down the tree, towards the replies
    Horizontal,
}

/// Observable state of a loader against a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Unfilled,
    Filled,
    Failed,
}

/// Common view over vertical and horizontal loaders
pub trait Loader: Send + Sync {
    fn base(&self) -> &BaseLoader;

    /// Untyped identity of the link this loader resolves
    fn key(&self) -> &LinkKey;

    fn direction(&self) -> Direction;

    fn state(&self, content: &Page2Content) -> LoaderState {
        match content.is_error_key(self.key()) {
            None => LoaderState::Unfilled,
            Some(false) => LoaderState::Filled,
            Some(true) => LoaderState::Failed,
        }
    }
}

/// Unresolved parent edge
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalLoader {
    pub base: BaseLoader,
    pub key: Link<VerticalLoaded>,
    /// Placeholder shown in place of the parent until `key` resolves
    pub temp_parent: Link<Post>,
}

impl VerticalLoader {
    /// Loader for an already-known parent
    pub fn prefilled(content: &mut Page2Content, client_id: &str, parent: VerticalLoaded) -> Self {
        let key = Link::create("prefilled vertical");
        content.fill_link(&key, parent);
        Self {
            base: BaseLoader::prefilled(content, client_id),
            key,
            temp_parent: content.create_link_to_error("prefilled loader has no temporary parent"),
        }
    }
}

impl Loader for VerticalLoader {
    fn base(&self) -> &BaseLoader {
        &self.base
    }

    fn key(&self) -> &LinkKey {
        self.key.key()
    }

    fn direction(&self) -> Direction {
        Direction::Vertical
    }
}

/// Unresolved reply list
#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalLoader {
    pub base: BaseLoader,
    pub key: Link<HorizontalLoaded>,
}

impl HorizontalLoader {
    /// Loader for an already-known reply list
    pub fn prefilled(content: &mut Page2Content, client_id: &str, items: HorizontalLoaded) -> Self {
        let key = Link::create("prefilled horizontal");
        let base = BaseLoader {
            load_count: Some(items.len() as u32),
            ..BaseLoader::prefilled(content, client_id)
        };
        content.fill_link(&key, items);
        Self { base, key }
    }
}

impl Loader for HorizontalLoader {
    fn base(&self) -> &BaseLoader {
        &self.base
    }

    fn key(&self) -> &LinkKey {
        self.key.key()
    }

    fn direction(&self) -> Direction {
        Direction::Horizontal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ReadLink;

    #[test]
    fn test_prefilled_horizontal_is_filled_and_not_loadable() {
        let mut content = Page2Content::new();
        let post: Link<Post> = Link::create("post");
        let loader =
            HorizontalLoader::prefilled(&mut content, "test", vec![HorizontalItem::Post(post.clone())]);

        assert_eq!(loader.state(&content), LoaderState::Filled);
        assert_eq!(loader.base.load_count, Some(1));
        assert!(content.read_link(&loader.base.request).unwrap().error().is_some());
        assert_eq!(
            content.read_link(&loader.key).unwrap(),
            ReadLink::Value(&vec![HorizontalItem::Post(post)])
        );
    }

    #[test]
    fn test_prefilled_vertical_root() {
        let mut content = Page2Content::new();
        let loader = VerticalLoader::prefilled(&mut content, "test", None);
        assert_eq!(loader.state(&content), LoaderState::Filled);
        assert_eq!(content.read_link(&loader.key).unwrap(), ReadLink::Value(&None));
        assert!(content.read_link(&loader.temp_parent).unwrap().error().is_some());
    }

    #[test]
    fn test_unfilled_then_failed() {
        let mut content = Page2Content::new();
        let loader = HorizontalLoader {
            base: BaseLoader {
                load_count: None,
                request: Link::create("request"),
                client_id: "test".into(),
                autoload: true,
            },
            key: Link::create("replies"),
        };
        assert_eq!(loader.state(&content), LoaderState::Unfilled);
        content.fill_error(&loader.key, "gone");
        assert_eq!(loader.state(&content), LoaderState::Failed);
    }
}
