//! Materialize pass
//!
//! Turns identity-map entries into `Post`s in a `Page2Content`. Edges are
//! followed by id lookup, never by re-walking the payload, so an item
//! referenced from several places is built exactly once.
//!
//! Reply edges recurse; re-entering an entry that is still `Processing`
//! through a reply edge is a true cycle and fails with `AdapterError::Cycle`.
//! Parent edges never recurse: they reuse the parent's pre-allocated link and
//! queue the parent, which is built after the requested node.

use crate::convert;
use crate::error::AdapterError;
use crate::identity::{EntryData, EntryState, IdentityMap, ItemNode, ListingHeader};
use crate::router::Listing;
use crate::Result;
use content::post::{InternalData, PostParent, PostReplies, RepliesDisplay};
use content::{
    BaseLoader, HorizontalItem, HorizontalLoaded, HorizontalLoader, Link, LoaderRequest, Opaque,
    Page2Content, Post, VerticalLoaded, VerticalLoader,
};
use tracing::{debug, warn};

/// Stack left before reply recursion moves to a fresh segment
const RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 2 * 1024 * 1024;

/// Adapter-private payload of a loader request token
#[derive(Debug, Clone)]
pub enum LoadRequest {
    /// Fetch the parent of `child`; fills `key`
    Parent {
        id: u64,
        key: Link<VerticalLoaded>,
        child_id: u64,
        child: Link<Post>,
    },
    /// Fetch the replies of `post`; fills `key`
    Replies {
        id: u64,
        key: Link<HorizontalLoaded>,
        post: Link<Post>,
    },
    /// Fetch the next page of a listing below `header`; fills `key`
    Page {
        listing: Listing,
        page: u32,
        key: Link<HorizontalLoaded>,
        header: Link<Post>,
    },
}

/// Adapter-private data attached to item posts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRef {
    pub id: u64,
}

/// Builds posts for identity-map entries into one content store
pub struct Materializer<'a> {
    map: &'a mut IdentityMap,
    content: &'a mut Page2Content,
    client_id: &'a str,
    /// Parents referenced by built nodes but not built yet
    ancestors: Vec<String>,
    materialized: usize,
}

impl<'a> Materializer<'a> {
    pub fn new(map: &'a mut IdentityMap, content: &'a mut Page2Content, client_id: &'a str) -> Self {
        Self {
            map,
            content,
            client_id,
            ancestors: Vec::new(),
            materialized: 0,
        }
    }

    /// Number of posts built so far
    pub fn materialized(&self) -> usize {
        self.materialized
    }

    /// Build `id` and every node reachable from it
    pub fn resolve(&mut self, id: &str) -> Result<Link<Post>> {
        let link = self.post_link(id)?;
        while let Some(ancestor) = self.ancestors.pop() {
            self.post_link(&ancestor)?;
        }
        Ok(link)
    }

    /// Loader for the page of `listing` after `page`
    ///
    /// `None` when `page` is the last representable page.
    pub fn next_page_loader(
        &mut self,
        listing: Listing,
        page: u32,
        header: &Link<Post>,
    ) -> Option<HorizontalLoader> {
        let next = page.checked_add(1)?;
        let key = Link::create(format!("{} page {}", listing.title(), u64::from(next) + 1));
        let request = self.request(LoadRequest::Page {
            listing,
            page: next,
            key: key.clone(),
            header: header.clone(),
        });
        Some(HorizontalLoader {
            base: BaseLoader {
                load_count: None,
                request,
                client_id: self.client_id.to_string(),
                autoload: false,
            },
            key,
        })
    }

    fn post_link(&mut self, id: &str) -> Result<Link<Post>> {
        let Some(entry) = self.map.get_mut(id) else {
            warn!(id, "reference to an item that is not loaded");
            return Ok(self.content.create_link_to_error(format!("{} is not loaded", id)));
        };

        match entry.state {
            EntryState::Processed => return Ok(entry.link.clone()),
            EntryState::Processing => {
                warn!(id, "cycle in reply graph");
                return Err(AdapterError::Cycle { id: id.to_string() });
            }
            EntryState::Unprocessed => entry.state = EntryState::Processing,
        }
        let link = entry.link.clone();
        let data = entry.data.clone();

        let post = match &data {
            EntryData::Item(node) => self.build_item(node, &link)?,
            EntryData::Header(header) => self.build_header(header, &link)?,
            // Known entries are inserted as processed
            EntryData::Known => return Ok(link),
        };
        self.content.fill_link(&link, post);

        if let Some(entry) = self.map.get_mut(id) {
            entry.state = EntryState::Processed;
        }
        self.materialized += 1;
        debug!(id, "materialized");
        Ok(link)
    }

    fn build_item(&mut self, node: &ItemNode, link: &Link<Post>) -> Result<Post> {
        let mut item = node.item.clone();
        if item.num_comments.is_none() && node.replies_loaded {
            item.num_comments = Some(node.descendants);
        }

        let parent = match (&node.parent, item.parent_id) {
            (Some(parent_id), _) => {
                let parent_link = self.parent_link(parent_id);
                Some(PostParent {
                    loader: VerticalLoader::prefilled(self.content, self.client_id, Some(parent_link)),
                })
            }
            (None, Some(parent)) => Some(PostParent {
                loader: self.parent_loader(parent, item.id, link),
            }),
            (None, None) => None,
        };

        let loader = if node.replies_loaded {
            let mut items = Vec::with_capacity(node.replies.len());
            for reply in &node.replies {
                let reply = stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || self.post_link(reply))?;
                items.push(HorizontalItem::Post(reply));
            }
            HorizontalLoader::prefilled(self.content, self.client_id, items)
        } else {
            self.replies_loader(item.id, item.num_comments, link)
        };

        Ok(Post {
            content: convert::item_content(&item),
            internal_data: InternalData::new(ItemRef { id: item.id }),
            parent,
            replies: Some(PostReplies {
                display: RepliesDisplay::Tree,
                loader,
            }),
            url: Some(convert::item_path(item.id)),
            client_id: self.client_id.to_string(),
        })
    }

    fn build_header(&mut self, header: &ListingHeader, link: &Link<Post>) -> Result<Post> {
        let client = self.client_link();

        let mut items = Vec::with_capacity(header.stories.len() + 1);
        for story in &header.stories {
            items.push(HorizontalItem::Post(self.post_link(story)?));
        }
        if header.has_more {
            if let Some(next) = self.next_page_loader(header.listing, header.page, link) {
                items.push(HorizontalItem::Loader(next));
            }
        }

        Ok(Post {
            content: convert::header_content(header.listing, header.page),
            internal_data: InternalData::none(),
            parent: Some(PostParent {
                loader: VerticalLoader::prefilled(self.content, self.client_id, Some(client)),
            }),
            replies: Some(PostReplies {
                display: RepliesDisplay::Repivot,
                loader: HorizontalLoader::prefilled(self.content, self.client_id, items),
            }),
            url: Some(header.listing.path(header.page)),
            client_id: self.client_id.to_string(),
        })
    }

    /// Link of a parent entry without building it
    fn parent_link(&mut self, parent_id: &str) -> Link<Post> {
        match self.map.get(parent_id) {
            Some(entry) => {
                if entry.state == EntryState::Unprocessed {
                    self.ancestors.push(parent_id.to_string());
                }
                entry.link.clone()
            }
            None => {
                warn!(id = parent_id, "parent is not in the identity map");
                self.content
                    .create_link_to_error(format!("{} is not loaded", parent_id))
            }
        }
    }

    /// The client node every listing hangs from
    fn client_link(&mut self) -> Link<Post> {
        let client_id = self.client_id;
        let link = Link::string(format!("client: {}", client_id));
        self.content.fill_link_once(&link, || Post {
            content: convert::client_content(client_id),
            internal_data: InternalData::none(),
            parent: None,
            replies: None,
            url: Some("/".to_string()),
            client_id: client_id.to_string(),
        })
    }

    fn parent_loader(&mut self, parent: u64, child_id: u64, child: &Link<Post>) -> VerticalLoader {
        let key = Link::create(format!("parent of item={}", child_id));
        let request = self.request(LoadRequest::Parent {
            id: parent,
            key: key.clone(),
            child_id,
            child: child.clone(),
        });
        VerticalLoader {
            base: BaseLoader {
                load_count: Some(1),
                request,
                client_id: self.client_id.to_string(),
                autoload: true,
            },
            key,
            temp_parent: self
                .content
                .create_link_to_error(format!("item={} has not been loaded", parent)),
        }
    }

    fn replies_loader(&mut self, id: u64, count: Option<u32>, post: &Link<Post>) -> HorizontalLoader {
        let key = Link::create(format!("replies of item={}", id));
        let request = self.request(LoadRequest::Replies {
            id,
            key: key.clone(),
            post: post.clone(),
        });
        HorizontalLoader {
            base: BaseLoader {
                load_count: count,
                request,
                client_id: self.client_id.to_string(),
                autoload: false,
            },
            key,
        }
    }

    fn request(&mut self, request: LoadRequest) -> Link<LoaderRequest> {
        let link = Link::create("hackernews request");
        self.content.fill_link(&link, Opaque::new(request));
        link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{item_id, PAGE_HEADER};
    use crate::wire::{Item, ItemKind};
    use content::{ReadLink, PostContent};

    fn item(id: u64, parent_id: Option<u64>, children: Vec<Item>) -> Item {
        Item {
            id,
            created_at_i: Some(1),
            kind: if parent_id.is_some() { ItemKind::Comment } else { ItemKind::Story },
            author: Some(format!("user{}", id)),
            title: parent_id.is_none().then(|| format!("story {}", id)),
            url: None,
            text: Some(format!("text {}", id)),
            points: None,
            parent_id,
            story_id: None,
            num_comments: None,
            children,
        }
    }

    fn replies<'c>(content: &'c Page2Content, post: &Post) -> &'c HorizontalLoaded {
        let loader = &post.replies.as_ref().unwrap().loader;
        content.read_link(&loader.key).unwrap().value().unwrap()
    }

    #[test]
    fn test_tree_materializes_each_node_once() {
        let mut map = IdentityMap::new();
        let tree = item(1, None, vec![item(2, Some(1), vec![item(3, Some(2), vec![])])]);
        map.set_up_item(&tree, None, true).unwrap();

        let mut content = Page2Content::new();
        let mut materializer = Materializer::new(&mut map, &mut content, "hackernews");
        let pivot = materializer.resolve(&item_id(2)).unwrap();
        assert_eq!(materializer.materialized(), 3);

        let post = content.read_link(&pivot).unwrap().value().unwrap();
        let parent = &post.parent.as_ref().unwrap().loader;
        let Some(ReadLink::Value(Some(root))) = content.read_link(&parent.key) else {
            panic!("parent should be prefilled");
        };
        assert_eq!(Some(root), map.link(&item_id(1)));

        // The root's reply is the pivot's own link
        let root_post = content.read_link(root).unwrap().value().unwrap();
        assert_eq!(replies(&content, root_post), &vec![HorizontalItem::Post(pivot)]);
    }

    #[test]
    fn test_missing_reply_becomes_error_link() {
        let mut map = IdentityMap::new();
        map.set_up_item(&item(1, None, vec![]), None, true).unwrap();
        if let Some(entry) = map.get_mut(&item_id(1)) {
            if let EntryData::Item(node) = &mut entry.data {
                node.replies.push(item_id(99));
            }
        }

        let mut content = Page2Content::new();
        let pivot = Materializer::new(&mut map, &mut content, "hackernews")
            .resolve(&item_id(1))
            .unwrap();

        let post = content.read_link(&pivot).unwrap().value().unwrap();
        let HorizontalItem::Post(missing) = &replies(&content, post)[0] else {
            panic!("expected a post link");
        };
        assert_eq!(
            content.read_link(missing).unwrap().error(),
            Some("item=99 is not loaded")
        );
    }

    #[test]
    fn test_reply_cycle_is_an_error() {
        // 1 -> 2 -> 1 with identical payloads for both occurrences of 1
        let mut map = IdentityMap::new();
        let inner_one = item(1, None, vec![item(2, Some(1), vec![])]);
        let tree = item(1, None, vec![item(2, Some(1), vec![inner_one])]);
        map.set_up_item(&tree, None, true).unwrap();

        let mut content = Page2Content::new();
        let err = Materializer::new(&mut map, &mut content, "hackernews")
            .resolve(&item_id(1))
            .unwrap_err();
        assert!(matches!(err, AdapterError::Cycle { ref id } if id == "item=1"));
    }

    #[test]
    fn test_unloaded_parent_gets_autoload_loader() {
        let mut map = IdentityMap::new();
        map.set_up_item(&item(5, Some(4), vec![]), None, true).unwrap();

        let mut content = Page2Content::new();
        let pivot = Materializer::new(&mut map, &mut content, "hackernews")
            .resolve(&item_id(5))
            .unwrap();
        let post = content.read_link(&pivot).unwrap().value().unwrap();
        let loader = &post.parent.as_ref().unwrap().loader;

        assert!(loader.base.autoload);
        assert!(content.read_link(&loader.key).is_none());
        let token = content.read_link(&loader.base.request).unwrap().value().unwrap();
        assert!(matches!(
            token.payload::<LoadRequest>(),
            Some(LoadRequest::Parent { id: 4, child_id: 5, .. })
        ));
    }

    #[test]
    fn test_listing_header() {
        let mut map = IdentityMap::new();
        let stories = vec![item(1, None, vec![]), item(2, None, vec![])];
        map.set_up_listing(Listing::Front, 0, true, &stories).unwrap();

        let mut content = Page2Content::new();
        let pivot = Materializer::new(&mut map, &mut content, "hackernews")
            .resolve(PAGE_HEADER)
            .unwrap();
        let header = content.read_link(&pivot).unwrap().value().unwrap();
        assert!(matches!(header.content, PostContent::Page(_)));

        let items = replies(&content, header);
        assert_eq!(items.len(), 3);
        let HorizontalItem::Loader(next) = &items[2] else {
            panic!("expected a next page loader");
        };
        assert!(!next.base.autoload);

        // Listing stories still need their comments fetched
        let HorizontalItem::Post(story) = &items[0] else {
            panic!("expected a story");
        };
        let story = content.read_link(story).unwrap().value().unwrap();
        let story_replies = &story.replies.as_ref().unwrap().loader;
        assert!(content.read_link(&story_replies.key).is_none());
    }

    #[test]
    fn test_next_page_loader_near_max_page() {
        let mut map = IdentityMap::new();
        let mut content = Page2Content::new();
        let header = Link::create("header");
        let mut materializer = Materializer::new(&mut map, &mut content, "hackernews");

        assert!(materializer
            .next_page_loader(Listing::Front, u32::MAX, &header)
            .is_none());

        let last = materializer
            .next_page_loader(Listing::Front, u32::MAX - 1, &header)
            .unwrap();
        let token = content.read_link(&last.base.request).unwrap().value().unwrap();
        assert!(matches!(
            token.payload::<LoadRequest>(),
            Some(LoadRequest::Page { page: u32::MAX, .. })
        ));
    }
}
