//! Identity pass
//!
//! Walks an upstream payload once and assigns every node a deterministic
//! string id (`item=42`, or `PAGE_HEADER` for the synthetic listing root).
//! Each id owns one pre-allocated `Link<Post>`, so every reference to the same
//! upstream item resolves to the same link. Nothing is materialized here.

use crate::error::AdapterError;
use crate::router::Listing;
use crate::wire::Item;
use crate::Result;
use ahash::AHashMap;
use content::{Link, Post};
use tracing::debug;

/// Id of the synthetic root of a listing page
pub const PAGE_HEADER: &str = "PAGE_HEADER";

/// Identity-map id for an upstream item
pub fn item_id(id: u64) -> String {
    format!("item={}", id)
}

/// Materialization progress of one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Unprocessed,
    /// On the current resolution path; re-entering it means a cycle
    Processing,
    Processed,
}

/// Listing root
#[derive(Debug, Clone, PartialEq)]
pub struct ListingHeader {
    pub listing: Listing,
    pub page: u32,
    pub has_more: bool,
    pub stories: Vec<String>,
}

/// One upstream item with its edges expressed as ids
#[derive(Debug, Clone, PartialEq)]
pub struct ItemNode {
    /// The item without its reply tree
    pub item: Item,
    /// Id of the node this one was found under
    pub parent: Option<String>,
    pub replies: Vec<String>,
    /// Size of the reply tree as found in the payload
    pub descendants: u32,
    /// False for listing hits, whose replies still have to be fetched
    pub replies_loaded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryData {
    Header(ListingHeader),
    Item(ItemNode),
    /// Materialized in another store; only the link is reused
    Known,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub link: Link<Post>,
    pub state: EntryState,
    pub data: EntryData,
}

/// A node collected by `set_up_item` before insertion
struct Found {
    id: String,
    up: Option<usize>,
    /// `None` for known entries and everything below them
    node: Option<ItemNode>,
}

/// Id to entry mapping for one resolution
#[derive(Debug, Default)]
pub struct IdentityMap {
    entries: AHashMap<String, Entry>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Entry> {
        self.entries.get_mut(id)
    }

    /// Link allocated for `id`, if it is in the map
    pub fn link(&self, id: &str) -> Option<&Link<Post>> {
        self.entries.get(id).map(|entry| &entry.link)
    }

    /// Register a node that already has a link in another store
    ///
    /// Later inserts under the same id are no-ops and are not descended.
    pub fn insert_known(&mut self, id: impl Into<String>, link: Link<Post>) {
        self.entries.entry(id.into()).or_insert(Entry {
            link,
            state: EntryState::Processed,
            data: EntryData::Known,
        });
    }

    /// Insert an entry, returning false when an identical one exists
    ///
    /// Items compare by their own payload; where they were found and how
    /// much of their subtree came along does not matter.
    fn insert(&mut self, id: &str, data: EntryData) -> Result<bool> {
        if let Some(existing) = self.entries.get(id) {
            return match (&existing.data, &data) {
                (EntryData::Known, _) => Ok(false),
                (EntryData::Item(a), EntryData::Item(b)) if a.item == b.item => Ok(false),
                (EntryData::Header(a), EntryData::Header(b)) if a == b => Ok(false),
                _ => Err(AdapterError::DuplicateId { id: id.to_string() }),
            };
        }
        self.entries.insert(
            id.to_string(),
            Entry {
                link: Link::create(id.to_string()),
                state: EntryState::Unprocessed,
                data,
            },
        );
        Ok(true)
    }

    /// Register `item` and its reply tree depth-first; returns the item's id
    ///
    /// The tree is walked with an explicit stack, so thread depth is bounded
    /// by memory rather than by the call stack. Entries are inserted in
    /// pre-order once every node's descendant count is known.
    pub fn set_up_item(
        &mut self,
        item: &Item,
        parent: Option<String>,
        replies_loaded: bool,
    ) -> Result<String> {
        let root_id = item_id(item.id);
        let mut root_parent = parent;
        let mut found: Vec<Found> = Vec::new();
        // (item, index of its parent in `found`, under a known entry)
        let mut stack: Vec<(&Item, Option<usize>, bool)> = vec![(item, None, false)];

        while let Some((item, up, under_known)) = stack.pop() {
            let id = item_id(item.id);
            let known = under_known
                || matches!(self.get(&id), Some(Entry { data: EntryData::Known, .. }));

            // Known entries are not descended; their subtree is only counted
            let node = (!known).then(|| ItemNode {
                item: item.shallow(),
                parent: match up {
                    Some(index) => Some(found[index].id.clone()),
                    None => root_parent.take(),
                },
                replies: item.children.iter().map(|child| item_id(child.id)).collect(),
                descendants: 0,
                replies_loaded: up.is_some() || replies_loaded,
            });

            let index = found.len();
            found.push(Found { id, up, node });
            for child in item.children.iter().rev() {
                stack.push((child, Some(index), known));
            }
        }

        // Parents precede their children, so a reverse pass sums bottom-up
        let mut counts = vec![0u32; found.len()];
        for index in (1..found.len()).rev() {
            if let Some(up) = found[index].up {
                counts[up] = counts[up].saturating_add(1).saturating_add(counts[index]);
            }
        }

        for (entry, descendants) in found.into_iter().zip(counts) {
            let Some(mut node) = entry.node else { continue };
            node.descendants = descendants;
            if !self.insert(&entry.id, EntryData::Item(node))? {
                debug!(id = %entry.id, "item seen again with the same payload");
            }
        }
        Ok(root_id)
    }

    /// Register a listing page under `PAGE_HEADER`
    pub fn set_up_listing(
        &mut self,
        listing: Listing,
        page: u32,
        has_more: bool,
        stories: &[Item],
    ) -> Result<()> {
        let mut ids = Vec::with_capacity(stories.len());
        for story in stories {
            ids.push(self.set_up_item(story, Some(PAGE_HEADER.to_string()), false)?);
        }
        let header = ListingHeader {
            listing,
            page,
            has_more,
            stories: ids,
        };
        self.insert(PAGE_HEADER, EntryData::Header(header))?;
        Ok(())
    }
}
