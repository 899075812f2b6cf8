//! Append-only link store
//!
//! `Page2Content` maps links to `{data}` or `{error}`. Absence means "not yet
//! resolved" and is distinct from an error, which is terminal for that link.

use crate::link::{Link, LinkKey};
use ahash::AHashMap;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Monotonic counter handing out store generations
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

const TYPE_MISMATCH: &str = "link holds a value of a different type";

type Payload = Arc<dyn Any + Send + Sync>;

/// Stored entry for one link
#[derive(Clone)]
enum Slot {
    Data {
        value: Payload,
        /// Payload comparison, monomorphized at fill time
        same: fn(&Payload, &Payload) -> bool,
    },
    Error(Arc<str>),
}

impl Slot {
    fn same_as(&self, other: &Slot) -> bool {
        match (self, other) {
            (Slot::Data { value: a, same }, Slot::Data { value: b, .. }) => same(a, b),
            (Slot::Error(a), Slot::Error(b)) => a == b,
            _ => false,
        }
    }
}

fn same_payload<T: PartialEq + 'static>(a: &Payload, b: &Payload) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Result of reading a filled link
#[derive(Debug, PartialEq)]
pub enum ReadLink<'a, T> {
    Value(&'a T),
    Error(&'a str),
}

impl<'a, T> ReadLink<'a, T> {
    /// The resolved value, if any
    pub fn value(&self) -> Option<&'a T> {
        match self {
            ReadLink::Value(value) => Some(*value),
            ReadLink::Error(_) => None,
        }
    }

    /// The terminal error, if any
    pub fn error(&self) -> Option<&'a str> {
        match self {
            ReadLink::Value(_) => None,
            ReadLink::Error(message) => Some(*message),
        }
    }
}

/// Mapping from links to resolved values or errors for one content graph
#[derive(Clone)]
pub struct Page2Content {
    /// Identifies this store instance; results for an older generation are stale
    generation: u64,
    slots: AHashMap<LinkKey, Slot>,
}

impl Page2Content {
    /// Create an empty store with a fresh generation
    pub fn new() -> Self {
        Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            slots: AHashMap::new(),
        }
    }

    /// Generation of this store instance
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of filled links
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no link has been filled yet
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Check if a link has been filled (with data or an error)
    pub fn contains<T>(&self, link: &Link<T>) -> bool {
        self.slots.contains_key(link.key())
    }

    /// Set `link` to `value`
    ///
    /// Filling an already-filled link with a different payload is a contract
    /// violation: it is logged, and panics in debug builds.
    pub fn fill_link<T>(&mut self, link: &Link<T>, value: T)
    where
        T: PartialEq + Send + Sync + 'static,
    {
        let slot = Slot::Data {
            value: Arc::new(value),
            same: same_payload::<T>,
        };
        self.put(link.key().clone(), slot);
    }

    /// Fill `link` with the thunk's result only if it is absent
    ///
    /// The thunk runs at most once per link. Returns the link either way.
    pub fn fill_link_once<T, F>(&mut self, link: &Link<T>, thunk: F) -> Link<T>
    where
        T: PartialEq + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        if !self.contains(link) {
            self.fill_link(link, thunk());
        }
        link.clone()
    }

    /// Mark `link` as permanently failed
    pub fn fill_error<T>(&mut self, link: &Link<T>, message: impl Into<Arc<str>>) {
        self.fill_error_key(link.key(), message);
    }

    pub(crate) fn fill_error_key(&mut self, key: &LinkKey, message: impl Into<Arc<str>>) {
        self.put(key.clone(), Slot::Error(message.into()));
    }

    /// Allocate a symbolic link and immediately fill it with an error
    pub fn create_link_to_error<T>(&mut self, message: impl Into<Arc<str>>) -> Link<T> {
        let link = Link::create("error");
        self.fill_error(&link, message);
        link
    }

    /// Read a link without mutating the store
    ///
    /// `None` means "still loading"; otherwise exactly one of value/error.
    pub fn read_link<T: 'static>(&self, link: &Link<T>) -> Option<ReadLink<'_, T>> {
        match self.slots.get(link.key())? {
            Slot::Data { value, .. } => match value.downcast_ref::<T>() {
                Some(value) => Some(ReadLink::Value(value)),
                None => {
                    warn!(link = %link.key().describe(), "read with mismatched type");
                    Some(ReadLink::Error(TYPE_MISMATCH))
                }
            },
            Slot::Error(message) => Some(ReadLink::Error(message.as_ref())),
        }
    }

    /// Whether the entry under `key` is an error, or `None` when absent
    pub(crate) fn is_error_key(&self, key: &LinkKey) -> Option<bool> {
        self.slots.get(key).map(|slot| matches!(slot, Slot::Error(_)))
    }

    /// Fold another store's entries into this one with fill-once semantics
    ///
    /// Returns the number of newly filled links. Entries already present are
    /// kept; a divergent payload for the same link is logged.
    pub fn merge(&mut self, delta: Page2Content) -> usize {
        let mut added = 0;
        for (key, slot) in delta.slots {
            match self.slots.get(&key) {
                Some(existing) => {
                    if !existing.same_as(&slot) {
                        warn!(link = %key.describe(), "merge skipped divergent payload");
                    }
                }
                None => {
                    self.slots.insert(key, slot);
                    added += 1;
                }
            }
        }
        debug!(generation = self.generation, added, "merged content delta");
        added
    }

    fn put(&mut self, key: LinkKey, slot: Slot) {
        if let Some(existing) = self.slots.get(&key) {
            if !existing.same_as(&slot) {
                warn!(link = %key.describe(), "link overwritten with a different payload");
                debug_assert!(false, "link {} filled twice with different payloads", key.describe());
            }
        }
        self.slots.insert(key, slot);
    }
}

impl Default for Page2Content {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Page2Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page2Content")
            .field("generation", &self.generation)
            .field("len", &self.slots.len())
            .finish()
    }
}
