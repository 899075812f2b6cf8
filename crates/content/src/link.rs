//! Opaque link identifiers
//!
//! A `Link<T>` names "a value of type T that may or may not exist yet" in a
//! given `Page2Content`. Two flavours exist:
//! - symbolic links, unique per `Link::create` call (labels are debug-only)
//! - string links, equal whenever their keys are equal

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic counter backing symbolic links
static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(1);

/// Untyped identity of a link inside a store
#[derive(Clone)]
pub enum LinkKey {
    /// Globally unique handle; `label` does not take part in equality
    Symbol { id: u64, label: Arc<str> },
    /// Caller-chosen stable key
    Str(Arc<str>),
}

impl LinkKey {
    /// Human-readable form used in logs and error messages
    pub fn describe(&self) -> String {
        match self {
            LinkKey::Symbol { id, label } => format!("{}#{}", label, id),
            LinkKey::Str(key) => format!("{:?}", key),
        }
    }
}

impl PartialEq for LinkKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LinkKey::Symbol { id: a, .. }, LinkKey::Symbol { id: b, .. }) => a == b,
            (LinkKey::Str(a), LinkKey::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for LinkKey {}

impl Hash for LinkKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            LinkKey::Symbol { id, .. } => {
                0u8.hash(state);
                id.hash(state);
            }
            LinkKey::Str(key) => {
                1u8.hash(state);
                key.hash(state);
            }
        }
    }
}

impl fmt::Debug for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinkKey({})", self.describe())
    }
}

/// Typed reference to a value in a `Page2Content`
pub struct Link<T> {
    key: LinkKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Link<T> {
    /// Allocate a fresh symbolic link
    ///
    /// Distinct from every other link ever created, even with the same label.
    pub fn create(label: impl Into<Arc<str>>) -> Self {
        let id = NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed);
        Self::from_key(LinkKey::Symbol {
            id,
            label: label.into(),
        })
    }

    /// Wrap a caller-supplied key as a typed link
    pub fn string(key: impl Into<Arc<str>>) -> Self {
        Self::from_key(LinkKey::Str(key.into()))
    }

    pub(crate) fn from_key(key: LinkKey) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }

    /// Untyped identity of this link
    pub fn key(&self) -> &LinkKey {
        &self.key
    }

    /// Whether this link came from `Link::create`
    pub fn is_symbolic(&self) -> bool {
        matches!(self.key, LinkKey::Symbol { .. })
    }
}

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Self::from_key(self.key.clone())
    }
}

impl<T> PartialEq for Link<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for Link<T> {}

impl<T> Hash for Link<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T> fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({})", self.key.describe())
    }
}
