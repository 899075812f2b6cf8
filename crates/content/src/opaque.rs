//! Capability tokens threaded from adapter to UI and back
//!
//! The UI never builds or inspects an `Opaque`; it only hands it back to the
//! adapter that issued it. Only that adapter knows the payload type.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Tag naming what an opaque token is for
pub trait OpaqueKind: 'static {
    const TAG: &'static str;
}

/// Token for resolving a loader
pub enum LoaderTag {}
/// Token for a generic stateful action (vote, save, ...)
pub enum ActTag {}
/// Token describing a report flow
pub enum ReportTag {}
/// Token describing where a reply goes
pub enum ReplyTag {}

impl OpaqueKind for LoaderTag {
    const TAG: &'static str = "loader";
}

impl OpaqueKind for ActTag {
    const TAG: &'static str = "act";
}

impl OpaqueKind for ReportTag {
    const TAG: &'static str = "report";
}

impl OpaqueKind for ReplyTag {
    const TAG: &'static str = "reply";
}

/// Typed capability token
pub struct Opaque<K> {
    id: u64,
    payload: Arc<dyn Any + Send + Sync>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: OpaqueKind> Opaque<K> {
    /// Wrap an adapter-private payload
    pub fn new<P: Any + Send + Sync>(payload: P) -> Self {
        Self {
            id: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            payload: Arc::new(payload),
            _kind: PhantomData,
        }
    }

    /// Tag of this token kind
    pub fn tag(&self) -> &'static str {
        K::TAG
    }

    /// Recover the payload; `None` if this token came from another adapter
    pub fn payload<P: 'static>(&self) -> Option<&P> {
        self.payload.downcast_ref::<P>()
    }
}

impl<K> Clone for Opaque<K> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            payload: Arc::clone(&self.payload),
            _kind: PhantomData,
        }
    }
}

impl<K> PartialEq for Opaque<K> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<K> Eq for Opaque<K> {}

impl<K: OpaqueKind> fmt::Debug for Opaque<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque<{}>#{}", K::TAG, self.id)
    }
}
