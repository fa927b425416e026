//! Process-wide memoization of per-type handler descriptor lists.
//!
//! Resolving a subscriber type runs its [`Subscriber::declare`] body once
//! and caches the resulting descriptor list keyed by `TypeId`; every later
//! subscription of any instance of that type reuses the cached list.
//! Multiple threads racing to resolve the same previously-unseen type are
//! allowed: the first inserted list wins and a losing thread's duplicate
//! work is discarded.

use std::any::TypeId;
use std::sync::OnceLock;

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::subscription::{HandlerList, Interests, Subscriber};
use crate::Result;

static GLOBAL: OnceLock<HandlerCache> = OnceLock::new();

/// Concurrent map from a subscriber's concrete type to its precomputed
/// handler descriptor list.
#[derive(Debug, Default)]
pub struct HandlerCache {
    entries: DashMap<TypeId, HandlerList>,
}

impl HandlerCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// The process-wide cache shared by every bus instance.
    ///
    /// Descriptor lists depend only on the subscriber type, never on the
    /// bus they were resolved for, so sharing across buses is safe.
    pub fn global() -> &'static HandlerCache {
        GLOBAL.get_or_init(HandlerCache::new)
    }

    /// Returns the descriptor list for `S`, building and caching it on
    /// first request.
    ///
    /// Fails with [`Error::AmbiguousInterest`](crate::Error::AmbiguousInterest)
    /// when `S` declares the same message type twice; a failed build is not
    /// cached.
    pub fn resolve<S: Subscriber>(&self) -> Result<HandlerList> {
        let key = TypeId::of::<S>();
        if let Some(hit) = self.entries.get(&key) {
            trace!(subscriber = std::any::type_name::<S>(), "handler cache hit");
            return Ok(hit.value().clone());
        }

        let mut interests = Interests::<S>::new();
        S::declare(&mut interests);
        let built = interests.into_handlers()?;
        debug!(
            subscriber = std::any::type_name::<S>(),
            handlers = built.len(),
            "resolved handler descriptors"
        );

        // First writer wins; a racing thread's list is dropped here.
        let entry = self.entries.entry(key).or_insert(built);
        Ok(entry.value().clone())
    }

    /// Number of subscriber types resolved so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no subscriber type has been resolved yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
