//! Shared memo store for built mapping plans and resolved target paths.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::{debug, trace};

use crate::representation::MappingRepresentation;
use crate::target::TargetFieldDescriptor;

/// Key of a cached representation: the type pair plus the nesting context.
///
/// The context is empty for top-level representations and names the
/// enclosing field and its effective path for nested ones, so the same local
/// type reached through two different paths gets two entries.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct RepresentationKey {
    local: TypeId,
    foreign: TypeId,
    context: String,
}

impl RepresentationKey {
    pub fn new(local: TypeId, foreign: TypeId, context: impl Into<String>) -> Self {
        Self {
            local,
            foreign,
            context: context.into(),
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct TargetKey {
    foreign: TypeId,
    field: &'static str,
    path: String,
}

impl TargetKey {
    pub fn new(foreign: TypeId, field: &'static str, path: impl Into<String>) -> Self {
        Self {
            foreign,
            field,
            path: path.into(),
        }
    }
}

/// Snapshot of cache occupancy and lookup counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub representations: usize,
    pub targets: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Memo store for mapping representations and target descriptors.
///
/// Entries are immutable and shared through `Arc`. Concurrent builders of the
/// same key race harmlessly: the first stored value wins and later ones are
/// dropped.
#[derive(Debug, Default)]
pub struct MappingCache {
    representations: RwLock<HashMap<RepresentationKey, Arc<MappingRepresentation>>>,
    targets: RwLock<HashMap<TargetKey, Arc<TargetFieldDescriptor>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MappingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn representation(&self, key: &RepresentationKey) -> Option<Arc<MappingRepresentation>> {
        let found = read(&self.representations).get(key).cloned();
        self.count(found.is_some());
        if found.is_some() {
            trace!(context = %key.context, "representation cache hit");
        }
        found
    }

    /// Stores `representation` unless another one got there first, and
    /// returns whichever is cached.
    pub fn store_representation(
        &self,
        key: RepresentationKey,
        representation: MappingRepresentation,
    ) -> Arc<MappingRepresentation> {
        write(&self.representations)
            .entry(key)
            .or_insert_with(|| Arc::new(representation))
            .clone()
    }

    pub fn target(&self, key: &TargetKey) -> Option<Arc<TargetFieldDescriptor>> {
        let found = read(&self.targets).get(key).cloned();
        self.count(found.is_some());
        found
    }

    pub fn store_target(&self, key: TargetKey, descriptor: TargetFieldDescriptor) -> Arc<TargetFieldDescriptor> {
        write(&self.targets)
            .entry(key)
            .or_insert_with(|| Arc::new(descriptor))
            .clone()
    }

    /// Drops every memoized entry. Counters are cumulative and kept.
    pub fn clear(&self) {
        let representations = {
            let mut guard = write(&self.representations);
            let count = guard.len();
            guard.clear();
            count
        };
        write(&self.targets).clear();
        debug!(representations, "mapping cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            representations: read(&self.representations).len(),
            targets: read(&self.targets).len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn count(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

// Cached values are immutable, so a panic while holding a guard cannot leave
// a map in a broken state.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
