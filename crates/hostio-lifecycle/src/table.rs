//! ResourceTable: concurrent registry of live handles via DashMap.

use std::sync::Arc;

use dashmap::DashMap;
use hostio_core::BridgeError;

use crate::handle::{ResourceHandle, ResourceId};

pub(crate) type Entries = DashMap<ResourceId, Arc<dyn ResourceHandle>>;

/// Thread-safe table of live resources, keyed by id.
///
/// Entries leave the table when their handle closes, so it only ever holds
/// resources that are still alive.
#[derive(Clone, Default)]
pub struct ResourceTable {
    handles: Arc<Entries>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle and return its id. A handle that is already
    /// closed is not kept.
    pub fn insert(&self, handle: Arc<dyn ResourceHandle>) -> ResourceId {
        let id = handle.id();
        handle.state().bind_table(Arc::downgrade(&self.handles));
        self.handles.insert(id, Arc::clone(&handle));
        // A close that raced the insert may have missed the entry.
        if handle.is_closed() {
            self.handles.remove(&id);
        }
        id
    }

    pub fn get(&self, id: &ResourceId) -> Option<Arc<dyn ResourceHandle>> {
        self.handles.get(id).map(|r| Arc::clone(r.value()))
    }

    pub fn remove(&self, id: &ResourceId) -> Option<Arc<dyn ResourceHandle>> {
        self.handles.remove(id).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn ids(&self) -> Vec<ResourceId> {
        self.handles.iter().map(|r| *r.key()).collect()
    }

    /// Close and remove every handle, returning the close failures.
    pub fn close_all(&self) -> Vec<(ResourceId, BridgeError)> {
        // Collect first so no shard lock is held while native close runs.
        let handles: Vec<_> = self
            .handles
            .iter()
            .map(|r| (*r.key(), Arc::clone(r.value())))
            .collect();
        let mut failures = Vec::new();
        for (id, handle) in handles {
            self.handles.remove(&id);
            if let Err(err) = handle.close() {
                failures.push((id, err));
            }
        }
        failures
    }
}

impl std::fmt::Debug for ResourceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceTable")
            .field("len", &self.handles.len())
            .finish()
    }
}
