//! Rendered page cache.
//!
//! Keyed by resource and the options that shaped the output. One coarse lock
//! guards the map; it is held for lookup and insertion only, never while a
//! page is rendered.

use super::resource::{ResourceId, ResourceKind};
use crate::config::PageOptions;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub resource: ResourceId,
    pub options: PageOptions,
}

impl CacheKey {
    pub fn new(resource: ResourceId, options: PageOptions) -> Self {
        Self { resource, options }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    pages: HashMap<CacheKey, Arc<[u8]>>,
    /// Insertion order, oldest first
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
pub struct PageCache {
    max_entries: usize,
    state: Mutex<CacheState>,
}

impl PageCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<[u8]>> {
        let mut state = self.state.lock();
        match state.pages.get(key).cloned() {
            Some(page) => {
                state.hits += 1;
                Some(page)
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Store a rendered page, evicting the oldest entries past capacity.
    pub fn insert(&self, key: CacheKey, page: Arc<[u8]>) {
        let mut state = self.state.lock();
        if state.pages.insert(key.clone(), page).is_none() {
            state.order.push_back(key);
        }
        while state.pages.len() > self.max_entries {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            state.pages.remove(&oldest);
        }
    }

    /// Drop every page of `kind`.
    pub fn invalidate_kind(&self, kind: ResourceKind) -> usize {
        self.retain(|key| key.resource.kind != kind)
    }

    /// Drop every page rendered with `options`.
    pub fn invalidate_options(&self, options: &PageOptions) -> usize {
        self.retain(|key| &key.options != options)
    }

    pub fn clear(&self) -> usize {
        self.retain(|_| false)
    }

    pub fn len(&self) -> usize {
        self.state.lock().pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.pages.len(),
            hits: state.hits,
            misses: state.misses,
        }
    }

    fn retain(&self, keep: impl Fn(&CacheKey) -> bool) -> usize {
        let mut state = self.state.lock();
        let before = state.pages.len();
        state.pages.retain(|key, _| keep(key));
        state.order.retain(|key| keep(key));
        let removed = before - state.pages.len();
        if removed > 0 {
            debug!(removed, "invalidated cached pages");
        }
        removed
    }
}
