//! Single-entry render memo

use super::types::{FilterState, RenderGraph};
use crate::graph::VersionedDataset;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

struct Entry {
    version: u64,
    fingerprint: u64,
    state: FilterState,
    graph: Arc<RenderGraph>,
}

/// Remembers the last render, keyed by dataset version and filter state
///
/// A miss just recomputes; results never depend on whether the cache hit.
#[derive(Default)]
pub struct PipelineCache {
    last: Mutex<Option<Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

fn fingerprint(state: &FilterState) -> u64 {
    let mut hasher = DefaultHasher::new();
    state.hash(&mut hasher);
    hasher.finish()
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render, reusing the previous result when nothing changed
    pub fn render(&self, current: &VersionedDataset, state: &FilterState) -> Arc<RenderGraph> {
        let key = fingerprint(state);
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(entry) = last.as_ref() {
            if entry.version == current.version && entry.fingerprint == key && &entry.state == state {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return entry.graph.clone();
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let graph = Arc::new(super::render(&current.dataset, state));
        *last = Some(Entry {
            version: current.version,
            fingerprint: key,
            state: state.clone(),
            graph: graph.clone(),
        });
        graph
    }

    /// Drop the remembered render
    pub fn clear(&self) {
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }
}
