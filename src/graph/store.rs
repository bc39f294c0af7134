//! DatasetStore: holds the most recently committed dataset

use super::dataset::Dataset;
use crate::labels::{FilterOptions, Labels};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Load state of the store, for display
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Last fetch failed; any previously committed dataset is still served
    Failed(String),
}

/// A committed dataset together with the version it was committed under
#[derive(Debug, Clone)]
pub struct VersionedDataset {
    pub version: u64,
    pub dataset: Arc<Dataset>,
}

#[derive(Debug, Default)]
struct StoreInner {
    current: Option<VersionedDataset>,
    version: u64,
    status: LoadStatus,
    labels: Option<Arc<Labels>>,
    filter_options: Option<Arc<FilterOptions>>,
}

/// The dataset store
///
/// Datasets are swapped in whole; nothing is ever merged into a committed
/// dataset. Every commit bumps the version, which keys render memoization.
#[derive(Debug, Default)]
pub struct DatasetStore {
    inner: RwLock<StoreInner>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the current dataset, returning the new version
    pub fn commit(&self, dataset: Dataset) -> u64 {
        let mut inner = self.write();
        inner.version += 1;
        let version = inner.version;
        tracing::info!(
            version,
            nodes = dataset.node_count(),
            edges = dataset.edge_count(),
            violations = dataset.validate().len(),
            "dataset committed"
        );
        inner.current = Some(VersionedDataset {
            version,
            dataset: Arc::new(dataset),
        });
        inner.status = LoadStatus::Ready;
        version
    }

    /// The current dataset, if one has been committed
    pub fn current(&self) -> Option<VersionedDataset> {
        self.read().current.clone()
    }

    pub fn version(&self) -> u64 {
        self.read().version
    }

    pub fn status(&self) -> LoadStatus {
        self.read().status.clone()
    }

    pub fn mark_loading(&self) {
        self.write().status = LoadStatus::Loading;
    }

    /// Record a failed fetch; the committed dataset is left untouched
    pub fn mark_failed(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(%reason, "dataset load failed");
        self.write().status = LoadStatus::Failed(reason);
    }

    pub fn set_labels(&self, labels: Labels) {
        self.write().labels = Some(Arc::new(labels));
    }

    pub fn labels(&self) -> Option<Arc<Labels>> {
        self.read().labels.clone()
    }

    pub fn set_filter_options(&self, options: FilterOptions) {
        self.write().filter_options = Some(Arc::new(options));
    }

    /// Filter vocabularies: fetched ones if present, otherwise derived from
    /// the current dataset
    pub fn filter_options(&self) -> Option<Arc<FilterOptions>> {
        let inner = self.read();
        if let Some(options) = &inner.filter_options {
            return Some(options.clone());
        }
        inner
            .current
            .as_ref()
            .map(|c| Arc::new(FilterOptions::from_dataset(&c.dataset)))
    }
}
