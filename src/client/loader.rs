//! Dataset loading into the store

use super::cancel::FetchCoordinator;
use super::traits::{ClientError, ClientResult, NetworkQuery, NetworkSource};
use crate::graph::{Dataset, DatasetStore};

/// Fetch a dataset and commit it, unless a newer fetch superseded this one
///
/// Returns the committed version, or `None` when the fetch was superseded
/// (its response, if any, is discarded). On failure the store keeps the
/// last good dataset and records the failure.
pub async fn load_dataset<S>(
    source: &S,
    store: &DatasetStore,
    coordinator: &FetchCoordinator,
    query: &NetworkQuery,
) -> ClientResult<Option<u64>>
where
    S: NetworkSource + ?Sized,
{
    let token = coordinator.begin(query.key());
    store.mark_loading();

    let result = tokio::select! {
        result = source.fetch_network(query) => result,
        _ = token.cancelled() => Err(ClientError::Cancelled),
    };

    if !coordinator.is_current(&token) {
        tracing::debug!(id = token.id(), key = token.key(), "discarding superseded fetch");
        return Ok(None);
    }
    coordinator.finish(&token);

    match result {
        Ok(payload) => {
            let dataset = Dataset::from(payload);
            Ok(Some(store.commit(dataset)))
        }
        Err(e) => {
            store.mark_failed(e.to_string());
            Err(e)
        }
    }
}

/// Fetch labels and filter options; failures are logged and left unset
///
/// Without fetched filter options the store derives them from the dataset.
pub async fn load_vocabularies<S>(source: &S, store: &DatasetStore)
where
    S: NetworkSource + ?Sized,
{
    let (labels, options) = tokio::join!(source.fetch_labels(), source.fetch_filter_options());

    match labels {
        Ok(labels) => store.set_labels(labels),
        Err(e) => tracing::warn!(error = %e, "could not load labels"),
    }
    match options {
        Ok(options) => store.set_filter_options(options),
        Err(e) => tracing::warn!(error = %e, "could not load filter options, deriving from dataset"),
    }
}
