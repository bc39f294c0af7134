//! Render pipeline: dataset + filter state -> bounded render graph
//!
//! Every stage is a pure function. `render` runs them in order:
//! attribute filter, similarity edges, accord edges, display budget, then
//! re-closes the edge set over the perfumes that made the cut.

mod accord;
mod budget;
mod cache;
mod filter;
mod similar;
mod types;

pub use accord::{active_accords, select_accord_edges};
pub use budget::apply_budget;
pub use cache::PipelineCache;
pub use filter::{filter_perfumes, matches};
pub use similar::{select_similar_edges, top_similar, SimilarNeighbor, PRIORITY_NEIGHBORS};
pub use types::{FilterState, RenderGraph};

use crate::graph::{Dataset, EdgeKind, NetworkEdge, NetworkNode, NodeId};
use std::collections::HashSet;

/// Ids that the display budget must keep: the selected perfume and its
/// closest neighbors over the given similarity edges
pub fn priority_ids<'a, I>(similar: I, selected: Option<&NodeId>) -> HashSet<NodeId>
where
    I: IntoIterator<Item = &'a NetworkEdge>,
{
    let Some(selected) = selected else {
        return HashSet::new();
    };
    let mut ids: HashSet<NodeId> = top_similar(similar, selected, PRIORITY_NEIGHBORS)
        .into_iter()
        .map(|n| n.neighbor_id)
        .collect();
    ids.insert(selected.clone());
    ids
}

/// Compute the render graph for a dataset and filter state
///
/// Nodes come out as accords (dataset order) followed by perfumes (budget
/// order). Edges come out as similarity edges (dataset order) followed by
/// accord edges, grouped per perfume.
pub fn render(dataset: &Dataset, state: &FilterState) -> RenderGraph {
    let filtered = filter_perfumes(dataset.perfumes(), state);
    let surviving: HashSet<NodeId> = filtered.iter().map(|p| p.id.clone()).collect();

    let similar = select_similar_edges(dataset.valid_edges(), &surviving, state.min_similarity);
    let accord_edges = select_accord_edges(
        dataset.valid_edges(),
        &surviving,
        state.top_accords_per_perfume,
        &state.selected_accord_ids(),
    );

    let priority = priority_ids(similar.iter().copied(), state.selected_perfume_id.as_ref());
    let filtered_count = filtered.len();
    let kept = apply_budget(filtered, &priority, state.display_limit);
    let kept_ids: HashSet<&NodeId> = kept.iter().map(|p| &p.id).collect();

    let edges: Vec<NetworkEdge> = similar
        .iter()
        .filter(|e| kept_ids.contains(&e.from) && kept_ids.contains(&e.to))
        .chain(accord_edges.iter().filter(|e| kept_ids.contains(&e.from)))
        .map(|e| (*e).clone())
        .collect();

    let active = active_accords(&edges);
    let nodes: Vec<NetworkNode> = dataset
        .accords()
        .filter(|a| active.contains(&a.id))
        .cloned()
        .map(NetworkNode::from)
        .chain(kept.iter().map(|p| NetworkNode::from((*p).clone())))
        .collect();

    let violations: Vec<_> = dataset.edge_violations().cloned().collect();

    tracing::debug!(
        filtered = filtered_count,
        similar = similar.len(),
        accord_edges = accord_edges.len(),
        priority = priority.len(),
        kept = kept.len(),
        nodes = nodes.len(),
        edges = edges.len(),
        dropped = violations.len(),
        "render pipeline"
    );

    RenderGraph {
        nodes,
        edges,
        violations,
    }
}

/// Edge count of one kind in a render graph, for summaries
pub fn count_edges(graph: &RenderGraph, kind: EdgeKind) -> usize {
    graph.edges_of_kind(kind).count()
}
