//! Similarity edge selection and neighbor ranking

use crate::graph::{EdgeKind, NetworkEdge, NodeId};
use serde::Serialize;
use std::collections::HashSet;

/// Neighbors of the selected perfume that are always rendered
pub const PRIORITY_NEIGHBORS: usize = 5;

/// Keep similarity edges between surviving perfumes at or above the threshold
///
/// A threshold of 0.0 keeps every edge, including zero-weight ones.
pub fn select_similar_edges<'a, I>(
    edges: I,
    surviving: &HashSet<NodeId>,
    min_similarity: f64,
) -> Vec<&'a NetworkEdge>
where
    I: IntoIterator<Item = &'a NetworkEdge>,
{
    edges
        .into_iter()
        .filter(|e| e.kind == EdgeKind::SimilarTo)
        .filter(|e| surviving.contains(&e.from) && surviving.contains(&e.to))
        .filter(|e| e.weight >= min_similarity)
        .collect()
}

/// A ranked similar perfume
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarNeighbor {
    pub neighbor_id: NodeId,
    pub score: f64,
}

/// The `n` most similar neighbors of `node_id`
///
/// Similarity edges are looked up in both directions. A neighbor reached by
/// more than one edge is counted once, with its first edge. Equal scores keep
/// edge scan order.
pub fn top_similar<'a, I>(edges: I, node_id: &NodeId, n: usize) -> Vec<SimilarNeighbor>
where
    I: IntoIterator<Item = &'a NetworkEdge>,
{
    let mut seen: HashSet<&NodeId> = HashSet::new();
    let mut ranked: Vec<SimilarNeighbor> = Vec::new();

    for edge in edges {
        if edge.kind != EdgeKind::SimilarTo {
            continue;
        }
        let Some(other) = edge.other_end(node_id) else {
            continue;
        };
        if other == node_id || !seen.insert(other) {
            continue;
        }
        ranked.push(SimilarNeighbor {
            neighbor_id: other.clone(),
            score: edge.weight,
        });
    }

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(n);
    ranked
}
