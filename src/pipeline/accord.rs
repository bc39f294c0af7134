//! Accord edge ranking

use crate::graph::{EdgeKind, NetworkEdge, NodeId};
use std::collections::{HashMap, HashSet};

/// Per surviving perfume, keep its `top_k` strongest accord edges, then
/// drop the ones whose accord is not selected
///
/// Ranking happens before the selection is applied: a selected accord that
/// falls outside a perfume's top `k` is not shown for that perfume. Groups
/// come out in order of first appearance, and edges of equal weight keep
/// their input order.
pub fn select_accord_edges<'a, I>(
    edges: I,
    surviving: &HashSet<NodeId>,
    top_k: usize,
    selected_accord_ids: &HashSet<NodeId>,
) -> Vec<&'a NetworkEdge>
where
    I: IntoIterator<Item = &'a NetworkEdge>,
{
    let mut order: Vec<&'a NodeId> = Vec::new();
    let mut groups: HashMap<&'a NodeId, Vec<&'a NetworkEdge>> = HashMap::new();

    for edge in edges {
        if edge.kind != EdgeKind::HasAccord || !surviving.contains(&edge.from) {
            continue;
        }
        groups
            .entry(&edge.from)
            .or_insert_with(|| {
                order.push(&edge.from);
                Vec::new()
            })
            .push(edge);
    }

    let mut selected = Vec::new();
    for perfume in order {
        let Some(mut group) = groups.remove(perfume) else {
            continue;
        };
        group.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        selected.extend(
            group
                .into_iter()
                .take(top_k)
                .filter(|e| selected_accord_ids.contains(&e.to)),
        );
    }
    selected
}

/// Accord ids targeted by at least one accord edge
pub fn active_accords<'a, I>(edges: I) -> HashSet<&'a NodeId>
where
    I: IntoIterator<Item = &'a NetworkEdge>,
{
    edges
        .into_iter()
        .filter(|e| e.kind == EdgeKind::HasAccord)
        .map(|e| &e.to)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> HashSet<NodeId> {
        names.iter().map(|s| NodeId::from(*s)).collect()
    }

    fn accords(names: &[&str]) -> HashSet<NodeId> {
        names.iter().map(|s| NodeId::accord(s)).collect()
    }

    fn pairs(edges: &[&NetworkEdge]) -> Vec<(String, String)> {
        edges
            .iter()
            .map(|e| (e.from.to_string(), e.to.to_string()))
            .collect()
    }

    #[test]
    fn test_rank_then_filter() {
        let edges = vec![
            NetworkEdge::has_accord("1", "Citrus", 0.4),
            NetworkEdge::has_accord("1", "Woody", 0.9),
            NetworkEdge::has_accord("1", "Musky", 0.6),
        ];
        // Citrus is selected but ranks third
        let kept = select_accord_edges(&edges, &ids(&["1"]), 2, &accords(&["Citrus", "Woody"]));
        assert_eq!(pairs(&kept), vec![("1".into(), "accord_Woody".into())]);
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let edges = vec![
            NetworkEdge::has_accord("2", "Woody", 0.5),
            NetworkEdge::has_accord("1", "Woody", 0.9),
            NetworkEdge::has_accord("2", "Citrus", 0.8),
        ];
        let kept = select_accord_edges(&edges, &ids(&["1", "2"]), 5, &accords(&["Woody", "Citrus"]));
        assert_eq!(
            pairs(&kept),
            vec![
                ("2".into(), "accord_Citrus".into()),
                ("2".into(), "accord_Woody".into()),
                ("1".into(), "accord_Woody".into()),
            ]
        );
    }

    #[test]
    fn test_equal_weights_keep_input_order() {
        let edges = vec![
            NetworkEdge::has_accord("1", "Fresh", 0.5),
            NetworkEdge::has_accord("1", "Spicy", 0.5),
            NetworkEdge::has_accord("1", "Floral", 0.5),
        ];
        let kept = select_accord_edges(
            &edges,
            &ids(&["1"]),
            2,
            &accords(&["Fresh", "Spicy", "Floral"]),
        );
        assert_eq!(
            pairs(&kept),
            vec![
                ("1".into(), "accord_Fresh".into()),
                ("1".into(), "accord_Spicy".into()),
            ]
        );
    }

    #[test]
    fn test_non_surviving_perfumes_and_similarity_edges_are_skipped() {
        let edges = vec![
            NetworkEdge::has_accord("9", "Woody", 0.9),
            NetworkEdge::similar_to("1", "9", 0.9),
            NetworkEdge::has_accord("1", "Woody", 0.1),
        ];
        let kept = select_accord_edges(&edges, &ids(&["1"]), 3, &accords(&["Woody"]));
        assert_eq!(pairs(&kept), vec![("1".into(), "accord_Woody".into())]);
    }

    #[test]
    fn test_empty_selection_keeps_no_accord_edges() {
        let edges = vec![NetworkEdge::has_accord("1", "Woody", 0.9)];
        assert!(select_accord_edges(&edges, &ids(&["1"]), 3, &HashSet::new()).is_empty());
    }

    #[test]
    fn test_active_accords() {
        let edges = vec![
            NetworkEdge::has_accord("1", "Woody", 0.9),
            NetworkEdge::has_accord("2", "Woody", 0.3),
            NetworkEdge::similar_to("1", "2", 0.9),
        ];
        let active = active_accords(&edges);
        assert_eq!(active.len(), 1);
        assert!(active.contains(&NodeId::accord("Woody")));
    }
}
