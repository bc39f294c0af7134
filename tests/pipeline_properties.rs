//! Render pipeline properties over seeded random datasets
//!
//! Each property is checked for a spread of seeds and filter states rather
//! than a single hand-built case.

mod common;

use common::{random_dataset, ACCORD_NAMES};
use scentmap::pipeline::{priority_ids, select_similar_edges, PipelineCache};
use scentmap::{render, Dataset, DatasetStore, EdgeKind, FilterState, NodeId, RenderGraph};
use std::collections::HashSet;

const SEEDS: [u64; 6] = [1, 7, 42, 99, 2024, 31337];
const PERFUMES: usize = 40;

fn all_accords(state: FilterState) -> FilterState {
    state.with_accords(ACCORD_NAMES)
}

fn states() -> Vec<FilterState> {
    vec![
        FilterState::unfiltered(0.0, 3, 10),
        all_accords(FilterState::unfiltered(0.5, 1, 10)),
        all_accords(FilterState::unfiltered(0.65, 3, 5)),
        all_accords(FilterState::unfiltered(0.3, 5, 1000)),
        FilterState::unfiltered(0.4, 2, 8).with_accords(["Woody", "Citrus"]),
        all_accords(FilterState::unfiltered(0.2, 3, 6))
            .with_seasons(["Summer"])
            .with_selected_perfume("1003"),
        all_accords(FilterState::unfiltered(0.0, 4, 12)).my_perfumes_only(true),
    ]
}

fn node_ids(graph: &RenderGraph) -> HashSet<&NodeId> {
    graph.nodes.iter().map(|n| n.id()).collect()
}

#[test]
fn test_every_edge_references_output_nodes() {
    for seed in SEEDS {
        let ds = random_dataset(seed, PERFUMES);
        for state in states() {
            let graph = render(&ds, &state);
            let ids = node_ids(&graph);

            assert_eq!(ids.len(), graph.nodes.len(), "duplicate node ids (seed {})", seed);
            for edge in &graph.edges {
                assert!(ids.contains(&edge.from), "dangling source {} (seed {})", edge.from, seed);
                assert!(ids.contains(&edge.to), "dangling target {} (seed {})", edge.to, seed);
            }
            assert!(graph.is_closed());
        }
    }
}

#[test]
fn test_raising_min_similarity_never_adds_edges() {
    for seed in SEEDS {
        let ds = random_dataset(seed, PERFUMES);
        let mut previous = usize::MAX;
        for step in 0..=20 {
            let min = step as f64 * 0.05;
            // budget above the perfume count, so only the threshold moves
            let state = all_accords(FilterState::unfiltered(min, 3, PERFUMES * 2));
            let count = render(&ds, &state)
                .edges_of_kind(EdgeKind::SimilarTo)
                .count();
            assert!(count <= previous, "min {} added edges (seed {})", min, seed);
            previous = count;
        }
    }
}

#[test]
fn test_output_never_exceeds_display_limit() {
    for seed in SEEDS {
        let ds = random_dataset(seed, PERFUMES);
        for limit in [0, 1, 2, 5, 10, 39, 40, 100] {
            let state = all_accords(FilterState::unfiltered(0.1, 3, limit)).with_selected_perfume("1000");
            let graph = render(&ds, &state);
            assert!(
                graph.perfume_count() <= limit,
                "{} perfumes for limit {} (seed {})",
                graph.perfume_count(),
                limit,
                seed
            );
        }
    }
}

fn expected_priority(ds: &Dataset, state: &FilterState) -> HashSet<NodeId> {
    let all: HashSet<NodeId> = ds.perfumes().map(|p| p.id.clone()).collect();
    let similar = select_similar_edges(ds.valid_edges(), &all, state.min_similarity);
    priority_ids(similar, state.selected_perfume_id.as_ref())
}

#[test]
fn test_selected_perfume_and_neighbors_always_shown() {
    for seed in SEEDS {
        let ds = random_dataset(seed, PERFUMES);
        for selected in ["1000", "1017", "1039"] {
            for min in [0.0, 0.5, 0.8] {
                let state = FilterState::unfiltered(min, 3, 6).with_selected_perfume(selected);
                let graph = render(&ds, &state);
                let shown = node_ids(&graph);

                let expected = expected_priority(&ds, &state);
                assert!(expected.len() <= 6);
                for id in &expected {
                    assert!(shown.contains(id), "{} missing for {} (seed {})", id, selected, seed);
                }
            }
        }
    }
}

#[test]
fn test_render_is_deterministic() {
    for seed in SEEDS {
        let ds = random_dataset(seed, PERFUMES);
        for state in states() {
            let first = serde_json::to_string(&render(&ds, &state)).unwrap();
            let second = serde_json::to_string(&render(&ds, &state)).unwrap();
            assert_eq!(first, second);

            let rebuilt = random_dataset(seed, PERFUMES);
            let third = serde_json::to_string(&render(&rebuilt, &state)).unwrap();
            assert_eq!(first, third);
        }
    }
}

#[test]
fn test_cached_render_matches_direct_render() {
    let store = DatasetStore::new();
    store.commit(random_dataset(42, PERFUMES));
    let current = store.current().unwrap();
    let cache = PipelineCache::new();

    for state in states() {
        let direct = render(&current.dataset, &state);
        assert_eq!(*cache.render(&current, &state), direct);
        assert_eq!(*cache.render(&current, &state), direct);
    }
    assert_eq!(cache.stats(), (states().len() as u64, states().len() as u64));

    // a new commit invalidates the memo even for an equal filter state
    store.commit(random_dataset(43, PERFUMES));
    let next = store.current().unwrap();
    let state = FilterState::unfiltered(0.0, 3, 10);
    assert_eq!(*cache.render(&next, &state), render(&next.dataset, &state));
}

#[test]
fn test_accord_node_shown_iff_an_accord_edge_targets_it() {
    for seed in SEEDS {
        let ds = random_dataset(seed, PERFUMES);
        for state in states() {
            let graph = render(&ds, &state);
            let targeted: HashSet<&NodeId> = graph
                .edges_of_kind(EdgeKind::HasAccord)
                .map(|e| &e.to)
                .collect();
            let shown: HashSet<&NodeId> = graph.accord_ids().collect();
            assert_eq!(shown, targeted, "seed {}", seed);
        }
    }
}

#[test]
fn test_accord_edges_respect_top_k_and_selection() {
    for seed in SEEDS {
        let ds = random_dataset(seed, PERFUMES);
        for top in 1..=4 {
            let state = FilterState::unfiltered(0.0, top, PERFUMES).with_accords(["Woody", "Floral", "Amber"]);
            let graph = render(&ds, &state);
            let selected = state.selected_accord_ids();

            for perfume in graph.perfume_ids() {
                let kept: Vec<_> = graph
                    .edges_of_kind(EdgeKind::HasAccord)
                    .filter(|e| &e.from == perfume)
                    .collect();
                assert!(kept.len() <= top);
                assert!(kept.iter().all(|e| selected.contains(&e.to)));
            }
        }
    }
}

#[test]
fn test_empty_accord_selection_renders_no_accords() {
    let ds = random_dataset(5, PERFUMES);
    let graph = render(&ds, &FilterState::unfiltered(0.0, 5, PERFUMES));
    assert_eq!(graph.accord_ids().count(), 0);
    assert_eq!(graph.edges_of_kind(EdgeKind::HasAccord).count(), 0);
    assert_eq!(graph.perfume_count(), PERFUMES);
}
