//! Detail views for a selected perfume or accord
//!
//! Both look at the whole dataset, not the rendered subgraph.

use crate::graph::{Dataset, EdgeKind, NodeId, PerfumeNode};
use crate::pipeline::top_similar;
use serde::Serialize;
use std::collections::BTreeSet;

/// Accords listed for a perfume
pub const DETAIL_ACCORDS: usize = 5;
/// Similar perfumes listed for a perfume
pub const DETAIL_SIMILAR: usize = 5;
/// Perfumes listed for an accord
pub const ACCORD_DETAIL_PERFUMES: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccordWeight {
    pub accord: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarPerfume {
    pub perfume: PerfumeNode,
    pub score: f64,
    /// Accords both perfumes have
    pub common_accords: Vec<String>,
    /// Accords the similar perfume adds
    pub new_accords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerfumeDetail {
    pub perfume: PerfumeNode,
    /// Strongest first; the first entry is the representative accord
    pub top_accords: Vec<AccordWeight>,
    pub similar: Vec<SimilarPerfume>,
    /// Selected accords found among `top_accords`
    pub matched_accords: Vec<String>,
    /// `top_accords` entries that are not selected
    pub unmatched_accords: Vec<String>,
}

impl PerfumeDetail {
    pub fn representative_accord(&self) -> Option<&str> {
        self.top_accords.first().map(|a| a.accord.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccordPerfume {
    pub perfume: PerfumeNode,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccordDetail {
    pub name: String,
    /// Strongest carriers first
    pub perfumes: Vec<AccordPerfume>,
}

/// Accords of `perfume` by edge weight, strongest first
///
/// A repeated edge to the same accord counts once, with its last weight.
fn ranked_accords(dataset: &Dataset, perfume: &NodeId) -> Vec<AccordWeight> {
    let mut ranked: Vec<AccordWeight> = Vec::new();
    for edge in dataset.valid_edges() {
        if edge.kind != EdgeKind::HasAccord || &edge.from != perfume {
            continue;
        }
        let Some(name) = edge.to.accord_name() else {
            continue;
        };
        match ranked.iter_mut().find(|a| a.accord == name) {
            Some(existing) => existing.weight = edge.weight,
            None => ranked.push(AccordWeight {
                accord: name.to_string(),
                weight: edge.weight,
            }),
        }
    }
    ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    ranked
}

/// Detail panel for one perfume
///
/// Returns `None` if `id` is not a perfume in the dataset.
pub fn perfume_detail(
    dataset: &Dataset,
    id: &NodeId,
    selected_accords: &BTreeSet<String>,
) -> Option<PerfumeDetail> {
    let perfume = dataset.get_perfume(id)?;

    let mut top_accords = ranked_accords(dataset, id);
    top_accords.truncate(DETAIL_ACCORDS);

    let similar = top_similar(dataset.valid_edges(), id, DETAIL_SIMILAR)
        .into_iter()
        .filter_map(|neighbor| {
            let other = dataset.get_perfume(&neighbor.neighbor_id)?;
            Some(SimilarPerfume {
                common_accords: other
                    .accords
                    .iter()
                    .filter(|a| perfume.accords.contains(a))
                    .cloned()
                    .collect(),
                new_accords: other
                    .accords
                    .iter()
                    .filter(|a| !perfume.accords.contains(a))
                    .cloned()
                    .collect(),
                perfume: other.clone(),
                score: neighbor.score,
            })
        })
        .collect();

    let matched_accords: Vec<String> = selected_accords
        .iter()
        .filter(|s| top_accords.iter().any(|a| a.accord.eq_ignore_ascii_case(s)))
        .cloned()
        .collect();
    let unmatched_accords = top_accords
        .iter()
        .filter(|a| !matched_accords.iter().any(|m| m.eq_ignore_ascii_case(&a.accord)))
        .map(|a| a.accord.clone())
        .collect();

    Some(PerfumeDetail {
        perfume: perfume.clone(),
        top_accords,
        similar,
        matched_accords,
        unmatched_accords,
    })
}

/// Detail panel for one accord: the perfumes that carry it most strongly
pub fn accord_detail(dataset: &Dataset, name: &str) -> AccordDetail {
    let accord_id = NodeId::accord(name);
    let mut perfumes: Vec<AccordPerfume> = dataset
        .valid_edges()
        .filter(|e| e.kind == EdgeKind::HasAccord && e.to == accord_id)
        .filter_map(|e| {
            dataset.get_perfume(&e.from).map(|p| AccordPerfume {
                perfume: p.clone(),
                weight: e.weight,
            })
        })
        .collect();
    perfumes.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    perfumes.truncate(ACCORD_DETAIL_PERFUMES);

    AccordDetail {
        name: name.to_string(),
        perfumes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AccordNode, NetworkEdge};

    fn dataset() -> Dataset {
        let accords = ["Woody", "Citrus", "Musky", "Amber", "Fresh", "Spicy"];
        let mut nodes: Vec<_> = accords.iter().map(|a| AccordNode::named(a).into()).collect();
        nodes.push(
            PerfumeNode::new("1", "Cedar")
                .with_accord("Woody")
                .with_accord("Citrus")
                .with_accord("Musky")
                .with_accord("Amber")
                .with_accord("Fresh")
                .with_accord("Spicy")
                .into(),
        );
        nodes.push(PerfumeNode::new("2", "Bergamot").with_accord("Citrus").with_accord("Fresh").into());
        nodes.push(PerfumeNode::new("3", "Smoke").with_accord("Woody").with_accord("Spicy").into());

        let edges = vec![
            NetworkEdge::has_accord("1", "Citrus", 0.5),
            NetworkEdge::has_accord("1", "Woody", 0.9),
            NetworkEdge::has_accord("1", "Musky", 0.3),
            NetworkEdge::has_accord("1", "Amber", 0.2),
            NetworkEdge::has_accord("1", "Fresh", 0.4),
            NetworkEdge::has_accord("1", "Spicy", 0.1),
            NetworkEdge::has_accord("2", "Citrus", 0.95),
            NetworkEdge::has_accord("3", "Woody", 0.6),
            NetworkEdge::similar_to("2", "1", 0.7),
            NetworkEdge::similar_to("1", "3", 0.8),
        ];
        Dataset::new(nodes, edges, serde_json::Value::Null)
    }

    #[test]
    fn test_perfume_detail_top_accords() {
        let ds = dataset();
        let detail = perfume_detail(&ds, &"1".into(), &BTreeSet::new()).unwrap();
        let names: Vec<&str> = detail.top_accords.iter().map(|a| a.accord.as_str()).collect();
        assert_eq!(names, vec!["Woody", "Citrus", "Fresh", "Musky", "Amber"]);
        assert_eq!(detail.representative_accord(), Some("Woody"));
    }

    #[test]
    fn test_perfume_detail_similar_with_accord_diff() {
        let ds = dataset();
        let detail = perfume_detail(&ds, &"2".into(), &BTreeSet::new()).unwrap();
        assert_eq!(detail.similar.len(), 1);

        let sim = &detail.similar[0];
        assert_eq!(sim.perfume.id.as_str(), "1");
        assert_eq!(sim.common_accords, vec!["Citrus", "Fresh"]);
        assert_eq!(sim.new_accords, vec!["Woody", "Musky", "Amber", "Spicy"]);

        let detail = perfume_detail(&ds, &"1".into(), &BTreeSet::new()).unwrap();
        let ids: Vec<&str> = detail.similar.iter().map(|s| s.perfume.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
    }

    #[test]
    fn test_perfume_detail_matches_selection_case_insensitively() {
        let ds = dataset();
        let selected: BTreeSet<String> = ["citrus", "Floral"].iter().map(|s| s.to_string()).collect();
        let detail = perfume_detail(&ds, &"1".into(), &selected).unwrap();
        assert_eq!(detail.matched_accords, vec!["citrus"]);
        assert_eq!(detail.unmatched_accords, vec!["Woody", "Fresh", "Musky", "Amber"]);
    }

    #[test]
    fn test_unknown_or_accord_id_has_no_detail() {
        let ds = dataset();
        assert!(perfume_detail(&ds, &"99".into(), &BTreeSet::new()).is_none());
        assert!(perfume_detail(&ds, &NodeId::accord("Woody"), &BTreeSet::new()).is_none());
    }

    #[test]
    fn test_accord_detail_ranks_carriers() {
        let ds = dataset();
        let detail = accord_detail(&ds, "Woody");
        let ids: Vec<(&str, f64)> = detail
            .perfumes
            .iter()
            .map(|p| (p.perfume.id.as_str(), p.weight))
            .collect();
        assert_eq!(ids, vec![("1", 0.9), ("3", 0.6)]);

        assert!(accord_detail(&ds, "Leather").perfumes.is_empty());
    }
}
