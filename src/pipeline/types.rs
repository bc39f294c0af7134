//! Pipeline input and output types

use crate::config::GraphConfig;
use crate::graph::{EdgeKind, IntegrityViolation, NetworkEdge, NetworkNode, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::hash::{Hash, Hasher};

/// Every filter dimension the user controls
///
/// Pure data. Together with a dataset it fully determines the render graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub selected_accords: BTreeSet<String>,
    #[serde(default)]
    pub selected_brands: BTreeSet<String>,
    #[serde(default)]
    pub selected_seasons: BTreeSet<String>,
    #[serde(default)]
    pub selected_occasions: BTreeSet<String>,
    #[serde(default)]
    pub selected_genders: BTreeSet<String>,
    /// Similarity edges below this weight are hidden (0.0 - 1.0)
    pub min_similarity: f64,
    /// Accord edges kept per perfume, before the accord selection applies
    pub top_accords_per_perfume: usize,
    /// Maximum perfume nodes rendered
    pub display_limit: usize,
    #[serde(default)]
    pub selected_perfume_id: Option<NodeId>,
    /// Only consider perfumes in the member's collection
    #[serde(default)]
    pub my_perfumes_only: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::from_config(&GraphConfig::default())
    }
}

impl Hash for FilterState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.selected_accords.hash(state);
        self.selected_brands.hash(state);
        self.selected_seasons.hash(state);
        self.selected_occasions.hash(state);
        self.selected_genders.hash(state);
        self.min_similarity.to_bits().hash(state);
        self.top_accords_per_perfume.hash(state);
        self.display_limit.hash(state);
        self.selected_perfume_id.hash(state);
        self.my_perfumes_only.hash(state);
    }
}

fn set_of<I, S>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl FilterState {
    /// Filter state seeded with the configured defaults
    pub fn from_config(config: &GraphConfig) -> Self {
        Self {
            selected_accords: set_of(config.default_accords.iter().cloned()),
            selected_brands: BTreeSet::new(),
            selected_seasons: BTreeSet::new(),
            selected_occasions: BTreeSet::new(),
            selected_genders: BTreeSet::new(),
            min_similarity: config.min_similarity,
            top_accords_per_perfume: config.top_accords,
            display_limit: config.display_limit,
            selected_perfume_id: None,
            my_perfumes_only: false,
        }
    }

    /// A state with no attribute constraints
    pub fn unfiltered(min_similarity: f64, top_accords: usize, display_limit: usize) -> Self {
        Self {
            selected_accords: BTreeSet::new(),
            selected_brands: BTreeSet::new(),
            selected_seasons: BTreeSet::new(),
            selected_occasions: BTreeSet::new(),
            selected_genders: BTreeSet::new(),
            min_similarity,
            top_accords_per_perfume: top_accords,
            display_limit,
            selected_perfume_id: None,
            my_perfumes_only: false,
        }
    }

    pub fn with_accords<I: IntoIterator<Item = S>, S: Into<String>>(mut self, accords: I) -> Self {
        self.selected_accords = set_of(accords);
        self
    }

    pub fn with_brands<I: IntoIterator<Item = S>, S: Into<String>>(mut self, brands: I) -> Self {
        self.selected_brands = set_of(brands);
        self
    }

    pub fn with_seasons<I: IntoIterator<Item = S>, S: Into<String>>(mut self, seasons: I) -> Self {
        self.selected_seasons = set_of(seasons);
        self
    }

    pub fn with_occasions<I: IntoIterator<Item = S>, S: Into<String>>(mut self, occasions: I) -> Self {
        self.selected_occasions = set_of(occasions);
        self
    }

    pub fn with_genders<I: IntoIterator<Item = S>, S: Into<String>>(mut self, genders: I) -> Self {
        self.selected_genders = set_of(genders);
        self
    }

    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn with_top_accords(mut self, top_accords: usize) -> Self {
        self.top_accords_per_perfume = top_accords;
        self
    }

    pub fn with_display_limit(mut self, display_limit: usize) -> Self {
        self.display_limit = display_limit;
        self
    }

    pub fn with_selected_perfume(mut self, id: impl Into<NodeId>) -> Self {
        self.selected_perfume_id = Some(id.into());
        self
    }

    pub fn my_perfumes_only(mut self, enabled: bool) -> Self {
        self.my_perfumes_only = enabled;
        self
    }

    /// Ids of the accord nodes for the selected accords
    pub fn selected_accord_ids(&self) -> HashSet<NodeId> {
        self.selected_accords.iter().map(|a| NodeId::accord(a)).collect()
    }
}

/// The render-ready subgraph
///
/// Every edge references two node ids present in `nodes`, and node ids are
/// unique. `violations` lists edges dropped for breaking the dataset
/// contract; it is not part of the render payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderGraph {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    #[serde(skip)]
    pub violations: Vec<IntegrityViolation>,
}

impl RenderGraph {
    pub fn perfume_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.kind() == NodeKind::Perfume)
            .map(NetworkNode::id)
    }

    pub fn accord_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.kind() == NodeKind::Accord)
            .map(NetworkNode::id)
    }

    pub fn perfume_count(&self) -> usize {
        self.perfume_ids().count()
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &NetworkEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    /// Numeric ids of the rendered perfumes, as the context endpoint wants them
    pub fn visible_perfume_ids(&self) -> Vec<i64> {
        self.perfume_ids().filter_map(NodeId::as_numeric).collect()
    }

    /// Check the render contract: unique node ids, closed edge set
    pub fn is_closed(&self) -> bool {
        let mut ids = HashSet::with_capacity(self.nodes.len());
        if !self.nodes.iter().all(|n| ids.insert(n.id())) {
            return false;
        }
        self.edges
            .iter()
            .all(|e| ids.contains(&e.from) && ids.contains(&e.to))
    }
}
