//! Dataset: the raw perfume network as served by one fetch

use super::edge::{EdgeKind, NetworkEdge};
use super::node::{AccordNode, NetworkNode, NodeId, NodeKind, PerfumeNode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use thiserror::Error;

/// Errors that can occur while reading a dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// A data-integrity problem found in a dataset
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrityViolation {
    /// A node id appears more than once; the first occurrence is kept
    DuplicateNode(NodeId),
    /// Edge references a node that is not in the dataset
    MissingEndpoint { edge: NetworkEdge, missing: NodeId },
    /// Edge endpoints have the wrong kinds for the edge type
    EndpointKind { edge: NetworkEdge },
    /// Edge weight is negative or not a number
    InvalidWeight { edge: NetworkEdge },
    /// Perfume lists an accord that has no accord node
    OrphanAccord { perfume: NodeId, accord: String },
}

impl IntegrityViolation {
    /// Whether the violation caused an edge to be dropped
    pub fn is_edge_violation(&self) -> bool {
        matches!(
            self,
            Self::MissingEndpoint { .. } | Self::EndpointKind { .. } | Self::InvalidWeight { .. }
        )
    }
}

impl std::fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateNode(id) => write!(f, "duplicate node {}", id),
            Self::MissingEndpoint { edge, missing } => write!(
                f,
                "{} edge {} -> {} references missing node {}",
                edge.kind, edge.from, edge.to, missing
            ),
            Self::EndpointKind { edge } => write!(
                f,
                "{} edge {} -> {} connects nodes of the wrong kind",
                edge.kind, edge.from, edge.to
            ),
            Self::InvalidWeight { edge } => write!(
                f,
                "{} edge {} -> {} has invalid weight {}",
                edge.kind, edge.from, edge.to, edge.weight
            ),
            Self::OrphanAccord { perfume, accord } => {
                write!(f, "perfume {} lists accord '{}' with no accord node", perfume, accord)
            }
        }
    }
}

/// Wire shape of `GET /nmap/perfumes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkPayload {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    #[serde(default)]
    pub meta: serde_json::Value,
}

/// Typed view over the opaque `meta` object, for display and debugging
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NetworkMeta {
    pub perfume_count: Option<u64>,
    pub accord_count: Option<u64>,
    pub edge_count: Option<u64>,
    pub accord_edges: Option<u64>,
    pub similarity_edges: Option<u64>,
    pub similarity_edges_high: Option<u64>,
    pub min_similarity: Option<f64>,
    pub top_accords: Option<u64>,
    pub candidate_pairs: Option<u64>,
    pub built_at: Option<String>,
    pub build_seconds: Option<f64>,
    pub max_perfumes: Option<u64>,
}

/// The raw perfume network
///
/// Immutable once built. Node ids are unique (duplicates are dropped and
/// reported); edges that break the node/edge contract are kept in `edges`
/// as received but flagged, and `valid_edges()` skips them.
#[derive(Debug, Clone)]
pub struct Dataset {
    nodes: Vec<NetworkNode>,
    edges: Vec<NetworkEdge>,
    meta: serde_json::Value,
    index: HashMap<NodeId, usize>,
    edge_ok: Vec<bool>,
    violations: Vec<IntegrityViolation>,
}

impl Dataset {
    /// Build a dataset and run integrity checks
    pub fn new(nodes: Vec<NetworkNode>, edges: Vec<NetworkEdge>, meta: serde_json::Value) -> Self {
        let mut violations = Vec::new();
        let mut index = HashMap::with_capacity(nodes.len());
        let mut kept = Vec::with_capacity(nodes.len());

        for node in nodes {
            if index.contains_key(node.id()) {
                violations.push(IntegrityViolation::DuplicateNode(node.id().clone()));
                continue;
            }
            index.insert(node.id().clone(), kept.len());
            kept.push(node);
        }

        let mut dataset = Self {
            nodes: kept,
            edges: Vec::new(),
            meta,
            index,
            edge_ok: Vec::with_capacity(edges.len()),
            violations,
        };

        let ds = &dataset;
        let orphans: Vec<IntegrityViolation> = ds
            .perfumes()
            .flat_map(move |perfume| {
                perfume
                    .accords
                    .iter()
                    .filter(move |accord| ds.kind_of(&NodeId::accord(accord)) != Some(NodeKind::Accord))
                    .map(move |accord| IntegrityViolation::OrphanAccord {
                        perfume: perfume.id.clone(),
                        accord: accord.clone(),
                    })
            })
            .collect();
        dataset.violations.extend(orphans);

        for edge in &edges {
            match dataset.check_edge(edge) {
                Ok(()) => dataset.edge_ok.push(true),
                Err(violation) => {
                    tracing::debug!(%violation, "dropping edge");
                    dataset.edge_ok.push(false);
                    dataset.violations.push(violation);
                }
            }
        }
        dataset.edges = edges;
        dataset
    }

    /// Parse a `{nodes, edges, meta}` JSON document
    pub fn from_json(json: &str) -> DatasetResult<Self> {
        let payload: NetworkPayload = serde_json::from_str(json)?;
        Ok(Self::from(payload))
    }

    /// Parse a `{nodes, edges, meta}` JSON document from a reader
    pub fn from_reader(reader: impl Read) -> DatasetResult<Self> {
        let payload: NetworkPayload = serde_json::from_reader(reader)?;
        Ok(Self::from(payload))
    }

    /// Check a single edge against the node/edge contract
    pub fn check_edge(&self, edge: &NetworkEdge) -> Result<(), IntegrityViolation> {
        let from_kind = self.kind_of(&edge.from).ok_or_else(|| IntegrityViolation::MissingEndpoint {
            edge: edge.clone(),
            missing: edge.from.clone(),
        })?;
        let to_kind = self.kind_of(&edge.to).ok_or_else(|| IntegrityViolation::MissingEndpoint {
            edge: edge.clone(),
            missing: edge.to.clone(),
        })?;

        let kinds_ok = match edge.kind {
            EdgeKind::HasAccord => from_kind == NodeKind::Perfume && to_kind == NodeKind::Accord,
            EdgeKind::SimilarTo => from_kind == NodeKind::Perfume && to_kind == NodeKind::Perfume,
        };
        if !kinds_ok {
            return Err(IntegrityViolation::EndpointKind { edge: edge.clone() });
        }
        if !edge.has_valid_weight() {
            return Err(IntegrityViolation::InvalidWeight { edge: edge.clone() });
        }
        Ok(())
    }

    /// Every integrity violation found when the dataset was built
    pub fn validate(&self) -> &[IntegrityViolation] {
        &self.violations
    }

    /// Violations that caused an edge to be skipped
    pub fn edge_violations(&self) -> impl Iterator<Item = &IntegrityViolation> {
        self.violations.iter().filter(|v| v.is_edge_violation())
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&NetworkNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn get_perfume(&self, id: &NodeId) -> Option<&PerfumeNode> {
        self.get_node(id).and_then(NetworkNode::as_perfume)
    }

    pub fn kind_of(&self, id: &NodeId) -> Option<NodeKind> {
        self.get_node(id).map(NetworkNode::kind)
    }

    /// All nodes, in payload order
    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    /// All edges as received, including ones that fail integrity checks
    pub fn edges(&self) -> &[NetworkEdge] {
        &self.edges
    }

    /// Edges that passed integrity checks, in payload order
    pub fn valid_edges(&self) -> impl Iterator<Item = &NetworkEdge> {
        self.edges
            .iter()
            .zip(self.edge_ok.iter())
            .filter(|(_, ok)| **ok)
            .map(|(e, _)| e)
    }

    /// Perfume nodes, in payload order
    pub fn perfumes(&self) -> impl Iterator<Item = &PerfumeNode> {
        self.nodes.iter().filter_map(NetworkNode::as_perfume)
    }

    /// Accord nodes, in payload order
    pub fn accords(&self) -> impl Iterator<Item = &AccordNode> {
        self.nodes.iter().filter_map(NetworkNode::as_accord)
    }

    /// The raw `meta` object
    pub fn meta(&self) -> &serde_json::Value {
        &self.meta
    }

    /// Typed view of `meta`; fields that don't parse are left empty
    pub fn meta_summary(&self) -> NetworkMeta {
        serde_json::from_value(self.meta.clone()).unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Convert back to the wire shape
    pub fn to_payload(&self) -> NetworkPayload {
        NetworkPayload {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            meta: self.meta.clone(),
        }
    }
}

impl From<NetworkPayload> for Dataset {
    fn from(payload: NetworkPayload) -> Self {
        Self::new(payload.nodes, payload.edges, payload.meta)
    }
}
