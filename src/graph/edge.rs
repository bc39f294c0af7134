//! Edge representation: accord membership and perfume similarity

use super::node::NodeId;
use serde::{Deserialize, Deserializer, Serialize};

/// Kind of relationship an edge expresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Perfume → Accord membership, weighted by accord strength
    #[serde(rename = "HAS_ACCORD")]
    HasAccord,
    /// Perfume to perfume similarity, stored once per pair
    #[serde(rename = "SIMILAR_TO")]
    SimilarTo,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HasAccord => write!(f, "HAS_ACCORD"),
            Self::SimilarTo => write!(f, "SIMILAR_TO"),
        }
    }
}

/// A missing or `null` weight reads as 0.0, which is still a real edge.
fn nullable_weight<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// A weighted edge between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    /// Similarity or accord strength (0.0 - 1.0)
    #[serde(default, deserialize_with = "nullable_weight")]
    pub weight: f64,
}

impl NetworkEdge {
    pub fn has_accord(perfume: impl Into<NodeId>, accord_name: &str, weight: f64) -> Self {
        Self {
            from: perfume.into(),
            to: NodeId::accord(accord_name),
            kind: EdgeKind::HasAccord,
            weight,
        }
    }

    pub fn similar_to(a: impl Into<NodeId>, b: impl Into<NodeId>, weight: f64) -> Self {
        Self {
            from: a.into(),
            to: b.into(),
            kind: EdgeKind::SimilarTo,
            weight,
        }
    }

    /// Whether `id` is either endpoint
    pub fn touches(&self, id: &NodeId) -> bool {
        &self.from == id || &self.to == id
    }

    /// The endpoint opposite `id`, if `id` is an endpoint
    pub fn other_end(&self, id: &NodeId) -> Option<&NodeId> {
        if &self.from == id {
            Some(&self.to)
        } else if &self.to == id {
            Some(&self.from)
        } else {
            None
        }
    }

    /// Weights must be finite and non-negative
    pub fn has_valid_weight(&self) -> bool {
        self.weight.is_finite() && self.weight >= 0.0
    }
}
