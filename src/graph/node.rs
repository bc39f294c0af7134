//! Node representation in the perfume network

use serde::{Deserialize, Deserializer, Serialize};

/// Prefix used for accord node ids (`accord_Woody`)
pub const ACCORD_ID_PREFIX: &str = "accord_";

/// Unique identifier for a node
///
/// Serializes as a plain string. Perfume ids are backend ids ("1042"),
/// accord ids are namespaced ("accord_Woody").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a NodeId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id of the accord node for an accord name
    pub fn accord(name: &str) -> Self {
        Self(format!("{}{}", ACCORD_ID_PREFIX, name))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Accord name if this is an accord id
    pub fn accord_name(&self) -> Option<&str> {
        self.0.strip_prefix(ACCORD_ID_PREFIX)
    }

    /// Numeric backend id, for endpoints that take perfume ids as integers
    pub fn as_numeric(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A user's collection marker on a perfume
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegisterStatus {
    Have,
    Had,
    Want,
    Recommended,
    /// Status string this crate does not know about
    Other(String),
}

impl From<String> for RegisterStatus {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "HAVE" => Self::Have,
            "HAD" => Self::Had,
            "WANT" => Self::Want,
            "RECOMMENDED" => Self::Recommended,
            _ => Self::Other(s),
        }
    }
}

impl From<RegisterStatus> for String {
    fn from(status: RegisterStatus) -> Self {
        match status {
            RegisterStatus::Have => "HAVE".to_string(),
            RegisterStatus::Had => "HAD".to_string(),
            RegisterStatus::Want => "WANT".to_string(),
            RegisterStatus::Recommended => "RECOMMENDED".to_string(),
            RegisterStatus::Other(s) => s,
        }
    }
}

/// Accepts `null`, a missing field or an array; drops repeated entries
/// while keeping first-seen order.
fn nullable_set<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    let mut out: Vec<String> = Vec::new();
    for item in raw.unwrap_or_default() {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    Ok(out)
}

/// A perfume node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfumeNode {
    pub id: NodeId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, rename = "image", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Highest-weighted accord, used as the coarse filter key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_accord: Option<String>,
    #[serde(default, deserialize_with = "nullable_set")]
    pub accords: Vec<String>,
    #[serde(default, deserialize_with = "nullable_set")]
    pub seasons: Vec<String>,
    #[serde(default, deserialize_with = "nullable_set")]
    pub occasions: Vec<String>,
    #[serde(default, deserialize_with = "nullable_set")]
    pub genders: Vec<String>,
    #[serde(default)]
    pub register_status: Option<RegisterStatus>,
}

impl PerfumeNode {
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            brand: None,
            image_url: None,
            primary_accord: None,
            accords: Vec::new(),
            seasons: Vec::new(),
            occasions: Vec::new(),
            genders: Vec::new(),
            register_status: None,
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Add an accord; the first accord added becomes the primary accord
    pub fn with_accord(mut self, accord: impl Into<String>) -> Self {
        let accord = accord.into();
        if self.primary_accord.is_none() {
            self.primary_accord = Some(accord.clone());
        }
        if !self.accords.contains(&accord) {
            self.accords.push(accord);
        }
        self
    }

    pub fn with_season(mut self, season: impl Into<String>) -> Self {
        self.seasons.push(season.into());
        self
    }

    pub fn with_occasion(mut self, occasion: impl Into<String>) -> Self {
        self.occasions.push(occasion.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.genders.push(gender.into());
        self
    }

    pub fn with_status(mut self, status: RegisterStatus) -> Self {
        self.register_status = Some(status);
        self
    }

    /// Whether the perfume is in the member's collection
    pub fn is_registered(&self) -> bool {
        self.register_status.is_some()
    }
}

/// An accord (scent category) node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccordNode {
    pub id: NodeId,
    pub label: String,
}

impl AccordNode {
    /// Create an accord node with the namespaced id for `name`
    pub fn named(name: &str) -> Self {
        Self {
            id: NodeId::accord(name),
            label: name.to_string(),
        }
    }

    /// The accord name, taken from the id
    pub fn name(&self) -> &str {
        self.id.accord_name().unwrap_or(&self.label)
    }
}

/// Node kind discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Perfume,
    Accord,
}

/// A node in the perfume network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NetworkNode {
    Perfume(PerfumeNode),
    Accord(AccordNode),
}

impl NetworkNode {
    pub fn id(&self) -> &NodeId {
        match self {
            Self::Perfume(p) => &p.id,
            Self::Accord(a) => &a.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Perfume(p) => &p.label,
            Self::Accord(a) => &a.label,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Perfume(_) => NodeKind::Perfume,
            Self::Accord(_) => NodeKind::Accord,
        }
    }

    pub fn as_perfume(&self) -> Option<&PerfumeNode> {
        match self {
            Self::Perfume(p) => Some(p),
            Self::Accord(_) => None,
        }
    }

    pub fn as_accord(&self) -> Option<&AccordNode> {
        match self {
            Self::Accord(a) => Some(a),
            Self::Perfume(_) => None,
        }
    }
}

impl From<PerfumeNode> for NetworkNode {
    fn from(p: PerfumeNode) -> Self {
        Self::Perfume(p)
    }
}

impl From<AccordNode> for NetworkNode {
    fn from(a: AccordNode) -> Self {
        Self::Accord(a)
    }
}
