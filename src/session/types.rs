//! Wire types for the session endpoints

use crate::pipeline::{FilterState, RenderGraph};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Shown when the backend reports readiness without a message
pub const DEFAULT_TRIGGER_MESSAGE: &str =
    "You've explored enough to reveal your scent persona. Want to see it?";

/// `POST /session/start`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub member_id: Option<i64>,
    pub mbti: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: String,
}

/// `POST /session/{id}/activity`
///
/// Counters are cumulative for the session, never deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accord_selected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_changed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perfume_id: Option<i64>,
    pub selected_accords: Vec<String>,
    pub dwell_time: u64,
    pub interaction_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityResponse {
    #[serde(default)]
    pub logged: bool,
    #[serde(default)]
    pub card_trigger_ready: bool,
    #[serde(default)]
    pub trigger_message: Option<String>,
    #[serde(default)]
    pub daily_limit_reached: Option<bool>,
    #[serde(default)]
    pub daily_limit_remaining: Option<i64>,
}

/// Filter groups sent with the generation context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextFilters {
    pub brands: Vec<String>,
    pub seasons: Vec<String>,
    pub occasions: Vec<String>,
    pub genders: Vec<String>,
}

/// What the user is looking at when generation starts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationContext {
    pub selected_accords: Vec<String>,
    pub filters: ContextFilters,
    pub visible_perfume_ids: Vec<i64>,
}

impl GenerationContext {
    /// Snapshot of a filter state and the graph rendered from it
    pub fn capture(state: &FilterState, graph: &RenderGraph) -> Self {
        Self {
            selected_accords: state.selected_accords.iter().cloned().collect(),
            filters: ContextFilters {
                brands: state.selected_brands.iter().cloned().collect(),
                seasons: state.selected_seasons.iter().cloned().collect(),
                occasions: state.selected_occasions.iter().cloned().collect(),
                genders: state.selected_genders.iter().cloned().collect(),
            },
            visible_perfume_ids: graph.visible_perfume_ids(),
        }
    }
}

/// `POST /session/{id}/update-context`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateContextRequest {
    pub member_id: Option<i64>,
    pub mbti: Option<String>,
    pub selected_accords: Vec<String>,
    pub filters: ContextFilters,
    pub visible_perfume_ids: Vec<i64>,
}

impl UpdateContextRequest {
    pub fn new(member_id: Option<i64>, mbti: Option<String>, context: GenerationContext) -> Self {
        Self {
            member_id,
            mbti,
            selected_accords: context.selected_accords,
            filters: context.filters,
            visible_perfume_ids: context.visible_perfume_ids,
        }
    }
}

/// Card ids arrive as strings or numbers; both read as a string
fn flexible_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) if !s.is_empty() => Some(s),
        Some(RawId::Text(_)) | None => None,
        Some(RawId::Int(n)) => Some(n.to_string()),
        Some(RawId::Float(f)) => Some(f.to_string()),
    })
}

/// `POST /session/{id}/generate-card`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateCardResponse {
    #[serde(default)]
    pub card: Option<Value>,
    #[serde(default, deserialize_with = "flexible_id")]
    pub card_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub generation_method: Option<String>,
    #[serde(default)]
    pub generation_time_ms: Option<u64>,
}

/// A successfully generated scent card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedCard {
    pub card: Value,
    pub card_id: String,
    /// Session the backend moved us to, if any
    pub session_id: Option<String>,
    pub generation_method: Option<String>,
}

impl GenerateCardResponse {
    /// Check the response carries a card and an id
    ///
    /// The id may be at the top level or inside the card object.
    pub fn into_card(self) -> Result<GeneratedCard, String> {
        let card = match self.card {
            Some(Value::Null) | None => return Err("response has no card".to_string()),
            Some(card) => card,
        };
        let nested_id = match card.get("card_id") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let card_id = self
            .card_id
            .or(nested_id)
            .ok_or_else(|| "response has no card id".to_string())?;

        Ok(GeneratedCard {
            card,
            card_id,
            session_id: self.session_id.filter(|s| !s.is_empty()),
            generation_method: self.generation_method,
        })
    }
}

/// `POST /session/{id}/save-card?member_id=`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveCardRequest {
    pub card_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveCardResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "flexible_id")]
    pub card_id: Option<String>,
    #[serde(default)]
    pub new_session_id: Option<String>,
}
