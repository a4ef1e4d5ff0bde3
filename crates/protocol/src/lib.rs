use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable description of the tier order, echoed in every response.
pub const SEARCH_HIERARCHY: &str = "memory → vector → web";

/// Classification bucket assigned to a query. Exactly one per query.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    General,
    VanaSpecific,
    UserContext,
    CurrentInfo,
    Technical,
}

impl QueryType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::VanaSpecific => "vana_specific",
            Self::UserContext => "user_context",
            Self::CurrentInfo => "current_info",
            Self::Technical => "technical",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "general" => Some(Self::General),
            "vana_specific" => Some(Self::VanaSpecific),
            "user_context" => Some(Self::UserContext),
            "current_info" => Some(Self::CurrentInfo),
            "technical" => Some(Self::Technical),
            _ => None,
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three search tiers.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    Memory,
    Vector,
    Web,
}

impl SearchSource {
    /// Fixed tier rank used by fusion: memory outranks vector outranks web.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Memory => 1,
            Self::Vector => 2,
            Self::Web => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Vector => "vector",
            Self::Web => "web",
        }
    }

    /// Value written into [`SearchResult::result_type`] for hits from this tier.
    #[must_use]
    pub const fn result_type(self) -> &'static str {
        match self {
            Self::Memory => "memory_match",
            Self::Vector => "semantic_match",
            Self::Web => "web_result",
        }
    }
}

impl fmt::Display for SearchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing decision for a single query.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct QueryClassification {
    #[serde(rename = "type")]
    pub kind: QueryType,
    pub priority: Vec<SearchSource>,
    pub requires_current: bool,
    pub is_vana_specific: bool,
    pub is_user_context: bool,
    pub confidence: f64,
}

impl Default for QueryClassification {
    fn default() -> Self {
        Self {
            kind: QueryType::General,
            priority: vec![SearchSource::Memory, SearchSource::Vector, SearchSource::Web],
            requires_current: false,
            is_vana_specific: false,
            is_user_context: false,
            confidence: 0.7,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct SearchResult {
    pub source: SearchSource,
    pub priority: u8,
    pub relevance: f64,
    pub data: serde_json::Value,
    #[serde(rename = "type")]
    pub result_type: String,
}

impl SearchResult {
    /// Build a result for `source`, deriving its tier priority and type tag.
    #[must_use]
    pub fn new(source: SearchSource, relevance: f64, data: serde_json::Value) -> Self {
        Self {
            source,
            priority: source.priority(),
            relevance,
            data,
            result_type: source.result_type().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct SearchStrategy {
    pub classification: QueryClassification,
    pub sources_used: Vec<SearchSource>,
    pub total_results: usize,
    pub search_duration_seconds: f64,
    /// Set only when the results come from the last-resort web search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ResponseMetadata {
    pub memory_available: bool,
    pub vector_available: bool,
    pub search_hierarchy: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct CoordinatedSearchResponse {
    pub query: String,
    pub search_strategy: SearchStrategy,
    pub results: Vec<SearchResult>,
    pub metadata: ResponseMetadata,
}

/// Payload returned when both the coordinated search and its fallback fail.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct SearchErrorPayload {
    pub query: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_error: Option<String>,
    pub timestamp: String,
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

/// JSON schema describing the successful `coordinated_search` payload.
pub fn response_schema() -> Result<serde_json::Value> {
    let schema = schemars::schema_for!(CoordinatedSearchResponse);
    serde_json::to_value(schema).map_err(Into::into)
}
