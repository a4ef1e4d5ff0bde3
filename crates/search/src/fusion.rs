use crate::backends::{MemoryRecord, VectorRecord};
use crate::config::{CoordinatorConfig, DefaultRelevance, SufficiencyConfig};
use serde_json::{json, Value};
use vana_protocol::{QueryClassification, SearchResult, SearchSource};

/// Converts tier hits into [`SearchResult`]s, decides when enough has been gathered, and
/// produces the final ranking.
///
/// Ranking is tier-first: every memory result precedes every vector result, which precede
/// every web result, regardless of individual relevance. Within a tier, higher relevance
/// comes first and equal relevance keeps backend order.
#[derive(Debug, Clone)]
pub struct TierFusion {
    relevance: DefaultRelevance,
    sufficiency: SufficiencyConfig,
}

impl TierFusion {
    #[must_use]
    pub fn new(relevance: DefaultRelevance, sufficiency: SufficiencyConfig) -> Self {
        Self {
            relevance,
            sufficiency,
        }
    }

    #[must_use]
    pub fn from_config(config: &CoordinatorConfig) -> Self {
        Self::new(config.default_relevance.clone(), config.sufficiency.clone())
    }

    pub fn memory_results(&self, records: Vec<MemoryRecord>) -> Vec<SearchResult> {
        records
            .into_iter()
            .map(|record| {
                let relevance = self.relevance_or_default(record.score, SearchSource::Memory);
                let mut data = json!({ "content": record.content, "score": record.score });
                attach_id(&mut data, record.id);
                SearchResult::new(SearchSource::Memory, relevance, data)
            })
            .collect()
    }

    pub fn vector_results(&self, records: Vec<VectorRecord>) -> Vec<SearchResult> {
        records
            .into_iter()
            .map(|record| {
                let relevance =
                    self.relevance_or_default(record.similarity_score, SearchSource::Vector);
                let mut data = json!({
                    "content": record.content,
                    "similarity_score": record.similarity_score,
                });
                attach_id(&mut data, record.id);
                SearchResult::new(SearchSource::Vector, relevance, data)
            })
            .collect()
    }

    /// Interpret a web payload.
    ///
    /// A JSON array, or an object with a `results` array, yields one result per element.
    /// Any other JSON value or non-JSON text becomes a single result. Blank payloads yield none.
    pub fn web_results(&self, payload: &str) -> Vec<SearchResult> {
        if payload.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Value>(payload) {
            Ok(Value::Array(items)) => self.web_items(items),
            Ok(Value::Object(mut object)) => match object.remove("results") {
                Some(Value::Array(items)) => self.web_items(items),
                Some(other) => {
                    object.insert("results".to_string(), other);
                    vec![self.web_single(Value::Object(object))]
                }
                None => vec![self.web_single(Value::Object(object))],
            },
            Ok(other) => vec![self.web_single(other)],
            Err(_) => vec![self.web_single(Value::String(payload.to_string()))],
        }
    }

    fn web_items(&self, items: Vec<Value>) -> Vec<SearchResult> {
        items
            .into_iter()
            .map(|item| {
                let reported = item
                    .get("relevance")
                    .or_else(|| item.get("score"))
                    .and_then(Value::as_f64);
                let relevance = self.relevance_or_default(reported, SearchSource::Web);
                SearchResult::new(SearchSource::Web, relevance, item)
            })
            .collect()
    }

    fn web_single(&self, data: Value) -> SearchResult {
        SearchResult::new(SearchSource::Web, self.relevance.web, data)
    }

    fn relevance_or_default(&self, reported: Option<f64>, source: SearchSource) -> f64 {
        reported
            .filter(|score| score.is_finite())
            .map(|score| score.clamp(0.0, 1.0))
            .unwrap_or_else(|| self.relevance.for_source(source))
    }

    /// Whether the accumulated results make the remaining tiers unnecessary.
    #[must_use]
    pub fn has_sufficient_results(
        &self,
        results: &[SearchResult],
        classification: &QueryClassification,
    ) -> bool {
        if classification.is_vana_specific {
            return results.len() >= self.sufficiency.vana_specific_min_results;
        }
        if classification.is_user_context {
            return results.len() >= self.sufficiency.user_context_min_results;
        }
        let strong = results
            .iter()
            .filter(|r| r.relevance > self.sufficiency.high_relevance_threshold)
            .count();
        strong >= self.sufficiency.high_relevance_min_results
    }

    /// Stable sort by (priority ascending, relevance descending).
    #[must_use]
    pub fn rank(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
        results.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| b.relevance.total_cmp(&a.relevance))
        });
        results
    }

    /// Distinct sources in the order they first appear.
    #[must_use]
    pub fn sources_used(results: &[SearchResult]) -> Vec<SearchSource> {
        let mut sources = Vec::new();
        for result in results {
            if !sources.contains(&result.source) {
                sources.push(result.source);
            }
        }
        sources
    }
}

impl Default for TierFusion {
    fn default() -> Self {
        Self::from_config(&CoordinatorConfig::default())
    }
}

fn attach_id(data: &mut Value, id: Option<String>) {
    if let (Some(id), Value::Object(map)) = (id, data) {
        map.insert("id".to_string(), Value::String(id));
    }
}
