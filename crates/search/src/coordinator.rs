use crate::backends::{Availability, MemoryBackend, VectorBackend, WebBackend};
use crate::config::CoordinatorConfig;
use crate::error::{Result, SearchError};
use crate::fusion::TierFusion;
use crate::query_classifier::QueryClassifier;
use std::sync::Arc;
use std::time::Instant;
use vana_protocol::{
    CoordinatedSearchResponse, QueryClassification, ResponseMetadata, SearchErrorPayload,
    SearchResult, SearchSource, SearchStrategy, SEARCH_HIERARCHY,
};

/// Tiered memory → vector → web search.
///
/// Tiers run strictly one after another in the classified priority order and stop as soon
/// as the accumulated results are sufficient. The coordinator holds no per-call state, so a
/// single instance can serve concurrent searches behind an `Arc`.
pub struct SearchCoordinator {
    memory: Option<Arc<dyn MemoryBackend>>,
    vector: Option<Arc<dyn VectorBackend>>,
    web: Arc<dyn WebBackend>,
    fusion: TierFusion,
    config: CoordinatorConfig,
}

impl SearchCoordinator {
    pub fn new(
        memory: Availability<dyn MemoryBackend>,
        vector: Availability<dyn VectorBackend>,
        web: Arc<dyn WebBackend>,
    ) -> Self {
        Self::with_config(memory, vector, web, CoordinatorConfig::default())
    }

    pub fn with_config(
        memory: Availability<dyn MemoryBackend>,
        vector: Availability<dyn VectorBackend>,
        web: Arc<dyn WebBackend>,
        config: CoordinatorConfig,
    ) -> Self {
        if let Some(reason) = memory.reason() {
            log::info!("Memory search unavailable, tier disabled: {reason}");
        }
        if let Some(reason) = vector.reason() {
            log::info!("Vector search unavailable, tier disabled: {reason}");
        }

        Self {
            memory: memory.into_handle(),
            vector: vector.into_handle(),
            web,
            fusion: TierFusion::from_config(&config),
            config,
        }
    }

    pub fn memory_available(&self) -> bool {
        self.memory.is_some()
    }

    pub fn vector_available(&self) -> bool {
        self.vector.is_some()
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    #[must_use]
    pub fn classify(&self, query: &str) -> QueryClassification {
        QueryClassifier::classify(query)
    }

    /// Run a coordinated search and return the response as a JSON string.
    ///
    /// Never fails. If the tiered search errors, one direct web search is attempted; if that
    /// fails too, the returned JSON carries `error` and `fallback_error` instead of results.
    pub async fn coordinated_search(
        &self,
        query: &str,
        max_results: usize,
        force_web: bool,
    ) -> String {
        let started = Instant::now();
        match self.search_from(query, max_results, force_web, started).await {
            Ok(response) => render_response(&response),
            Err(err) => {
                log::warn!("Coordinated search failed for '{query}', falling back to web: {err}");
                self.fallback_search(query, max_results, started, err).await
            }
        }
    }

    /// Structured variant of [`coordinated_search`](Self::coordinated_search) without the
    /// fallback path; errors propagate to the caller.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        force_web: bool,
    ) -> Result<CoordinatedSearchResponse> {
        self.search_from(query, max_results, force_web, Instant::now())
            .await
    }

    async fn search_from(
        &self,
        query: &str,
        max_results: usize,
        force_web: bool,
        started: Instant,
    ) -> Result<CoordinatedSearchResponse> {
        let classification = QueryClassifier::classify(query);
        log::debug!(
            "Query '{}' classified as {} (confidence {:.2}, priority {:?})",
            query,
            classification.kind,
            classification.confidence,
            classification.priority
        );

        if force_web || classification.requires_current {
            log::debug!("Direct web search (force_web={force_web})");
            let results = self.search_web(query, max_results).await?;
            return Ok(self.format_results(query, classification, results, started, None));
        }

        let mut results: Vec<SearchResult> = Vec::new();
        for &source in &classification.priority {
            match source {
                SearchSource::Memory => {
                    let Some(memory) = self.memory.as_deref() else {
                        continue;
                    };
                    results.extend(self.search_memory(memory, query, max_results).await);
                    if self.fusion.has_sufficient_results(&results, &classification) {
                        log::debug!("Memory results sufficient, skipping remaining tiers");
                        break;
                    }
                }
                SearchSource::Vector => {
                    let Some(vector) = self.vector.as_deref() else {
                        continue;
                    };
                    results.extend(self.search_vector(vector, query, max_results).await);
                    if self.fusion.has_sufficient_results(&results, &classification) {
                        log::debug!("Memory+vector results sufficient, skipping web");
                        break;
                    }
                }
                SearchSource::Web => {
                    results.extend(self.search_web(query, max_results).await?);
                    break;
                }
            }
        }

        Ok(self.format_results(query, classification, results, started, None))
    }

    async fn search_memory(
        &self,
        memory: &dyn MemoryBackend,
        query: &str,
        top_k: usize,
    ) -> Vec<SearchResult> {
        match memory.search_memory(query, top_k).await {
            Ok(records) => {
                log::debug!("Memory tier returned {} results", records.len());
                self.fusion.memory_results(records)
            }
            Err(err) => {
                log::warn!("Memory search failed, continuing without it: {err}");
                Vec::new()
            }
        }
    }

    async fn search_vector(
        &self,
        vector: &dyn VectorBackend,
        query: &str,
        top_k: usize,
    ) -> Vec<SearchResult> {
        match vector.semantic_search_simple(query, top_k).await {
            Ok(records) => {
                log::debug!("Vector tier returned {} results", records.len());
                self.fusion.vector_results(records)
            }
            Err(err) => {
                log::warn!("Vector search failed, continuing without it: {err}");
                Vec::new()
            }
        }
    }

    async fn search_web(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let payload = self.web.web_search(query, max_results).await?;
        let results = self.fusion.web_results(&payload);
        log::debug!("Web tier returned {} results", results.len());
        Ok(results)
    }

    async fn fallback_search(
        &self,
        query: &str,
        max_results: usize,
        started: Instant,
        error: SearchError,
    ) -> String {
        match self.search_web(query, max_results).await {
            Ok(results) => {
                let response = self.format_results(
                    query,
                    QueryClassifier::classify(query),
                    results,
                    started,
                    Some(error.to_string()),
                );
                render_response(&response)
            }
            Err(fallback_error) => {
                log::warn!("Fallback web search failed for '{query}': {fallback_error}");
                render_error(query, error.to_string(), Some(fallback_error.to_string()))
            }
        }
    }

    fn format_results(
        &self,
        query: &str,
        classification: QueryClassification,
        results: Vec<SearchResult>,
        started: Instant,
        fallback_reason: Option<String>,
    ) -> CoordinatedSearchResponse {
        let results = TierFusion::rank(results);
        let sources_used = TierFusion::sources_used(&results);

        CoordinatedSearchResponse {
            query: query.to_string(),
            search_strategy: SearchStrategy {
                classification,
                sources_used,
                total_results: results.len(),
                search_duration_seconds: started.elapsed().as_secs_f64(),
                fallback_reason,
            },
            results,
            metadata: ResponseMetadata {
                memory_available: self.memory_available(),
                vector_available: self.vector_available(),
                search_hierarchy: SEARCH_HIERARCHY.to_string(),
                timestamp: timestamp(),
            },
        }
    }
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn render_response(response: &CoordinatedSearchResponse) -> String {
    match serde_json::to_string(response) {
        Ok(json) => json,
        Err(err) => render_error(&response.query, format!("Serialization failed: {err}"), None),
    }
}

fn render_error(query: &str, error: String, fallback_error: Option<String>) -> String {
    let payload = SearchErrorPayload {
        query: query.to_string(),
        error,
        fallback_error,
        timestamp: timestamp(),
    };
    serde_json::to_string(&payload).unwrap_or_else(|_| {
        serde_json::json!({
            "query": payload.query,
            "error": payload.error,
            "timestamp": payload.timestamp,
        })
        .to_string()
    })
}
