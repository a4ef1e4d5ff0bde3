use crate::error::{Result, SearchError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use vana_memory::{MemoryHit, MemoryStore};
use vana_vector_store::{VectorHit, VectorStore};

/// A memory-tier hit. `score` is optional; missing scores get the configured default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub content: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl MemoryRecord {
    pub fn new(content: impl Into<String>, score: Option<f64>) -> Self {
        Self {
            content: content.into(),
            score,
            id: None,
        }
    }
}

impl From<MemoryHit> for MemoryRecord {
    fn from(hit: MemoryHit) -> Self {
        Self {
            content: hit.content,
            score: Some(hit.score),
            id: Some(hit.id),
        }
    }
}

/// A vector-tier hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub content: String,
    #[serde(default)]
    pub similarity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl VectorRecord {
    pub fn new(content: impl Into<String>, similarity_score: Option<f64>) -> Self {
        Self {
            content: content.into(),
            similarity_score,
            id: None,
        }
    }
}

impl From<VectorHit> for VectorRecord {
    fn from(hit: VectorHit) -> Self {
        Self {
            content: hit.content,
            similarity_score: Some(hit.similarity_score),
            id: Some(hit.id),
        }
    }
}

/// Availability probe shared by the optional tiers.
pub trait BackendProbe: Send + Sync {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool {
        true
    }
}

#[async_trait]
pub trait MemoryBackend: BackendProbe {
    async fn search_memory(&self, query: &str, top_k: usize) -> Result<Vec<MemoryRecord>>;
}

#[async_trait]
pub trait VectorBackend: BackendProbe {
    async fn semantic_search_simple(&self, query: &str, top_k: usize)
        -> Result<Vec<VectorRecord>>;
}

/// Web search returns the raw (usually JSON) payload. It has no availability probe:
/// a failing call is a hard failure for the coordinator.
#[async_trait]
pub trait WebBackend: Send + Sync {
    async fn web_search(&self, query: &str, max_results: usize) -> Result<String>;
}

/// Outcome of acquiring an optional backend.
pub enum Availability<B: ?Sized> {
    Available(Arc<B>),
    Unavailable(String),
}

impl<B: ?Sized + BackendProbe> Availability<B> {
    /// Ask the backend whether it can serve queries.
    pub fn probe(handle: Arc<B>) -> Self {
        if handle.is_available() {
            Self::Available(handle)
        } else {
            Self::Unavailable(format!("{} reported itself unavailable", handle.name()))
        }
    }

    /// Probe the product of a fallible factory; construction errors become `Unavailable`.
    pub fn from_result<E: fmt::Display>(result: std::result::Result<Arc<B>, E>) -> Self {
        match result {
            Ok(handle) => Self::probe(handle),
            Err(err) => Self::Unavailable(err.to_string()),
        }
    }
}

impl<B: ?Sized> Availability<B> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable(reason) => Some(reason),
        }
    }

    pub fn into_handle(self) -> Option<Arc<B>> {
        match self {
            Self::Available(handle) => Some(handle),
            Self::Unavailable(_) => None,
        }
    }
}

impl<B: ?Sized> fmt::Debug for Availability<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(_) => f.write_str("Available"),
            Self::Unavailable(reason) => f.debug_tuple("Unavailable").field(reason).finish(),
        }
    }
}

impl BackendProbe for MemoryStore {
    fn name(&self) -> &str {
        "memory_store"
    }

    fn is_available(&self) -> bool {
        !self.is_empty()
    }
}

#[async_trait]
impl MemoryBackend for MemoryStore {
    async fn search_memory(&self, query: &str, top_k: usize) -> Result<Vec<MemoryRecord>> {
        Ok(self
            .search(query, top_k)
            .into_iter()
            .map(MemoryRecord::from)
            .collect())
    }
}

impl BackendProbe for VectorStore {
    fn name(&self) -> &str {
        "vector_store"
    }

    fn is_available(&self) -> bool {
        !self.is_empty()
    }
}

#[async_trait]
impl VectorBackend for VectorStore {
    async fn semantic_search_simple(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<VectorRecord>> {
        let hits = VectorStore::semantic_search_simple(self, query, top_k)?;
        Ok(hits.into_iter().map(VectorRecord::from).collect())
    }
}

/// Web backend that replays a fixed payload. Useful offline and in tests.
#[derive(Debug, Clone)]
pub struct StaticWebSearch {
    payload: String,
}

impl StaticWebSearch {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

#[async_trait]
impl WebBackend for StaticWebSearch {
    async fn web_search(&self, _query: &str, _max_results: usize) -> Result<String> {
        Ok(self.payload.clone())
    }
}

/// Web backend used when no provider is configured; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredWebSearch;

#[async_trait]
impl WebBackend for UnconfiguredWebSearch {
    async fn web_search(&self, _query: &str, _max_results: usize) -> Result<String> {
        Err(SearchError::Web("web search is not configured".to_string()))
    }
}
