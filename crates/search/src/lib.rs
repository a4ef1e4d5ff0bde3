//! Query classification and tiered search coordination.
//!
//! A [`SearchCoordinator`] consults memory, then the vector store, then the web, in the order
//! chosen by the [`QueryClassifier`], stopping early once the results gathered so far are
//! sufficient for the query's type.

mod backends;
mod config;
mod coordinator;
mod error;
mod fusion;
mod query_classifier;

pub use backends::{
    Availability, BackendProbe, MemoryBackend, MemoryRecord, StaticWebSearch,
    UnconfiguredWebSearch, VectorBackend, VectorRecord, WebBackend,
};
pub use config::{CoordinatorConfig, DefaultRelevance, SufficiencyConfig};
pub use coordinator::SearchCoordinator;
pub use error::{Result, SearchError};
pub use fusion::TierFusion;
pub use query_classifier::QueryClassifier;

pub use vana_protocol::{
    CoordinatedSearchResponse, QueryClassification, QueryType, SearchErrorPayload, SearchResult,
    SearchSource, SearchStrategy,
};
