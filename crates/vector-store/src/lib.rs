//! # VANA Vector Store
//!
//! Semantic similarity search for the second search tier.
//!
//! ```text
//! VectorDocument[]
//!     │
//!     ├──> HashedEmbedder (signed feature hashing)
//!     │      └─> Array1<f32>[dimension]
//!     │
//!     └──> VectorIndex
//!            └─> brute-force cosine top-k
//! ```
//!
//! ## Example
//!
//! ```
//! use vana_vector_store::{VectorDocument, VectorStore};
//!
//! let mut store = VectorStore::new(128).unwrap();
//! store
//!     .add_documents(vec![VectorDocument::new("a", "async error handling")])
//!     .unwrap();
//! let hits = store.semantic_search_simple("async error handling", 3).unwrap();
//! assert_eq!(hits[0].id, "a");
//! ```

mod embeddings;
mod error;
mod index;
mod store;
mod types;

pub use embeddings::{HashedEmbedder, DEFAULT_DIMENSION};
pub use error::{Result, VectorStoreError};
pub use store::VectorStore;
pub use types::{VectorDocument, VectorHit};
