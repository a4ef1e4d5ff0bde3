use crate::embeddings::HashedEmbedder;
use crate::error::{Result, VectorStoreError};
use crate::index::VectorIndex;
use crate::types::{VectorDocument, VectorHit};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CorpusFile {
    #[serde(default)]
    schema_version: Option<u32>,
    documents: Vec<VectorDocument>,
}

pub struct VectorStore {
    documents: Vec<VectorDocument>,
    positions: HashMap<String, usize>,
    index: VectorIndex,
    embedder: HashedEmbedder,
}

impl VectorStore {
    pub fn new(dimension: usize) -> Result<Self> {
        let embedder = HashedEmbedder::new(dimension)?;
        Ok(Self {
            documents: Vec::new(),
            positions: HashMap::new(),
            index: VectorIndex::new(dimension),
            embedder,
        })
    }

    /// Load a `{"schema_version": 1, "documents": [...]}` corpus and embed it.
    pub async fn load(path: impl AsRef<Path>, dimension: usize) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading vector corpus from {}", path.display());
        let bytes = tokio::fs::read(path).await?;
        let corpus: CorpusFile = serde_json::from_slice(&bytes)?;
        if let Some(version) = corpus.schema_version {
            if version != 1 {
                return Err(VectorStoreError::UnsupportedSchema(version));
            }
        }

        let mut store = Self::new(dimension)?;
        store.add_documents(corpus.documents)?;
        Ok(store)
    }

    /// Embed and index documents. A document whose id already exists replaces the old one.
    pub fn add_documents(&mut self, documents: Vec<VectorDocument>) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let vectors = self
            .embedder
            .embed_batch(documents.iter().map(|d| d.content.as_str()));

        for (document, vector) in documents.into_iter().zip(vectors) {
            let position = match self.positions.get(&document.id) {
                Some(&existing) => {
                    self.documents[existing] = document;
                    existing
                }
                None => {
                    let next = self.documents.len();
                    self.positions.insert(document.id.clone(), next);
                    self.documents.push(document);
                    next
                }
            };
            self.index.add(position, vector)?;
        }

        log::debug!("Vector store now holds {} documents", self.documents.len());
        Ok(())
    }

    /// Cosine search returning hits with similarity in `(0, 1]`.
    pub fn semantic_search_simple(&self, query: &str, top_k: usize) -> Result<Vec<VectorHit>> {
        if top_k == 0 || self.documents.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query);
        let neighbors = self.index.search(query_vector.view(), top_k)?;

        let hits: Vec<VectorHit> = neighbors
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .filter_map(|(position, score)| {
                self.documents.get(position).map(|doc| VectorHit {
                    id: doc.id.clone(),
                    content: doc.content.clone(),
                    similarity_score: f64::from(score.min(1.0)),
                })
            })
            .collect();

        log::debug!("Semantic search for '{}': {} hits", query, hits.len());
        Ok(hits)
    }

    pub fn get(&self, id: &str) -> Option<&VectorDocument> {
        self.positions.get(id).and_then(|&pos| self.documents.get(pos))
    }

    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> VectorStore {
        let mut store = VectorStore::new(128).unwrap();
        store
            .add_documents(vec![
                VectorDocument::new("k8s", "kubernetes rollout strategy for deployments"),
                VectorDocument::new("sort", "quicksort partitions an array around a pivot"),
            ])
            .unwrap();
        store
    }

    #[test]
    fn exact_text_scores_highest() {
        let hits = store()
            .semantic_search_simple("quicksort partitions an array around a pivot", 2)
            .unwrap();
        assert_eq!(hits[0].id, "sort");
        assert!((hits[0].similarity_score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn readding_an_id_replaces_content() {
        let mut store = store();
        store
            .add_documents(vec![VectorDocument::new("k8s", "helm charts")])
            .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("k8s").unwrap().content, "helm charts");
    }

    #[test]
    fn zero_top_k_returns_nothing() {
        assert!(store().semantic_search_simple("pivot", 0).unwrap().is_empty());
    }

    #[test]
    fn similarity_scores_stay_in_unit_range() {
        let hits = store().semantic_search_simple("array pivot rollout", 5).unwrap();
        for hit in hits {
            assert!(hit.similarity_score > 0.0 && hit.similarity_score <= 1.0);
        }
    }
}
