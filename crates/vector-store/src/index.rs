use crate::embeddings::HashedEmbedder;
use crate::error::{Result, VectorStoreError};
use ndarray::{Array1, ArrayView1};
use std::collections::HashMap;

/// Brute-force cosine index keyed by document position.
pub struct VectorIndex {
    dimension: usize,
    vectors: HashMap<usize, Array1<f32>>,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
        }
    }

    pub fn add(&mut self, id: usize, vector: Array1<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.vectors.insert(id, vector);
        Ok(())
    }

    /// Returns (id, score) sorted by score descending, ties by id ascending.
    pub fn search(&self, query: ArrayView1<'_, f32>, k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scores: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .map(|(id, vector)| (*id, HashedEmbedder::cosine_similarity(query, vector.view())))
            .collect();

        scores.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scores.truncate(k);

        Ok(scores)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
