use crate::error::{Result, VectorStoreError};
use ndarray::{Array1, ArrayView1};
use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_DIMENSION: usize = 256;

/// Deterministic bag-of-words embedder using signed feature hashing.
///
/// Every lower-cased word is hashed into one of `dimension` buckets; the top hash bit picks
/// the sign so unrelated words tend to cancel instead of piling up. Vectors are L2-normalized.
#[derive(Debug, Clone)]
pub struct HashedEmbedder {
    dimension: usize,
}

impl HashedEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(VectorStoreError::InvalidConfig(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn embed(&self, text: &str) -> Array1<f32> {
        let mut vec = Array1::<f32>::zeros(self.dimension);
        for word in text.unicode_words() {
            let hash = fnv1a_64(word.to_lowercase().as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
            vec[bucket] += sign;
        }
        normalize(&mut vec);
        vec
    }

    pub fn embed_batch<'a, I>(&self, texts: I) -> Vec<Array1<f32>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        texts.into_iter().map(|text| self.embed(text)).collect()
    }

    #[must_use]
    pub fn cosine_similarity(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let norm_a = a.dot(&a).sqrt();
        let norm_b = b.dot(&b).sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        a.dot(&b) / (norm_a * norm_b)
    }
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
        }
    }
}

fn normalize(vec: &mut Array1<f32>) {
    let norm = vec.dot(&*vec).sqrt();
    if norm > 0.0 {
        vec.mapv_inplace(|v| v / norm);
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
