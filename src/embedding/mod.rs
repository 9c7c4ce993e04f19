/// Embedding provider trait and supporting types
///
/// Provides a pluggable interface for text embedding generation. The only
/// provider shipped is the deterministic fingerprint, a hash-based stand-in
/// for a real embedding model.

pub mod fingerprint;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use fingerprint::{FingerprintEmbeddingProvider, cosine_similarity, generate, simple_hash};

/// Errors that can occur during embedding operations.
#[derive(Debug, Error, PartialEq)]
pub enum EmbeddingError {
    /// Two vectors compared by similarity have different dimensions
    #[error("Vector length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// A fixed-length embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector(Vec<f64>);

impl Vector {
    /// All-zero vector of the given dimension.
    pub fn zeros(dimension: usize) -> Self {
        Vector(vec![0.0; dimension])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Euclidean norm.
    pub fn magnitude(&self) -> f64 {
        self.0.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for Vector {
    fn from(values: Vec<f64>) -> Self {
        Vector(values)
    }
}

/// Build the text embedded for an issue: title, body, then label names.
///
/// Missing body contributes an empty segment, so the separators stay in place.
pub fn build_embedding_text(title: &str, body: Option<&str>, labels: &[String]) -> String {
    format!("{} {} {}", title, body.unwrap_or(""), labels.join(" "))
}

/// Core trait for embedding text into fixed-dimension float vectors.
///
/// Implementations must be Send + Sync to support use in async contexts
/// and across thread boundaries (e.g., Arc<dyn EmbeddingProvider>).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for the given text.
    async fn embed(&self, text: &str) -> Result<Vector, EmbeddingError>;

    /// Return the model name identifier.
    fn model_name(&self) -> &str;

    /// Return the dimension of the embedding vectors produced by this model.
    fn dimension(&self) -> usize;
}
