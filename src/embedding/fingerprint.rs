/// Deterministic text fingerprints
///
/// Maps text to a 1536-dimensional unit vector by hashing each whitespace
/// token into ten slots. This is not a language model: similar vectors mean
/// shared tokens, nothing more. The hash recurrence is the classic
/// `h = h * 31 + c` over UTF-16 code units with 32-bit wraparound, so a
/// given text always produces the same fingerprint on every platform.

use async_trait::async_trait;

use super::{EmbeddingError, EmbeddingProvider, Vector};

/// Length of every fingerprint vector.
pub const DIMENSION: usize = 1536;

/// Slots written per token.
const SLOTS_PER_TOKEN: u64 = 10;

/// Per-slot amplitude before normalization.
const AMPLITUDE: f64 = 0.1;

/// 32-bit rolling hash of a token, returned as its absolute value.
///
/// `i32::MIN` maps to 2^31, which is why the result is `u32`.
pub fn simple_hash(token: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in token.encode_utf16() {
        hash = (hash << 5).wrapping_sub(hash).wrapping_add(unit as i32);
    }
    hash.unsigned_abs()
}

/// Generate the fingerprint vector for `text`.
///
/// Later writes to a slot overwrite earlier ones. Empty text (or text made
/// only of whitespace) yields the zero vector, which is returned as-is.
pub fn generate(text: &str) -> Vector {
    let lowered = text.to_lowercase();
    let mut values = vec![0.0_f64; DIMENSION];

    for (index, token) in lowered.split_whitespace().enumerate() {
        let hash = simple_hash(token) as u64;
        for i in 0..SLOTS_PER_TOKEN {
            let pos = ((hash + i * index as u64) % DIMENSION as u64) as usize;
            values[pos] = ((hash + i) as f64).sin() * AMPLITUDE;
        }
    }

    let magnitude = values.iter().map(|v| v * v).sum::<f64>().sqrt();
    if magnitude > 0.0 {
        for v in values.iter_mut() {
            *v /= magnitude;
        }
    }
    Vector::from(values)
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &Vector, b: &Vector) -> Result<f64, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0;
    let mut mag_a = 0.0;
    let mut mag_b = 0.0;
    for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    let mag_a = mag_a.sqrt();
    let mag_b = mag_b.sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (mag_a * mag_b))
}

/// Embedding provider backed by [`generate`].
///
/// Never fails and needs no model weights, which makes it the default for
/// ingestion and for tests.
pub struct FingerprintEmbeddingProvider {
    name: String,
}

impl FingerprintEmbeddingProvider {
    pub fn new() -> Self {
        FingerprintEmbeddingProvider {
            name: "fingerprint-v1".to_string(),
        }
    }
}

impl Default for FingerprintEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for FingerprintEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vector, EmbeddingError> {
        Ok(generate(text))
    }

    fn model_name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }
}
