//! Embedding provider abstraction.
//!
//! `EmbeddingProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities; clone them freely.
//! Calls are blocking; a query's encode step may suspend the calling thread.

pub mod providers;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    /// The provider could not be constructed or reached at startup.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available embedding backends.
#[derive(Debug, Clone)]
pub enum EmbeddingProvider {
    Hashing(providers::hashing::HashingEmbedder),
    #[cfg(feature = "embeddings-openai")]
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleEmbedder),
}

impl EmbeddingProvider {
    /// Encode a single text into a vector.
    pub fn encode(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        match self {
            EmbeddingProvider::Hashing(p) => Ok(p.encode(text)),
            #[cfg(feature = "embeddings-openai")]
            EmbeddingProvider::OpenAiCompatible(p) => p.encode(text),
        }
    }

    /// Encode many texts; the output is parallel to `texts`.
    pub fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        match self {
            EmbeddingProvider::Hashing(p) => Ok(texts.iter().map(|t| p.encode(t)).collect()),
            #[cfg(feature = "embeddings-openai")]
            EmbeddingProvider::OpenAiCompatible(p) => p.encode_batch(texts),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EmbeddingProvider::Hashing(_) => "hashing",
            #[cfg(feature = "embeddings-openai")]
            EmbeddingProvider::OpenAiCompatible(_) => "openai",
        }
    }
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in [-1, 1] where 1 means identical direction. Zero
/// vectors and mismatched dimensions score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
