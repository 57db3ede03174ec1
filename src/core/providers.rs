//! Capabilities the engines consume: embeddings and sentiment
//!
//! The engines never know how scores are produced. Anything that can map
//! text to a vector or to a compound score plugs in here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::core::lexicon::LexiconSentiment;
use crate::types::{Result, ThreadError};

/// Maps N texts to N fixed-length vectors, order preserved
pub trait Embedder: Send + Sync {
    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;

    /// Embed a batch of texts
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Maps one text to a compound sentiment in [-1, 1]
pub trait SentimentScorer: Send + Sync {
    fn sentiment(&self, text: &str) -> Result<f64>;
}

/// Score `text` and enforce the [-1, 1] contract
pub fn checked_sentiment(scorer: &dyn SentimentScorer, text: &str) -> Result<f64> {
    let score = scorer.sentiment(text)?;
    if !score.is_finite() {
        return Err(ThreadError::Provider(format!("non-finite sentiment {}", score)));
    }
    if !(-1.0..=1.0).contains(&score) {
        warn!(score, "sentiment outside [-1, 1], clamping");
        return Ok(score.clamp(-1.0, 1.0));
    }
    Ok(score)
}

/// Embed `texts` and enforce the order/length contract
pub fn checked_embeddings(embedder: &dyn Embedder, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let vectors = embedder.embed(texts)?;
    if vectors.len() != texts.len() {
        return Err(ThreadError::LengthMismatch {
            comments: texts.len(),
            embeddings: vectors.len(),
        });
    }
    Ok(vectors)
}

// =============================================================================
// HASHING EMBEDDER
// =============================================================================

/// Feature-hashing bag-of-words embedder
///
/// SHA-256 of each lowercased token picks a bucket and a sign, so vectors
/// are identical across platforms and releases. Output is L2-normalized.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl HashingEmbedder {
    /// Create with the given output dimension (at least 1)
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash_feature(&self, token: &str) -> (usize, f32) {
        let digest = Sha256::digest(token.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[0..8]);
        let hash = u64::from_le_bytes(bytes);

        let position = (hash % self.dimension as u64) as usize;
        let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
        (position, sign)
    }

    /// Embed one text
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimension];
        let lower = text.to_lowercase();
        for token in lower
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|t| !t.is_empty())
        {
            let (position, sign) = self.hash_feature(token);
            vec[position] += sign;
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 1e-10 {
            for x in vec.iter_mut() {
                *x /= norm;
            }
        }
        vec
    }
}

impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

// =============================================================================
// PRECOMPUTED SIGNALS
// =============================================================================

/// Sentiments and embeddings computed elsewhere, keyed by text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrecomputedSignals {
    #[serde(default)]
    pub sentiments: HashMap<String, f64>,
    #[serde(default)]
    pub embeddings: HashMap<String, Vec<f32>>,
}

impl PrecomputedSignals {
    /// Parse from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Add one sentiment
    pub fn with_sentiment(mut self, text: impl Into<String>, score: f64) -> Self {
        self.sentiments.insert(text.into(), score);
        self
    }

    /// Add one embedding
    pub fn with_embedding(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.embeddings.insert(text.into(), vector);
        self
    }
}

impl SentimentScorer for PrecomputedSignals {
    fn sentiment(&self, text: &str) -> Result<f64> {
        self.sentiments
            .get(text)
            .copied()
            .ok_or_else(|| ThreadError::Provider(format!("no sentiment for {:?}", text)))
    }
}

impl Embedder for PrecomputedSignals {
    fn dimension(&self) -> usize {
        self.embeddings.values().next().map(Vec::len).unwrap_or(0)
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|t| {
                self.embeddings
                    .get(t)
                    .cloned()
                    .ok_or_else(|| ThreadError::Provider(format!("no embedding for {:?}", t)))
            })
            .collect()
    }
}

/// Providers for one analysis
///
/// Precomputed sentiments and embeddings are used when present; each
/// missing half falls back to the lexicon scorer or the hashing embedder.
pub fn select_providers(
    signals: Option<PrecomputedSignals>,
) -> (Box<dyn Embedder>, Box<dyn SentimentScorer>) {
    let signals = signals.unwrap_or_default();
    let embedder: Box<dyn Embedder> = if signals.embeddings.is_empty() {
        Box::new(HashingEmbedder::default())
    } else {
        Box::new(PrecomputedSignals {
            sentiments: HashMap::new(),
            embeddings: signals.embeddings,
        })
    };
    let scorer: Box<dyn SentimentScorer> = if signals.sentiments.is_empty() {
        Box::new(LexiconSentiment::new())
    } else {
        Box::new(PrecomputedSignals {
            sentiments: signals.sentiments,
            embeddings: HashMap::new(),
        })
    };
    (embedder, scorer)
}

// =============================================================================
// TESTS
// =============================================================================
