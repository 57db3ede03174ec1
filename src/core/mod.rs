//! Core modules for threadsense

pub mod tree_builder;
pub mod providers;
pub mod lexicon;
pub mod propagation;
pub mod kmeans;
pub mod coalition;
pub mod onesidedness;
pub mod defection;
pub mod resilience;
pub mod reciprocity;
pub mod analyzer;
pub mod api;

pub use tree_builder::TreeBuilder;
pub use providers::{
    checked_embeddings, checked_sentiment, select_providers, Embedder, HashingEmbedder,
    PrecomputedSignals, SentimentScorer,
};
pub use lexicon::LexiconSentiment;
pub use propagation::SentimentPropagator;
pub use kmeans::{KMeans, KMeansFit};
pub use coalition::CoalitionEngine;
pub use onesidedness::OneSidednessEngine;
pub use defection::DefectionEngine;
pub use resilience::ResilienceEngine;
pub use reciprocity::ReciprocityEngine;
pub use analyzer::ThreadAnalyzer;
pub use api::{create_router, run_server};
