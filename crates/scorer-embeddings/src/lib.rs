//! # scorer-embeddings
//!
//! Text-to-vector embedding for the label scorer.
//!
//! The scorer treats the embedding model as a black box: any
//! [`EmbeddingModel`] that maps strings to unit-normalized vectors will do.
//! This crate ships the default one, all-MiniLM-L6-v2 run locally through
//! Candle, plus a registry that loads each model once per process.
//!
//! ## Features
//! - Local inference via Candle (no Python, no API)
//! - all-MiniLM-L6-v2 model (384 dimensions) by default
//! - Automatic model file caching
//! - Batch embedding, one row per input text

pub mod cache;
pub mod candle;
pub mod error;
pub mod model;
pub mod registry;

pub use crate::candle::CandleEmbedder;
pub use cache::{
    get_or_download_model, model_repo, ModelCache, ModelPaths, DEFAULT_MODEL_REPO, MODEL_FILES,
};
pub use error::EmbeddingError;
pub use model::{Embedding, EmbeddingModel, ModelInfo};
pub use registry::EmbedderRegistry;
