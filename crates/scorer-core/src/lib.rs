//! # scorer-core
//!
//! Semantic label scoring for light personal classification.
//!
//! Each label is described by its own name plus a bounded list of example
//! phrases. Free text is scored against a label by averaging the `k` best
//! cosine similarities between the text's embedding and the label's
//! description embeddings.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! use scorer_core::{Scorer, ScorerConfig};
//! use scorer_embeddings::CandleEmbedder;
//!
//! let labels = BTreeMap::from([
//!     ("Work".to_string(), vec!["coding".to_string(), "meeting".to_string()]),
//!     ("Sleep".to_string(), vec!["nap".to_string(), "bedtime".to_string()]),
//! ]);
//! let embedder = Arc::new(CandleEmbedder::load_default()?);
//! let scorer = Scorer::build(labels, embedder, ScorerConfig::default())?;
//!
//! let ranked = scorer.predict("writing code")?;
//! scorer.update_descriptions("Work", "writing code")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod description;
pub mod error;
pub mod scorer;
pub mod similarity;
pub mod snapshot;
pub mod store;

pub use config::{LabelSeed, ScorerConfig, Settings};
pub use description::DescriptionSet;
pub use error::{Result, ScorerError};
pub use scorer::Scorer;
pub use similarity::{rank, score_set, top_k_mean, LabelScore};
pub use snapshot::ScorerSnapshot;
pub use store::{LabelStore, UpdateOutcome};
