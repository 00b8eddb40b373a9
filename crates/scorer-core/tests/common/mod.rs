//! Shared test helpers.

#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use scorer_embeddings::{Embedding, EmbeddingError, EmbeddingModel, ModelInfo};

pub const DIM: usize = 4;

/// Deterministic embedder backed by a lookup table.
///
/// Known texts map to fixed vectors; anything else gets a vector derived
/// from a hash of the text. Empty text and texts registered with
/// [`fail_on`](Self::fail_on) are rejected.
pub struct MockEmbedder {
    info: ModelInfo,
    table: HashMap<String, Vec<f32>>,
    failing: HashSet<String>,
    calls: AtomicUsize,
    hooks: HashMap<String, Box<dyn Fn() + Send + Sync>>,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            info: ModelInfo {
                name: "mock".to_string(),
                dimension: DIM,
                max_sequence_length: 128,
            },
            table: HashMap::new(),
            failing: HashSet::new(),
            calls: AtomicUsize::new(0),
            hooks: HashMap::new(),
        }
    }

    /// Embedder knowing the Work/Sleep vocabulary used across tests.
    pub fn activities() -> Self {
        Self::new()
            .with("Work", &[0.8, 0.2, 0.1, 0.0])
            .with("coding", &[0.9, 0.0, 0.1, 0.1])
            .with("meeting", &[0.7, 0.1, 0.3, 0.0])
            .with("writing code", &[0.95, 0.05, 0.1, 0.0])
            .with("Sleep", &[0.1, 0.9, 0.1, 0.0])
            .with("nap", &[0.0, 0.95, 0.1, 0.1])
            .with("bedtime", &[0.1, 0.8, 0.2, 0.0])
            .with("taking a nap", &[0.05, 0.9, 0.0, 0.1])
    }

    pub fn with(mut self, text: &str, values: &[f32]) -> Self {
        self.table.insert(text.to_string(), values.to_vec());
        self
    }

    pub fn fail_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    /// Run `hook` every time `text` is embedded, before returning its vector.
    pub fn on_embed(mut self, text: &str, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.insert(text.to_string(), Box::new(hook));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hashed(text: &str) -> Vec<f32> {
        (0..DIM)
            .map(|i| {
                let mut hasher = DefaultHasher::new();
                (text, i).hash(&mut hasher);
                (hasher.finish() % 2000) as f32 / 1000.0 - 1.0
            })
            .collect()
    }
}

impl EmbeddingModel for MockEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("empty text".to_string()));
        }
        if self.failing.contains(text) {
            return Err(EmbeddingError::InvalidInput(format!("cannot embed {}", text)));
        }
        if let Some(hook) = self.hooks.get(text) {
            hook();
        }
        let values = self
            .table
            .get(text)
            .cloned()
            .unwrap_or_else(|| Self::hashed(text));
        Ok(Embedding::new(values))
    }
}

pub fn mapping(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(label, descs)| {
            (
                label.to_string(),
                descs.iter().map(|d| d.to_string()).collect(),
            )
        })
        .collect()
}

/// Mean of the `k` largest values, computed independently of the crate.
pub fn expected_top_k(mut sims: Vec<f32>, k: usize) -> f32 {
    sims.sort_by(|a, b| b.partial_cmp(a).unwrap());
    let k = k.min(sims.len());
    sims[..k].iter().sum::<f32>() / k as f32
}
