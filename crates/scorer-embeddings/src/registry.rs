//! Process-wide embedder registry.
//!
//! Loading a model is expensive, so callers construct one registry at startup
//! and share it. Each model identifier is loaded at most once; later lookups
//! return the same `Arc`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::cache::ModelCache;
use crate::candle::CandleEmbedder;
use crate::error::EmbeddingError;
use crate::model::EmbeddingModel;

type Loader<E> = Box<dyn Fn(&str) -> Result<E, EmbeddingError> + Send + Sync>;

/// Lazily-populated cache of embedders keyed by model identifier.
pub struct EmbedderRegistry<E: EmbeddingModel> {
    loader: Loader<E>,
    models: Mutex<HashMap<String, Arc<E>>>,
}

impl<E: EmbeddingModel> EmbedderRegistry<E> {
    /// Create a registry that builds models with `loader`.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn(&str) -> Result<E, EmbeddingError> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            models: Mutex::new(HashMap::new()),
        }
    }

    /// Return the embedder for `model_id`, loading it on first use.
    ///
    /// The lock is held across the load so concurrent callers never load the
    /// same model twice. Failed loads are not cached.
    pub fn get_or_load(&self, model_id: &str) -> Result<Arc<E>, EmbeddingError> {
        let mut models = self
            .models
            .lock()
            .map_err(|e| EmbeddingError::Cache(format!("Registry lock error: {}", e)))?;

        if let Some(model) = models.get(model_id) {
            debug!(model = model_id, "Embedder already loaded");
            return Ok(Arc::clone(model));
        }

        info!(model = model_id, "Loading embedder");
        let model = Arc::new((self.loader)(model_id)?);
        models.insert(model_id.to_string(), Arc::clone(&model));
        Ok(model)
    }

    /// Identifiers of the models loaded so far, sorted.
    pub fn loaded(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .models
            .lock()
            .map(|models| models.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }
}

impl EmbedderRegistry<CandleEmbedder> {
    /// Registry of Candle embedders cached under `cache_dir` (platform
    /// cache directory when `None`).
    pub fn candle(cache_dir: Option<PathBuf>) -> Self {
        Self::new(move |model_id| {
            let cache = ModelCache::for_model(model_id, cache_dir.clone());
            CandleEmbedder::load(&cache)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Embedding, ModelInfo};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        info: ModelInfo,
    }

    impl EmbeddingModel for Fixed {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
            Ok(Embedding::new(vec![1.0, 0.0]))
        }
    }

    fn counting_registry(loads: Arc<AtomicUsize>) -> EmbedderRegistry<Fixed> {
        EmbedderRegistry::new(move |model_id| {
            if model_id == "broken" {
                return Err(EmbeddingError::ModelNotFound(model_id.to_string()));
            }
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(Fixed {
                info: ModelInfo {
                    name: model_id.to_string(),
                    dimension: 2,
                    max_sequence_length: 16,
                },
            })
        })
    }

    #[test]
    fn test_loads_once_per_model() {
        let loads = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(Arc::clone(&loads));

        let a = registry.get_or_load("mini").unwrap();
        let b = registry.get_or_load("mini").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        registry.get_or_load("other").unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert_eq!(registry.loaded(), vec!["mini".to_string(), "other".to_string()]);
    }

    #[test]
    fn test_failed_load_not_cached() {
        let loads = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(loads);

        assert!(registry.get_or_load("broken").is_err());
        assert!(registry.loaded().is_empty());
    }
}
