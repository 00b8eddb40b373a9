//! The label scorer.
//!
//! Owns the embedder, the label store and the scoring configuration.
//! Embedding runs outside the store lock; the store is only locked to read
//! or apply already-computed vectors, so a failed embedding never leaves a
//! label half-updated.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use scorer_embeddings::{Embedding, EmbeddingError, EmbeddingModel};
use tracing::{debug, info, warn};

use crate::config::ScorerConfig;
use crate::description::DescriptionSet;
use crate::error::{Result, ScorerError};
use crate::similarity::{rank, LabelScore};
use crate::snapshot::ScorerSnapshot;
use crate::store::{embed_rows, LabelStore, UpdateOutcome};

/// Assigns free text to the closest of a set of labels.
pub struct Scorer<E: EmbeddingModel> {
    embedder: Arc<E>,
    store: RwLock<LabelStore>,
    label_to_descriptions: BTreeMap<String, Vec<String>>,
    config: ScorerConfig,
}

impl<E: EmbeddingModel> Scorer<E> {
    /// Create a scorer for the given seed labels.
    ///
    /// No text is embedded yet; call
    /// [`initialize_vectors`](Self::initialize_vectors) before predicting, or
    /// use [`build`](Self::build).
    pub fn new(
        label_to_descriptions: BTreeMap<String, Vec<String>>,
        embedder: Arc<E>,
        config: ScorerConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            embedder,
            store: RwLock::new(LabelStore::new()),
            label_to_descriptions,
            config,
        })
    }

    /// Create a scorer and embed its seed labels.
    pub fn build(
        label_to_descriptions: BTreeMap<String, Vec<String>>,
        embedder: Arc<E>,
        config: ScorerConfig,
    ) -> Result<Self> {
        let scorer = Self::new(label_to_descriptions, embedder, config)?;
        scorer.initialize_vectors()?;
        Ok(scorer)
    }

    /// Embed every seed label as `[label] + descriptions`.
    ///
    /// Replaces the sets of seed labels; labels added later through updates
    /// are left alone.
    pub fn initialize_vectors(&self) -> Result<()> {
        let mut fresh = LabelStore::new();
        fresh.initialize(
            &self.label_to_descriptions,
            self.embedder.as_ref(),
            self.config.max_description_length,
        )?;

        let count = fresh.len();
        self.write()?.merge(fresh);
        info!(labels = count, model = %self.config.model, "Label vectors initialized");
        Ok(())
    }

    /// Score `text` against every label, best first.
    pub fn predict(&self, text: &str) -> Result<Vec<LabelScore>> {
        let query = self.embedder.embed(text)?;
        let scores = rank(&query, &*self.read()?, self.config.k);

        if let Some(top) = scores.first() {
            debug!(label = %top.label, score = top.score, "Prediction");
        }
        Ok(scores)
    }

    /// The single best label for `text`, if any labels exist.
    pub fn best(&self, text: &str) -> Result<Option<LabelScore>> {
        Ok(self.predict(text)?.into_iter().next())
    }

    /// Add `description` as an example of `label`, creating the label on
    /// first use.
    ///
    /// When the label is at `max_description_length`, its oldest non-seed
    /// description is evicted first. On error the store is unchanged.
    pub fn update_descriptions(&self, label: &str, description: &str) -> Result<UpdateOutcome> {
        let known = self.read()?.contains(label);

        let (mut seed, vector) = if known {
            (None, self.embedder.embed(description)?)
        } else {
            let rows =
                embed_rows(self.embedder.as_ref(), &[label.to_string(), description.to_string()])?;
            let [seed, vector] = <[Embedding; 2]>::try_from(rows).map_err(|rows| {
                EmbeddingError::DimensionMismatch {
                    expected: 2,
                    actual: rows.len(),
                }
            })?;
            (Some(seed), vector)
        };

        let outcome = loop {
            let mut store = self.write()?;
            // A restore may have dropped the label while embedding
            if seed.is_none() && !store.contains(label) {
                drop(store);
                seed = Some(self.embedder.embed(label)?);
                continue;
            }
            break store.append(
                label,
                seed,
                description,
                vector,
                self.config.max_description_length,
            )?;
        };

        if outcome.created {
            info!(label = %label, "Label created");
        }
        for evicted in &outcome.evicted {
            debug!(label = %label, description = %evicted, "Evicted oldest description");
        }
        debug!(label = %label, len = outcome.len, "Description added");
        Ok(outcome)
    }

    /// Create `label` with no descriptions beyond its own name.
    ///
    /// Returns false if the label already exists.
    pub fn create_label(&self, label: &str) -> Result<bool> {
        if self.read()?.contains(label) {
            debug!(label = %label, "Label already exists");
            return Ok(false);
        }

        let seed = self.embedder.embed(label)?;
        let created = self.write()?.create(label, seed);
        if created {
            info!(label = %label, "Label created");
        }
        Ok(created)
    }

    /// Copy of a label's description set.
    pub fn descriptions(&self, label: &str) -> Result<DescriptionSet> {
        self.read()?.describe(label).cloned()
    }

    /// All labels, ascending.
    pub fn labels(&self) -> Result<Vec<String>> {
        Ok(self.read()?.labels())
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    pub fn embedder(&self) -> &Arc<E> {
        &self.embedder
    }

    /// Capture the store for persistence.
    pub fn snapshot(&self) -> Result<ScorerSnapshot> {
        Ok(ScorerSnapshot::from_store(&self.config.model, &*self.read()?))
    }

    /// Replace the store with a snapshot's contents.
    ///
    /// Returns false, leaving the store alone, if the snapshot was made with
    /// another model or lacks any seed label. Malformed label entries are an
    /// error.
    pub fn restore(&self, snapshot: &ScorerSnapshot) -> Result<bool> {
        if snapshot.model != self.config.model {
            warn!(
                snapshot_model = %snapshot.model,
                model = %self.config.model,
                "Snapshot made with a different model, ignoring"
            );
            return Ok(false);
        }

        if let Some(missing) = self
            .label_to_descriptions
            .keys()
            .find(|label| !snapshot.descriptions.contains_key(*label))
        {
            warn!(label = %missing, "Snapshot outdated, seed label missing");
            return Ok(false);
        }

        let restored = snapshot.to_store(self.config.max_description_length)?;
        let count = restored.len();
        *self.write()? = restored;
        info!(labels = count, saved_at = %snapshot.saved_at, "Snapshot restored");
        Ok(true)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LabelStore>> {
        self.store
            .read()
            .map_err(|e| ScorerError::Lock(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LabelStore>> {
        self.store
            .write()
            .map_err(|e| ScorerError::Lock(format!("Failed to acquire write lock: {}", e)))
    }
}
