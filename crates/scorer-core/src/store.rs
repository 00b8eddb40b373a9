//! Label description store.
//!
//! Maps each label to its [`DescriptionSet`]. A label is present exactly
//! when it has a set, and every set holds at least its seed.

use std::collections::BTreeMap;

use scorer_embeddings::{Embedding, EmbeddingError, EmbeddingModel};
use serde::Serialize;
use tracing::{debug, warn};

use crate::description::DescriptionSet;
use crate::error::{Result, ScorerError};

/// Result of adding a description to a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub label: String,
    /// Whether the label was created by this update
    pub created: bool,
    /// Descriptions dropped to stay within the bound, oldest first
    pub evicted: Vec<String>,
    /// Description count after the update, seed included
    pub len: usize,
}

/// Label -> description set mapping.
#[derive(Debug, Clone, Default)]
pub struct LabelStore {
    sets: BTreeMap<String, DescriptionSet>,
}

impl LabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed `[label] + descriptions` for every label and install the sets.
    ///
    /// Existing sets for the given labels are replaced; other labels are
    /// kept. Nothing is installed unless every label embeds successfully.
    pub fn initialize<E: EmbeddingModel + ?Sized>(
        &mut self,
        label_to_descriptions: &BTreeMap<String, Vec<String>>,
        embedder: &E,
        max_len: usize,
    ) -> Result<()> {
        let mut built = Vec::with_capacity(label_to_descriptions.len());

        for (label, descriptions) in label_to_descriptions {
            let mut texts = Vec::with_capacity(descriptions.len() + 1);
            texts.push(label.clone());
            texts.extend(descriptions.iter().cloned());

            let vectors = embed_rows(embedder, &texts)?;
            let mut set = DescriptionSet::from_parts(label, texts, vectors)?;

            let dropped = set.truncate_to(max_len);
            if !dropped.is_empty() {
                warn!(
                    label = %label,
                    dropped = dropped.len(),
                    max_len,
                    "Initial descriptions exceed bound, keeping newest"
                );
            }

            debug!(label = %label, len = set.len(), "Initialized label");
            built.push((label.clone(), set));
        }

        self.sets.extend(built);
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&DescriptionSet> {
        self.sets.get(label)
    }

    /// Like [`get`](Self::get) but reports a missing label as an error.
    pub fn describe(&self, label: &str) -> Result<&DescriptionSet> {
        self.sets
            .get(label)
            .ok_or_else(|| ScorerError::UnknownLabel(label.to_string()))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.sets.contains_key(label)
    }

    /// Labels in ascending order.
    pub fn labels(&self) -> Vec<String> {
        self.sets.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DescriptionSet)> {
        self.sets.iter().map(|(label, set)| (label.as_str(), set))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Install a prebuilt set under its own label.
    pub fn insert(&mut self, set: DescriptionSet) -> Result<()> {
        set.check_invariant()?;
        self.sets.insert(set.label().to_string(), set);
        Ok(())
    }

    /// Create `label` from its seed vector unless it already exists.
    ///
    /// Returns whether the label was created.
    pub fn create(&mut self, label: &str, seed: Embedding) -> bool {
        if self.sets.contains_key(label) {
            return false;
        }
        self.sets
            .insert(label.to_string(), DescriptionSet::seeded(label, seed));
        true
    }

    /// Append an embedded description to `label`, creating the label from
    /// `seed` if it does not exist yet.
    ///
    /// Vectors are computed by the caller so this never fails halfway.
    pub fn append(
        &mut self,
        label: &str,
        seed: Option<Embedding>,
        description: &str,
        vector: Embedding,
        max_len: usize,
    ) -> Result<UpdateOutcome> {
        let created = match seed {
            Some(seed) => self.create(label, seed),
            None => false,
        };

        let set = self
            .sets
            .get_mut(label)
            .ok_or_else(|| ScorerError::UnknownLabel(label.to_string()))?;

        let evicted = set.push(description, vector, max_len);
        set.check_invariant()?;

        Ok(UpdateOutcome {
            label: label.to_string(),
            created,
            evicted,
            len: set.len(),
        })
    }

    /// Move every set from `other` into this store, replacing same-named
    /// labels.
    pub(crate) fn merge(&mut self, other: LabelStore) {
        self.sets.extend(other.sets);
    }
}

/// Embed `texts`, checking that the model returned one row per text.
pub(crate) fn embed_rows<E: EmbeddingModel + ?Sized>(
    embedder: &E,
    texts: &[String],
) -> Result<Vec<Embedding>> {
    let vectors = embedder.embed_texts(texts)?;
    if vectors.len() != texts.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: texts.len(),
            actual: vectors.len(),
        }
        .into());
    }
    Ok(vectors)
}
