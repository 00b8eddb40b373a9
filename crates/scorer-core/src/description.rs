//! Per-label description sets.
//!
//! A [`DescriptionSet`] keeps the example phrases for one label next to their
//! embeddings. Element `i` of `vectors` is always the embedding of element
//! `i` of `descriptions`, and element 0 is the label's own name (the seed).
//! Fields are private so the two sequences can only change together.

use scorer_embeddings::Embedding;

use crate::error::{Result, ScorerError};

/// Ordered descriptions of one label and their embeddings, kept in lock-step.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionSet {
    descriptions: Vec<String>,
    vectors: Vec<Embedding>,
}

impl DescriptionSet {
    /// New set holding only the seed: the label name and its embedding.
    pub fn seeded(label: impl Into<String>, vector: Embedding) -> Self {
        Self {
            descriptions: vec![label.into()],
            vectors: vec![vector],
        }
    }

    /// Rebuild a set from parallel sequences.
    ///
    /// Fails unless both sequences are non-empty, equally long, and start
    /// with `label`.
    pub fn from_parts(
        label: &str,
        descriptions: Vec<String>,
        vectors: Vec<Embedding>,
    ) -> Result<Self> {
        let violation = || ScorerError::InvariantViolation {
            label: label.to_string(),
            descriptions: descriptions.len(),
            vectors: vectors.len(),
        };
        if descriptions.is_empty() || descriptions.len() != vectors.len() {
            return Err(violation());
        }
        if descriptions[0] != label {
            return Err(violation());
        }
        Ok(Self {
            descriptions,
            vectors,
        })
    }

    /// The label this set belongs to.
    pub fn label(&self) -> &str {
        &self.descriptions[0]
    }

    pub fn descriptions(&self) -> &[String] {
        &self.descriptions
    }

    pub fn vectors(&self) -> &[Embedding] {
        &self.vectors
    }

    /// Number of descriptions, seed included.
    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }

    /// The seed entry (label name and its embedding).
    pub fn seed(&self) -> (&str, &Embedding) {
        (&self.descriptions[0], &self.vectors[0])
    }

    /// The most recently added entry.
    pub fn last(&self) -> Option<(&str, &Embedding)> {
        self.descriptions
            .last()
            .zip(self.vectors.last())
            .map(|(d, v)| (d.as_str(), v))
    }

    /// Append a description, evicting the oldest non-seed entries first so
    /// the set stays within `max_len`.
    ///
    /// Returns the evicted descriptions, oldest first.
    pub fn push(
        &mut self,
        description: impl Into<String>,
        vector: Embedding,
        max_len: usize,
    ) -> Vec<String> {
        let evicted = self.evict_while(|len| len >= max_len);
        self.descriptions.push(description.into());
        self.vectors.push(vector);
        evicted
    }

    /// Evict oldest non-seed entries until the set holds at most `max_len`.
    pub fn truncate_to(&mut self, max_len: usize) -> Vec<String> {
        self.evict_while(|len| len > max_len)
    }

    fn evict_while(&mut self, over: impl Fn(usize) -> bool) -> Vec<String> {
        let mut evicted = Vec::new();
        // Index 0 is the seed and never leaves
        while self.descriptions.len() > 1 && over(self.descriptions.len()) {
            evicted.push(self.descriptions.remove(1));
            self.vectors.remove(1);
        }
        evicted
    }

    /// Check that descriptions and vectors line up.
    pub fn check_invariant(&self) -> Result<()> {
        if self.descriptions.is_empty() || self.descriptions.len() != self.vectors.len() {
            return Err(ScorerError::InvariantViolation {
                label: self.descriptions.first().cloned().unwrap_or_default(),
                descriptions: self.descriptions.len(),
                vectors: self.vectors.len(),
            });
        }
        Ok(())
    }
}
