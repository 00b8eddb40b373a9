//! Snapshot persistence.
//!
//! Learned descriptions and their vectors are written to a JSON file so a
//! later process can skip re-embedding everything. A snapshot is tied to the
//! model that produced its vectors.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use scorer_embeddings::Embedding;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::description::DescriptionSet;
use crate::error::{Result, ScorerError};
use crate::store::LabelStore;

const UNIT_TOLERANCE: f32 = 1e-3;

/// Serializable copy of a label store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerSnapshot {
    /// Model identifier the vectors came from
    pub model: String,
    pub saved_at: DateTime<Utc>,
    pub descriptions: BTreeMap<String, Vec<String>>,
    pub vectors: BTreeMap<String, Vec<Vec<f32>>>,
}

impl ScorerSnapshot {
    /// Capture the current contents of `store`.
    pub fn from_store(model: &str, store: &LabelStore) -> Self {
        let mut descriptions = BTreeMap::new();
        let mut vectors = BTreeMap::new();
        for (label, set) in store.iter() {
            descriptions.insert(label.to_string(), set.descriptions().to_vec());
            vectors.insert(
                label.to_string(),
                set.vectors().iter().map(|v| v.values.clone()).collect(),
            );
        }
        Self {
            model: model.to_string(),
            saved_at: Utc::now(),
            descriptions,
            vectors,
        }
    }

    /// Labels present in the snapshot.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.descriptions.keys().map(String::as_str)
    }

    /// Rebuild a store, validating every label and applying the size bound.
    ///
    /// Every row must be a unit vector, and all rows must share one
    /// dimension.
    pub fn to_store(&self, max_len: usize) -> Result<LabelStore> {
        let mut store = LabelStore::new();
        let mut dimension = None;
        for (label, descriptions) in &self.descriptions {
            let rows = self.vectors.get(label).map(Vec::as_slice).unwrap_or_default();
            let mut vectors = Vec::with_capacity(rows.len());
            for (index, row) in rows.iter().enumerate() {
                let expected = *dimension.get_or_insert(row.len());
                let vector = Embedding::from_normalized(row.clone());
                let reason = if vector.dimension() != expected {
                    Some(format!(
                        "dimension {} differs from {}",
                        vector.dimension(),
                        expected
                    ))
                } else if !vector.is_unit(UNIT_TOLERANCE) {
                    Some("not unit length".to_string())
                } else {
                    None
                };
                if let Some(reason) = reason {
                    return Err(ScorerError::InvalidVector {
                        label: label.clone(),
                        index,
                        reason,
                    });
                }
                vectors.push(vector);
            }

            let mut set = DescriptionSet::from_parts(label, descriptions.clone(), vectors)?;
            set.truncate_to(max_len);
            store.insert(set)?;
        }
        Ok(store)
    }

    /// Write the snapshot as JSON, replacing any previous file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;

        debug!(path = ?path, labels = self.descriptions.len(), "Snapshot saved");
        Ok(())
    }

    /// Read a snapshot, or `None` if the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read(path)?;
        let snapshot: ScorerSnapshot = serde_json::from_slice(&data)?;
        debug!(path = ?path, labels = snapshot.descriptions.len(), "Snapshot loaded");
        Ok(Some(snapshot))
    }
}
