//! Sample-table reading and the first-seen leaf vocabulary.

use std::path::Path;

use csv::ReaderBuilder;
use indexmap::IndexSet;
use tracing::debug;

use crate::constants::hierarchy::PATH_DELIMITER;
use crate::constants::table::{COL_LEAF, COL_PATH, COL_TEXT};
use crate::errors::PrepError;
use crate::types::{LeafLabel, NodeName};

/// One usable input row: raw text plus its leaf label and taxonomy path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Zero-based row position in the source table, kept for diagnostics.
    pub row_index: usize,
    /// Raw sample text; normalization happens at encode time.
    pub text: String,
    /// Leaf-category label, as written in the table.
    pub leaf: LeafLabel,
    /// Lowercased taxonomy path from root to leaf.
    pub path: Vec<NodeName>,
}

/// Read the headerless sample table at `path`.
///
/// Column positions are fixed by convention (text, unused, leaf, path);
/// rows missing any required field are dropped, matching the original
/// table's incomplete-row filtering. The leaf-index column, when present,
/// is ignored; indices are re-derived from the leaf vocabulary so they
/// cannot drift from the persisted ordering.
pub fn read_samples(path: impl AsRef<Path>) -> Result<Vec<Sample>, PrepError> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut samples = Vec::new();
    let mut dropped = 0usize;
    for (row_index, record) in reader.records().enumerate() {
        let record = record?;
        let text = record.get(COL_TEXT).map(str::trim).unwrap_or_default();
        let leaf = record.get(COL_LEAF).map(str::trim).unwrap_or_default();
        let path_field = record.get(COL_PATH).map(str::trim).unwrap_or_default();
        if text.is_empty() || leaf.is_empty() || path_field.is_empty() {
            dropped += 1;
            continue;
        }
        let nodes: Vec<NodeName> = path_field
            .to_lowercase()
            .split(PATH_DELIMITER)
            .map(|node| node.trim().to_string())
            .collect();
        samples.push(Sample {
            row_index,
            text: text.to_string(),
            leaf: leaf.to_string(),
            path: nodes,
        });
    }

    if dropped > 0 {
        debug!(dropped, "skipping incomplete sample rows");
    }
    if samples.is_empty() {
        return Err(PrepError::EmptyDataset {
            path: path.to_path_buf(),
        });
    }
    Ok(samples)
}

/// Leaf-label vocabulary in first-seen row order.
///
/// The ordering assigns every distinct leaf its dense class index; it is
/// persisted in the manifest so cache readers never re-derive it from a
/// possibly reordered table.
#[derive(Clone, Debug, Default)]
pub struct LeafVocabulary {
    labels: IndexSet<LeafLabel>,
}

impl LeafVocabulary {
    /// Build the vocabulary from samples in table order.
    pub fn from_samples(samples: &[Sample]) -> Self {
        let mut labels = IndexSet::new();
        for sample in samples {
            labels.insert(sample.leaf.clone());
        }
        Self { labels }
    }

    /// Rebuild a vocabulary from a persisted label ordering.
    pub fn from_labels(labels: impl IntoIterator<Item = LeafLabel>) -> Self {
        Self {
            labels: labels.into_iter().collect(),
        }
    }

    /// Dense class index of `leaf`, if known.
    pub fn index_of(&self, leaf: &str) -> Option<usize> {
        self.labels.get_index_of(leaf)
    }

    /// Number of distinct leaf classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` when no leaf has been recorded.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in index order, suitable for the persisted manifest.
    pub fn to_vec(&self) -> Vec<LeafLabel> {
        self.labels.iter().cloned().collect()
    }
}
