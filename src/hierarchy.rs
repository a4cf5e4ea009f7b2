//! Taxonomy tree parsing and sample/hierarchy consistency validation.
//!
//! The tree is a flat `parent -> ordered child set` map. Both parent order
//! and per-parent child order are first-seen insertion orders from the
//! hierarchy file; they are identity for the dense parent index and for
//! every hierarchical one-hot, so the map types preserve them.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::constants::hierarchy::PATH_DELIMITER;
use crate::errors::PrepError;
use crate::table::Sample;
use crate::types::NodeName;

/// One sample path step that references an edge absent from the parsed tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathMismatch {
    /// Zero-based row position of the offending sample in the source table.
    pub sample_index: usize,
    /// Parent node named by the sample's path.
    pub parent: NodeName,
    /// Child node the hierarchy file never records under `parent`.
    pub child: NodeName,
}

impl fmt::Display for PathMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sample {}: '{}' is not a recorded child of '{}'",
            self.sample_index, self.child, self.parent
        )
    }
}

/// Parsed taxonomy tree: parent name -> ordered set of child names.
#[derive(Clone, Debug, Default)]
pub struct HierarchyTree {
    children: IndexMap<NodeName, IndexSet<NodeName>>,
}

impl HierarchyTree {
    /// Parse the hierarchy definition file at `path`.
    ///
    /// One taxonomy path per line, nodes separated by `" > "`, lowercased.
    /// Every adjacent pair records the right node as a child of the left;
    /// a root node only becomes a key through its parent position.
    pub fn parse(path: impl AsRef<Path>) -> Result<Self, PrepError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), path)
    }

    /// Parse hierarchy lines from any buffered reader.
    ///
    /// `origin` is used only for error reporting.
    pub fn from_reader(reader: impl BufRead, origin: &Path) -> Result<Self, PrepError> {
        let mut children: IndexMap<NodeName, IndexSet<NodeName>> = IndexMap::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            let malformed = || PrepError::MalformedHierarchy {
                path: origin.to_path_buf(),
                line: index + 1,
            };
            if trimmed.is_empty() {
                return Err(malformed());
            }
            let nodes: Vec<NodeName> = trimmed
                .to_lowercase()
                .split(PATH_DELIMITER)
                .map(|node| node.trim().to_string())
                .collect();
            if nodes.len() < 2 {
                return Err(malformed());
            }
            for pair in nodes.windows(2) {
                children
                    .entry(pair[0].clone())
                    .or_default()
                    .insert(pair[1].clone());
            }
        }
        debug!(parents = children.len(), "parsed hierarchy tree");
        Ok(Self { children })
    }

    /// Ordered children recorded for `parent`, if any.
    pub fn children_of(&self, parent: &str) -> Option<&IndexSet<NodeName>> {
        self.children.get(parent)
    }

    /// Dense parent index (0..P-1, map insertion order) and children of
    /// `parent`, in one lookup.
    pub fn parent_entry(&self, parent: &str) -> Option<(usize, &IndexSet<NodeName>)> {
        self.children
            .get_full(parent)
            .map(|(index, _, children)| (index, children))
    }

    /// Dense index of `parent` in the stable parent ordering.
    pub fn parent_position(&self, parent: &str) -> Option<usize> {
        self.children.get_index_of(parent)
    }

    /// Parent names in stable index order.
    pub fn parents(&self) -> impl Iterator<Item = &NodeName> {
        self.children.keys()
    }

    /// Per-parent child orderings, suitable for the persisted manifest.
    pub fn child_orders(&self) -> Vec<Vec<NodeName>> {
        self.children
            .values()
            .map(|set| set.iter().cloned().collect())
            .collect()
    }

    /// Number of parent nodes.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` when no parent has been recorded.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Check every sample path against the parsed tree before any dataset
    /// construction starts.
    ///
    /// All mismatches are collected and reported in one batch error rather
    /// than aborting on the first occurrence.
    pub fn validate_samples(&self, samples: &[Sample]) -> Result<(), PrepError> {
        let mut mismatches = Vec::new();
        for sample in samples {
            for pair in sample.path.windows(2) {
                let known = self
                    .children_of(&pair[0])
                    .map(|children| children.contains(pair[1].as_str()))
                    .unwrap_or(false);
                if !known {
                    mismatches.push(PathMismatch {
                        sample_index: sample.row_index,
                        parent: pair[0].clone(),
                        child: pair[1].clone(),
                    });
                }
            }
        }
        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(PrepError::HierarchyMismatch { mismatches })
        }
    }
}
