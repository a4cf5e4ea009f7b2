use crate::data::ExampleSet;
use crate::types::{OneHot, TokenizedText};

/// Per-parent collection of hierarchical examples, keyed by parent index.
///
/// One bucket exists per parent in the hierarchy's stable ordering; buckets
/// for parents no sample path passes through stay empty. There is no
/// deduplication: a sample contributes one example per (parent, depth) pair
/// on its path, so a depth-4 path lands in three buckets.
#[derive(Clone, Debug)]
pub struct HierarchyAccumulator {
    buckets: Vec<ExampleSet>,
}

impl HierarchyAccumulator {
    /// Create empty buckets for `parent_count` parents.
    pub fn new(parent_count: usize) -> Self {
        Self {
            buckets: vec![ExampleSet::default(); parent_count],
        }
    }

    /// Append one hierarchical example to the bucket at `parent_index`.
    ///
    /// `parent_index` must come from the same hierarchy the accumulator was
    /// sized for.
    pub fn add(&mut self, parent_index: usize, input: TokenizedText, target: OneHot) {
        self.buckets[parent_index].push(input, target);
    }

    /// Number of buckets (equals the hierarchy's parent count).
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` when the accumulator tracks no parents.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Bucket contents for `parent_index`.
    pub fn bucket(&self, parent_index: usize) -> &ExampleSet {
        &self.buckets[parent_index]
    }

    /// Consume the accumulator, yielding buckets in parent-index order.
    pub fn into_buckets(self) -> Vec<ExampleSet> {
        self.buckets
    }
}
