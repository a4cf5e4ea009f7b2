use serde::{Deserialize, Serialize};

use crate::types::{OneHot, TokenizedText};

/// A collection of encoded examples held as parallel input/target lists.
///
/// This is the unit of splitting and persistence: the flat dataset is one
/// `ExampleSet`, and every per-parent hierarchical bucket is another.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct ExampleSet {
    /// Tokenized inputs, all padded/truncated to the same fixed length.
    pub inputs: Vec<TokenizedText>,
    /// One-hot targets, parallel to `inputs`.
    pub targets: Vec<OneHot>,
}

impl ExampleSet {
    /// Append one encoded example.
    pub fn push(&mut self, input: TokenizedText, target: OneHot) {
        self.inputs.push(input);
        self.targets.push(target);
    }

    /// Number of examples in the collection.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Returns `true` when the collection holds no examples.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Train/validation/test partition of one example collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct SplitSets {
    /// Training partition.
    pub train: ExampleSet,
    /// Validation partition.
    pub valid: ExampleSet,
    /// Test partition.
    pub test: ExampleSet,
}

impl SplitSets {
    /// Total example count across all three partitions.
    pub fn total_len(&self) -> usize {
        self.train.len() + self.valid.len() + self.test.len()
    }
}

/// Per-parent hierarchical split collection, ordered by parent index.
pub type HierarchicalSplits = Vec<SplitSets>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_inputs_and_targets_parallel() {
        let mut set = ExampleSet::default();
        set.push(vec![1, 2, 0], vec![1, 0]);
        set.push(vec![3, 4, 0], vec![0, 1]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.inputs.len(), set.targets.len());
    }

    #[test]
    fn total_len_sums_partitions() {
        let mut train = ExampleSet::default();
        train.push(vec![1], vec![1]);
        let splits = SplitSets {
            train,
            valid: ExampleSet::default(),
            test: ExampleSet::default(),
        };
        assert_eq!(splits.total_len(), 1);
        assert!(splits.valid.is_empty());
    }
}
