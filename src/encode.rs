//! Per-sample encoding into flat and hierarchical training examples.

use crate::errors::PrepError;
use crate::hierarchy::{HierarchyTree, PathMismatch};
use crate::table::{LeafVocabulary, Sample};
use crate::text::{TextNormalizer, Tokenizer};
use crate::types::{OneHot, TokenizedText};

/// One sample encoded for both classification regimes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedSample {
    /// Tokenized input, padded/truncated to the run's fixed length.
    pub input: TokenizedText,
    /// One-hot over all leaf classes, with the sample's leaf bit set.
    pub flat_target: OneHot,
    /// One (parent index, child one-hot) pair per path depth except the
    /// leaf; the one-hot length equals that parent's recorded child count.
    pub hierarchical: Vec<(usize, OneHot)>,
}

/// Encodes samples against a fixed hierarchy, vocabulary, and token length.
///
/// The hierarchy and vocabulary are read-only after construction and shared
/// by reference across every encode call.
pub struct SampleEncoder<'a, N, T> {
    hierarchy: &'a HierarchyTree,
    vocabulary: &'a LeafVocabulary,
    normalizer: &'a N,
    tokenizer: &'a T,
    max_length: usize,
}

impl<'a, N: TextNormalizer, T: Tokenizer> SampleEncoder<'a, N, T> {
    /// Create an encoder over shared, already-built run state.
    pub fn new(
        hierarchy: &'a HierarchyTree,
        vocabulary: &'a LeafVocabulary,
        normalizer: &'a N,
        tokenizer: &'a T,
        max_length: usize,
    ) -> Self {
        Self {
            hierarchy,
            vocabulary,
            normalizer,
            tokenizer,
            max_length,
        }
    }

    /// Fixed token length every encoded input is padded/truncated to.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Encode one sample.
    ///
    /// A path step that references an edge absent from the hierarchy is a
    /// consistency fault and fails with the sample and offending pair
    /// identified; callers that already ran the batch validation pass will
    /// never hit it.
    pub fn encode(&self, sample: &Sample) -> Result<EncodedSample, PrepError> {
        let cleaned = self.normalizer.normalize(&sample.text);
        let input = self.tokenizer.tokenize(&cleaned, self.max_length);

        let leaf_index = self.vocabulary.index_of(&sample.leaf).ok_or_else(|| {
            PrepError::Configuration(format!(
                "sample {}: leaf '{}' is missing from the label vocabulary",
                sample.row_index, sample.leaf
            ))
        })?;
        let mut flat_target = vec![0u8; self.vocabulary.len()];
        flat_target[leaf_index] = 1;

        let mut hierarchical = Vec::with_capacity(sample.path.len().saturating_sub(1));
        for pair in sample.path.windows(2) {
            let mismatch = || PrepError::HierarchyMismatch {
                mismatches: vec![PathMismatch {
                    sample_index: sample.row_index,
                    parent: pair[0].clone(),
                    child: pair[1].clone(),
                }],
            };
            let (parent_index, children) = self
                .hierarchy
                .parent_entry(&pair[0])
                .ok_or_else(mismatch)?;
            let child_position = children
                .get_index_of(pair[1].as_str())
                .ok_or_else(mismatch)?;
            let mut target = vec![0u8; children.len()];
            target[child_position] = 1;
            hierarchical.push((parent_index, target));
        }

        Ok(EncodedSample {
            input,
            flat_target,
            hierarchical,
        })
    }
}
