//! Deterministic-proportion train/valid/test partitioning.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::splits::{
    DEFAULT_TRAIN_FRACTION, DEFAULT_TRAIN_VALID_FRACTION, DEGENERATE_SPLIT_SIZE,
};
use crate::data::{ExampleSet, SplitSets};
use crate::errors::PrepError;

/// Two-stage split proportions: the whole collection is cut into
/// train+valid vs test, then the train+valid portion into train vs valid.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SplitFractions {
    /// Fraction of the whole collection assigned to train+valid.
    pub train_valid: f64,
    /// Fraction of the train+valid portion assigned to train.
    pub train: f64,
}

impl Default for SplitFractions {
    fn default() -> Self {
        Self {
            train_valid: DEFAULT_TRAIN_VALID_FRACTION,
            train: DEFAULT_TRAIN_FRACTION,
        }
    }
}

impl SplitFractions {
    /// Validate that both fractions fall in `(0, 1]`.
    pub fn validated(self) -> Result<Self, PrepError> {
        for (name, value) in [("train_valid", self.train_valid), ("train", self.train)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(PrepError::Configuration(format!(
                    "split fraction '{name}' must be in (0, 1], got {value}"
                )));
            }
        }
        Ok(self)
    }
}

/// Randomly partition `set` into train/valid/test.
///
/// Sizes follow the rounding contract: train+valid = round(train_valid × N),
/// test = remainder, train = round(train × |train+valid|), valid = remainder.
/// Membership is randomized through `rng`; the same RNG state reproduces the
/// same partition. Collections smaller than ten examples can round into
/// zero-sized splits; this is accepted and logged, not an error.
pub fn split_examples(
    set: ExampleSet,
    fractions: SplitFractions,
    rng: &mut impl Rng,
) -> SplitSets {
    let total = set.len();
    if total > 0 && total < DEGENERATE_SPLIT_SIZE {
        warn!(total, "collection is small enough to round into empty splits");
    }

    let mut order: Vec<usize> = (0..total).collect();
    order.shuffle(rng);

    let train_valid_size = ((total as f64) * fractions.train_valid).round() as usize;
    let train_size = ((train_valid_size as f64) * fractions.train).round() as usize;

    let gather = |indices: &[usize]| ExampleSet {
        inputs: indices.iter().map(|&i| set.inputs[i].clone()).collect(),
        targets: indices.iter().map(|&i| set.targets[i].clone()).collect(),
    };

    SplitSets {
        train: gather(&order[..train_size]),
        valid: gather(&order[train_size..train_valid_size]),
        test: gather(&order[train_valid_size..]),
    }
}
