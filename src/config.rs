use std::path::PathBuf;

use crate::cache::CacheValidation;
use crate::constants::cache::DEFAULT_DATASET_DIR;
use crate::constants::encode::DEFAULT_EXTRA_LENGTH;
use crate::split::SplitFractions;

/// Top-level preprocessing configuration.
#[derive(Clone, Debug)]
pub struct PrepConfig {
    /// Sample table path (headerless CSV, positional columns).
    pub table_path: PathBuf,
    /// Hierarchy definition file path (one taxonomy path per line).
    pub hierarchy_path: PathBuf,
    /// Directory holding persisted dataset artifacts.
    pub dataset_dir: PathBuf,
    /// RNG seed that controls split assignment.
    ///
    /// Splitting is seeded so repeated builds from the same inputs produce
    /// the same partitions; override the seed to draw a different one.
    pub seed: u64,
    /// Padding margin added to the scanned max token count.
    pub extra_length: usize,
    /// Train/valid/test proportions.
    pub fractions: SplitFractions,
    /// Cache-hit validation policy.
    pub cache_validation: CacheValidation,
}

impl PrepConfig {
    /// Create a config for the given input files with default settings.
    pub fn new(table_path: impl Into<PathBuf>, hierarchy_path: impl Into<PathBuf>) -> Self {
        Self {
            table_path: table_path.into(),
            hierarchy_path: hierarchy_path.into(),
            dataset_dir: PathBuf::from(DEFAULT_DATASET_DIR),
            seed: 42,
            extra_length: DEFAULT_EXTRA_LENGTH,
            fractions: SplitFractions::default(),
            cache_validation: CacheValidation::default(),
        }
    }

    /// Override the dataset artifact directory.
    pub fn with_dataset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dataset_dir = dir.into();
        self
    }

    /// Override the split RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Override the padding margin.
    pub fn with_extra_length(mut self, extra_length: usize) -> Self {
        self.extra_length = extra_length;
        self
    }

    /// Override the split proportions.
    pub fn with_fractions(mut self, fractions: SplitFractions) -> Self {
        self.fractions = fractions;
        self
    }

    /// Override the cache validation policy.
    pub fn with_cache_validation(mut self, validation: CacheValidation) -> Self {
        self.cache_validation = validation;
        self
    }
}
