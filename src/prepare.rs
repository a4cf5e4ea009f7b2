//! Dataset orchestration: the public prepare entry points.
//!
//! `DatasetPreparer` wires parsing, encoding, accumulation, splitting, and
//! caching into one synchronous, single-threaded pipeline. A failure at any
//! step aborts the run before anything is persisted.

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::bucket::HierarchyAccumulator;
use crate::cache::{BuiltDataset, DatasetCache, DatasetManifest, fingerprint_files};
use crate::config::PrepConfig;
use crate::constants::cache::MANIFEST_VERSION;
use crate::data::{ExampleSet, HierarchicalSplits, SplitSets};
use crate::encode::SampleEncoder;
use crate::errors::PrepError;
use crate::hierarchy::HierarchyTree;
use crate::split::split_examples;
use crate::table::{LeafVocabulary, read_samples};
use crate::text::{TextNormalizer, Tokenizer, max_token_length};

/// Downstream consumer stage selecting which splits are retained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Training: keep the train and validation splits.
    Fit,
    /// Evaluation: keep the test split.
    Test,
}

/// Flat splits plus the manifest describing how they were built.
#[derive(Clone, Debug)]
pub struct PreparedDataset {
    /// Flat train/valid/test splits.
    pub splits: SplitSets,
    /// Build manifest: fingerprint, max length, and every ordering.
    pub manifest: DatasetManifest,
}

impl PreparedDataset {
    /// Retain only the splits a consumer stage needs.
    pub fn for_stage(self, stage: Stage) -> StageDataset {
        match stage {
            Stage::Fit => StageDataset {
                train: Some(self.splits.train),
                valid: Some(self.splits.valid),
                test: None,
                manifest: self.manifest,
            },
            Stage::Test => StageDataset {
                train: None,
                valid: None,
                test: Some(self.splits.test),
                manifest: self.manifest,
            },
        }
    }
}

/// Splits retained for one consumer stage.
#[derive(Clone, Debug)]
pub struct StageDataset {
    /// Training split, present for [`Stage::Fit`].
    pub train: Option<ExampleSet>,
    /// Validation split, present for [`Stage::Fit`].
    pub valid: Option<ExampleSet>,
    /// Test split, present for [`Stage::Test`].
    pub test: Option<ExampleSet>,
    /// Build manifest.
    pub manifest: DatasetManifest,
}

/// Builds (or loads) the flat and hierarchical datasets for one input pair.
///
/// The normalizer and tokenizer are injected at construction and passed
/// into every encode call; the preparer holds no other mutable state.
pub struct DatasetPreparer<N, T> {
    config: PrepConfig,
    normalizer: N,
    tokenizer: T,
}

impl<N: TextNormalizer, T: Tokenizer> DatasetPreparer<N, T> {
    /// Create a preparer over `config` with injected text adapters.
    pub fn new(config: PrepConfig, normalizer: N, tokenizer: T) -> Self {
        Self {
            config,
            normalizer,
            tokenizer,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &PrepConfig {
        &self.config
    }

    /// Cache handle over the configured dataset directory.
    pub fn cache(&self) -> DatasetCache {
        DatasetCache::new(&self.config.dataset_dir, self.config.cache_validation)
    }

    /// Load cached flat splits or run the full preprocessing pass.
    ///
    /// On a miss every artifact (flat splits, hierarchical collection,
    /// manifest) is rebuilt and persisted before the flat splits are
    /// returned.
    pub fn prepare(&self) -> Result<PreparedDataset, PrepError> {
        let cache = self.cache();
        let fingerprint = || {
            fingerprint_files(&[
                self.config.table_path.as_path(),
                self.config.hierarchy_path.as_path(),
            ])
        };
        let (splits, manifest) = cache.load_or_build(fingerprint, || self.build())?;
        Ok(PreparedDataset { splits, manifest })
    }

    /// Prepare and retain only the splits `stage` needs.
    pub fn prepare_for_stage(&self, stage: Stage) -> Result<StageDataset, PrepError> {
        Ok(self.prepare()?.for_stage(stage))
    }

    fn build(&self) -> Result<BuiltDataset, PrepError> {
        let fractions = self.config.fractions.validated()?;
        info!("preprocessing datasets");

        let hierarchy = HierarchyTree::parse(&self.config.hierarchy_path)?;
        let samples = read_samples(&self.config.table_path)?;
        let vocabulary = LeafVocabulary::from_samples(&samples);
        hierarchy.validate_samples(&samples)?;

        let max_length = max_token_length(&samples, self.config.extra_length);
        debug!(
            samples = samples.len(),
            parents = hierarchy.len(),
            classes = vocabulary.len(),
            max_length,
            "building datasets"
        );

        let encoder = SampleEncoder::new(
            &hierarchy,
            &vocabulary,
            &self.normalizer,
            &self.tokenizer,
            max_length,
        );
        let mut accumulator = HierarchyAccumulator::new(hierarchy.len());
        let mut flat = ExampleSet::default();
        for sample in &samples {
            let encoded = encoder.encode(sample)?;
            for (parent_index, target) in encoded.hierarchical {
                accumulator.add(parent_index, encoded.input.clone(), target);
            }
            flat.push(encoded.input, encoded.flat_target);
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let hierarchical: HierarchicalSplits = accumulator
            .into_buckets()
            .into_iter()
            .map(|bucket| split_examples(bucket, fractions, &mut rng))
            .collect();
        let flat_splits = split_examples(flat, fractions, &mut rng);

        let manifest = DatasetManifest {
            version: MANIFEST_VERSION,
            fingerprint: fingerprint_files(&[
                self.config.table_path.as_path(),
                self.config.hierarchy_path.as_path(),
            ])?,
            max_length,
            seed: self.config.seed,
            leaf_labels: vocabulary.to_vec(),
            parents: hierarchy.parents().cloned().collect(),
            children: hierarchy.child_orders(),
            built_at: Utc::now(),
        };
        info!(
            train = flat_splits.train.len(),
            valid = flat_splits.valid.len(),
            test = flat_splits.test.len(),
            buckets = hierarchical.len(),
            "preprocessing complete"
        );

        Ok(BuiltDataset {
            flat: flat_splits,
            hierarchical,
            manifest,
        })
    }
}
