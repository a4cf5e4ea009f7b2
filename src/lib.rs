#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Per-parent accumulation of hierarchical examples.
pub mod bucket;
/// Dataset-artifact persistence and cache validation.
pub mod cache;
/// Preprocessing configuration types.
pub mod config;
/// Centralized constants used across parsing, splitting, and caching.
pub mod constants;
/// Encoded example collections and split triples.
pub mod data;
/// Per-sample flat and hierarchical encoding.
pub mod encode;
mod hash;
/// Taxonomy tree parsing and consistency validation.
pub mod hierarchy;
/// Dataset orchestration and the public prepare entry points.
pub mod prepare;
/// Train/valid/test partitioning.
pub mod split;
/// Sample-table reading and the leaf vocabulary.
pub mod table;
/// Normalizer/tokenizer seams and reference implementations.
pub mod text;
/// Shared type aliases.
pub mod types;

mod errors;

pub use bucket::HierarchyAccumulator;
pub use cache::{BuiltDataset, CacheValidation, DatasetCache, DatasetManifest, fingerprint_files};
pub use config::PrepConfig;
pub use data::{ExampleSet, HierarchicalSplits, SplitSets};
pub use encode::{EncodedSample, SampleEncoder};
pub use errors::PrepError;
pub use hierarchy::{HierarchyTree, PathMismatch};
pub use prepare::{DatasetPreparer, PreparedDataset, Stage, StageDataset};
pub use split::{SplitFractions, split_examples};
pub use table::{LeafVocabulary, Sample, read_samples};
pub use text::{
    HashTokenizer, InlineWhitespaceNormalizer, TextNormalizer, Tokenizer, max_token_length,
};
pub use types::{Fingerprint, LeafLabel, NodeName, OneHot, TokenId, TokenizedText};
