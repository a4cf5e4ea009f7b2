/// Constants used by hierarchy-file parsing.
pub mod hierarchy {
    /// Node separator inside one taxonomy path line.
    pub const PATH_DELIMITER: &str = " > ";
}

/// Constants used by sample-table reading and positional column layout.
pub mod table {
    /// Column holding the raw sample text.
    pub const COL_TEXT: usize = 0;
    /// Column holding the leaf-category label.
    pub const COL_LEAF: usize = 2;
    /// Column holding the full taxonomy path string.
    pub const COL_PATH: usize = 3;
}

/// Constants used by tokenization and the max-length scan.
pub mod encode {
    use crate::types::TokenId;

    /// Padding margin added on top of the longest whitespace token count.
    pub const DEFAULT_EXTRA_LENGTH: usize = 10;
    /// Token id used to pad short inputs up to the fixed length.
    pub const PAD_TOKEN: TokenId = 0;
}

/// Constants used by train/valid/test partitioning.
pub mod splits {
    /// Default fraction of the whole collection kept for train+valid.
    pub const DEFAULT_TRAIN_VALID_FRACTION: f64 = 0.8;
    /// Default fraction of the train+valid portion kept for train.
    pub const DEFAULT_TRAIN_FRACTION: f64 = 0.9;
    /// Collections smaller than this can round into zero-sized splits.
    pub const DEGENERATE_SPLIT_SIZE: usize = 10;
}

/// Constants used by dataset-artifact persistence and wire encoding.
pub mod cache {
    /// Default directory for persisted dataset artifacts.
    pub const DEFAULT_DATASET_DIR: &str = "datasets";
    /// Flat training-split artifact filename.
    pub const TRAIN_SET_FILENAME: &str = "train_set";
    /// Flat validation-split artifact filename.
    pub const VALID_SET_FILENAME: &str = "valid_set";
    /// Flat test-split artifact filename.
    pub const TEST_SET_FILENAME: &str = "test_set";
    /// Per-parent hierarchical split collection artifact filename.
    pub const HIERARCHICAL_FILENAME: &str = "hierarchical_dataset";
    /// Manifest artifact filename (JSON, human-inspectable).
    pub const MANIFEST_FILENAME: &str = "manifest.json";
    /// Prefix marker for bitcode-encoded payloads.
    pub const BITCODE_PREFIX: u8 = b'B';
    /// Version tag for persisted flat example-set records.
    pub const EXAMPLE_SET_RECORD_VERSION: u8 = 1;
    /// Version tag for the persisted hierarchical split collection.
    pub const HIERARCHICAL_RECORD_VERSION: u8 = 1;
    /// Version tag for the persisted manifest.
    pub const MANIFEST_VERSION: u8 = 1;
    /// Seed mixed into the input-content fingerprint hash.
    pub const FINGERPRINT_SEED: u64 = 0xDA7A_5E7;
}
