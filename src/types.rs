/// Lowercase taxonomy node name.
/// Examples: `electronics`, `phones`, `android`
pub type NodeName = String;
/// Leaf-category label attached to a sample.
/// Example: `android`
pub type LeafLabel = String;
/// Single token id produced by a tokenizer.
pub type TokenId = u32;
/// Fixed-length tokenized input (padded/truncated to the run's max length).
pub type TokenizedText = Vec<TokenId>;
/// One-hot target vector with exactly one `1` entry.
/// Example: `[0, 0, 1, 0, 0]`
pub type OneHot = Vec<u8>;
/// Stable content fingerprint over the input table and hierarchy file.
pub type Fingerprint = u64;
