//! Normalizer/tokenizer seams and reference implementations.
//!
//! Real text cleaning and subword tokenization live outside this crate;
//! consumers inject them through the two traits below. The built-in
//! implementations exist for tests and demos and make no claim of
//! linguistic quality.

use crate::constants::encode::PAD_TOKEN;
use crate::hash::stable_hash_str;
use crate::table::Sample;
use crate::types::{TokenId, TokenizedText};

/// Text-cleaning seam applied before tokenization.
pub trait TextNormalizer {
    /// Produce the cleaned form of `text`.
    fn normalize(&self, text: &str) -> String;
}

/// Tokenization seam producing fixed-length id sequences.
pub trait Tokenizer {
    /// Tokenize `text` into exactly `max_length` ids, padding short inputs
    /// and truncating long ones. Output must be deterministic.
    fn tokenize(&self, text: &str, max_length: usize) -> TokenizedText;
}

/// Reference normalizer: lowercases and collapses whitespace runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineWhitespaceNormalizer;

impl TextNormalizer for InlineWhitespaceNormalizer {
    fn normalize(&self, text: &str) -> String {
        let mut normalized = String::new();
        let mut seen_space = false;
        for ch in text.chars() {
            if ch.is_whitespace() {
                if !seen_space {
                    normalized.push(' ');
                    seen_space = true;
                }
            } else {
                for lower in ch.to_lowercase() {
                    normalized.push(lower);
                }
                seen_space = false;
            }
        }
        normalized.trim().to_string()
    }
}

/// Reference tokenizer: one stable hash id per whitespace word.
///
/// Ids are never `PAD_TOKEN`, so padding is distinguishable from content.
#[derive(Clone, Copy, Debug)]
pub struct HashTokenizer {
    seed: u64,
}

impl HashTokenizer {
    /// Create a tokenizer whose ids are derived with `seed`.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for HashTokenizer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Tokenizer for HashTokenizer {
    fn tokenize(&self, text: &str, max_length: usize) -> TokenizedText {
        let mut ids: TokenizedText = text
            .split_whitespace()
            .take(max_length)
            .map(|word| (stable_hash_str(self.seed, word) % u64::from(TokenId::MAX)) as TokenId + 1)
            .collect();
        ids.resize(max_length, PAD_TOKEN);
        ids
    }
}

/// Longest whitespace token count across all samples plus a padding margin.
///
/// This scan runs once up front; every encoded input is then padded or
/// truncated to the returned length.
pub fn max_token_length(samples: &[Sample], extra_length: usize) -> usize {
    let longest = samples
        .iter()
        .map(|sample| sample.text.split_whitespace().count())
        .max()
        .unwrap_or(0);
    longest + extra_length
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(text: &str) -> Sample {
        Sample {
            row_index: 0,
            text: text.to_string(),
            leaf: "leaf".to_string(),
            path: vec!["root".to_string(), "leaf".to_string()],
        }
    }

    #[test]
    fn normalizer_lowercases_and_collapses_whitespace() {
        let normalizer = InlineWhitespaceNormalizer;
        assert_eq!(normalizer.normalize("  Cheap\tANDROID\n phone "), "cheap android phone");
    }

    #[test]
    fn tokenizer_pads_to_the_requested_length() {
        let tokenizer = HashTokenizer::default();
        let ids = tokenizer.tokenize("two words", 5);
        assert_eq!(ids.len(), 5);
        assert_ne!(ids[0], PAD_TOKEN);
        assert_ne!(ids[1], PAD_TOKEN);
        assert_eq!(&ids[2..], [PAD_TOKEN, PAD_TOKEN, PAD_TOKEN]);
    }

    #[test]
    fn tokenizer_truncates_long_inputs() {
        let tokenizer = HashTokenizer::default();
        let ids = tokenizer.tokenize("a b c d e f", 3);
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| *id != PAD_TOKEN));
    }

    #[test]
    fn tokenizer_is_deterministic_per_word() {
        let tokenizer = HashTokenizer::default();
        let first = tokenizer.tokenize("repeat repeat", 2);
        assert_eq!(first[0], first[1]);
        assert_eq!(first, tokenizer.tokenize("repeat repeat", 2));
    }

    #[test]
    fn max_length_scans_whole_dataset_and_adds_margin() {
        let samples = vec![sample("one"), sample("three whole words here"), sample("two words")];
        assert_eq!(max_token_length(&samples, 10), 14);
        assert_eq!(max_token_length(&[], 10), 10);
    }
}
