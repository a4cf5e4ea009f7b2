use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::hierarchy::PathMismatch;

/// Error type for hierarchy parsing, dataset construction, and cache failures.
///
/// Every arm is fatal for the current preprocessing run; there is no retry
/// logic anywhere in the pipeline.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error(
        "hierarchy file '{}' line {line}: expected at least two ' > '-separated nodes",
        .path.display()
    )]
    MalformedHierarchy { path: PathBuf, line: usize },
    #[error("{}", format_mismatches(.mismatches))]
    HierarchyMismatch { mismatches: Vec<PathMismatch> },
    #[error("sample table '{}' contains no usable rows", .path.display())]
    EmptyDataset { path: PathBuf },
    #[error("cache artifact '{}' is corrupt: {reason}", .path.display())]
    CacheCorruption { path: PathBuf, reason: String },
    #[error("failed to read sample table: {0}")]
    Table(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
}

fn format_mismatches(mismatches: &[PathMismatch]) -> String {
    match mismatches.first() {
        None => "sample table disagrees with hierarchy".to_string(),
        Some(first) if mismatches.len() == 1 => {
            format!("sample table disagrees with hierarchy: {first}")
        }
        Some(first) => format!(
            "sample table disagrees with hierarchy on {} path steps; first: {first}",
            mismatches.len()
        ),
    }
}
