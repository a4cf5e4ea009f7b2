//! Dataset-artifact persistence and cache validation.
//!
//! Artifacts are individual files under the dataset directory: the three
//! flat splits and the hierarchical split collection as versioned bitcode
//! records, plus a JSON manifest holding the input fingerprint and every
//! ordering the datasets depend on. A cache hit requires the three flat
//! artifacts; the hierarchical artifact and manifest are written on build
//! but do not gate the hit.

use std::fs;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::constants::cache::{
    BITCODE_PREFIX, EXAMPLE_SET_RECORD_VERSION, FINGERPRINT_SEED, HIERARCHICAL_FILENAME,
    HIERARCHICAL_RECORD_VERSION, MANIFEST_FILENAME, MANIFEST_VERSION, TEST_SET_FILENAME,
    TRAIN_SET_FILENAME, VALID_SET_FILENAME,
};
use crate::data::{ExampleSet, HierarchicalSplits, SplitSets};
use crate::errors::PrepError;
use crate::hash::stable_hash_with;
use crate::types::Fingerprint;

/// Cache-hit validation policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheValidation {
    /// Compare the manifest fingerprint against the current input files and
    /// rebuild on mismatch.
    #[default]
    Fingerprint,
    /// Honor existing artifacts without reading the input files at all,
    /// even if they changed since the cache was built.
    TrustExisting,
}

/// Persisted record of everything a cache reader needs besides the tensors:
/// the input fingerprint, the fixed token length, and the three orderings
/// (leaf vocabulary, parent order, per-parent child order) that give the
/// datasets their meaning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetManifest {
    /// Manifest format version.
    pub version: u8,
    /// Stable content hash of the sample table and hierarchy file.
    pub fingerprint: Fingerprint,
    /// Fixed token length every input was padded/truncated to.
    pub max_length: usize,
    /// RNG seed the splits were drawn with.
    pub seed: u64,
    /// Leaf labels in class-index order.
    pub leaf_labels: Vec<String>,
    /// Parent node names in parent-index order.
    pub parents: Vec<String>,
    /// Child orderings, parallel to `parents`.
    pub children: Vec<Vec<String>>,
    /// Build completion time.
    pub built_at: DateTime<Utc>,
}

/// Output of one full preprocessing pass, ready to persist.
#[derive(Clone, Debug)]
pub struct BuiltDataset {
    /// Flat dataset splits.
    pub flat: SplitSets,
    /// Per-parent hierarchical splits, ordered by parent index.
    pub hierarchical: HierarchicalSplits,
    /// Manifest describing the build.
    pub manifest: DatasetManifest,
}

/// Disk cache over the dataset artifacts.
#[derive(Clone, Debug)]
pub struct DatasetCache {
    dir: PathBuf,
    validation: CacheValidation,
}

impl DatasetCache {
    /// Create a cache over the dataset directory `dir`.
    pub fn new(dir: impl Into<PathBuf>, validation: CacheValidation) -> Self {
        Self {
            dir: dir.into(),
            validation,
        }
    }

    /// Flat training-split artifact path.
    pub fn train_set_path(&self) -> PathBuf {
        self.dir.join(TRAIN_SET_FILENAME)
    }

    /// Flat validation-split artifact path.
    pub fn valid_set_path(&self) -> PathBuf {
        self.dir.join(VALID_SET_FILENAME)
    }

    /// Flat test-split artifact path.
    pub fn test_set_path(&self) -> PathBuf {
        self.dir.join(TEST_SET_FILENAME)
    }

    /// Hierarchical split collection artifact path.
    pub fn hierarchical_path(&self) -> PathBuf {
        self.dir.join(HIERARCHICAL_FILENAME)
    }

    /// Manifest artifact path.
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILENAME)
    }

    /// Load cached flat splits, or run `build` and persist its output.
    ///
    /// `fingerprint` is only invoked when the validation policy needs the
    /// current input hash, so `TrustExisting` hits never touch the input
    /// files. Decode failures are fatal; a corrupt artifact never falls
    /// back to recomputation silently.
    pub fn load_or_build(
        &self,
        fingerprint: impl FnOnce() -> Result<Fingerprint, PrepError>,
        build: impl FnOnce() -> Result<BuiltDataset, PrepError>,
    ) -> Result<(SplitSets, DatasetManifest), PrepError> {
        if self.flat_artifacts_present() {
            match self.validation {
                CacheValidation::TrustExisting => {
                    if self.manifest_path().is_file() {
                        info!("loading cached datasets (presence-only validation)");
                        return Ok((self.load_flat()?, self.load_manifest()?));
                    }
                    warn!("cached datasets lack a manifest, rebuilding");
                }
                CacheValidation::Fingerprint => {
                    if self.manifest_path().is_file() {
                        let manifest = self.load_manifest()?;
                        let current = fingerprint()?;
                        if manifest.fingerprint == current {
                            info!("loading cached datasets (fingerprint match)");
                            return Ok((self.load_flat()?, manifest));
                        }
                        info!(
                            cached = manifest.fingerprint,
                            current, "input fingerprint changed, rebuilding"
                        );
                    } else {
                        warn!("cached datasets lack a manifest, rebuilding");
                    }
                }
            }
        } else {
            debug!("flat artifacts missing, building datasets");
        }

        let built = build()?;
        self.persist(&built)?;
        Ok((built.flat, built.manifest))
    }

    /// Returns `true` when all three flat artifacts exist on disk.
    pub fn flat_artifacts_present(&self) -> bool {
        self.train_set_path().is_file()
            && self.valid_set_path().is_file()
            && self.test_set_path().is_file()
    }

    /// Load the three flat split artifacts.
    pub fn load_flat(&self) -> Result<SplitSets, PrepError> {
        Ok(SplitSets {
            train: self.read_example_set(&self.train_set_path())?,
            valid: self.read_example_set(&self.valid_set_path())?,
            test: self.read_example_set(&self.test_set_path())?,
        })
    }

    /// Load the persisted hierarchical split collection.
    pub fn load_hierarchical(&self) -> Result<HierarchicalSplits, PrepError> {
        let path = self.hierarchical_path();
        let bytes = fs::read(&path)?;
        let raw = decode_record(&bytes, HIERARCHICAL_RECORD_VERSION, &path)?;
        bitcode::decode(raw).map_err(|err| PrepError::CacheCorruption {
            path,
            reason: format!("corrupt hierarchical dataset record: {err}"),
        })
    }

    /// Load and version-check the persisted manifest.
    pub fn load_manifest(&self) -> Result<DatasetManifest, PrepError> {
        let path = self.manifest_path();
        let bytes = fs::read(&path)?;
        let manifest: DatasetManifest =
            serde_json::from_slice(&bytes).map_err(|err| PrepError::CacheCorruption {
                path: path.clone(),
                reason: format!("failed to decode manifest: {err}"),
            })?;
        if manifest.version != MANIFEST_VERSION {
            return Err(PrepError::CacheCorruption {
                path,
                reason: format!(
                    "manifest version mismatch (expected {MANIFEST_VERSION}, found {})",
                    manifest.version
                ),
            });
        }
        Ok(manifest)
    }

    /// Persist every artifact of a freshly built dataset.
    pub fn persist(&self, built: &BuiltDataset) -> Result<(), PrepError> {
        fs::create_dir_all(&self.dir)?;
        self.write_example_set(&self.train_set_path(), &built.flat.train)?;
        self.write_example_set(&self.valid_set_path(), &built.flat.valid)?;
        self.write_example_set(&self.test_set_path(), &built.flat.test)?;

        let hierarchical = encode_record(
            HIERARCHICAL_RECORD_VERSION,
            &bitcode::encode(&built.hierarchical),
        );
        fs::write(self.hierarchical_path(), hierarchical)?;

        let manifest_path = self.manifest_path();
        let manifest =
            serde_json::to_vec_pretty(&built.manifest).map_err(|err| PrepError::CacheCorruption {
                path: manifest_path.clone(),
                reason: format!("failed to encode manifest: {err}"),
            })?;
        fs::write(manifest_path, manifest)?;
        debug!(dir = %self.dir.display(), "persisted dataset artifacts");
        Ok(())
    }

    fn write_example_set(&self, path: &Path, set: &ExampleSet) -> Result<(), PrepError> {
        let payload = encode_record(EXAMPLE_SET_RECORD_VERSION, &bitcode::encode(set));
        fs::write(path, payload)?;
        Ok(())
    }

    fn read_example_set(&self, path: &Path) -> Result<ExampleSet, PrepError> {
        let bytes = fs::read(path)?;
        let raw = decode_record(&bytes, EXAMPLE_SET_RECORD_VERSION, path)?;
        bitcode::decode(raw).map_err(|err| PrepError::CacheCorruption {
            path: path.to_path_buf(),
            reason: format!("corrupt example set record: {err}"),
        })
    }
}

/// Stable content fingerprint over the given input files, order-sensitive.
pub fn fingerprint_files(paths: &[&Path]) -> Result<Fingerprint, PrepError> {
    let mut contents = Vec::with_capacity(paths.len());
    for path in paths {
        contents.push(fs::read(path)?);
    }
    Ok(stable_hash_with(|hasher| {
        FINGERPRINT_SEED.hash(hasher);
        for bytes in &contents {
            bytes.hash(hasher);
        }
    }))
}

fn encode_record(version: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(2 + payload.len());
    buf.push(version);
    buf.push(BITCODE_PREFIX);
    buf.extend_from_slice(payload);
    buf
}

fn decode_record<'a>(bytes: &'a [u8], version: u8, path: &Path) -> Result<&'a [u8], PrepError> {
    if bytes.len() < 2 {
        return Err(PrepError::CacheCorruption {
            path: path.to_path_buf(),
            reason: "record is truncated".to_string(),
        });
    }
    if bytes[0] != version {
        return Err(PrepError::CacheCorruption {
            path: path.to_path_buf(),
            reason: format!("record version mismatch (expected {version}, found {})", bytes[0]),
        });
    }
    if bytes[1] != BITCODE_PREFIX {
        return Err(PrepError::CacheCorruption {
            path: path.to_path_buf(),
            reason: "payload missing expected bitcode prefix".to_string(),
        });
    }
    Ok(&bytes[2..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ExampleSet;
    use tempfile::tempdir;

    fn example_set(marker: u32) -> ExampleSet {
        let mut set = ExampleSet::default();
        set.push(vec![marker, 0], vec![1, 0]);
        set
    }

    fn manifest(fingerprint: Fingerprint) -> DatasetManifest {
        DatasetManifest {
            version: MANIFEST_VERSION,
            fingerprint,
            max_length: 12,
            seed: 42,
            leaf_labels: vec!["android".to_string()],
            parents: vec!["electronics".to_string()],
            children: vec![vec!["phones".to_string()]],
            built_at: Utc::now(),
        }
    }

    fn built(fingerprint: Fingerprint) -> BuiltDataset {
        BuiltDataset {
            flat: SplitSets {
                train: example_set(1),
                valid: example_set(2),
                test: example_set(3),
            },
            hierarchical: vec![SplitSets {
                train: example_set(4),
                valid: ExampleSet::default(),
                test: ExampleSet::default(),
            }],
            manifest: manifest(fingerprint),
        }
    }

    #[test]
    fn persisted_artifacts_round_trip() {
        let dir = tempdir().unwrap();
        let cache = DatasetCache::new(dir.path(), CacheValidation::Fingerprint);
        let dataset = built(11);
        cache.persist(&dataset).unwrap();

        assert!(cache.flat_artifacts_present());
        let flat = cache.load_flat().unwrap();
        assert_eq!(flat, dataset.flat);
        let hierarchical = cache.load_hierarchical().unwrap();
        assert_eq!(hierarchical, dataset.hierarchical);
        let manifest = cache.load_manifest().unwrap();
        assert_eq!(manifest, dataset.manifest);
    }

    #[test]
    fn trust_existing_hit_never_reads_inputs_or_rebuilds() {
        let dir = tempdir().unwrap();
        let cache = DatasetCache::new(dir.path(), CacheValidation::TrustExisting);
        cache.persist(&built(5)).unwrap();

        let (flat, manifest) = cache
            .load_or_build(
                || panic!("fingerprint must not be computed"),
                || panic!("build must not run"),
            )
            .unwrap();
        assert_eq!(flat.train, example_set(1));
        assert_eq!(manifest.fingerprint, 5);
    }

    #[test]
    fn fingerprint_mismatch_triggers_rebuild() {
        let dir = tempdir().unwrap();
        let cache = DatasetCache::new(dir.path(), CacheValidation::Fingerprint);
        cache.persist(&built(5)).unwrap();

        let (_, manifest) = cache
            .load_or_build(|| Ok(6), || Ok(built(6)))
            .unwrap();
        assert_eq!(manifest.fingerprint, 6);
        assert_eq!(cache.load_manifest().unwrap().fingerprint, 6);
    }

    #[test]
    fn fingerprint_match_skips_rebuild() {
        let dir = tempdir().unwrap();
        let cache = DatasetCache::new(dir.path(), CacheValidation::Fingerprint);
        cache.persist(&built(5)).unwrap();

        let (flat, manifest) = cache
            .load_or_build(|| Ok(5), || panic!("build must not run"))
            .unwrap();
        assert_eq!(manifest.fingerprint, 5);
        assert_eq!(flat.test, example_set(3));
    }

    #[test]
    fn missing_flat_artifact_forces_build() {
        let dir = tempdir().unwrap();
        let cache = DatasetCache::new(dir.path(), CacheValidation::TrustExisting);
        cache.persist(&built(5)).unwrap();
        fs::remove_file(cache.valid_set_path()).unwrap();

        let (_, manifest) = cache
            .load_or_build(|| unreachable!(), || Ok(built(9)))
            .unwrap();
        assert_eq!(manifest.fingerprint, 9);
    }

    #[test]
    fn corrupt_record_is_fatal_not_a_rebuild() {
        let dir = tempdir().unwrap();
        let cache = DatasetCache::new(dir.path(), CacheValidation::TrustExisting);
        cache.persist(&built(5)).unwrap();
        fs::write(cache.train_set_path(), [EXAMPLE_SET_RECORD_VERSION, BITCODE_PREFIX, 0xFF])
            .unwrap();

        let err = cache
            .load_or_build(|| unreachable!(), || panic!("build must not run"))
            .unwrap_err();
        assert!(matches!(
            err,
            PrepError::CacheCorruption { reason, .. } if reason.contains("corrupt example set")
        ));
    }

    #[test]
    fn record_framing_rejects_version_and_prefix_mismatches() {
        let path = Path::new("artifact");
        let err = decode_record(&[9, BITCODE_PREFIX, 0], 1, path).unwrap_err();
        assert!(matches!(
            err,
            PrepError::CacheCorruption { reason, .. } if reason.contains("version mismatch")
        ));

        let err = decode_record(&[1, b'X', 0], 1, path).unwrap_err();
        assert!(matches!(
            err,
            PrepError::CacheCorruption { reason, .. } if reason.contains("bitcode prefix")
        ));

        let err = decode_record(&[1], 1, path).unwrap_err();
        assert!(matches!(
            err,
            PrepError::CacheCorruption { reason, .. } if reason.contains("truncated")
        ));

        let payload = encode_record(1, &[7, 7]);
        assert_eq!(decode_record(&payload, 1, path).unwrap(), &[7, 7]);
    }

    #[test]
    fn manifest_version_mismatch_is_corruption() {
        let dir = tempdir().unwrap();
        let cache = DatasetCache::new(dir.path(), CacheValidation::Fingerprint);
        let mut dataset = built(5);
        dataset.manifest.version = MANIFEST_VERSION + 1;
        cache.persist(&dataset).unwrap();

        let err = cache.load_manifest().unwrap_err();
        assert!(matches!(
            err,
            PrepError::CacheCorruption { reason, .. } if reason.contains("manifest version mismatch")
        ));
    }

    #[test]
    fn fingerprint_tracks_file_contents() {
        let dir = tempdir().unwrap();
        let table = dir.path().join("samples.csv");
        let tree = dir.path().join("hierarchy.txt");
        fs::write(&table, "text,x,leaf,a > leaf,0\n").unwrap();
        fs::write(&tree, "a > leaf\n").unwrap();

        let before = fingerprint_files(&[table.as_path(), tree.as_path()]).unwrap();
        let again = fingerprint_files(&[table.as_path(), tree.as_path()]).unwrap();
        assert_eq!(before, again);

        fs::write(&tree, "a > leaf\na > other\n").unwrap();
        let after = fingerprint_files(&[table.as_path(), tree.as_path()]).unwrap();
        assert_ne!(before, after);
    }
}
