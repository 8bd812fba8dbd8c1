use std::{
    collections::BTreeMap,
    ffi::OsStr,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{
    dataset::Dataset,
    error::{EngineError, Result},
    index::SimilarityIndex,
    utils::math::matrix::CsMatrix,
    vectorizer::{serde::TFIDFData, TFIDFVectorizer},
};

pub const DATASET_ARTIFACT: &str = "ds";
pub const MODEL_ARTIFACT: &str = "tf_model";
pub const MATRIX_ARTIFACT: &str = "tfidf_matrix";
pub const MANIFEST_FILE: &str = "manifest.json";

const ARTIFACT_EXT: &str = ".cbor";

/// Bumped when the layout of any artifact changes
pub const FORMAT_VERSION: u32 = 2;

/// File name of `artifact` in `generation`, e.g. `ds.3.cbor`
pub fn artifact_file(artifact: &str, generation: u64) -> String {
    format!("{artifact}.{generation}{ARTIFACT_EXT}")
}

/// One persisted artifact of a generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub file: String,
    /// blake3 hex digest of the file contents
    pub blake3: String,
}

/// Describes one completed training.
/// Written after all artifacts, so its presence marks a complete set.
/// Each generation writes its own files, so replacing the manifest is the
/// only step that switches readers to a new set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    /// increases by one per training in this directory
    pub generation: u64,
    pub created_at: DateTime<Utc>,
    pub rows: usize,
    pub vocab_size: usize,
    /// artifact name -> file
    pub artifacts: BTreeMap<String, ArtifactEntry>,
}

/// Directory holding the persisted artifact set
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// `None` if no training has completed in this directory.
    pub fn read_manifest(&self) -> Result<Option<Manifest>> {
        let bytes = match fs::read(self.path(MANIFEST_FILE)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let manifest: Manifest = serde_json::from_slice(&bytes).map_err(|e| EngineError::CorruptIndex {
            artifact: MANIFEST_FILE,
            reason: e.to_string(),
        })?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(EngineError::CorruptIndex {
                artifact: MANIFEST_FILE,
                reason: format!(
                    "unsupported format version {} (expected {FORMAT_VERSION})",
                    manifest.format_version
                ),
            });
        }
        Ok(Some(manifest))
    }

    pub fn current_generation(&self) -> Result<Option<u64>> {
        Ok(self.read_manifest()?.map(|m| m.generation))
    }

    /// Persist `index` as the next generation.
    /// Artifacts first under generation-numbered names, then the manifest.
    /// A failure before the manifest rename leaves the previous generation
    /// intact and current. Files of older generations are removed afterwards.
    pub fn save(&self, index: &SimilarityIndex) -> Result<Manifest> {
        fs::create_dir_all(&self.dir)?;

        let previous = match self.read_manifest() {
            Ok(m) => m.map(|m| m.generation).unwrap_or(0),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable manifest");
                0
            }
        };
        let generation = previous + 1;

        let encoded: [(&'static str, Vec<u8>); 3] = [
            (DATASET_ARTIFACT, encode(DATASET_ARTIFACT, index.dataset())?),
            (MODEL_ARTIFACT, encode(MODEL_ARTIFACT, index.vectorizer())?),
            (MATRIX_ARTIFACT, encode(MATRIX_ARTIFACT, index.matrix())?),
        ];

        let mut artifacts = BTreeMap::new();
        for (name, bytes) in &encoded {
            let file = artifact_file(name, generation);
            self.write_atomic(&file, bytes)?;
            tracing::debug!(artifact = name, file = %file, bytes = bytes.len(), "artifact written");
            artifacts.insert(
                name.to_string(),
                ArtifactEntry {
                    file,
                    blake3: blake3::hash(bytes).to_hex().to_string(),
                },
            );
        }

        let manifest = Manifest {
            format_version: FORMAT_VERSION,
            generation,
            created_at: Utc::now(),
            rows: index.len(),
            vocab_size: index.vectorizer().vocab_size(),
            artifacts,
        };
        let json = serde_json::to_vec_pretty(&manifest).map_err(|e| EngineError::Encode {
            artifact: MANIFEST_FILE,
            reason: e.to_string(),
        })?;
        self.write_atomic(MANIFEST_FILE, &json)?;
        self.remove_stale(&manifest);

        tracing::info!(
            dir = %self.dir.display(),
            generation = manifest.generation,
            rows = manifest.rows,
            vocab = manifest.vocab_size,
            "index persisted"
        );
        Ok(manifest)
    }

    /// Load and verify the artifact set named by the manifest.
    pub fn load(&self) -> Result<(Manifest, SimilarityIndex)> {
        let manifest = self.read_manifest()?.ok_or_else(|| EngineError::IndexNotFound {
            path: self.dir.clone(),
        })?;

        let dataset: Dataset = decode(&self.read_verified(&manifest, DATASET_ARTIFACT)?, DATASET_ARTIFACT)?;
        let model: TFIDFData = decode(&self.read_verified(&manifest, MODEL_ARTIFACT)?, MODEL_ARTIFACT)?;
        let matrix: CsMatrix<f64> = decode(&self.read_verified(&manifest, MATRIX_ARTIFACT)?, MATRIX_ARTIFACT)?;

        let vectorizer: TFIDFVectorizer = model
            .into_tf_idf_vectorizer()
            .map_err(|reason| EngineError::CorruptIndex {
                artifact: MODEL_ARTIFACT,
                reason,
            })?;

        if dataset.len() != manifest.rows || vectorizer.vocab_size() != manifest.vocab_size {
            return Err(EngineError::InconsistentIndex {
                reason: format!(
                    "manifest records {} rows and {} terms, artifacts hold {} rows and {} terms",
                    manifest.rows,
                    manifest.vocab_size,
                    dataset.len(),
                    vectorizer.vocab_size()
                ),
            });
        }

        let index = SimilarityIndex::new(dataset, vectorizer, matrix)?;
        Ok((manifest, index))
    }

    fn read_verified(&self, manifest: &Manifest, name: &'static str) -> Result<Vec<u8>> {
        let entry = manifest
            .artifacts
            .get(name)
            .ok_or_else(|| EngineError::InconsistentIndex {
                reason: format!("manifest has no entry for {name}"),
            })?;
        // plain file names only, never a path out of the index directory
        if Path::new(&entry.file).file_name() != Some(OsStr::new(&entry.file)) {
            return Err(EngineError::CorruptIndex {
                artifact: MANIFEST_FILE,
                reason: format!("invalid artifact file name {:?}", entry.file),
            });
        }
        let bytes = match fs::read(self.path(&entry.file)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(EngineError::InconsistentIndex {
                    reason: format!("{} is missing", entry.file),
                })
            }
            Err(e) => return Err(e.into()),
        };
        let actual = blake3::hash(&bytes).to_hex();
        if actual.as_str() != entry.blake3 {
            return Err(EngineError::InconsistentIndex {
                reason: format!("{} does not match the manifest digest", entry.file),
            });
        }
        Ok(bytes)
    }

    /// Remove artifact files not named by `manifest`.
    /// Failures are logged; the new generation is already complete.
    fn remove_stale(&self, manifest: &Manifest) {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "cannot list index directory");
                return;
            }
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.ends_with(ARTIFACT_EXT) || manifest.artifacts.values().any(|a| a.file == name) {
                continue;
            }
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => tracing::debug!(file = name, "stale artifact removed"),
                Err(e) => tracing::warn!(file = name, error = %e, "cannot remove stale artifact"),
            }
        }
    }

    /// Write to a temp file in the same directory, then rename over `name`.
    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path(name)).map_err(|e| e.error)?;
        Ok(())
    }
}

fn encode<T: Serialize>(artifact: &'static str, value: &T) -> Result<Vec<u8>> {
    serde_cbor::to_vec(value).map_err(|e| EngineError::Encode {
        artifact,
        reason: e.to_string(),
    })
}

fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8], artifact: &'static str) -> Result<T> {
    serde_cbor::from_slice(bytes).map_err(|e| EngineError::CorruptIndex {
        artifact,
        reason: e.to_string(),
    })
}
