use std::path::PathBuf;

/// Errors raised by training, querying and persisting the similarity index.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV source: {0}")]
    Csv(#[from] csv::Error),

    #[error("data source has no `{column}` column")]
    MissingColumn { column: String },

    #[error("failed to read data source {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("empty vocabulary: the documents contain only stop words or no words at all")]
    EmptyVocabulary,

    #[error("failed to encode {artifact}: {reason}")]
    Encode { artifact: &'static str, reason: String },

    #[error("no trained index found at {}", path.display())]
    IndexNotFound { path: PathBuf },

    #[error("index artifact {artifact} is corrupt: {reason}")]
    CorruptIndex { artifact: &'static str, reason: String },

    #[error("index artifacts are inconsistent: {reason}")]
    InconsistentIndex { reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("engine lock poisoned: {0}")]
    LockPoisoned(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
