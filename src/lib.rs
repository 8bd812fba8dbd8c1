/// This crate is a content recommendation service built on a TF-IDF Vectorizer.
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod index;
pub mod logging;
pub mod server;
pub mod store;
pub mod utils;
pub mod vectorizer;

/// Content Engine
/// The top-level struct of this crate.
/// It trains a similarity index from a CSV data source (path or URL) and
/// recommends the documents most similar to a piece of text.
///
/// Trainings are serialized within a process and each one replaces the
/// persisted artifact set as a whole. Queries run against an immutable
/// snapshot of the latest completed training, reloaded when another process
/// trains into the same directory.
pub use engine::ContentEngine;

/// Recommendation
/// A `(score, description)` pair. Serialized as a two-element JSON array.
pub use index::{Recommendation, SimilarityIndex};

/// Engine Error
/// Every fallible operation returns `Result<T, EngineError>`.
pub use error::{EngineError, Result};

/// CSV document table
/// The `description` column is vectorized; every other column is kept as is.
pub use dataset::Dataset;

/// TF-IDF Vectorizer
/// Learns a vocabulary and IDF weights from documents and maps text into
/// L2-normalized TF-IDF vectors.
///
/// `TFIDFVectorizer<E>` is generic over the calculation engine `E`
/// (default `DefaultTFIDFEngine`).
///
/// # Serialization
/// Supported. Only params, vocabulary and IDF weights are written.
///
/// # Deserialization
/// Use `TFIDFData` and `into_tf_idf_vectorizer`, which validates the data.
pub use vectorizer::{DocFrequency, StopWords, TFIDFParams, TFIDFVectorizer};

/// TF-IDF Vectorizer Data Structure for Deserialization
pub use vectorizer::serde::TFIDFData;

/// Corpus for TF-IDF Vectorizer
/// Manages the number of documents and the number of documents in which each
/// term appears. It is the base data for IDF calculation.
pub use vectorizer::corpus::Corpus;

/// Term Frequency structure
/// Occurrence counts of each term within one document, the base data for TF.
pub use vectorizer::token::TermFrequency;

/// TF IDF Calculation Engine Trait
/// Plug different weighting strategies into `TFIDFVectorizer<E>`.
/// `DefaultTFIDFEngine` uses raw counts, smoothed IDF and L2 normalization.
pub use vectorizer::tfidf::{DefaultTFIDFEngine, TFIDFEngine};

/// Search Hits and Hit Entry structures
/// - `Hits`: scores of every row, with ranking helpers
/// - `HitEntry`: one row index and its score
pub use vectorizer::evaluate::scoring::{HitEntry, Hits};
