pub mod analyzer;
pub mod corpus;
pub mod evaluate;
pub mod serde;
pub mod stop_words;
pub mod tfidf;
pub mod token;

use std::marker::PhantomData;

use ::serde::{Deserialize, Serialize};
use indexmap::IndexSet;
use rayon::prelude::*;

use crate::{
    error::{EngineError, Result},
    utils::math::{matrix::CsMatrix, vector::ZeroSpVec},
    vectorizer::{analyzer::Analyzer, corpus::Corpus, tfidf::{DefaultTFIDFEngine, TFIDFEngine}, token::TermFrequency},
};

/// Stop word list applied before n-grams are built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopWords {
    #[default]
    English,
    None,
}

/// Document frequency bound.
/// An integer is an absolute document count, a float a proportion of documents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocFrequency {
    Count(u64),
    Proportion(f64),
}

impl DocFrequency {
    /// Bound expressed as a document count for a corpus of `doc_num` documents
    fn threshold(self, doc_num: u64) -> f64 {
        match self {
            DocFrequency::Count(c) => c as f64,
            DocFrequency::Proportion(p) => p * doc_num as f64,
        }
    }

    fn validate(self, name: &str) -> Result<()> {
        match self {
            DocFrequency::Proportion(p) if !(0.0..=1.0).contains(&p) => Err(EngineError::Config(
                format!("{name} proportion must be within [0, 1], got {p}"),
            )),
            _ => Ok(()),
        }
    }
}

/// Analyzer and pruning parameters of the vectorizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TFIDFParams {
    pub lowercase: bool,
    /// inclusive (min_n, max_n)
    pub ngram_range: (usize, usize),
    pub stop_words: StopWords,
    pub min_df: DocFrequency,
    pub max_df: DocFrequency,
}

impl Default for TFIDFParams {
    fn default() -> Self {
        Self {
            lowercase: true,
            ngram_range: (1, 3),
            stop_words: StopWords::English,
            min_df: DocFrequency::Count(0),
            max_df: DocFrequency::Proportion(1.0),
        }
    }
}

impl TFIDFParams {
    pub fn validate(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(EngineError::Config(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        self.min_df.validate("min_df")?;
        self.max_df.validate("max_df")?;
        Ok(())
    }
}

/// IDF weights aligned with the vocabulary columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IDFVector {
    pub idf_vec: Vec<f64>,
    /// number of training documents
    pub doc_num: u64,
}

/// TF-IDF Vectorizer
/// Learns a vocabulary and IDF weights from a document collection and maps
/// text into that vector space.
///
/// Vocabulary columns are assigned in lexicographic term order, so fitting the
/// same documents twice yields the same columns and weights.
#[derive(Debug, Clone)]
pub struct TFIDFVectorizer<E = DefaultTFIDFEngine>
where
    E: TFIDFEngine,
{
    pub params: TFIDFParams,
    /// term -> column (index in the set)
    pub vocabulary: IndexSet<Box<str>>,
    pub idf_cache: IDFVector,
    analyzer: Analyzer,
    _marker: PhantomData<fn() -> E>,
}

impl<E> TFIDFVectorizer<E>
where
    E: TFIDFEngine,
{
    /// Unfitted vectorizer
    pub fn new(params: TFIDFParams) -> Result<Self> {
        params.validate()?;
        Ok(Self::from_parts(params, IndexSet::new(), IDFVector::default()))
    }

    pub(crate) fn from_parts(params: TFIDFParams, vocabulary: IndexSet<Box<str>>, idf_cache: IDFVector) -> Self {
        let analyzer = Analyzer::new(&params);
        Self {
            params,
            vocabulary,
            idf_cache,
            analyzer,
            _marker: PhantomData,
        }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.vocabulary.len()
    }

    #[inline]
    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Column of `term`
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get_index_of(term)
    }

    /// IDF weight of `term`
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.term_index(term)
            .and_then(|i| self.idf_cache.idf_vec.get(i).copied())
    }

    /// Learn vocabulary and IDF from `docs`.
    pub fn fit<S>(&mut self, docs: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        let freqs = self.analyze_all(docs);
        self.fit_freqs(&freqs)
    }

    /// Learn from `docs` and return their term-document matrix.
    /// Row `i` of the matrix corresponds to `docs[i]`.
    pub fn fit_transform<S>(&mut self, docs: &[S]) -> Result<CsMatrix<f64>>
    where
        S: AsRef<str> + Sync,
    {
        let freqs = self.analyze_all(docs);
        self.fit_freqs(&freqs)?;
        self.rows_from_freqs(&freqs)
    }

    /// Map `docs` into the fitted space.
    pub fn transform<S>(&self, docs: &[S]) -> Result<CsMatrix<f64>>
    where
        S: AsRef<str> + Sync,
    {
        let freqs = self.analyze_all(docs);
        self.rows_from_freqs(&freqs)
    }

    /// Map one text into the fitted space.
    /// Out-of-vocabulary terms are dropped.
    pub fn transform_one(&self, text: &str) -> ZeroSpVec<f64> {
        let freq = self.analyzer.analyze(text);
        E::tf_idf_vec(&freq, &self.vocabulary, &self.idf_cache.idf_vec)
    }

    fn analyze_all<S>(&self, docs: &[S]) -> Vec<TermFrequency>
    where
        S: AsRef<str> + Sync,
    {
        docs.par_iter()
            .map(|doc| self.analyzer.analyze(doc.as_ref()))
            .collect()
    }

    fn fit_freqs(&mut self, freqs: &[TermFrequency]) -> Result<()> {
        let mut corpus = Corpus::new();
        for freq in freqs {
            corpus.add_doc(freq);
        }

        let doc_num = corpus.get_doc_num();
        let min_count = self.params.min_df.threshold(doc_num);
        let max_count = self.params.max_df.threshold(doc_num);
        if max_count < min_count {
            return Err(EngineError::Config(
                "max_df corresponds to fewer documents than min_df".to_string(),
            ));
        }

        // 出現0件の語は corpus に入らない
        let mut terms: Vec<&str> = corpus
            .iter()
            .filter(|(_, df)| {
                let df = *df as f64;
                df >= min_count && df <= max_count
            })
            .map(|(term, _)| term)
            .collect();
        if terms.is_empty() {
            return Err(EngineError::EmptyVocabulary);
        }
        terms.sort_unstable();

        self.vocabulary = terms.into_iter().map(Box::<str>::from).collect();
        self.idf_cache = IDFVector {
            idf_vec: E::idf_vec(&corpus, &self.vocabulary),
            doc_num,
        };
        tracing::debug!(
            docs = doc_num,
            vocab = self.vocabulary.len(),
            "vectorizer fitted"
        );
        Ok(())
    }

    /// Every row must come out with `vocab_size` columns.
    fn rows_from_freqs(&self, freqs: &[TermFrequency]) -> Result<CsMatrix<f64>> {
        let rows: Vec<ZeroSpVec<f64>> = freqs
            .par_iter()
            .map(|freq| {
                let mut row = E::tf_idf_vec(freq, &self.vocabulary, &self.idf_cache.idf_vec);
                row.shrink_to_fit();
                row
            })
            .collect();
        CsMatrix::from_rows(self.vocabulary.len(), rows).ok_or_else(|| EngineError::InconsistentIndex {
            reason: format!(
                "transformed row dimension differs from the {} vocabulary terms",
                self.vocabulary.len()
            ),
        })
    }
}
