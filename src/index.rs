use serde::{Deserialize, Serialize};

use crate::{
    dataset::Dataset,
    error::{EngineError, Result},
    utils::math::matrix::CsMatrix,
    vectorizer::{TFIDFParams, TFIDFVectorizer},
};

/// One recommended document.
/// In JSON this is the pair `[score, description]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, String)", into = "(f64, String)")]
pub struct Recommendation {
    pub score: f64,
    pub description: String,
}

impl From<(f64, String)> for Recommendation {
    fn from((score, description): (f64, String)) -> Self {
        Self { score, description }
    }
}

impl From<Recommendation> for (f64, String) {
    fn from(r: Recommendation) -> Self {
        (r.score, r.description)
    }
}

/// Dataset, fitted vectorizer and term-document matrix from one training.
/// Row `i` of the matrix is record `i` of the dataset.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    dataset: Dataset,
    vectorizer: TFIDFVectorizer,
    matrix: CsMatrix<f64>,
}

impl SimilarityIndex {
    /// Fit on the description column and vectorize it.
    pub fn build(dataset: Dataset, params: TFIDFParams) -> Result<Self> {
        let mut vectorizer = TFIDFVectorizer::new(params)?;
        let matrix = vectorizer.fit_transform(&dataset.descriptions())?;
        Self::new(dataset, vectorizer, matrix)
    }

    /// Assemble from parts, checking that their shapes agree.
    pub fn new(dataset: Dataset, vectorizer: TFIDFVectorizer, matrix: CsMatrix<f64>) -> Result<Self> {
        if matrix.n_rows() != dataset.len() {
            return Err(EngineError::InconsistentIndex {
                reason: format!(
                    "matrix has {} rows for {} records",
                    matrix.n_rows(),
                    dataset.len()
                ),
            });
        }
        if matrix.n_cols() != vectorizer.vocab_size() {
            return Err(EngineError::InconsistentIndex {
                reason: format!(
                    "matrix has {} columns for {} vocabulary terms",
                    matrix.n_cols(),
                    vectorizer.vocab_size()
                ),
            });
        }
        Ok(Self {
            dataset,
            vectorizer,
            matrix,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn vectorizer(&self) -> &TFIDFVectorizer {
        &self.vectorizer
    }

    pub fn matrix(&self) -> &CsMatrix<f64> {
        &self.matrix
    }

    /// number of documents
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Top `num` documents most similar to `content`.
    /// `num <= 0` gives an empty list.
    pub fn recommend(&self, content: &str, num: i64) -> Vec<Recommendation> {
        if num <= 0 {
            return Vec::new();
        }
        let n = usize::try_from(num).unwrap_or(usize::MAX);
        self.vectorizer
            .similarity(&self.matrix, content)
            .top_n(n)
            .into_iter()
            .filter_map(|hit| {
                self.dataset.description(hit.row).map(|d| Recommendation {
                    score: hit.score,
                    description: d.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shoes() -> SimilarityIndex {
        let ds = Dataset::from_descriptions(["red shoes for running", "blue shoes for walking", "red hat"]);
        SimilarityIndex::build(ds, TFIDFParams::default()).unwrap()
    }

    #[test]
    fn red_shoes_ranks_running_first() {
        let recs = shoes().recommend("red shoes", 2);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].description, "red shoes for running");
        assert!(recs[1].score <= recs[0].score);
        assert!(recs[0].score > 0.0 && recs[0].score <= 1.0);
    }

    #[test]
    fn unknown_terms_score_zero() {
        let recs = shoes().recommend("zzz nonexistent term xyz", 1);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].score, 0.0);
        // all zero: lowest row wins
        assert_eq!(recs[0].description, "red shoes for running");
    }

    #[test]
    fn num_bounds() {
        let index = shoes();
        assert!(index.recommend("red", 0).is_empty());
        assert!(index.recommend("red", -5).is_empty());
        assert_eq!(index.recommend("red", 100).len(), 3);
        assert_eq!(index.recommend("red", i64::MAX).len(), 3);
    }

    #[test]
    fn recommendation_is_a_json_pair() {
        let r = Recommendation {
            score: 0.5,
            description: "red hat".to_string(),
        };
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"[0.5,"red hat"]"#);
        assert_eq!(serde_json::from_str::<Recommendation>(&json).unwrap(), r);
    }

    #[test]
    fn mismatched_parts_are_rejected() {
        let index = shoes();
        let err = SimilarityIndex::new(
            Dataset::from_descriptions(["only one"]),
            index.vectorizer().clone(),
            index.matrix().clone(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InconsistentIndex { .. }));
    }

    #[test]
    fn empty_description_cells_are_allowed() {
        let ds = Dataset::from_reader("id,description\n1,\n2,red hat\n".as_bytes()).unwrap();
        let index = SimilarityIndex::build(ds, TFIDFParams::default()).unwrap();
        assert_eq!(index.matrix().row(0).unwrap().nnz(), 0);
        assert_eq!(index.recommend("red hat", 1)[0].description, "red hat");
    }
}
