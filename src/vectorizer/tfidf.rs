use indexmap::IndexSet;

use crate::{utils::math::vector::ZeroSpVec, vectorizer::{corpus::Corpus, token::TermFrequency}};

pub trait TFIDFEngine {
    /// IDF weight per vocabulary column
    /// # Arguments
    /// * `corpus` - document frequencies of the training set
    /// * `vocabulary` - column order
    fn idf_vec(corpus: &Corpus, vocabulary: &IndexSet<Box<str>>) -> Vec<f64>;

    /// TF vector in vocabulary space. Terms outside the vocabulary are dropped.
    fn tf_vec(freq: &TermFrequency, vocabulary: &IndexSet<Box<str>>) -> ZeroSpVec<f64>;

    /// Weighted, L2-normalized document row.
    fn tf_idf_vec(freq: &TermFrequency, vocabulary: &IndexSet<Box<str>>, idf: &[f64]) -> ZeroSpVec<f64> {
        let mut vec = Self::tf_vec(freq, vocabulary);
        vec.mul_dense(idf);
        vec.l2_normalize();
        vec
    }
}

/// デフォルトのTF-IDFエンジン
/// - tf: raw count
/// - idf: smoothed, `ln((1 + n) / (1 + df)) + 1`
/// - rows: L2 normalized
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTFIDFEngine;

impl TFIDFEngine for DefaultTFIDFEngine {
    fn idf_vec(corpus: &Corpus, vocabulary: &IndexSet<Box<str>>) -> Vec<f64> {
        let doc_num = corpus.get_doc_num() as f64;
        vocabulary
            .iter()
            .map(|term| {
                let df = corpus.get_term_count(term) as f64;
                ((1.0 + doc_num) / (1.0 + df)).ln() + 1.0
            })
            .collect()
    }

    fn tf_vec(freq: &TermFrequency, vocabulary: &IndexSet<Box<str>>) -> ZeroSpVec<f64> {
        let pairs = freq.iter().filter_map(|(term, count)| {
            vocabulary
                .get_index_of(term)
                .map(|idx| (idx, count as f64))
        });
        ZeroSpVec::from_pairs(vocabulary.len(), pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(terms: &[&str]) -> IndexSet<Box<str>> {
        terms.iter().map(|t| Box::<str>::from(*t)).collect()
    }

    #[test]
    fn smooth_idf_values() {
        let mut corpus = Corpus::new();
        corpus.add_set(&["red", "shoes"]);
        corpus.add_set(&["blue", "shoes"]);
        corpus.add_set(&["red"]);
        let idf = DefaultTFIDFEngine::idf_vec(&corpus, &vocab(&["blue", "red", "shoes"]));
        assert!((idf[0] - ((4.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
        assert!((idf[1] - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert_eq!(idf[1], idf[2]);
    }

    #[test]
    fn tf_vec_drops_unknown_terms() {
        let mut freq = TermFrequency::new();
        freq.add_terms(&["red", "zzz", "red", "hat"]);
        let v = DefaultTFIDFEngine::tf_vec(&freq, &vocab(&["hat", "red", "shoes"]));
        assert_eq!(v.to_dense(), vec![1.0, 2.0, 0.0]);
    }

    #[test]
    fn tf_idf_vec_is_unit_length() {
        let mut freq = TermFrequency::new();
        freq.add_terms(&["red", "hat"]);
        let v = DefaultTFIDFEngine::tf_idf_vec(&freq, &vocab(&["hat", "red"]), &[2.0, 1.0]);
        assert!((v.norm() - 1.0).abs() < 1e-12);
        assert!(v.get(0).unwrap() > v.get(1).unwrap());
    }
}
