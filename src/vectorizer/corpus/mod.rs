use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::vectorizer::token::TermFrequency;

/// Keeps the document count and the number of documents each term occurs in.
/// It does not store document text, only the statistics IDF is computed from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    /// number of documents added
    pub doc_num: u64,
    /// term -> document frequency
    #[serde(with = "indexmap::map::serde_seq")]
    pub term_counts: IndexMap<Box<str>, u64>,
}

impl Corpus {
    pub fn new() -> Self {
        Self {
            doc_num: 0,
            term_counts: IndexMap::new(),
        }
    }

    /// Add a document's distinct terms to the corpus
    pub fn add_set<T>(&mut self, terms: &[T])
    where
        T: AsRef<str>,
    {
        self.doc_num += 1;
        for term in terms {
            if let Some(count) = self.term_counts.get_mut(term.as_ref()) {
                *count += 1;
            } else {
                self.term_counts.insert(term.as_ref().into(), 1);
            }
        }
    }

    /// Add one document by its term frequency
    #[inline]
    pub fn add_doc(&mut self, freq: &TermFrequency) {
        self.add_set(&freq.term_set_ref_str());
    }

    #[inline]
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num
    }

    /// Number of documents containing `term`
    #[inline]
    pub fn get_term_count(&self, term: &str) -> u64 {
        self.term_counts.get(term).copied().unwrap_or(0)
    }

    /// Current vocabulary size (number of unique terms)
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.term_counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.term_counts.iter().map(|(t, &c)| (t.as_ref(), c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_documents_not_occurrences() {
        let mut corpus = Corpus::new();
        let mut a = TermFrequency::new();
        a.add_terms(&["red", "red", "shoes"]);
        let mut b = TermFrequency::new();
        b.add_terms(&["red", "hat"]);
        corpus.add_doc(&a);
        corpus.add_doc(&b);

        assert_eq!(corpus.get_doc_num(), 2);
        assert_eq!(corpus.get_term_count("red"), 2);
        assert_eq!(corpus.get_term_count("shoes"), 1);
        assert_eq!(corpus.get_term_count("blue"), 0);
        assert_eq!(corpus.vocab_size(), 3);
    }
}
