use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// TermFrequency
/// Counts how often each term occurs inside one document.
/// Terms keep their first-seen order.
///
/// # Examples
/// ```
/// use content_engine::TermFrequency;
/// let mut freq = TermFrequency::new();
/// freq.add_terms(&["red", "shoes", "red"]);
/// assert_eq!(freq.term_count("red"), 2);
/// assert_eq!(freq.term_sum(), 3);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TermFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    term_count: IndexMap<String, u32>,
    total_term_count: u64,
}

impl TermFrequency {
    pub fn new() -> Self {
        TermFrequency {
            term_count: IndexMap::new(),
            total_term_count: 0,
        }
    }

    /// termを追加する
    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        if let Some(count) = self.term_count.get_mut(term) {
            *count += 1;
        } else {
            self.term_count.insert(term.to_string(), 1);
        }
        self.total_term_count += 1;
        self
    }

    #[inline]
    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }

    /// Set the count of a term directly.
    /// A count of 0 removes the term.
    pub fn set_term_count(&mut self, term: &str, count: u32) -> &mut Self {
        let old = self.term_count.get(term).copied().unwrap_or(0);
        self.total_term_count = self.total_term_count - old as u64 + count as u64;
        if count == 0 {
            self.term_count.shift_remove(term);
        } else {
            self.term_count.insert(term.to_string(), count);
        }
        self
    }

    #[inline]
    pub fn term_count(&self, term: &str) -> u32 {
        self.term_count.get(term).copied().unwrap_or(0)
    }

    /// Total number of terms (with repetition)
    #[inline]
    pub fn term_sum(&self) -> u64 {
        self.total_term_count
    }

    /// Number of distinct terms
    #[inline]
    pub fn term_num(&self) -> usize {
        self.term_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.term_count.is_empty()
    }

    /// Distinct terms in first-seen order
    #[inline]
    pub fn term_set_ref_str(&self) -> Vec<&str> {
        self.term_count.keys().map(|s| s.as_str()).collect()
    }

    /// `(term, count)` in first-seen order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.term_count.iter().map(|(t, &c)| (t.as_str(), c))
    }

    pub fn clear(&mut self) {
        self.term_count.clear();
        self.total_term_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_terms_and_totals() {
        let mut freq = TermFrequency::new();
        freq.add_terms(&["a b", "c", "a b"]).add_term("d");
        assert_eq!(freq.term_count("a b"), 2);
        assert_eq!(freq.term_count("missing"), 0);
        assert_eq!(freq.term_sum(), 4);
        assert_eq!(freq.term_num(), 3);
        assert_eq!(freq.term_set_ref_str(), vec!["a b", "c", "d"]);
    }

    #[test]
    fn set_term_count_keeps_total_consistent() {
        let mut freq = TermFrequency::new();
        freq.add_terms(&["x", "x", "y"]);
        freq.set_term_count("x", 5);
        assert_eq!(freq.term_sum(), 6);
        freq.set_term_count("y", 0);
        assert_eq!(freq.term_sum(), 5);
        assert_eq!(freq.term_num(), 1);
    }
}
