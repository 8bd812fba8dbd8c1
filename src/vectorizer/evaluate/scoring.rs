use std::{cmp::Ordering, fmt::Debug};

use crate::{utils::math::matrix::CsMatrix, vectorizer::{tfidf::TFIDFEngine, TFIDFVectorizer}};

/// One scored document row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEntry {
    /// row index in the term-document matrix
    pub row: usize,
    pub score: f64,
}

/// Structure to store search results
pub struct Hits {
    pub list: Vec<HitEntry>,
}

/// Descending score, then ascending row for equal scores.
#[inline]
fn rank_order(a: &HitEntry, b: &HitEntry) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.row.cmp(&b.row))
}

impl Hits {
    /// Scores in row order: `scores[i]` belongs to row `i`.
    pub fn from_scores(scores: Vec<f64>) -> Self {
        Hits {
            list: scores
                .into_iter()
                .enumerate()
                .map(|(row, score)| HitEntry { row, score })
                .collect(),
        }
    }

    /// Keep the `n` best hits, ranked.
    /// Selects before sorting, so only the kept hits are fully ordered.
    pub fn top_n(mut self, n: usize) -> Vec<HitEntry> {
        self.list.retain(|h| !h.score.is_nan());
        if n == 0 {
            return Vec::new();
        }
        if n < self.list.len() {
            self.list.select_nth_unstable_by(n - 1, rank_order);
            self.list.truncate(n);
        }
        self.list.sort_by(rank_order);
        self.list
    }
}

impl Debug for Hits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            writeln!(f, "Hits [")?;
            for h in &self.list {
                writeln!(f, "    {}: {:.6}", h.row, h.score)?;
            }
            write!(f, "]")
        } else {
            f.debug_list().entries(&self.list).finish()
        }
    }
}

impl<E> TFIDFVectorizer<E>
where
    E: TFIDFEngine,
{
    /// Cosine similarity between `query` and every row of `matrix`.
    /// Rows and the query are L2 normalized, so this is the linear kernel.
    /// Scores are clamped into [0, 1] against rounding.
    pub fn similarity(&self, matrix: &CsMatrix<f64>, query: &str) -> Hits {
        let q = self.transform_one(query);
        let scores = matrix
            .linear_kernel(&q)
            .into_iter()
            .map(|s| s.clamp(0.0, 1.0))
            .collect();
        Hits::from_scores(scores)
    }
}
