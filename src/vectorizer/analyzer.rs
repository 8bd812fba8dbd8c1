use std::sync::OnceLock;

use regex::Regex;

use crate::vectorizer::{stop_words::is_english_stop_word, token::TermFrequency, StopWords, TFIDFParams};

/// Two or more word characters between word boundaries.
fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"))
}

/// Word analyzer
/// text -> lowercase -> word tokens -> stop word filter -> n-grams
#[derive(Debug, Clone)]
pub struct Analyzer {
    lowercase: bool,
    ngram_range: (usize, usize),
    stop_words: StopWords,
}

impl Analyzer {
    pub fn new(params: &TFIDFParams) -> Self {
        Self {
            lowercase: params.lowercase,
            ngram_range: params.ngram_range,
            stop_words: params.stop_words,
        }
    }

    /// Split text into word tokens with stop words removed.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        token_pattern()
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|tok| match self.stop_words {
                StopWords::English => !is_english_stop_word(tok),
                StopWords::None => true,
            })
            .map(str::to_string)
            .collect()
    }

    /// Every contiguous n-gram for n in the configured range, joined by one space.
    pub fn ngrams(&self, tokens: &[String]) -> Vec<String> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 1 && max_n == 1 {
            return tokens.to_vec();
        }
        let mut out = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                out.push(window.join(" "));
            }
        }
        out
    }

    /// Term counts of one document
    pub fn analyze(&self, text: &str) -> TermFrequency {
        let terms = self.ngrams(&self.tokenize(text));
        let mut freq = TermFrequency::new();
        freq.add_terms(&terms);
        freq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer(ngram_range: (usize, usize), stop_words: StopWords) -> Analyzer {
        Analyzer::new(&TFIDFParams {
            ngram_range,
            stop_words,
            ..TFIDFParams::default()
        })
    }

    #[test]
    fn tokenize_lowercases_and_drops_short_and_stop_words() {
        let a = analyzer((1, 1), StopWords::English);
        assert_eq!(
            a.tokenize("Red Shoes for Running, a 5k!"),
            vec!["red", "shoes", "running", "5k"]
        );
        let a = analyzer((1, 1), StopWords::None);
        assert_eq!(a.tokenize("shoes for x"), vec!["shoes", "for"]);
    }

    #[test]
    fn tokenize_handles_unicode_words() {
        let a = analyzer((1, 1), StopWords::English);
        assert_eq!(a.tokenize("Crème brûlée_v2"), vec!["crème", "brûlée_v2"]);
    }

    #[test]
    fn ngrams_are_built_after_stop_word_removal() {
        let a = analyzer((1, 3), StopWords::English);
        let terms = a.ngrams(&a.tokenize("red shoes for running"));
        assert_eq!(
            terms,
            vec![
                "red",
                "shoes",
                "running",
                "red shoes",
                "shoes running",
                "red shoes running"
            ]
        );
    }

    #[test]
    fn ngram_range_longer_than_document() {
        let a = analyzer((2, 3), StopWords::English);
        assert!(a.ngrams(&a.tokenize("hat")).is_empty());
        let freq = a.analyze("red hat red hat");
        assert_eq!(freq.term_count("red hat"), 2);
        assert_eq!(freq.term_count("hat red"), 1);
        assert_eq!(freq.term_count("red"), 0);
    }
}
