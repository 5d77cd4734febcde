//! Phonetic alignment scoring
//!
//! Words are paired positionally (no insertion/deletion alignment) and each
//! pair is compared on its Metaphone code:
//! - identical codes score 1.0
//! - otherwise 1 - levenshtein(code_a, code_b) / max(len_a, len_b)
//!
//! A word-count mismatch is a defined zero score, not an error.

use rphonetic::{Encoder, Metaphone};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::types::{EvaluationDetails, NormalizedText, PhoneticComparison};

/// Maps a single word to a phonetic code. Must be total (empty in, empty out).
pub trait PhoneticEncoder: Send + Sync {
    fn encode(&self, word: &str) -> String;
}

/// Metaphone encoder (English-oriented), full-length codes
pub struct MetaphoneEncoder {
    metaphone: Metaphone,
}

impl Default for MetaphoneEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaphoneEncoder {
    pub fn new() -> Self {
        Self {
            // rphonetic's default truncates codes to 4 characters
            metaphone: Metaphone::new(usize::MAX),
        }
    }
}

impl PhoneticEncoder for MetaphoneEncoder {
    fn encode(&self, word: &str) -> String {
        if word.is_empty() {
            return String::new();
        }

        // rphonetic can panic on some non-ASCII input
        match catch_unwind(AssertUnwindSafe(|| self.metaphone.encode(word))) {
            Ok(code) => code,
            Err(_) => {
                let ascii: String = word.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
                warn!(
                    "Metaphone panicked on {:?}, retrying with ASCII subset {:?}",
                    word, ascii
                );
                if ascii.is_empty() {
                    return String::new();
                }
                catch_unwind(AssertUnwindSafe(|| self.metaphone.encode(&ascii)))
                    .unwrap_or_default()
            }
        }
    }
}

/// Outcome of aligning two normalized texts
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhoneticReport {
    /// Mean pair similarity in [0, 1]
    pub similarity: f64,
    /// Word counts differed; no pairs were compared
    pub word_count_mismatch: bool,
    pub comparisons: Vec<PhoneticComparison>,
    /// Transcribed words whose code matched the target word's code exactly
    pub correct_words: Vec<String>,
    pub incorrect_words: Vec<String>,
}

impl PhoneticReport {
    pub fn correct_count(&self) -> usize {
        self.correct_words.len()
    }

    pub fn incorrect_count(&self) -> usize {
        self.incorrect_words.len()
    }

    pub fn into_details(self) -> EvaluationDetails {
        EvaluationDetails {
            correct_count: self.correct_words.len(),
            incorrect_count: self.incorrect_words.len(),
            correct_words: self.correct_words,
            incorrect_words: self.incorrect_words,
            phonetic_details: self.comparisons,
        }
    }
}

/// Similarity of two phonetic codes.
///
/// Two empty codes are equal and score 1.0; the zero-length guard only
/// protects the division.
pub fn code_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    let distance = strsim::levenshtein(a, b);
    1.0 - distance as f64 / max_len as f64
}

/// Positional word-by-word phonetic scorer
#[derive(Clone)]
pub struct PhoneticScorer {
    encoder: Arc<dyn PhoneticEncoder>,
}

impl Default for PhoneticScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PhoneticScorer {
    pub fn new() -> Self {
        Self::with_encoder(Arc::new(MetaphoneEncoder::new()))
    }

    pub fn with_encoder(encoder: Arc<dyn PhoneticEncoder>) -> Self {
        Self { encoder }
    }

    pub fn encoder(&self) -> &dyn PhoneticEncoder {
        self.encoder.as_ref()
    }

    /// Align `transcribed` against `target` and score every pair.
    ///
    /// Two empty texts score 1.0 with no pairs.
    pub fn score(&self, transcribed: &NormalizedText, target: &NormalizedText) -> PhoneticReport {
        let transcribed_words = transcribed.words();
        let target_words = target.words();

        if transcribed_words.len() != target_words.len() {
            debug!(
                "Word count mismatch: {} vs {}",
                transcribed_words.len(),
                target_words.len()
            );
            return PhoneticReport {
                similarity: 0.0,
                word_count_mismatch: true,
                ..Default::default()
            };
        }

        if transcribed_words.is_empty() {
            return PhoneticReport {
                similarity: 1.0,
                ..Default::default()
            };
        }

        let mut report = PhoneticReport::default();
        let mut total = 0.0;

        for (spoken, expected) in transcribed_words.iter().zip(&target_words) {
            let phonetic_transcribed = self.encoder.encode(spoken);
            let phonetic_target = self.encoder.encode(expected);
            let is_correct = phonetic_transcribed == phonetic_target;

            total += code_similarity(&phonetic_transcribed, &phonetic_target);

            if is_correct {
                report.correct_words.push(spoken.to_string());
            } else {
                report.incorrect_words.push(spoken.to_string());
            }

            report.comparisons.push(PhoneticComparison {
                transcribed_word: spoken.to_string(),
                target_word: expected.to_string(),
                phonetic_transcribed,
                phonetic_target,
                is_correct,
            });
        }

        report.similarity = total / transcribed_words.len() as f64;
        report
    }

    /// Scalar shortcut for [`PhoneticScorer::score`]
    pub fn phonetic_similarity(
        &self,
        transcribed: &NormalizedText,
        target: &NormalizedText,
    ) -> f64 {
        self.score(transcribed, target).similarity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    /// Uses the uppercased word itself as its code so distances are predictable
    struct IdentityEncoder;

    impl PhoneticEncoder for IdentityEncoder {
        fn encode(&self, word: &str) -> String {
            word.to_uppercase()
        }
    }

    struct SilentEncoder;

    impl PhoneticEncoder for SilentEncoder {
        fn encode(&self, _word: &str) -> String {
            String::new()
        }
    }

    fn identity_scorer() -> PhoneticScorer {
        PhoneticScorer::with_encoder(Arc::new(IdentityEncoder))
    }

    #[test]
    fn test_case_and_punctuation_invariance() {
        let scorer = PhoneticScorer::new();
        let sim = scorer.phonetic_similarity(&normalize("Cat!"), &normalize("cat"));
        assert_eq!(sim, 1.0);
    }

    #[test]
    fn test_word_count_mismatch() {
        let scorer = PhoneticScorer::new();
        let report = scorer.score(&normalize("one two"), &normalize("one"));
        assert_eq!(report.similarity, 0.0);
        assert!(report.word_count_mismatch);
        assert!(report.comparisons.is_empty());
        assert_eq!(report.correct_count() + report.incorrect_count(), 0);
    }

    #[test]
    fn test_identity() {
        let scorer = PhoneticScorer::new();
        let text = normalize("the quick brown fox jumps");
        assert_eq!(scorer.phonetic_similarity(&text, &text), 1.0);
    }

    #[test]
    fn test_homophones_match() {
        let scorer = PhoneticScorer::new();
        let report = scorer.score(&normalize("knight"), &normalize("night"));
        assert_eq!(report.similarity, 1.0);
        assert_eq!(report.correct_words, vec!["knight".to_string()]);
    }

    #[test]
    fn test_empty_texts() {
        let scorer = PhoneticScorer::new();
        let report = scorer.score(&normalize(""), &normalize("   "));
        assert_eq!(report.similarity, 1.0);
        assert!(!report.word_count_mismatch);

        let report = scorer.score(&normalize(""), &normalize("hello"));
        assert_eq!(report.similarity, 0.0);
        assert!(report.word_count_mismatch);
    }

    #[test]
    fn test_codes_are_not_truncated() {
        let encoder = MetaphoneEncoder::new();
        assert_ne!(encoder.encode("understand"), encoder.encode("understood"));
        assert!(encoder.encode("pronunciation").chars().count() > 4);

        let scorer = PhoneticScorer::new();
        let report = scorer.score(&normalize("understand"), &normalize("understood"));
        assert!(report.similarity < 1.0, "got {}", report.similarity);
        assert!(report.correct_words.is_empty());
        assert_eq!(report.incorrect_words, vec!["understand".to_string()]);
    }

    #[test]
    fn test_edit_distance_ratio() {
        let scorer = identity_scorer();
        let report = scorer.score(&normalize("kitten"), &normalize("sitting"));
        // levenshtein = 3, max len = 7
        assert!((report.similarity - (1.0 - 3.0 / 7.0)).abs() < 1e-9);
        assert_eq!(report.incorrect_words, vec!["kitten".to_string()]);
        assert!(!report.comparisons[0].is_correct);
    }

    #[test]
    fn test_mean_over_pairs_and_partition() {
        let scorer = identity_scorer();
        let report = scorer.score(&normalize("hello big world"), &normalize("hello bag world"));
        // pairs: 1.0, 1 - 1/3, 1.0
        let expected = (1.0 + (1.0 - 1.0 / 3.0) + 1.0) / 3.0;
        assert!((report.similarity - expected).abs() < 1e-9);
        assert_eq!(report.correct_count(), 2);
        assert_eq!(report.incorrect_count(), 1);
        assert_eq!(report.comparisons.len(), 3);
        assert_eq!(report.comparisons[1].phonetic_target, "BAG");
    }

    #[test]
    fn test_whitespace_runs_do_not_create_words() {
        let scorer = identity_scorer();
        let report = scorer.score(&normalize("one    two"), &normalize("one two"));
        assert_eq!(report.similarity, 1.0);
    }

    #[test]
    fn test_empty_codes_are_equal() {
        let scorer = PhoneticScorer::with_encoder(Arc::new(SilentEncoder));
        let report = scorer.score(&normalize("123"), &normalize("456"));
        assert_eq!(report.similarity, 1.0);
        assert_eq!(report.correct_count(), 1);
    }

    #[test]
    fn test_code_similarity() {
        assert_eq!(code_similarity("", ""), 1.0);
        assert_eq!(code_similarity("KT", ""), 0.0);
        assert_eq!(code_similarity("KT", "KT"), 1.0);
        assert!((code_similarity("KT", "KS") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_metaphone_total_on_unusual_input() {
        let encoder = MetaphoneEncoder::new();
        assert_eq!(encoder.encode(""), "");
        // Must not panic
        let _ = encoder.encode("ação");
        let _ = encoder.encode("___");
        let _ = encoder.encode("2024");
    }
}
