//! Text normalization ahead of phonetic and semantic scoring

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::NormalizedText;

/// Anything that is neither a word character nor whitespace (Unicode-aware)
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

/// Lowercase, strip punctuation/symbols/emoji, trim.
///
/// Internal whitespace runs are kept as-is; word splitting downstream
/// tolerates them.
pub fn normalize(text: &str) -> NormalizedText {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    NormalizedText::new_unchecked(stripped.trim().to_string())
}
