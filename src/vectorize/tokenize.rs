// Tokenization and n-gram extraction.
//
// Word tokens are lowercase runs of letters, digits, and apostrophes —
// punctuation and whitespace split them. Grams are overlapping windows of
// every order in [min_order, max_order], space-joined back into a single
// string after stopword filtering.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex_lite::Regex;
use stop_words::{get, LANGUAGE};

/// Lowercase word tokens in document order.
pub fn tokenize(text: &str) -> Vec<String> {
    static WORD: OnceLock<Regex> = OnceLock::new();
    let re = WORD.get_or_init(|| Regex::new(r"[a-z0-9']+").expect("literal regex"));
    re.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// The English stop list used for gram filtering.
pub fn english_stopwords() -> HashSet<String> {
    get(LANGUAGE::English).into_iter().collect()
}

/// Extract overlapping grams of every order in `[min_order, max_order]`.
///
/// Filtering is deliberately permissive: a gram is dropped only when *every*
/// constituent token is a stop word. A single content token anywhere keeps
/// the gram, so multi-word phrases anchored on a function word ("of the
/// internet") survive. Pass an empty stop set to disable filtering, as the
/// part-of-speech representation does.
pub fn extract_grams(
    tokens: &[String],
    min_order: usize,
    max_order: usize,
    stopwords: &HashSet<String>,
) -> Vec<String> {
    let mut grams = Vec::new();
    for order in min_order..=max_order {
        if order == 0 || order > tokens.len() {
            continue;
        }
        for window in tokens.windows(order) {
            if !stopwords.is_empty() && window.iter().all(|t| stopwords.contains(t)) {
                continue;
            }
            grams.push(window.join(" "));
        }
    }
    grams
}
