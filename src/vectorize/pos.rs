// Part-of-speech representation — tagging behind a swap-ready trait.
//
// The pipeline only needs one tag per token; where the tags come from is
// somebody else's problem. The default implementation is a small
// suffix-and-lexicon heuristic that is adequate for tests and demos — a real
// annotation model plugs in behind the same trait without touching the
// matrix machinery.

use std::collections::HashSet;

use super::matrix::{build_from_gram_streams, DocumentNgramMatrix, NgramParams};
use super::tokenize::{extract_grams, tokenize};
use super::Measure;
use crate::corpus::Document;

/// Maps word tokens to part-of-speech tags, one tag per token.
pub trait Tagger {
    fn tag(&self, tokens: &[String]) -> Vec<String>;
}

/// Heuristic tagger: closed-class lexicons first, then suffix rules,
/// defaulting to noun. Uses the Penn-style tag names so its output reads
/// like any other tagger's.
pub struct HeuristicTagger;

impl HeuristicTagger {
    fn tag_one(token: &str) -> &'static str {
        const DETERMINERS: &[&str] = &["the", "a", "an", "this", "that", "these", "those"];
        const ADPOSITIONS: &[&str] = &[
            "of", "in", "on", "at", "by", "for", "with", "to", "from", "and", "or", "but",
        ];
        const PRONOUNS: &[&str] = &[
            "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
        ];
        const AUXILIARIES: &[&str] = &[
            "is", "are", "was", "were", "be", "been", "am", "do", "does", "did", "have", "has",
            "had", "will", "would", "can", "could", "should", "may", "might",
        ];

        if token.chars().all(|c| c.is_ascii_digit()) {
            "CD"
        } else if DETERMINERS.contains(&token) {
            "DT"
        } else if ADPOSITIONS.contains(&token) {
            "IN"
        } else if PRONOUNS.contains(&token) {
            "PRP"
        } else if AUXILIARIES.contains(&token) {
            "VB"
        } else if token.ends_with("ly") {
            "RB"
        } else if token.ends_with("ing") || token.ends_with("ed") {
            "VB"
        } else if ["ous", "ful", "ive", "ble", "cal"]
            .iter()
            .any(|s| token.ends_with(s))
        {
            "JJ"
        } else {
            "NN"
        }
    }
}

impl Tagger for HeuristicTagger {
    fn tag(&self, tokens: &[String]) -> Vec<String> {
        tokens
            .iter()
            .map(|t| Self::tag_one(t).to_string())
            .collect()
    }
}

/// Build a matrix over part-of-speech n-grams.
///
/// Same counting, weighting, and thresholding as the word representation,
/// but over tag sequences. Stopword filtering does not apply — a tag gram
/// like "DT NN" is structural signal, not vocabulary.
pub fn build_pos_matrix(
    docs: &[Document],
    tagger: &dyn Tagger,
    params: &NgramParams,
    measure: Measure,
    threshold: f64,
) -> DocumentNgramMatrix {
    let no_stopwords = HashSet::new();
    let streams: Vec<Vec<String>> = docs
        .iter()
        .map(|d| {
            let tags = tagger.tag(&tokenize(&d.text));
            extract_grams(&tags, params.min_order, params.order, &no_stopwords)
        })
        .collect();
    let docids = docs.iter().map(|d| d.docid.clone()).collect();
    build_from_gram_streams(docids, streams, measure, threshold)
}
