// Vectorization — turning comments into sparse document × n-gram matrices.
//
// Three weighting measures over two representations (word n-grams and
// part-of-speech n-grams). The matrix builder is the workhorse of the whole
// pipeline: everything downstream just clusters whatever it produces.

pub mod matrix;
pub mod pos;
pub mod tokenize;

pub use matrix::{build_matrix, DocumentNgramMatrix, NgramParams};

use std::fmt;
use std::str::FromStr;

/// Weighting measure for a matrix cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// Term frequency: gram count / total grams in the document.
    Tf,
    /// Inverse document frequency: ln(N docs / docs containing the gram).
    Idf,
    /// The product of the two. Discounts grams common across the corpus.
    TfIdf,
}

impl Measure {
    /// Short name used inside model cache keys (`word_2_tfidf` etc.).
    pub fn as_str(&self) -> &'static str {
        match self {
            Measure::Tf => "tf",
            Measure::Idf => "idf",
            Measure::TfIdf => "tfidf",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Measure {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tf" => Ok(Measure::Tf),
            "idf" => Ok(Measure::Idf),
            "tfidf" | "tf-idf" => Ok(Measure::TfIdf),
            other => anyhow::bail!("Unknown measure '{other}' (expected tf, idf, or tfidf)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_parses_both_tfidf_spellings() {
        assert_eq!("tfidf".parse::<Measure>().unwrap(), Measure::TfIdf);
        assert_eq!("tf-idf".parse::<Measure>().unwrap(), Measure::TfIdf);
        assert!("bm25".parse::<Measure>().is_err());
    }
}
