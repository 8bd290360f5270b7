// The document × n-gram matrix builder.
//
// Rows are documents in input order, columns are the grams that survived
// stopword filtering and the weight threshold anywhere in the corpus. The
// matrix is stored sparsely — a high n-gram order over a few thousand
// comments produces far more columns than any one row touches.

use anyhow::Result;
use tracing::info;

use super::tokenize::{english_stopwords, extract_grams, tokenize};
use super::Measure;
use crate::corpus::Document;

/// N-gram extraction parameters: every order in `[min_order, order]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NgramParams {
    pub order: usize,
    pub min_order: usize,
}

impl NgramParams {
    /// Grams of a single order `n`.
    pub fn new(order: usize) -> Result<Self> {
        Self::with_min(order, order)
    }

    /// Grams of every order in `[min_order, order]`.
    pub fn with_min(order: usize, min_order: usize) -> Result<Self> {
        if min_order == 0 || order == 0 {
            anyhow::bail!("n-gram order must be positive");
        }
        if min_order > order {
            anyhow::bail!("minimum n-gram order {min_order} exceeds maximum {order}");
        }
        Ok(Self { order, min_order })
    }
}

/// A sparse document × n-gram weight matrix.
///
/// Absent cells are zero; present cells strictly exceed the build threshold,
/// so every stored weight is positive. Row order matches the input document
/// order and the column set is sorted, which makes the whole structure
/// deterministic for a given input and parameter set.
#[derive(Debug, Clone)]
pub struct DocumentNgramMatrix {
    docids: Vec<String>,
    grams: Vec<String>,
    /// Per row: (column index, weight), sorted by column index.
    rows: Vec<Vec<(usize, f64)>>,
}

impl DocumentNgramMatrix {
    pub fn n_rows(&self) -> usize {
        self.docids.len()
    }

    pub fn n_cols(&self) -> usize {
        self.grams.len()
    }

    pub fn docids(&self) -> &[String] {
        &self.docids
    }

    pub fn grams(&self) -> &[String] {
        &self.grams
    }

    /// Weight of a cell by position; absent cells are 0.0.
    pub fn weight(&self, row: usize, col: usize) -> f64 {
        self.rows[row]
            .binary_search_by_key(&col, |&(c, _)| c)
            .map(|i| self.rows[row][i].1)
            .unwrap_or(0.0)
    }

    /// Weight of a cell by (docid, gram); 0.0 when either is unknown.
    /// Linear in rows — convenience for tests and spot checks, not hot paths.
    pub fn weight_of(&self, docid: &str, gram: &str) -> f64 {
        let row = match self.docids.iter().position(|d| d == docid) {
            Some(r) => r,
            None => return 0.0,
        };
        match self.grams.binary_search_by(|g| g.as_str().cmp(gram)) {
            Ok(col) => self.weight(row, col),
            Err(_) => 0.0,
        }
    }

    /// Sum of a row's stored weights.
    pub fn row_sum(&self, row: usize) -> f64 {
        self.rows[row].iter().map(|&(_, w)| w).sum()
    }

    /// Densify for the clustering library: one Vec per document, zeros
    /// filled in. Memory scales as rows × columns — fine for the sample
    /// sizes this pipeline runs at.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| {
                let mut dense = vec![0.0; self.grams.len()];
                for &(col, weight) in row {
                    dense[col] = weight;
                }
                dense
            })
            .collect()
    }
}

/// Build a matrix over lowercase word n-grams with permissive stopword
/// filtering (a gram drops only when every token is a stop word).
pub fn build_matrix(
    docs: &[Document],
    params: &NgramParams,
    measure: Measure,
    threshold: f64,
) -> DocumentNgramMatrix {
    let stopwords = english_stopwords();
    let streams: Vec<Vec<String>> = docs
        .iter()
        .map(|d| extract_grams(&tokenize(&d.text), params.min_order, params.order, &stopwords))
        .collect();
    let docids = docs.iter().map(|d| d.docid.clone()).collect();
    build_from_gram_streams(docids, streams, measure, threshold)
}

/// Core weighting path, shared by the word and part-of-speech
/// representations. `streams` holds each document's extracted grams, already
/// filtered; this function only counts, weights, thresholds, and pivots.
pub fn build_from_gram_streams(
    docids: Vec<String>,
    streams: Vec<Vec<String>>,
    measure: Measure,
    threshold: f64,
) -> DocumentNgramMatrix {
    use std::collections::HashMap;

    let n_docs = docids.len();

    // Per-document gram counts and totals.
    let mut counts: Vec<HashMap<&str, usize>> = Vec::with_capacity(n_docs);
    for grams in &streams {
        let mut map: HashMap<&str, usize> = HashMap::new();
        for gram in grams {
            *map.entry(gram.as_str()).or_insert(0) += 1;
        }
        counts.push(map);
    }

    // Document frequency per gram, corpus-wide.
    let mut df: HashMap<&str, usize> = HashMap::new();
    for map in &counts {
        for gram in map.keys() {
            *df.entry(gram).or_insert(0) += 1;
        }
    }

    // Weight each (doc, gram) cell and keep the ones above threshold.
    let mut cells: Vec<Vec<(&str, f64)>> = Vec::with_capacity(n_docs);
    for (grams, map) in streams.iter().zip(&counts) {
        let total = grams.len() as f64;
        let mut row = Vec::new();
        if total > 0.0 {
            for (&gram, &count) in map {
                let tf = count as f64 / total;
                let idf = (n_docs as f64 / df[gram] as f64).ln();
                let weight = match measure {
                    Measure::Tf => tf,
                    Measure::Idf => idf,
                    Measure::TfIdf => tf * idf,
                };
                if weight > threshold {
                    row.push((gram, weight));
                }
            }
        }
        cells.push(row);
    }

    // The column set is exactly the grams that survived anywhere, sorted.
    let mut grams: Vec<String> = cells
        .iter()
        .flat_map(|row| row.iter().map(|&(g, _)| g.to_string()))
        .collect();
    grams.sort_unstable();
    grams.dedup();

    let col_index: HashMap<&str, usize> = grams
        .iter()
        .enumerate()
        .map(|(i, g)| (g.as_str(), i))
        .collect();

    let rows: Vec<Vec<(usize, f64)>> = cells
        .into_iter()
        .map(|row| {
            let mut sparse: Vec<(usize, f64)> =
                row.into_iter().map(|(g, w)| (col_index[g], w)).collect();
            sparse.sort_unstable_by_key(|&(c, _)| c);
            sparse
        })
        .collect();

    info!(
        documents = n_docs,
        grams = grams.len(),
        measure = %measure,
        "Built document × n-gram matrix"
    );

    DocumentNgramMatrix {
        docids,
        grams,
        rows,
    }
}
