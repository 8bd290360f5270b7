// Comment corpus — the document table and its loading rules.
//
// A docket export is a CSV with one row per public comment. Only two columns
// are required: `docid` and `text_data`. The optional `dupe_count` and
// ground-truth astroturf columns ride along for the evaluation step; the
// vectorizer never looks at them.

pub mod sample;

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SchemaError;

/// One public comment, immutable once sampled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique, stable identifier from the docket export.
    pub docid: String,
    /// Raw comment text (UTF-8).
    pub text: String,
    /// How many near-identical submissions the export collapsed into this row.
    pub dupe_count: Option<u32>,
    /// Human ground-truth label: was this comment judged astroturf?
    /// Consumed only by evaluation; absent for unlabeled comments.
    pub is_astroturf: Option<bool>,
}

/// Load a comment table from CSV.
///
/// Required columns: `docid`, `text_data`. Optional: `dupe_count`, and the
/// ground-truth label under either `is_astroturf` or the export's original
/// `level_0` header. Missing required columns fail fast with a
/// [`SchemaError`] before any row is processed; a duplicate docid aborts
/// the load.
pub fn load_comments(path: &Path) -> Result<Vec<Document>> {
    let mut reader = csv::ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("failed to open comment table {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h == name);

    let docid_idx = col("docid").ok_or_else(|| SchemaError::MissingColumn("docid".into()))?;
    let text_idx =
        col("text_data").ok_or_else(|| SchemaError::MissingColumn("text_data".into()))?;
    let dupe_idx = col("dupe_count");
    // The hand-labeled export called this column `level_0`; accept both.
    let truth_idx = col("is_astroturf").or_else(|| col("level_0"));

    let mut docs = Vec::new();
    let mut seen = HashSet::new();
    for record in reader.records() {
        let record = record?;
        let docid = record.get(docid_idx).unwrap_or_default().to_string();
        if !seen.insert(docid.clone()) {
            return Err(SchemaError::DuplicateDocid(docid).into());
        }
        docs.push(Document {
            docid,
            text: record.get(text_idx).unwrap_or_default().to_string(),
            dupe_count: dupe_idx
                .and_then(|i| record.get(i))
                .and_then(|v| v.parse().ok()),
            is_astroturf: truth_idx
                .and_then(|i| record.get(i))
                .and_then(parse_truth_label),
        });
    }

    info!(
        path = %path.display(),
        documents = docs.len(),
        labeled = docs.iter().filter(|d| d.is_astroturf.is_some()).count(),
        "Loaded comment table"
    );
    Ok(docs)
}

/// Parse a ground-truth cell. The hand labeling used 0/1; be tolerant of
/// boolean spellings but never guess at anything else.
fn parse_truth_label(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_required_and_optional_columns() {
        let file = write_csv(
            "docid,text_data,dupe_count,is_astroturf\n\
             d1,net neutrality matters,3,1\n\
             d2,please reconsider,,0\n\
             d3,no label here,,\n",
        );
        let docs = load_comments(file.path()).unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].dupe_count, Some(3));
        assert_eq!(docs[0].is_astroturf, Some(true));
        assert_eq!(docs[1].is_astroturf, Some(false));
        assert_eq!(docs[2].is_astroturf, None);
    }

    #[test]
    fn accepts_level_0_as_truth_header() {
        let file = write_csv("docid,text_data,level_0\nd1,text,1\n");
        let docs = load_comments(file.path()).unwrap();
        assert_eq!(docs[0].is_astroturf, Some(true));
    }

    #[test]
    fn missing_text_column_is_schema_error() {
        let file = write_csv("docid,body\nd1,text\n");
        let err = load_comments(file.path()).unwrap_err();
        let schema = err.downcast_ref::<SchemaError>().expect("typed error");
        assert_eq!(*schema, SchemaError::MissingColumn("text_data".into()));
    }

    #[test]
    fn duplicate_docid_is_schema_error() {
        let file = write_csv("docid,text_data\nd1,a\nd1,b\n");
        let err = load_comments(file.path()).unwrap_err();
        assert!(err.downcast_ref::<SchemaError>().is_some());
    }
}
