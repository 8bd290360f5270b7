// Seeded sampling — reproducible draws from the full docket export.
//
// A sample is fully determined by (n, seed), which is also how its artifact
// directory is named. Re-running with the same pair always reproduces the
// same sample.csv, so every downstream matrix and clustering is addressable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use super::Document;

/// File name of the persisted sample inside a run directory.
pub const SAMPLE_FILE: &str = "sample.csv";

/// Draw `n` documents uniformly without replacement, deterministically.
///
/// The drawn rows keep the input table's relative order, so the sample (and
/// everything derived from it) is stable for a given (n, seed) regardless of
/// how the random indices came out.
pub fn draw(docs: &[Document], n: usize, seed: u64) -> Result<Vec<Document>> {
    if n > docs.len() {
        anyhow::bail!(
            "Sample size {n} exceeds the {} documents in the export",
            docs.len()
        );
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = rand::seq::index::sample(&mut rng, docs.len(), n).into_vec();
    indices.sort_unstable();

    let sampled: Vec<Document> = indices.into_iter().map(|i| docs[i].clone()).collect();
    info!(n, seed, "Drew comment sample");
    Ok(sampled)
}

/// Persist a sample into its run directory as `sample.csv`.
pub fn save(dir: &Path, docs: &[Document]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create run directory {}", dir.display()))?;
    let path = dir.join(SAMPLE_FILE);

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(["docid", "text_data", "dupe_count", "is_astroturf"])?;
    for doc in docs {
        let dupe = doc.dupe_count.map(|d| d.to_string()).unwrap_or_default();
        let truth = match doc.is_astroturf {
            Some(true) => "1",
            Some(false) => "0",
            None => "",
        };
        writer.write_record([doc.docid.as_str(), doc.text.as_str(), dupe.as_str(), truth])?;
    }
    writer.flush()?;
    Ok(path)
}

/// Load a previously drawn sample from its run directory.
pub fn load(dir: &Path) -> Result<Vec<Document>> {
    let path = dir.join(SAMPLE_FILE);
    if !path.exists() {
        anyhow::bail!(
            "No sample found in {}\n\
             Run `thatch sample` with the same --n and --seed first.",
            dir.display()
        );
    }
    super::load_comments(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(len: usize) -> Vec<Document> {
        (0..len)
            .map(|i| Document {
                docid: format!("d{i}"),
                text: format!("comment number {i}"),
                dupe_count: None,
                is_astroturf: Some(i % 2 == 0),
            })
            .collect()
    }

    #[test]
    fn same_seed_same_sample() {
        let docs = corpus(100);
        let a = draw(&docs, 10, 7).unwrap();
        let b = draw(&docs, 10, 7).unwrap();
        let ids = |s: &[Document]| s.iter().map(|d| d.docid.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn different_seed_different_sample() {
        let docs = corpus(100);
        let a = draw(&docs, 10, 7).unwrap();
        let b = draw(&docs, 10, 8).unwrap();
        let ids = |s: &[Document]| s.iter().map(|d| d.docid.clone()).collect::<Vec<_>>();
        assert_ne!(ids(&a), ids(&b));
    }

    #[test]
    fn oversized_sample_is_an_error() {
        let docs = corpus(5);
        assert!(draw(&docs, 6, 0).is_err());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let docs = corpus(20);
        let sampled = draw(&docs, 8, 42).unwrap();
        save(dir.path(), &sampled).unwrap();

        let loaded = load(dir.path()).unwrap();
        assert_eq!(loaded.len(), 8);
        for (a, b) in sampled.iter().zip(&loaded) {
            assert_eq!(a.docid, b.docid);
            assert_eq!(a.text, b.text);
            assert_eq!(a.is_astroturf, b.is_astroturf);
        }
    }
}
