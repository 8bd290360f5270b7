// Cluster-assignment cache — swap-ready abstraction.
//
// The cluster runner never touches the filesystem directly; it talks to this
// key-value interface. Production uses CsvCache (one clusters_<model>.csv
// per key inside the run directory). Tests use MemoryCache. The
// check-then-write sequence is not atomic — concurrent writers to the same
// key must be serialized by the caller.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cluster::ClusterAssignment;

pub trait AssignmentCache {
    /// Is there a stored result for this model key?
    fn exists(&self, key: &str) -> bool;

    /// Load the stored result for this key, verbatim.
    fn read(&self, key: &str) -> Result<Vec<ClusterAssignment>>;

    /// Persist a result under this key, replacing anything already there.
    fn write(&self, key: &str, rows: &[ClusterAssignment]) -> Result<()>;
}

/// Directory-backed cache: each key becomes `clusters_<key>.csv` with the
/// header `docid,cluster,membership_prob,outlier_scores`.
pub struct CsvCache {
    dir: PathBuf,
}

impl CsvCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The file a key maps to. Pure function of the key — the cache never
    /// inspects contents to decide freshness.
    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("clusters_{key}.csv"))
    }
}

impl AssignmentCache for CsvCache {
    fn exists(&self, key: &str) -> bool {
        self.path(key).exists()
    }

    fn read(&self, key: &str) -> Result<Vec<ClusterAssignment>> {
        let path = self.path(key);
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("failed to open cache entry {}", path.display()))?;
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record?);
        }
        Ok(rows)
    }

    fn write(&self, key: &str, rows: &[ClusterAssignment]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create cache dir {}", self.dir.display()))?;
        let path = self.path(key);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create cache entry {}", path.display()))?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// List the model keys with cache entries in a run directory.
pub fn cached_models(dir: &Path) -> Vec<String> {
    let mut keys = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return keys;
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(key) = name
            .strip_prefix("clusters_")
            .and_then(|rest| rest.strip_suffix(".csv"))
        {
            keys.push(key.to_string());
        }
    }
    keys.sort();
    keys
}

/// In-memory cache for tests. Single-threaded by construction, like the
/// rest of the pipeline.
#[derive(Default)]
pub struct MemoryCache {
    entries: RefCell<HashMap<String, Vec<ClusterAssignment>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssignmentCache for MemoryCache {
    fn exists(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    fn read(&self, key: &str) -> Result<Vec<ClusterAssignment>> {
        self.entries
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no cache entry for key '{key}'"))
    }

    fn write(&self, key: &str, rows: &[ClusterAssignment]) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), rows.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<ClusterAssignment> {
        vec![
            ClusterAssignment {
                docid: "d1".into(),
                cluster: 0,
                membership_prob: 0.9,
                outlier_score: 0.1,
            },
            ClusterAssignment {
                docid: "d2".into(),
                cluster: -1,
                membership_prob: 0.0,
                outlier_score: 2.5,
            },
        ]
    }

    #[test]
    fn csv_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path());
        assert!(!cache.exists("word_2_tf"));

        cache.write("word_2_tf", &rows()).unwrap();
        assert!(cache.exists("word_2_tf"));

        let loaded = cache.read("word_2_tf").unwrap();
        assert_eq!(loaded, rows());
    }

    #[test]
    fn csv_cache_header_matches_the_export_format() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path());
        cache.write("pos_3_tfidf", &rows()).unwrap();

        let contents = std::fs::read_to_string(cache.path("pos_3_tfidf")).unwrap();
        assert!(contents.starts_with("docid,cluster,membership_prob,outlier_scores\n"));
    }

    #[test]
    fn cached_models_lists_keys() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path());
        cache.write("word_2_tf", &rows()).unwrap();
        cache.write("pos_3_idf", &rows()).unwrap();
        std::fs::write(dir.path().join("sample.csv"), "docid,text_data\n").unwrap();

        assert_eq!(
            cached_models(dir.path()),
            vec!["pos_3_idf".to_string(), "word_2_tf".to_string()]
        );
    }

    #[test]
    fn memory_cache_read_missing_key_errors() {
        let cache = MemoryCache::new();
        assert!(cache.read("nope").is_err());
    }
}
