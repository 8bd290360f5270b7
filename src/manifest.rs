// Run manifest — what was built into a run directory, and when.
//
// One manifest.json per <n>_<seed> directory. Purely informational: the
// cache files are the source of truth for results, the manifest just makes
// `thatch status` useful without re-parsing every CSV.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunManifest {
    pub runs: Vec<RunRecord>,
}

/// One clustering run over this directory's sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub model: String,
    pub built_at: DateTime<Utc>,
    pub documents: usize,
    pub clusters: usize,
    pub noise: usize,
}

impl RunManifest {
    /// Load the directory's manifest, or an empty one if none exists yet.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Record a run, replacing any earlier record for the same model key.
    pub fn record(&mut self, record: RunRecord) {
        self.runs.retain(|r| r.model != record.model);
        self.runs.push(record);
        self.runs.sort_by(|a, b| a.model.cmp(&b.model));
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(model: &str, documents: usize) -> RunRecord {
        RunRecord {
            model: model.to_string(),
            built_at: Utc::now(),
            documents,
            clusters: 2,
            noise: 3,
        }
    }

    #[test]
    fn record_replaces_same_model() {
        let mut manifest = RunManifest::default();
        manifest.record(record("word_2_tf", 100));
        manifest.record(record("word_2_tf", 200));
        assert_eq!(manifest.runs.len(), 1);
        assert_eq!(manifest.runs[0].documents, 200);
    }

    #[test]
    fn load_missing_manifest_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = RunManifest::load(dir.path()).unwrap();
        assert!(manifest.runs.is_empty());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = RunManifest::default();
        manifest.record(record("pos_3_tfidf", 50));
        manifest.save(dir.path()).unwrap();

        let loaded = RunManifest::load(dir.path()).unwrap();
        assert_eq!(loaded.runs.len(), 1);
        assert_eq!(loaded.runs[0].model, "pos_3_tfidf");
    }
}
