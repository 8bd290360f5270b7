use std::env;
use std::path::PathBuf;

use anyhow::Result;

/// Central configuration loaded from environment variables.
///
/// Paths come from env vars with sensible defaults. The .env file is loaded
/// automatically at startup via dotenvy, so a checked-out analysis directory
/// can pin its own data locations.
pub struct Config {
    /// Root directory for run artifacts. Each run writes into a
    /// `<n>_<seed>` subdirectory so artifacts are addressable by the two
    /// parameters that make a sample reproducible.
    pub data_dir: PathBuf,
    /// The full docket export — one row per public comment.
    pub comments_csv: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default: `./data` for artifacts and
    /// `./comments.csv` for the docket export.
    pub fn load() -> Result<Self> {
        Ok(Self {
            data_dir: env::var("THATCH_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            comments_csv: env::var("THATCH_COMMENTS_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./comments.csv")),
        })
    }

    /// Directory holding every artifact for one (sample size, seed) run.
    pub fn sample_dir(&self, n: usize, seed: u64) -> PathBuf {
        self.data_dir.join(format!("{n}_{seed}"))
    }

    /// Check that the docket export exists.
    /// Call this before any operation that reads the full comment table.
    pub fn require_comments(&self) -> Result<()> {
        if !self.comments_csv.exists() {
            anyhow::bail!(
                "Comment export not found at {}\n\
                 Set THATCH_COMMENTS_CSV in your .env to point at the docket CSV.",
                self.comments_csv.display()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_dir_encodes_n_and_seed() {
        let config = Config {
            data_dir: PathBuf::from("/tmp/thatch"),
            comments_csv: PathBuf::from("/tmp/comments.csv"),
        };
        assert_eq!(
            config.sample_dir(1000, 42),
            PathBuf::from("/tmp/thatch/1000_42")
        );
    }
}
