// Artifact status display — what samples exist and what has been clustered.

use anyhow::Result;

use crate::cache::cached_models;
use crate::config::Config;
use crate::corpus::sample::SAMPLE_FILE;
use crate::manifest::RunManifest;

/// Display every run directory under the data root.
pub fn show(config: &Config) -> Result<()> {
    if !config.data_dir.exists() {
        println!("Data directory: not created yet ({})", config.data_dir.display());
        println!("\nRun `thatch sample --n <N> --seed <S>` to draw a sample.");
        return Ok(());
    }
    println!("Data directory: {}", config.data_dir.display());

    let mut run_dirs: Vec<_> = std::fs::read_dir(&config.data_dir)?
        .flatten()
        .filter(|e| e.path().is_dir())
        .collect();
    run_dirs.sort_by_key(|e| e.file_name());

    if run_dirs.is_empty() {
        println!("No run directories yet.");
        return Ok(());
    }

    for entry in run_dirs {
        let dir = entry.path();
        println!("\n  {}", entry.file_name().to_string_lossy());

        if dir.join(SAMPLE_FILE).exists() {
            println!("    Sample: present");
        } else {
            println!("    Sample: missing");
        }

        let models = cached_models(&dir);
        if models.is_empty() {
            println!("    Models: none clustered yet");
            continue;
        }

        let manifest = RunManifest::load(&dir).unwrap_or_default();
        for model in models {
            match manifest.runs.iter().find(|r| r.model == model) {
                Some(run) => println!(
                    "    Model {}: {} documents, {} clusters, {} noise (built {})",
                    run.model,
                    run.documents,
                    run.clusters,
                    run.noise,
                    run.built_at.format("%Y-%m-%d %H:%M UTC"),
                ),
                None => println!("    Model {model}: cached (no manifest record)"),
            }
        }
    }

    Ok(())
}
