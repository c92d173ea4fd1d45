use crate::model::Artifact;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn load_artifact(path: &Path) -> Result<Artifact> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read artifact {}", path.display()))?;
    let artifact = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse artifact {}", path.display()))?;
    Ok(artifact)
}

pub fn save_artifact(dir: &Path, artifact: &Artifact) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create artifact directory {}", dir.display()))?;

    let path = dir.join(artifact_file_name(artifact));
    let serialized = serde_json::to_string_pretty(artifact)?;
    std::fs::write(&path, serialized)
        .with_context(|| format!("failed to write artifact {}", path.display()))?;
    Ok(path)
}

pub fn artifact_file_name(artifact: &Artifact) -> String {
    format!(
        "nowcast_{}_{}.json",
        artifact.city_id,
        artifact.scrape_time.format("%Y%m%d_%H%M%S")
    )
}
