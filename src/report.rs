use crate::model::NO_DATA_SENTINEL;
use crate::store::load_artifact;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectoryScan {
    pub total_files: usize,
    pub unreadable: usize,
    pub by_type: BTreeMap<String, usize>,
    pub robot_files: Vec<String>,
    pub untyped_files: Vec<String>,
    pub no_data_files: usize,
}

pub fn scan_artifacts(dir: &Path) -> Result<DirectoryScan> {
    let mut scan = DirectoryScan::default();

    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file()
            || entry.path().extension().and_then(|s| s.to_str()) != Some("json")
        {
            continue;
        }

        scan.total_files += 1;
        let artifact = match load_artifact(entry.path()) {
            Ok(artifact) => artifact,
            Err(_) => {
                scan.unreadable += 1;
                continue;
            }
        };

        let type_key = artifact.kind.clone().unwrap_or_else(|| "null".to_string());
        *scan.by_type.entry(type_key).or_default() += 1;

        let file_name = entry.file_name().to_string_lossy().to_string();
        match artifact.kind.as_deref() {
            Some("robot") => scan.robot_files.push(file_name),
            None => scan.untyped_files.push(file_name),
            _ => {}
        }

        if artifact.message.as_deref() == Some(NO_DATA_SENTINEL) {
            scan.no_data_files += 1;
        }
    }

    Ok(scan)
}
