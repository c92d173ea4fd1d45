use crate::config::NormalizeConfig;
use crate::model::{MergeReport, NormalizedRecord};
use crate::normalize::normalize_artifact;
use crate::stations::{Station, load_station_index};
use crate::store::load_artifact;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub stations_path: Option<PathBuf>,
    pub normalize: NormalizeConfig,
}

pub fn merge_artifacts(options: &MergeOptions) -> Result<MergeReport> {
    let stations = load_stations_lenient(options.stations_path.as_deref());

    // File-name order keeps the output reproducible regardless of discovery
    // order.
    let mut files = artifact_files(&options.input_dir)?;
    files.sort();

    let mut report = MergeReport::default();
    let mut records: Vec<NormalizedRecord> = Vec::new();

    for path in files {
        report.files += 1;
        let artifact = match load_artifact(&path) {
            Ok(artifact) => artifact,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "skipping unreadable artifact");
                report.skipped += 1;
                continue;
            }
        };

        let tz = stations
            .get(&artifact.city_id)
            .and_then(|station| station.tz);
        let rows = normalize_artifact(&artifact, tz, &options.normalize);
        debug!(file = %path.display(), records = rows.len(), "artifact normalized");
        records.extend(rows);
    }

    report.records = records.len();

    if records.is_empty() {
        info!(
            dir = %options.input_dir.display(),
            files = report.files,
            skipped = report.skipped,
            "no records produced; table not written"
        );
        return Ok(report);
    }

    write_table(&options.output_path, &records)?;
    info!(
        records = report.records,
        skipped = report.skipped,
        file = %options.output_path.display(),
        "table written"
    );

    Ok(report)
}

fn artifact_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join("*.json");
    let pattern = pattern.to_string_lossy();
    let mut files = Vec::new();
    for entry in
        glob::glob(&pattern).with_context(|| format!("invalid artifact pattern {pattern}"))?
    {
        match entry {
            Ok(path) => files.push(path),
            Err(err) => warn!(error = %err, "unreadable directory entry"),
        }
    }
    Ok(files)
}

fn load_stations_lenient(path: Option<&Path>) -> BTreeMap<String, Station> {
    let Some(path) = path else {
        return BTreeMap::new();
    };

    match load_station_index(path) {
        Ok(index) => {
            info!(stations = index.len(), file = %path.display(), "station index loaded");
            index
        }
        Err(err) => {
            warn!(
                file = %path.display(),
                error = %err,
                "station list unavailable; normalizing in UTC"
            );
            BTreeMap::new()
        }
    }
}

fn write_table(path: &Path, records: &[NormalizedRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output dir {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create table {}", path.display()))?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("failed to write record to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush table {}", path.display()))?;

    Ok(())
}
