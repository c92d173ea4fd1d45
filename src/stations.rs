use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Station {
    pub name: String,
    pub id: String,
    pub tz: Option<Tz>,
}

#[derive(Debug, Deserialize)]
struct StationRow {
    name: String,
    id: String,
    #[serde(default)]
    tz: Option<String>,
}

pub fn load_station_index(path: &Path) -> Result<BTreeMap<String, Station>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open station list {}", path.display()))?;

    let mut index = BTreeMap::new();
    for row in reader.deserialize::<StationRow>() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "skipping malformed station row");
                continue;
            }
        };

        let tz = match row.tz.as_deref().filter(|value| !value.trim().is_empty()) {
            Some(name) => match name.trim().parse::<Tz>() {
                Ok(tz) => Some(tz),
                Err(_) => {
                    warn!(station = %row.id, tz = name, "unknown timezone; using UTC");
                    None
                }
            },
            None => None,
        };

        index.insert(
            row.id.clone(),
            Station {
                name: row.name,
                id: row.id,
                tz,
            },
        );
    }

    Ok(index)
}
