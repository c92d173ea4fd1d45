use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub stations: StationsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizeConfig {
    #[serde(default = "default_open_ended_hours")]
    pub open_ended_hours: i64,
    #[serde(default = "default_precip_keywords")]
    pub keywords: Vec<String>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            open_ended_hours: default_open_ended_hours(),
            keywords: default_precip_keywords(),
        }
    }
}

impl NormalizeConfig {
    // Substring match, not whole-word: "showers" must hit "shower".
    pub fn mentions_precip(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| lowered.contains(&keyword.to_lowercase()))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StationsConfig {
    #[serde(default)]
    pub list_path: Option<PathBuf>,
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: AppConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse toml in {}", path.display()))?;
    Ok(config)
}

fn default_open_ended_hours() -> i64 {
    6
}

fn default_precip_keywords() -> Vec<String> {
    [
        "rain",
        "shower",
        "thunderstorm",
        "drizzle",
        "precipitation",
        "wet",
        "sleet",
        "snow",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}
