use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

pub const NO_DATA_SENTINEL: &str = "no nowcast data now.";

#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    Robot,
    BarChart {
        view_box: Option<String>,
        points: Vec<ChartPoint>,
    },
    FreeText {
        summary: Option<String>,
        detail: Option<String>,
    },
    HourlyList {
        entries: Vec<String>,
    },
    Empty {
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub minute_index: u32,
    pub height: String,
    pub fill: String,
    pub x: String,
    pub y: String,
    pub width: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecipPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PrecipPeriod {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Nowcast,
    Hourly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub city: String,
    pub city_id: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub scrape_time: String,
    pub valid_time: String,
    pub leadtime: i64,
    pub precip: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactPoint {
    pub minute_index: u32,
    pub time: String,
    pub height: String,
    pub fill: String,
    pub x: String,
    pub y: String,
    pub width: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackData {
    pub div1_text: Option<String>,
    pub div2_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub city: String,
    pub city_id: String,
    pub scrape_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "viewBox", default)]
    pub view_box: Option<String>,
    #[serde(default)]
    pub points: Vec<ArtifactPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_data: Option<FallbackData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_data: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Artifact {
    pub fn from_raw(city: &str, city_id: &str, scrape_time: DateTime<Utc>, raw: &RawResult) -> Self {
        let mut artifact = Artifact {
            city: city.to_string(),
            city_id: city_id.to_string(),
            scrape_time,
            kind: None,
            view_box: None,
            points: Vec::new(),
            fallback_data: None,
            hourly_data: None,
            source: None,
            message: None,
        };

        match raw {
            RawResult::Robot => {
                artifact.kind = Some("robot".to_string());
            }
            RawResult::BarChart { view_box, points } => {
                artifact.kind = Some("nowcast".to_string());
                artifact.view_box = view_box.clone();
                // Bucket times are stamped off the even-aligned scrape instant.
                let mut base = scrape_time;
                if base.minute() % 2 == 1 {
                    base -= Duration::minutes(1);
                }
                artifact.points = points
                    .iter()
                    .map(|point| {
                        let slot = base + Duration::minutes(i64::from(point.minute_index) * 2);
                        ArtifactPoint {
                            minute_index: point.minute_index,
                            time: slot.format("%Y-%m-%d %H:%M").to_string(),
                            height: point.height.clone(),
                            fill: point.fill.clone(),
                            x: point.x.clone(),
                            y: point.y.clone(),
                            width: point.width.clone(),
                        }
                    })
                    .collect();
            }
            RawResult::FreeText { summary, detail } => {
                artifact.kind = Some("nowcast".to_string());
                artifact.source = Some("fallback_div".to_string());
                artifact.fallback_data = Some(FallbackData {
                    div1_text: summary.clone(),
                    div2_text: detail.clone(),
                });
            }
            RawResult::HourlyList { entries } => {
                artifact.kind = Some("hourly".to_string());
                artifact.source = Some("hourly_aria_label".to_string());
                artifact.hourly_data = Some(entries.clone());
            }
            RawResult::Empty { .. } => {
                artifact.message = Some(NO_DATA_SENTINEL.to_string());
            }
        }

        artifact
    }

    // The `type` discriminator was stamped at capture time; reading it back is
    // deserialization, not re-classification.
    pub fn raw(&self) -> RawResult {
        match self.kind.as_deref() {
            Some("robot") => RawResult::Robot,
            Some("nowcast") if !self.points.is_empty() => RawResult::BarChart {
                view_box: self.view_box.clone(),
                points: self
                    .points
                    .iter()
                    .map(|point| ChartPoint {
                        minute_index: point.minute_index,
                        height: point.height.clone(),
                        fill: point.fill.clone(),
                        x: point.x.clone(),
                        y: point.y.clone(),
                        width: point.width.clone(),
                    })
                    .collect(),
            },
            Some("nowcast") if self.fallback_data.is_some() => {
                let fallback = self.fallback_data.as_ref();
                RawResult::FreeText {
                    summary: fallback.and_then(|data| data.div1_text.clone()),
                    detail: fallback.and_then(|data| data.div2_text.clone()),
                }
            }
            Some("hourly") if self.hourly_data.is_some() => RawResult::HourlyList {
                entries: self.hourly_data.clone().unwrap_or_default(),
            },
            _ => RawResult::Empty {
                reason: self.message.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub files: usize,
    pub skipped: usize,
    pub records: usize,
}

impl MergeReport {
    pub fn wrote_output(&self) -> bool {
        self.records > 0
    }
}
