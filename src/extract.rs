use crate::probe::{ProbeReport, probe_document};
use crate::stations::Station;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Capture {
    pub city: String,
    pub city_id: String,
    pub scrape_time: DateTime<Utc>,
    pub report: ProbeReport,
}

pub trait ScrapeSource {
    fn capture(&self, station: &Station) -> Result<Capture>;
}

// Replays page captures saved as <root>/<station id>.html. The scrape
// timestamp is stamped here; everything downstream treats it as given.
#[derive(Debug, Clone)]
pub struct HtmlDirSource {
    pub root: PathBuf,
}

impl ScrapeSource for HtmlDirSource {
    fn capture(&self, station: &Station) -> Result<Capture> {
        let path = self.root.join(format!("{}.html", station.id));
        let html = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read page capture {}", path.display()))?;

        Ok(Capture {
            city: station.name.clone(),
            city_id: station.id.clone(),
            scrape_time: Utc::now(),
            report: probe_document(&html),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScheduleStrategy {
    BatchAll,
    WorkRest {
        work_minutes: u32,
        rest_minutes: u32,
        per_station_secs: u32,
    },
    Spread {
        duration_minutes: u32,
    },
}

impl ScheduleStrategy {
    // A launch plan only; nothing here runs jobs or sleeps.
    pub fn launch_offsets(&self, station_count: usize) -> Vec<Duration> {
        match self {
            ScheduleStrategy::BatchAll => vec![Duration::zero(); station_count],
            ScheduleStrategy::WorkRest {
                work_minutes,
                rest_minutes,
                per_station_secs,
            } => {
                let per_station = i64::from((*per_station_secs).max(1));
                let window = i64::from(*work_minutes) * 60;
                let chunk = (window / per_station).max(1) as usize;
                let cycle = Duration::seconds(window + i64::from(*rest_minutes) * 60);
                (0..station_count)
                    .map(|index| cycle * ((index / chunk) as i32))
                    .collect()
            }
            ScheduleStrategy::Spread { duration_minutes } => {
                if station_count == 0 {
                    return Vec::new();
                }
                let step = i64::from(*duration_minutes) * 60 / station_count as i64;
                (0..station_count)
                    .map(|index| Duration::seconds(step * index as i64))
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_all_launches_everything_at_once() {
        let offsets = ScheduleStrategy::BatchAll.launch_offsets(3);
        assert_eq!(offsets, vec![Duration::zero(); 3]);
    }

    #[test]
    fn work_rest_groups_by_window_capacity() {
        let strategy = ScheduleStrategy::WorkRest {
            work_minutes: 20,
            rest_minutes: 60,
            per_station_secs: 600,
        };
        // Two stations fit a 20-minute window; the third waits out the rest.
        let offsets = strategy.launch_offsets(3);
        assert_eq!(offsets[0], Duration::zero());
        assert_eq!(offsets[1], Duration::zero());
        assert_eq!(offsets[2], Duration::minutes(80));
    }

    #[test]
    fn spread_divides_the_window_evenly() {
        let strategy = ScheduleStrategy::Spread {
            duration_minutes: 30,
        };
        let offsets = strategy.launch_offsets(3);
        assert_eq!(offsets, vec![
            Duration::zero(),
            Duration::minutes(10),
            Duration::minutes(20),
        ]);
    }
}
