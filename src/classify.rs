use crate::model::{ChartPoint, RawResult};
use crate::probe::ProbeReport;

pub const MAX_HOURLY_ENTRIES: usize = 6;

// Fixed precedence: cheaper, more structured signals first; free text last
// among the data-bearing tiers because it is the least structured.
pub fn classify(report: &ProbeReport) -> RawResult {
    if report.robot_banner {
        return RawResult::Robot;
    }

    if let Some(chart) = &report.chart
        && !chart.rows.is_empty()
    {
        let points = chart
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| ChartPoint {
                minute_index: index as u32,
                height: row.height.clone(),
                fill: row.fill.clone(),
                x: row.x.clone(),
                y: row.y.clone(),
                width: row.width.clone(),
            })
            .collect();
        return RawResult::BarChart {
            view_box: chart.view_box.clone(),
            points,
        };
    }

    if let Some(fallback) = &report.fallback
        && (fallback.summary.is_some() || fallback.detail.is_some())
    {
        return RawResult::FreeText {
            summary: fallback.summary.clone(),
            detail: fallback.detail.clone(),
        };
    }

    if let Some(hourly) = &report.hourly
        && !hourly.labels.is_empty()
    {
        return RawResult::HourlyList {
            entries: hourly
                .labels
                .iter()
                .take(MAX_HOURLY_ENTRIES)
                .cloned()
                .collect(),
        };
    }

    RawResult::Empty {
        reason: report.last_failure.clone(),
    }
}
