use chrono::{DateTime, Utc};
use nowgrid::classify::classify;
use nowgrid::model::{Artifact, RawResult};
use nowgrid::probe::{ChartProbe, ChartRow, FallbackProbe, HourlyProbe, ProbeReport, probe_document};

fn utc(value: &str) -> DateTime<Utc> {
    value.parse().expect("valid test timestamp")
}

fn chart_row(height: &str) -> ChartRow {
    ChartRow {
        height: height.to_string(),
        fill: "#4285f4".to_string(),
        x: "0".to_string(),
        y: "40".to_string(),
        width: "6".to_string(),
    }
}

#[test]
fn robot_banner_wins_over_everything() {
    let report = ProbeReport {
        robot_banner: true,
        chart: Some(ChartProbe {
            view_box: Some("0 0 1440 48".to_string()),
            rows: vec![chart_row("1")],
        }),
        fallback: None,
        hourly: None,
        last_failure: None,
    };

    assert_eq!(classify(&report), RawResult::Robot);
}

#[test]
fn chart_rows_beat_fallback_text() {
    let report = ProbeReport {
        robot_banner: false,
        chart: Some(ChartProbe {
            view_box: Some("0 0 1440 48".to_string()),
            rows: vec![chart_row("0"), chart_row("2.5")],
        }),
        fallback: Some(FallbackProbe {
            summary: Some("Rain".to_string()),
            detail: None,
        }),
        hourly: None,
        last_failure: None,
    };

    let RawResult::BarChart { points, .. } = classify(&report) else {
        panic!("expected bar chart classification");
    };
    let indexes: Vec<u32> = points.iter().map(|p| p.minute_index).collect();
    assert_eq!(indexes, vec![0, 1]);
}

#[test]
fn empty_chart_falls_through_to_fallback_text() {
    let report = ProbeReport {
        robot_banner: false,
        chart: Some(ChartProbe {
            view_box: Some("0 0 1440 48".to_string()),
            rows: Vec::new(),
        }),
        fallback: Some(FallbackProbe {
            summary: None,
            detail: Some("Rain likely from 7:00 AM to 9:30 AM.".to_string()),
        }),
        hourly: None,
        last_failure: None,
    };

    let RawResult::FreeText { summary, detail } = classify(&report) else {
        panic!("expected free text classification");
    };
    assert_eq!(summary, None);
    assert_eq!(detail.as_deref(), Some("Rain likely from 7:00 AM to 9:30 AM."));
}

#[test]
fn hourly_entries_are_capped_at_six() {
    let labels: Vec<String> = (0..9).map(|hour| format!("{hour} PM,60°F,Cloudy")).collect();
    let report = ProbeReport {
        robot_banner: false,
        chart: None,
        fallback: None,
        hourly: Some(HourlyProbe { labels }),
        last_failure: None,
    };

    let RawResult::HourlyList { entries } = classify(&report) else {
        panic!("expected hourly classification");
    };
    assert_eq!(entries.len(), 6);
}

#[test]
fn all_probes_missed_yields_empty_with_last_reason() {
    let report = ProbeReport {
        robot_banner: false,
        chart: None,
        fallback: None,
        hourly: None,
        last_failure: Some("no_hourly_items".to_string()),
    };

    assert_eq!(
        classify(&report),
        RawResult::Empty {
            reason: Some("no_hourly_items".to_string())
        }
    );
}

#[test]
fn probe_finds_the_minute_bar_chart() {
    let html = r##"<html><body>
        <svg viewBox="0 0 20 20"><rect height="5"/></svg>
        <svg viewBox="0 0 1440 48">
            <rect height="0" fill="#fff" x="0" y="40" width="6"/>
            <rect height="2.5" fill="#00f" x="6" y="38" width="6"/>
        </svg>
    </body></html>"##;

    let report = probe_document(html);
    let chart = report.chart.expect("chart probe must match");
    assert_eq!(chart.view_box.as_deref(), Some("0 0 1440 48"));
    assert_eq!(chart.rows.len(), 2);
    assert_eq!(chart.rows[1].height, "2.5");
}

#[test]
fn probe_detects_robot_banner() {
    let html = r#"<html><body>
        <p>Our systems have detected unusual traffic from your computer network.</p>
    </body></html>"#;

    let report = probe_document(html);
    assert!(report.robot_banner);
    assert_eq!(classify(&report), RawResult::Robot);
}

#[test]
fn probe_reads_both_fallback_blocks() {
    let html = r#"<html><body>
        <div jsname="Kt2ahd" class="XhUg9e">
            <div class="SnOHQb tNxQIb">Rain</div>
            <div class="jz8NAf ApHyTb">Rain likely from 7:00 AM to 9:30 AM.</div>
        </div>
    </body></html>"#;

    let report = probe_document(html);
    let fallback = report.fallback.expect("fallback probe must match");
    assert_eq!(fallback.summary.as_deref(), Some("Rain"));
    assert_eq!(
        fallback.detail.as_deref(),
        Some("Rain likely from 7:00 AM to 9:30 AM.")
    );
}

#[test]
fn probe_collects_at_most_six_hourly_labels() {
    let items: String = (0..8)
        .map(|hour| format!(r#"<div role="listitem" aria-label="{hour} PM,60°F,Cloudy"></div>"#))
        .collect();
    let html = format!(
        r#"<html><body><div jsname="s2gQvd" class="EDblX HG5ZQb">{items}</div></body></html>"#
    );

    let report = probe_document(&html);
    let hourly = report.hourly.expect("hourly probe must match");
    assert_eq!(hourly.labels.len(), 6);
    assert_eq!(hourly.labels[0], "0 PM,60°F,Cloudy");
}

#[test]
fn blank_page_reports_the_last_failed_probe() {
    let report = probe_document("<html><body><p>nothing here</p></body></html>");

    assert!(!report.robot_banner);
    assert!(report.chart.is_none());
    assert_eq!(report.last_failure.as_deref(), Some("no_hourly_container"));
    assert_eq!(
        classify(&report),
        RawResult::Empty {
            reason: Some("no_hourly_container".to_string())
        }
    );
}

#[test]
fn artifact_round_trips_the_classified_result() {
    let html = r#"<html><body>
        <div jsname="Kt2ahd" class="XhUg9e">
            <div class="SnOHQb tNxQIb">Rain</div>
            <div class="jz8NAf ApHyTb">Light rain from 2:00 PM continuing beyond.</div>
        </div>
    </body></html>"#;

    let raw = classify(&probe_document(html));
    let artifact = Artifact::from_raw("Fairfax", "fx001", utc("2026-01-06T12:00:00Z"), &raw);

    assert_eq!(artifact.kind.as_deref(), Some("nowcast"));
    assert_eq!(artifact.source.as_deref(), Some("fallback_div"));
    assert_eq!(artifact.raw(), raw);
}

#[test]
fn bar_chart_artifact_stamps_aligned_slot_times() {
    let report = ProbeReport {
        robot_banner: false,
        chart: Some(ChartProbe {
            view_box: Some("0 0 1440 48".to_string()),
            rows: vec![chart_row("1"), chart_row("0")],
        }),
        fallback: None,
        hourly: None,
        last_failure: None,
    };

    let raw = classify(&report);
    let artifact = Artifact::from_raw("Fairfax", "fx001", utc("2026-01-06T12:01:00Z"), &raw);

    assert_eq!(artifact.points[0].time, "2026-01-06 12:00");
    assert_eq!(artifact.points[1].time, "2026-01-06 12:02");
    assert_eq!(artifact.raw(), raw);
}
