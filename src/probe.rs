use scraper::{ElementRef, Html, Selector};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    pub robot_banner: bool,
    pub chart: Option<ChartProbe>,
    pub fallback: Option<FallbackProbe>,
    pub hourly: Option<HourlyProbe>,
    pub last_failure: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChartProbe {
    pub view_box: Option<String>,
    pub rows: Vec<ChartRow>,
}

#[derive(Debug, Clone)]
pub struct ChartRow {
    pub height: String,
    pub fill: String,
    pub x: String,
    pub y: String,
    pub width: String,
}

#[derive(Debug, Clone)]
pub struct FallbackProbe {
    pub summary: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HourlyProbe {
    pub labels: Vec<String>,
}

// Probes run in the same order the page tiers are tried: robot banner, bar
// chart, fallback text, hourly list. The first hit wins; each miss records
// its reason so an all-miss capture can explain itself.
pub fn probe_document(html: &str) -> ProbeReport {
    let document = Html::parse_document(html);
    let mut report = ProbeReport::default();

    if has_robot_banner(&document) {
        report.robot_banner = true;
        return report;
    }

    match probe_chart(&document) {
        Ok(chart) => {
            debug!(rows = chart.rows.len(), "bar chart probe matched");
            report.chart = Some(chart);
            return report;
        }
        Err(reason) => report.last_failure = Some(reason),
    }

    match probe_fallback(&document) {
        Ok(fallback) => {
            report.fallback = Some(fallback);
            return report;
        }
        Err(reason) => report.last_failure = Some(reason),
    }

    match probe_hourly(&document) {
        Ok(hourly) => {
            debug!(labels = hourly.labels.len(), "hourly probe matched");
            report.hourly = Some(hourly);
            return report;
        }
        Err(reason) => report.last_failure = Some(reason),
    }

    report
}

fn has_robot_banner(document: &Html) -> bool {
    let text = document.root_element().text().collect::<Vec<_>>().join(" ");
    text.contains("I'm not a robot") || text.contains("unusual traffic")
}

fn probe_chart(document: &Html) -> Result<ChartProbe, String> {
    let svg_selector = Selector::parse("svg").expect("svg selector must parse");
    let rect_selector = Selector::parse("rect").expect("rect selector must parse");

    for svg in document.select(&svg_selector) {
        let view_box = svg.value().attr("viewBox").unwrap_or("");
        if !(view_box.contains("1440") && view_box.contains("48")) {
            continue;
        }

        let rows: Vec<ChartRow> = svg
            .select(&rect_selector)
            .map(|rect| ChartRow {
                height: attr_or_empty(rect, "height"),
                fill: attr_or_empty(rect, "fill"),
                x: attr_or_empty(rect, "x"),
                y: attr_or_empty(rect, "y"),
                width: attr_or_empty(rect, "width"),
            })
            .collect();

        if !rows.is_empty() {
            return Ok(ChartProbe {
                view_box: Some(view_box.to_string()),
                rows,
            });
        }
    }

    Err("no_target_svg".to_string())
}

fn probe_fallback(document: &Html) -> Result<FallbackProbe, String> {
    let container_selector = Selector::parse(r#"div[jsname="Kt2ahd"].XhUg9e"#)
        .expect("fallback container selector must parse");
    let summary_selector =
        Selector::parse(".SnOHQb.tNxQIb").expect("summary selector must parse");
    let detail_selector = Selector::parse(".jz8NAf.ApHyTb").expect("detail selector must parse");

    let Some(container) = document.select(&container_selector).next() else {
        return Err("no_fallback_container".to_string());
    };

    let summary = container
        .select(&summary_selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty());
    let detail = container
        .select(&detail_selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty());

    if summary.is_none() && detail.is_none() {
        return Err("no_fallback_blocks".to_string());
    }

    Ok(FallbackProbe { summary, detail })
}

fn probe_hourly(document: &Html) -> Result<HourlyProbe, String> {
    let container_selector = Selector::parse(r#"[jsname="s2gQvd"].EDblX.HG5ZQb"#)
        .expect("hourly container selector must parse");
    let item_selector = Selector::parse(r#"[role="listitem"][aria-label]"#)
        .expect("hourly item selector must parse");

    let Some(container) = document.select(&container_selector).next() else {
        return Err("no_hourly_container".to_string());
    };

    let labels: Vec<String> = container
        .select(&item_selector)
        .filter_map(|item| item.value().attr("aria-label"))
        .take(6)
        .map(ToString::to_string)
        .collect();

    if labels.is_empty() {
        return Err("no_hourly_items".to_string());
    }

    Ok(HourlyProbe { labels })
}

fn attr_or_empty(element: ElementRef<'_>, attr: &str) -> String {
    element.value().attr(attr).unwrap_or("").to_string()
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
