use crate::config::NormalizeConfig;
use crate::model::{Artifact, ChartPoint, NormalizedRecord, PrecipPeriod, RawResult, RecordKind};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use regex::Regex;
use tracing::{debug, warn};

pub fn normalize_artifact(
    artifact: &Artifact,
    tz: Option<Tz>,
    config: &NormalizeConfig,
) -> Vec<NormalizedRecord> {
    let ctx = SeriesContext {
        city: &artifact.city,
        city_id: &artifact.city_id,
        scrape_time: artifact.scrape_time,
        scrape_formatted: format_minute(to_local_naive(artifact.scrape_time, tz)),
        tz,
    };

    match artifact.raw() {
        RawResult::BarChart { points, .. } => bar_chart_series(&ctx, &points),
        RawResult::FreeText { summary, detail } => {
            free_text_series(&ctx, summary.as_deref(), detail.as_deref(), config)
        }
        RawResult::HourlyList { entries } => hourly_series(&ctx, &entries, config),
        RawResult::Robot | RawResult::Empty { .. } => Vec::new(),
    }
}

struct SeriesContext<'a> {
    city: &'a str,
    city_id: &'a str,
    scrape_time: DateTime<Utc>,
    scrape_formatted: String,
    tz: Option<Tz>,
}

impl SeriesContext<'_> {
    fn record(&self, kind: RecordKind, valid_time: String, leadtime: i64, precip: u8) -> NormalizedRecord {
        NormalizedRecord {
            city: self.city.to_string(),
            city_id: self.city_id.to_string(),
            kind,
            scrape_time: self.scrape_formatted.clone(),
            valid_time,
            leadtime,
            precip,
        }
    }
}

fn bar_chart_series(ctx: &SeriesContext<'_>, points: &[ChartPoint]) -> Vec<NormalizedRecord> {
    points
        .iter()
        .map(|point| {
            let leadtime = i64::from(point.minute_index) * 2;
            let valid_utc = align_even_utc(ctx.scrape_time + Duration::minutes(leadtime));
            let valid_local = align_even(to_local_naive(valid_utc, ctx.tz));
            ctx.record(
                RecordKind::Nowcast,
                format_minute(valid_local),
                leadtime,
                precip_from_height(&point.height),
            )
        })
        .collect()
}

fn free_text_series(
    ctx: &SeriesContext<'_>,
    summary: Option<&str>,
    detail: Option<&str>,
    config: &NormalizeConfig,
) -> Vec<NormalizedRecord> {
    let combined = format!("{} {}", summary.unwrap_or(""), detail.unwrap_or(""));
    if !config.mentions_precip(&combined) {
        return Vec::new();
    }

    let periods = parse_time_ranges(
        detail.unwrap_or(""),
        ctx.scrape_time,
        ctx.tz,
        Duration::hours(config.open_ended_hours),
    );

    if periods.is_empty() {
        // Keywords without a parseable range degrade to one point at lead 0.
        return vec![ctx.record(RecordKind::Nowcast, ctx.scrape_formatted.clone(), 0, 1)];
    }

    let Some(max_end) = periods.iter().map(|period| period.end).max() else {
        return Vec::new();
    };

    debug!(
        city_id = %ctx.city_id,
        periods = periods.len(),
        "synthesizing dense series from text ranges"
    );

    let mut records = Vec::new();
    let mut cursor = ctx.scrape_time;
    while cursor <= max_end {
        let leadtime = (cursor - ctx.scrape_time).num_minutes();
        let precip = u8::from(periods.iter().any(|period| period.contains(cursor)));
        let valid_local = align_even(to_local_naive(cursor, ctx.tz));
        records.push(ctx.record(
            RecordKind::Nowcast,
            format_minute(valid_local),
            leadtime,
            precip,
        ));
        cursor += Duration::minutes(2);
    }

    records
}

fn hourly_series(
    ctx: &SeriesContext<'_>,
    entries: &[String],
    config: &NormalizeConfig,
) -> Vec<NormalizedRecord> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let description = entry.split(',').nth(2).map(str::trim).unwrap_or("");
            let leadtime = index as i64 * 60;
            let valid_utc = floor_hour_utc(ctx.scrape_time + Duration::hours(index as i64));
            let valid_local = floor_hour(to_local_naive(valid_utc, ctx.tz));
            ctx.record(
                RecordKind::Hourly,
                format_minute(valid_local),
                leadtime,
                u8::from(config.mentions_precip(description)),
            )
        })
        .collect()
}

pub fn parse_time_ranges(
    text: &str,
    scrape_time: DateTime<Utc>,
    tz: Option<Tz>,
    open_ended: Duration,
) -> Vec<PrecipPeriod> {
    let range_re = Regex::new(
        r"(?i)from\s+(\d{1,2}):(\d{2})\s*(AM|PM)(?:\s+(?:to|continuing beyond)\s+(\d{1,2}):(\d{2})\s*(AM|PM))?",
    )
    .expect("time range regex must compile");

    let mut periods = Vec::new();
    for caps in range_re.captures_iter(text) {
        let Some(start_hour) = capture_u32(&caps, 1) else {
            continue;
        };
        let Some(start_minute) = capture_u32(&caps, 2) else {
            continue;
        };
        let Some(start_meridiem) = caps.get(3).map(|m| m.as_str()) else {
            continue;
        };

        let start_clock = to_24h(start_hour, start_meridiem);
        let Some(mut start) = clock_on_scrape_date(scrape_time, tz, start_clock, start_minute)
        else {
            warn!(hour = start_clock, minute = start_minute, "unresolvable range start; skipping");
            continue;
        };

        let explicit_end = match (capture_u32(&caps, 4), capture_u32(&caps, 5), caps.get(6)) {
            (Some(hour), Some(minute), Some(meridiem)) => {
                let clock = to_24h(hour, meridiem.as_str());
                match clock_on_scrape_date(scrape_time, tz, clock, minute) {
                    Some(end) => Some(end),
                    None => {
                        warn!(hour = clock, minute, "unresolvable range end; skipping");
                        continue;
                    }
                }
            }
            _ => None,
        };
        let mut end = explicit_end.unwrap_or(start + open_ended);

        // Ranges describe current or future events; roll past clock readings
        // forward one day, never more.
        if start < scrape_time {
            start += Duration::days(1);
        }
        if end < scrape_time {
            end += Duration::days(1);
        }
        if end < start {
            end += Duration::days(1);
        }
        if start < scrape_time {
            warn!(
                start = %start,
                scrape = %scrape_time,
                "range start still behind scrape time after one-day rollover"
            );
        }

        periods.push(PrecipPeriod { start, end });
    }

    periods
}

fn capture_u32(caps: &regex::Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

fn to_24h(hour: u32, meridiem: &str) -> u32 {
    if meridiem.eq_ignore_ascii_case("PM") && hour != 12 {
        hour + 12
    } else if meridiem.eq_ignore_ascii_case("AM") && hour == 12 {
        0
    } else {
        hour
    }
}

fn clock_on_scrape_date(
    scrape_time: DateTime<Utc>,
    tz: Option<Tz>,
    hour: u32,
    minute: u32,
) -> Option<DateTime<Utc>> {
    match tz {
        Some(tz) => {
            let local_date = scrape_time.with_timezone(&tz).date_naive();
            let naive = local_date.and_hms_opt(hour, minute, 0)?;
            tz.from_local_datetime(&naive)
                .earliest()
                .or_else(|| tz.from_local_datetime(&naive).latest())
                .map(|resolved| resolved.with_timezone(&Utc))
        }
        None => {
            let naive = scrape_time.date_naive().and_hms_opt(hour, minute, 0)?;
            Some(Utc.from_utc_datetime(&naive))
        }
    }
}

fn precip_from_height(height: &str) -> u8 {
    match height.trim().parse::<f64>() {
        Ok(value) if value > 0.0 => 1,
        _ => 0,
    }
}

fn to_local_naive(instant: DateTime<Utc>, tz: Option<Tz>) -> NaiveDateTime {
    match tz {
        Some(tz) => instant.with_timezone(&tz).naive_local(),
        None => instant.naive_utc(),
    }
}

fn align_even_utc(instant: DateTime<Utc>) -> DateTime<Utc> {
    if instant.minute() % 2 == 1 {
        instant - Duration::minutes(1)
    } else {
        instant
    }
}

// Wall-clock alignment; offsets with odd minute parts reintroduce odd minutes,
// so this runs again after conversion.
fn align_even(naive: NaiveDateTime) -> NaiveDateTime {
    if naive.minute() % 2 == 1 {
        naive - Duration::minutes(1)
    } else {
        naive
    }
}

fn floor_hour(naive: NaiveDateTime) -> NaiveDateTime {
    naive
        .date()
        .and_hms_opt(naive.hour(), 0, 0)
        .unwrap_or(naive)
}

fn floor_hour_utc(instant: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&floor_hour(instant.naive_utc()))
}

fn format_minute(naive: NaiveDateTime) -> String {
    naive.format("%Y-%m-%d %H:%M").to_string()
}
