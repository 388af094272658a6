//! Pure transforms from raw metric records to what the dashboard shows.
use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use crate::api::MetricRecord;

pub const TIME_FORMAT: &str = "%H:%M:%S";
const INVALID_TIME: &str = "--:--:--";

/// A record placed on the latency chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesPoint {
    #[serde(flatten)]
    pub record: MetricRecord,
    /// Wall clock label for the record's timestamp
    pub time: String,
    /// Position within the window
    pub idx: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub avg_latency_ms: u64,
    pub total_cost: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Aggregate {
    pub series: Vec<SeriesPoint>,
    pub summary: Summary,
}

/// Label an epoch-seconds timestamp with the wall clock time in `tz`.
pub fn time_label<Tz>(timestamp: f64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let millis = (timestamp * 1000.0).round() as i64;
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.with_timezone(tz).format(TIME_FORMAT).to_string(),
        None => INVALID_TIME.to_string(),
    }
}

pub fn summarize(records: &[MetricRecord]) -> Summary {
    let total = records.len();
    let total_latency: f64 = records.iter().map(|r| r.latency_ms).sum();
    let total_cost: f64 = records.iter().map(MetricRecord::cost).sum();
    let avg_latency_ms = if total > 0 {
        (total_latency / total as f64).round() as u64
    } else {
        0
    };

    Summary {
        total,
        avg_latency_ms,
        total_cost,
    }
}

/// Aggregate a window of records using the local timezone for labels.
pub fn aggregate(records: &[MetricRecord]) -> Aggregate {
    aggregate_in(records, &Local)
}

pub fn aggregate_in<Tz>(records: &[MetricRecord], tz: &Tz) -> Aggregate
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let series = records
        .iter()
        .enumerate()
        .map(|(idx, record)| SeriesPoint {
            record: record.clone(),
            time: time_label(record.timestamp, tz),
            idx,
        })
        .collect();

    Aggregate {
        series,
        summary: summarize(records),
    }
}

/// Snapshot of the telemetry window published to the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub records: Vec<MetricRecord>,
    pub series: Vec<SeriesPoint>,
    pub summary: Summary,
}

impl Dashboard {
    pub fn from_records(records: Vec<MetricRecord>) -> Self {
        let Aggregate { series, summary } = aggregate(&records);
        Self {
            records,
            series,
            summary,
        }
    }

    /// The first `n` points in window order, which is most recent first
    /// as delivered by the backend.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &SeriesPoint> {
        self.series.iter().take(n)
    }
}
