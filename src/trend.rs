//! Time-bucketed KPI series.
//!
//! Daily series are dense (every day of the window appears, zero-filled);
//! monthly series are sparse (only months with at least one record).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::debug;

use crate::kpi::Kpi;
use crate::types::{CanonicalRecord, HolidaySet};

/// Label of the series that applies no designer filter.
pub const TEAM_SERIES: &str = "Team";

const DAILY_WINDOW_DAYS: i64 = 30;
const MONTHLY_WINDOW_MONTHS: i32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendRange {
    /// Thirty days back from the latest submission, one bucket per day.
    Daily30,
    /// The twelve calendar months ending at the latest submission's month.
    Monthly12,
    /// Every month in the record set.
    MonthlyAll,
}

impl FromStr for TrendRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "daily-30" => Ok(TrendRange::Daily30),
            "monthly-12" => Ok(TrendRange::Monthly12),
            "monthly-all" => Ok(TrendRange::MonthlyAll),
            other => Err(format!(
                "unknown range '{other}', expected daily-30, monthly-12 or monthly-all"
            )),
        }
    }
}

impl fmt::Display for TrendRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendRange::Daily30 => "daily-30",
            TrendRange::Monthly12 => "monthly-12",
            TrendRange::MonthlyAll => "monthly-all",
        })
    }
}

/// One requested overlay: the whole team, or a single designer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeriesFilter {
    Team,
    Designer(String),
}

impl SeriesFilter {
    pub fn from_label(label: &str) -> Self {
        if label == TEAM_SERIES {
            SeriesFilter::Team
        } else {
            SeriesFilter::Designer(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SeriesFilter::Team => TEAM_SERIES,
            SeriesFilter::Designer(name) => name.as_str(),
        }
    }

    fn designer(&self) -> Option<&str> {
        match self {
            SeriesFilter::Team => None,
            SeriesFilter::Designer(name) => Some(name.as_str()),
        }
    }

    fn accepts(&self, record: &CanonicalRecord) -> bool {
        match self {
            SeriesFilter::Team => true,
            SeriesFilter::Designer(name) => record.designer() == Some(name.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketKey {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
}

impl BucketKey {
    fn month_of(date: NaiveDate) -> Self {
        BucketKey::Month {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            BucketKey::Month { year, month } => write!(f, "{year:04}-{month:02}"),
        }
    }
}

impl Serialize for BucketKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendBucket {
    pub key: BucketKey,
    pub value: usize,
    pub designer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendSeries {
    pub label: String,
    pub kpi: Kpi,
    pub buckets: Vec<TrendBucket>,
}

/// Build one series per filter. An empty filter list means the team
/// series alone.
///
/// The window is anchored on the latest submission in the whole record
/// set, so every overlay shares the same axis. Records without a
/// submission timestamp never fall in a bucket. A series with no record
/// inside the window is left out of the result.
pub fn aggregate(
    records: &[CanonicalRecord],
    kpi: Kpi,
    range: TrendRange,
    holidays: &HolidaySet,
    series: &[SeriesFilter],
) -> Vec<TrendSeries> {
    let stamped: Vec<(NaiveDateTime, &CanonicalRecord)> = records
        .iter()
        .filter_map(|r| r.submission_timestamp.map(|ts| (ts, r)))
        .collect();
    let Some(anchor) = stamped.iter().map(|(ts, _)| *ts).max() else {
        return Vec::new();
    };
    let window = Window::new(range, anchor);
    let windowed: Vec<(NaiveDateTime, &CanonicalRecord)> = stamped
        .into_iter()
        .filter(|(ts, _)| window.contains(*ts))
        .collect();

    let team = [SeriesFilter::Team];
    let series = if series.is_empty() { &team[..] } else { series };

    series
        .iter()
        .filter_map(|filter| {
            let members: Vec<(NaiveDate, &CanonicalRecord)> = windowed
                .iter()
                .filter(|(_, r)| filter.accepts(r))
                .map(|(ts, r)| (ts.date(), *r))
                .collect();
            if members.is_empty() {
                debug!(series = filter.label(), %range, "no records in window, series omitted");
                return None;
            }
            let buckets = window
                .bucket(&members, kpi, holidays)
                .into_iter()
                .map(|(key, value)| TrendBucket {
                    key,
                    value,
                    designer: filter.designer().map(str::to_string),
                })
                .collect();
            Some(TrendSeries {
                label: filter.label().to_string(),
                kpi,
                buckets,
            })
        })
        .collect()
}

struct Window {
    range: TrendRange,
    start: Option<NaiveDateTime>,
    anchor: NaiveDateTime,
}

impl Window {
    fn new(range: TrendRange, anchor: NaiveDateTime) -> Self {
        let start = match range {
            // Anchors near chrono's lower bound clamp the window instead of
            // overflowing.
            TrendRange::Daily30 => Some(
                anchor
                    .checked_sub_signed(Duration::days(DAILY_WINDOW_DAYS))
                    .unwrap_or(NaiveDateTime::MIN),
            ),
            TrendRange::Monthly12 => {
                let (year, month) =
                    months_back(anchor.year(), anchor.month(), MONTHLY_WINDOW_MONTHS - 1);
                Some(
                    NaiveDate::from_ymd_opt(year, month, 1)
                        .map_or(NaiveDateTime::MIN, |d| d.and_time(NaiveTime::MIN)),
                )
            }
            TrendRange::MonthlyAll => None,
        };
        Self {
            range,
            start,
            anchor,
        }
    }

    fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start.map_or(true, |start| ts >= start) && ts <= self.anchor
    }

    fn bucket(
        &self,
        members: &[(NaiveDate, &CanonicalRecord)],
        kpi: Kpi,
        holidays: &HolidaySet,
    ) -> Vec<(BucketKey, usize)> {
        let mut counts: BTreeMap<BucketKey, usize> = BTreeMap::new();
        if let (TrendRange::Daily30, Some(start)) = (self.range, self.start) {
            for day in start.date().iter_days().take_while(|d| *d <= self.anchor.date()) {
                counts.insert(BucketKey::Day(day), 0);
            }
        }
        for (date, record) in members {
            let key = match self.range {
                TrendRange::Daily30 => BucketKey::Day(*date),
                TrendRange::Monthly12 | TrendRange::MonthlyAll => BucketKey::month_of(*date),
            };
            let slot = counts.entry(key).or_insert(0);
            if kpi.matches(record, holidays) {
                *slot += 1;
            }
        }
        counts.into_iter().collect()
    }
}

fn months_back(year: i32, month: u32, n: i32) -> (i32, u32) {
    let total = year * 12 + month as i32 - 1 - n;
    (total.div_euclid(12), total.rem_euclid(12) as u32 + 1)
}
