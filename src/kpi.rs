//! The fixed catalog of task KPIs.
//!
//! Each [`Kpi`] is a predicate over a single record; a KPI value for a set
//! of records is the number of records the predicate accepts.

use std::fmt;
use std::str::FromStr;

use chrono::Timelike;
use serde::Serialize;

use crate::error::KpiError;
use crate::types::{CanonicalRecord, HolidaySet, TaskType};

/// Submissions at or after this hour count as late.
pub const LATE_CUTOFF_HOUR: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Kpi {
    GhormeSabzi,
    Omlet,
    Burger,
    DesignerError,
    MultiEdit,
    Late,
}

pub type Predicate = fn(&CanonicalRecord, &HolidaySet) -> bool;

/// Display metadata and predicate for one catalog entry.
#[derive(Clone, Copy)]
pub struct KpiDefinition {
    pub kind: Kpi,
    pub key: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub predicate: Predicate,
}

static CATALOG: [KpiDefinition; 6] = [
    KpiDefinition {
        kind: Kpi::GhormeSabzi,
        key: "ghorme-sabzi",
        label: "GhormeSabzi covers",
        color: "#2e7d32",
        predicate: |r, _| r.task_type() == Some(TaskType::GhormeSabzi),
    },
    KpiDefinition {
        kind: Kpi::Omlet,
        key: "omlet",
        label: "Omlet covers",
        color: "#c62828",
        predicate: |r, _| r.task_type() == Some(TaskType::Omlet),
    },
    KpiDefinition {
        kind: Kpi::Burger,
        key: "burger",
        label: "Burger covers",
        color: "#f9a825",
        predicate: |r, _| r.task_type() == Some(TaskType::Burger),
    },
    KpiDefinition {
        kind: Kpi::DesignerError,
        key: "designer-error",
        label: "Designer errors",
        color: "#6a1b9a",
        predicate: |r, _| r.reason().is_some_and(|reason| reason.is_designer_fault()),
    },
    KpiDefinition {
        kind: Kpi::MultiEdit,
        key: "multi-edit",
        label: "Two or more edits",
        color: "#1565c0",
        predicate: |r, _| r.edit_count >= 2,
    },
    KpiDefinition {
        kind: Kpi::Late,
        key: "late",
        label: "Late submissions",
        color: "#ef6c00",
        predicate: is_late,
    },
];

impl fmt::Debug for KpiDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KpiDefinition")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Late means submitted at or after the cutoff hour, or on a holiday.
/// Either condition alone is enough.
pub fn is_late(record: &CanonicalRecord, holidays: &HolidaySet) -> bool {
    let after_hours = record
        .submission_hour
        .is_some_and(|h| h.hour() >= LATE_CUTOFF_HOUR);
    let on_holiday = record
        .submission_date()
        .is_some_and(|d| holidays.contains(&d));
    after_hours || on_holiday
}

impl Kpi {
    pub const ALL: [Kpi; 6] = [
        Kpi::GhormeSabzi,
        Kpi::Omlet,
        Kpi::Burger,
        Kpi::DesignerError,
        Kpi::MultiEdit,
        Kpi::Late,
    ];

    pub fn definition(self) -> &'static KpiDefinition {
        let def = &CATALOG[self as usize];
        debug_assert_eq!(def.kind, self);
        def
    }

    pub fn key(self) -> &'static str {
        self.definition().key
    }

    pub fn label(self) -> &'static str {
        self.definition().label
    }

    pub fn matches(self, record: &CanonicalRecord, holidays: &HolidaySet) -> bool {
        (self.definition().predicate)(record, holidays)
    }
}

impl fmt::Display for Kpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Kpi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kpi::ALL
            .into_iter()
            .find(|k| k.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let keys: Vec<&str> = Kpi::ALL.iter().map(|k| k.key()).collect();
                format!("unknown KPI '{s}', expected one of: {}", keys.join(", "))
            })
    }
}

/// Number of records accepted by `kpi`.
pub fn count<'a, I>(records: I, kpi: Kpi, holidays: &HolidaySet) -> usize
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    records
        .into_iter()
        .filter(|r| kpi.matches(r, holidays))
        .count()
}

/// A KPI measured against a record set. An empty set yields `NoData`
/// rather than a zero ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpiReading {
    NoData,
    Measured { count: usize, total: usize },
}

impl KpiReading {
    pub fn ratio(self) -> Option<f64> {
        match self {
            KpiReading::NoData => None,
            KpiReading::Measured { count, total } => Some(count as f64 / total as f64),
        }
    }
}

pub fn ratio(records: &[CanonicalRecord], kpi: Kpi, holidays: &HolidaySet) -> KpiReading {
    if records.is_empty() {
        return KpiReading::NoData;
    }
    KpiReading::Measured {
        count: count(records, kpi, holidays),
        total: records.len(),
    }
}

/// All six KPIs for one non-empty record set.
///
/// Only [`snapshot`] builds one, so `total` is never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSnapshot {
    total: usize,
    counts: Vec<(Kpi, usize)>,
}

impl KpiSnapshot {
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn counts(&self) -> &[(Kpi, usize)] {
        &self.counts
    }

    pub fn reading(&self, kpi: Kpi) -> KpiReading {
        KpiReading::Measured {
            count: self.count(kpi),
            total: self.total,
        }
    }

    pub fn count(&self, kpi: Kpi) -> usize {
        self.counts
            .iter()
            .find(|(k, _)| *k == kpi)
            .map_or(0, |(_, c)| *c)
    }

    pub fn ratio(&self, kpi: Kpi) -> f64 {
        self.count(kpi) as f64 / self.total as f64
    }
}

pub fn snapshot<'a, I>(records: I, holidays: &HolidaySet) -> Result<KpiSnapshot, KpiError>
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    let records: Vec<&CanonicalRecord> = records.into_iter().collect();
    if records.is_empty() {
        return Err(KpiError::EmptyResultSet);
    }
    let counts = Kpi::ALL
        .iter()
        .map(|kpi| (*kpi, count(records.iter().copied(), *kpi, holidays)))
        .collect();
    Ok(KpiSnapshot {
        total: records.len(),
        counts,
    })
}
