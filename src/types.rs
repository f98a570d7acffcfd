use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};
use tabled::Tabled;

/// A spreadsheet as read from disk: one header row plus data rows, all
/// cells kept as text. Column order is preserved because some layouts
/// address columns by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Borrowed view of one data row with its column labels.
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    pub headers: &'a [String],
    pub cells: &'a [String],
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.rows.iter().map(|cells| RawRow {
            headers: &self.headers,
            cells,
        })
    }
}

impl<'a> RawRow<'a> {
    /// Cell under `label`, or `None` when the column is absent or the row
    /// is shorter than the header.
    pub fn get(&self, label: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == label)?;
        self.cells.get(idx).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let (headers, cells) = (self.headers, self.cells);
        headers
            .iter()
            .enumerate()
            .map(move |(i, h)| (h.as_str(), cells.get(i).map_or("", String::as_str)))
    }
}

/// Cover type of a design task, named after the house color codes
/// (green, red, yellow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskType {
    GhormeSabzi,
    Omlet,
    Burger,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::GhormeSabzi, TaskType::Omlet, TaskType::Burger];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::GhormeSabzi => "GhormeSabzi",
            TaskType::Omlet => "Omlet",
            TaskType::Burger => "Burger",
        }
    }

    pub fn from_canonical(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Cause of a revision round. The escalated variants are the same causes
/// raised by a team lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reason {
    DesignerError,
    CustomerError,
    Taste,
    EscalatedDesignerError,
    EscalatedCustomerError,
    EscalatedTaste,
}

impl Reason {
    pub const ALL: [Reason; 6] = [
        Reason::DesignerError,
        Reason::CustomerError,
        Reason::Taste,
        Reason::EscalatedDesignerError,
        Reason::EscalatedCustomerError,
        Reason::EscalatedTaste,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Reason::DesignerError => "DesignerError",
            Reason::CustomerError => "CustomerError",
            Reason::Taste => "Taste",
            Reason::EscalatedDesignerError => "EscalatedDesignerError",
            Reason::EscalatedCustomerError => "EscalatedCustomerError",
            Reason::EscalatedTaste => "EscalatedTaste",
        }
    }

    pub fn from_canonical(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }

    pub fn is_designer_fault(self) -> bool {
        matches!(self, Reason::DesignerError | Reason::EscalatedDesignerError)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A controlled-vocabulary value, or the raw label when no table entry
/// matched. Unmapped labels are carried verbatim, never replaced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Labeled<T> {
    Known(T),
    Unmapped(String),
}

impl<T: Copy> Labeled<T> {
    pub fn known(&self) -> Option<T> {
        match self {
            Labeled::Known(v) => Some(*v),
            Labeled::Unmapped(_) => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Labeled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Labeled::Known(v) => v.fmt(f),
            Labeled::Unmapped(raw) => f.write_str(raw),
        }
    }
}

impl<T: fmt::Display> Serialize for Labeled<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One design task after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CanonicalRecord {
    pub brief_number: Option<String>,
    pub designer_name: Option<String>,
    pub customer: Option<String>,
    pub task_type: Option<Labeled<TaskType>>,
    pub edit_count: u32,
    pub reason: Option<Labeled<Reason>>,
    pub submission_timestamp: Option<NaiveDateTime>,
    pub submission_hour: Option<NaiveTime>,
    pub deadline_date: Option<NaiveDate>,
    pub deadline_hour: Option<NaiveTime>,
}

impl CanonicalRecord {
    pub fn task_type(&self) -> Option<TaskType> {
        self.task_type.as_ref().and_then(Labeled::known)
    }

    pub fn reason(&self) -> Option<Reason> {
        self.reason.as_ref().and_then(Labeled::known)
    }

    pub fn submission_date(&self) -> Option<NaiveDate> {
        self.submission_timestamp.map(|ts| ts.date())
    }

    pub fn designer(&self) -> Option<&str> {
        self.designer_name.as_deref()
    }
}

/// Dates that count as late submissions regardless of the hour.
///
/// Owned by the caller and edited between pipeline calls; the pipeline
/// only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet {
    dates: BTreeSet<NaiveDate>,
}

impl HolidaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.dates.insert(date)
    }

    pub fn remove(&mut self, date: &NaiveDate) -> bool {
        self.dates.remove(date)
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.dates.contains(date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> {
        self.dates.iter()
    }
}

impl FromIterator<NaiveDate> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}

impl Extend<NaiveDate> for HolidaySet {
    fn extend<I: IntoIterator<Item = NaiveDate>>(&mut self, iter: I) {
        self.dates.extend(iter);
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiRow {
    #[serde(rename = "Series")]
    #[tabled(rename = "Series")]
    pub series: String,
    #[serde(rename = "Kpi")]
    #[tabled(rename = "Kpi")]
    pub kpi: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: usize,
    #[serde(rename = "Ratio")]
    #[tabled(rename = "Ratio")]
    pub ratio: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendRow {
    #[serde(rename = "Series")]
    #[tabled(rename = "Series")]
    pub series: String,
    #[serde(rename = "Bucket")]
    #[tabled(rename = "Bucket")]
    pub bucket: String,
    #[serde(rename = "Kpi")]
    #[tabled(rename = "Kpi")]
    pub kpi: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: usize,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_tasks: usize,
    pub total_designers: usize,
    pub total_customers: usize,
    pub avg_edit_count: f64,
    pub late_ratio: Option<f64>,
    pub designer_error_ratio: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_row_lookup_by_label() {
        let table = RawTable::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into()]],
        );
        let row = table.rows().next().unwrap();
        assert_eq!(row.get("a"), Some("1"));
        assert_eq!(row.get("b"), None);
        assert_eq!(row.iter().collect::<Vec<_>>(), vec![("a", "1"), ("b", "")]);
    }

    #[test]
    fn labeled_displays_raw_when_unmapped() {
        assert_eq!(Labeled::Known(TaskType::Omlet).to_string(), "Omlet");
        assert_eq!(Labeled::<TaskType>::Unmapped("آبی".into()).to_string(), "آبی");
    }

    #[test]
    fn holiday_set_is_editable() {
        let day = NaiveDate::from_ymd_opt(2023, 3, 21).unwrap();
        let mut holidays = HolidaySet::new();
        assert!(holidays.insert(day));
        assert!(holidays.contains(&day));
        assert!(holidays.remove(&day));
        assert!(holidays.is_empty());
    }
}
