//! Raw spreadsheet rows to canonical records.
//!
//! Every record is derived from exactly one row. Problems with individual
//! cells become null fields and counters in [`NormalizeReport`]; problems
//! with the table shape become [`SchemaMismatch`] issues. Neither stops
//! the batch.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info, warn};

use crate::calendar::jalali_to_gregorian;
use crate::category::{
    customer_category, designer_alias, normalize_customer, normalize_designer, normalize_reason,
    normalize_task_type,
};
use crate::error::{DateParseError, SchemaMismatch};
use crate::schema::{ColumnPlan, Field, Origin, SchemaLayout};
use crate::types::{CanonicalRecord, Labeled, RawRow, RawTable};
use crate::util::{non_empty, parse_date, parse_time, parse_timestamp, parse_u32_safe};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const TIME_FORMAT: &str = "%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub total_rows: usize,
    /// Cells that were present but could not be parsed, per field.
    pub parse_failures: BTreeMap<Field, usize>,
    /// Category cells that matched no table entry and passed through.
    pub unmapped: BTreeMap<Field, usize>,
}

impl NormalizeReport {
    pub fn parse_failures_for(&self, field: Field) -> usize {
        self.parse_failures.get(&field).copied().unwrap_or(0)
    }

    pub fn unmapped_for(&self, field: Field) -> usize {
        self.unmapped.get(&field).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<CanonicalRecord>,
    pub issues: Vec<SchemaMismatch>,
    pub report: NormalizeReport,
}

/// Normalize every row of `table` against `layout`.
pub fn normalize_table(table: &RawTable, layout: &SchemaLayout) -> Normalized {
    let plan = layout.resolve(&table.headers);
    for issue in &plan.issues {
        warn!(layout = %layout.version, "{issue}");
    }

    let mut report = NormalizeReport::default();
    let records: Vec<CanonicalRecord> = table
        .rows()
        .enumerate()
        .map(|(idx, row)| {
            report.total_rows += 1;
            normalize_row(idx, row, &plan, &mut report)
        })
        .collect();

    info!(
        rows = report.total_rows,
        parse_failures = report.parse_failures.values().sum::<usize>(),
        unmapped = report.unmapped.values().sum::<usize>(),
        "normalized design tasks"
    );
    Normalized {
        records,
        issues: plan.issues,
        report,
    }
}

fn normalize_row(
    idx: usize,
    row: RawRow<'_>,
    plan: &ColumnPlan,
    report: &mut NormalizeReport,
) -> CanonicalRecord {
    let raw = |field: Field| -> Option<&str> {
        let (pos, _) = plan.binding(field)?;
        row.cells.get(pos).map(String::as_str)
    };
    let cell = |field: Field| non_empty(raw(field));
    // Category labels pass through verbatim, whitespace-only ones included;
    // only a truly empty cell is null.
    let label = |field: Field| raw(field).filter(|v| !v.is_empty());

    let deadline_date: Option<NaiveDate> = cell(Field::DeadlineDate).and_then(|v| {
        let result = match plan.binding(Field::DeadlineDate) {
            Some((_, Origin::Canonical)) => parse_date(v),
            _ => jalali_to_gregorian(v),
        };
        parsed(idx, Field::DeadlineDate, result, report)
    });
    let deadline_hour: Option<NaiveTime> = cell(Field::DeadlineHour)
        .and_then(|v| parsed(idx, Field::DeadlineHour, parse_time(v), report));
    let submission_timestamp: Option<NaiveDateTime> = cell(Field::SubmissionTimestamp)
        .and_then(|v| parsed(idx, Field::SubmissionTimestamp, parse_timestamp(v), report));
    let submission_hour: Option<NaiveTime> = cell(Field::SubmissionHour)
        .and_then(|v| parsed(idx, Field::SubmissionHour, parse_time(v), report));

    let edit_count = match cell(Field::EditCount) {
        Some(v) => parse_u32_safe(Some(v)).unwrap_or_else(|| {
            debug!(row = idx, value = v, "unparsable edit count, using 0");
            *report.parse_failures.entry(Field::EditCount).or_default() += 1;
            0
        }),
        None => 0,
    };

    let designer_name = label(Field::DesignerName).map(|v| {
        note_unmapped(report, Field::DesignerName, designer_alias(v).is_some());
        normalize_designer(v)
    });
    let customer = label(Field::Customer).map(|v| {
        note_unmapped(report, Field::Customer, customer_category(v).is_some());
        normalize_customer(v)
    });
    let task_type = label(Field::TaskType).map(|v| {
        let t = normalize_task_type(v);
        note_unmapped(report, Field::TaskType, matches!(t, Labeled::Known(_)));
        t
    });
    let reason = label(Field::Reason).map(|v| {
        let r = normalize_reason(v);
        note_unmapped(report, Field::Reason, matches!(r, Labeled::Known(_)));
        r
    });

    CanonicalRecord {
        brief_number: cell(Field::BriefNumber).map(str::to_string),
        designer_name,
        customer,
        task_type,
        edit_count,
        reason,
        submission_timestamp,
        submission_hour,
        deadline_date,
        deadline_hour,
    }
}

fn parsed<T>(
    idx: usize,
    field: Field,
    result: Result<T, DateParseError>,
    report: &mut NormalizeReport,
) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(row = idx, field = field.canonical_name(), error = %e, "unparsable cell");
            *report.parse_failures.entry(field).or_default() += 1;
            None
        }
    }
}

fn note_unmapped(report: &mut NormalizeReport, field: Field, mapped: bool) {
    if !mapped {
        *report.unmapped.entry(field).or_default() += 1;
    }
}

/// Render canonical records back into a table with canonical headers.
///
/// Feeding the result through [`normalize_table`] reproduces the same
/// records.
pub fn records_to_table(records: &[CanonicalRecord]) -> RawTable {
    let headers = Field::ALL
        .iter()
        .map(|f| f.canonical_name().to_string())
        .collect();
    let rows = records
        .iter()
        .map(|r| {
            Field::ALL
                .iter()
                .map(|f| canonical_cell(r, *f))
                .collect()
        })
        .collect();
    RawTable::new(headers, rows)
}

fn canonical_cell(r: &CanonicalRecord, field: Field) -> String {
    fn opt<T: ToString>(v: Option<&T>) -> String {
        v.map(ToString::to_string).unwrap_or_default()
    }
    match field {
        Field::BriefNumber => opt(r.brief_number.as_ref()),
        Field::DesignerName => opt(r.designer_name.as_ref()),
        Field::Customer => opt(r.customer.as_ref()),
        Field::DeadlineDate => r
            .deadline_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        Field::DeadlineHour => r
            .deadline_hour
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or_default(),
        Field::TaskType => opt(r.task_type.as_ref()),
        Field::EditCount => r.edit_count.to_string(),
        Field::Reason => opt(r.reason.as_ref()),
        Field::SubmissionTimestamp => r
            .submission_timestamp
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default(),
        Field::SubmissionHour => r
            .submission_hour
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Reason, TaskType};
    use pretty_assertions::assert_eq;

    fn source_table(rows: Vec<Vec<&str>>) -> RawTable {
        let headers = Field::ALL
            .iter()
            .map(|f| format!(" {} ", f.source_header()))
            .collect();
        RawTable::new(
            headers,
            rows.into_iter()
                .map(|r| r.into_iter().map(str::to_string).collect())
                .collect(),
        )
    }

    fn sample() -> RawTable {
        source_table(vec![
            vec![
                "101", " سارا ", "کانال موسیقی", "1402/01/01", "12:00", "کاور سبز", "3",
                "تیم لید: خطای طراح", "2023-03-25 18:10:00", "18:10",
            ],
            vec![
                "102", "Kaveh", "Bank", "1402/13/40", "", "آبی", "x", "نامشخص", "not a date",
                "",
            ],
        ])
    }

    #[test]
    fn normalizes_source_rows() {
        let out = normalize_table(&sample(), &SchemaLayout::default());
        assert!(out.issues.is_empty());
        let first = &out.records[0];
        assert_eq!(first.brief_number.as_deref(), Some("101"));
        assert_eq!(first.designer_name.as_deref(), Some("Sara"));
        assert_eq!(first.customer.as_deref(), Some("Music"));
        assert_eq!(first.task_type(), Some(TaskType::GhormeSabzi));
        assert_eq!(first.reason(), Some(Reason::EscalatedDesignerError));
        assert_eq!(first.edit_count, 3);
        assert_eq!(first.deadline_date, NaiveDate::from_ymd_opt(2023, 3, 21));
        assert_eq!(first.submission_hour, NaiveTime::from_hms_opt(18, 10, 0));
    }

    #[test]
    fn bad_cells_become_null_and_are_counted() {
        let out = normalize_table(&sample(), &SchemaLayout::default());
        let second = &out.records[1];
        assert_eq!(second.deadline_date, None);
        assert_eq!(second.submission_timestamp, None);
        assert_eq!(second.submission_hour, None);
        assert_eq!(second.edit_count, 0);
        assert_eq!(second.task_type, Some(Labeled::Unmapped("آبی".into())));
        assert_eq!(second.customer.as_deref(), Some("Bank"));

        assert_eq!(out.report.total_rows, 2);
        assert_eq!(out.report.parse_failures_for(Field::DeadlineDate), 1);
        assert_eq!(out.report.parse_failures_for(Field::SubmissionTimestamp), 1);
        assert_eq!(out.report.parse_failures_for(Field::EditCount), 1);
        assert_eq!(out.report.parse_failures_for(Field::SubmissionHour), 0);
        assert_eq!(out.report.unmapped_for(Field::DesignerName), 1);
        assert_eq!(out.report.unmapped_for(Field::Reason), 1);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let first = normalize_table(&sample(), &SchemaLayout::default()).records;
        let again = normalize_table(&records_to_table(&first), &SchemaLayout::default());
        assert!(again.issues.is_empty());
        assert_eq!(again.records, first);
    }

    #[test]
    fn missing_column_skips_field_for_every_row() {
        let mut table = sample();
        table.headers[1] = "something else".into();
        let out = normalize_table(&table, &SchemaLayout::default());
        assert_eq!(out.records.len(), 2);
        assert!(out.records.iter().all(|r| r.designer_name.is_none()));
        assert_eq!(
            out.issues,
            vec![SchemaMismatch::MissingColumn {
                layout: "default".into(),
                column: "designer_name".into()
            }]
        );
    }

    #[test]
    fn positional_drop_removes_column_before_rename() {
        let layout = SchemaLayout::positional("v1", &[2, 42]);
        let out = normalize_table(&sample(), &layout);
        assert!(out.records.iter().all(|r| r.customer.is_none()));
        assert_eq!(out.issues.len(), 2);
    }

    #[test]
    fn whitespace_only_labels_pass_through() {
        let table = source_table(vec![vec!["8", "  ", " ", "", "", "   ", "", "\t"]]);
        let out = normalize_table(&table, &SchemaLayout::default());
        let rec = &out.records[0];
        assert_eq!(rec.designer_name.as_deref(), Some("  "));
        assert_eq!(rec.customer.as_deref(), Some(" "));
        assert_eq!(rec.task_type, Some(Labeled::Unmapped("   ".into())));
        assert_eq!(rec.reason, Some(Labeled::Unmapped("\t".into())));
        assert_eq!(rec.edit_count, 0);
        assert_eq!(out.report.unmapped_for(Field::DesignerName), 1);

        let again = normalize_table(&records_to_table(&out.records), &SchemaLayout::default());
        assert_eq!(again.records, out.records);
    }

    #[test]
    fn short_rows_do_not_panic() {
        let table = source_table(vec![vec!["7", "رضا"]]);
        let out = normalize_table(&table, &SchemaLayout::default());
        assert_eq!(out.records[0].designer_name.as_deref(), Some("Reza"));
        assert_eq!(out.records[0].task_type, None);
    }
}
