//! Column catalog and spreadsheet layouts.
//!
//! A [`SchemaLayout`] names the columns a given spreadsheet revision is
//! expected to carry and which columns to discard before renaming. Drops
//! can be given by zero-based position (older layouts) or by header name.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SchemaMismatch;

/// Canonical fields of a design-task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    BriefNumber,
    DesignerName,
    Customer,
    DeadlineDate,
    DeadlineHour,
    TaskType,
    EditCount,
    Reason,
    SubmissionTimestamp,
    SubmissionHour,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::BriefNumber,
        Field::DesignerName,
        Field::Customer,
        Field::DeadlineDate,
        Field::DeadlineHour,
        Field::TaskType,
        Field::EditCount,
        Field::Reason,
        Field::SubmissionTimestamp,
        Field::SubmissionHour,
    ];

    pub fn canonical_name(self) -> &'static str {
        match self {
            Field::BriefNumber => "brief_number",
            Field::DesignerName => "designer_name",
            Field::Customer => "customer",
            Field::DeadlineDate => "deadline_date",
            Field::DeadlineHour => "deadline_hour",
            Field::TaskType => "task_type",
            Field::EditCount => "edit_count",
            Field::Reason => "reason",
            Field::SubmissionTimestamp => "submission_timestamp",
            Field::SubmissionHour => "submission_hour",
        }
    }

    /// Header used for this field in the source spreadsheet.
    pub fn source_header(self) -> &'static str {
        match self {
            Field::BriefNumber => "شماره بریف",
            Field::DesignerName => "نام طراح",
            Field::Customer => "مشتری",
            Field::DeadlineDate => "تاریخ ددلاین",
            Field::DeadlineHour => "ساعت ددلاین",
            Field::TaskType => "نوع کاور",
            Field::EditCount => "تعداد ادیت",
            Field::Reason => "دلیل ادیت",
            Field::SubmissionTimestamp => "تاریخ ارسال",
            Field::SubmissionHour => "ساعت ارسال",
        }
    }

    fn from_source_header(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.source_header() == label)
    }

    fn from_canonical_name(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.canonical_name() == label)
    }
}

/// Whether a column arrived with its source header or was already renamed.
///
/// Matters for the deadline column: source values are Jalali, already
/// normalized values are ISO dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Source,
    Canonical,
}

/// A column to discard, by zero-based position or by header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSelector {
    Position(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaLayout {
    pub version: String,
    pub drop: Vec<ColumnSelector>,
    pub required: Vec<Field>,
}

impl Default for SchemaLayout {
    fn default() -> Self {
        Self {
            version: "default".to_string(),
            drop: Vec::new(),
            required: Field::ALL.to_vec(),
        }
    }
}

/// Where each canonical field lives in a concrete table, after trimming,
/// dropping and renaming.
#[derive(Debug, Clone, Default)]
pub struct ColumnPlan {
    pub bindings: HashMap<Field, (usize, Origin)>,
    pub issues: Vec<SchemaMismatch>,
}

impl ColumnPlan {
    pub fn binding(&self, field: Field) -> Option<(usize, Origin)> {
        self.bindings.get(&field).copied()
    }
}

impl SchemaLayout {
    /// Layout that drops columns by position only, as older spreadsheet
    /// revisions were handled.
    pub fn positional(version: impl Into<String>, positions: &[usize]) -> Self {
        Self {
            version: version.into(),
            drop: positions.iter().copied().map(ColumnSelector::Position).collect(),
            ..Self::default()
        }
    }

    /// Work out which columns survive and which canonical field each one
    /// feeds. Problems are collected, never fatal.
    pub fn resolve(&self, headers: &[String]) -> ColumnPlan {
        let trimmed: Vec<&str> = headers.iter().map(|h| h.trim()).collect();
        let width = trimmed.len();
        let mut plan = ColumnPlan::default();

        let mut dropped = BTreeSet::new();
        for selector in &self.drop {
            match selector {
                ColumnSelector::Position(p) if *p < width => {
                    dropped.insert(*p);
                }
                ColumnSelector::Position(p) => {
                    debug!(position = *p, width, "drop position out of range, ignored");
                    plan.issues.push(SchemaMismatch::DropPositionOutOfRange {
                        position: *p,
                        width,
                    });
                }
                ColumnSelector::Name(name) => {
                    match trimmed.iter().position(|h| *h == name.trim()) {
                        Some(p) => {
                            dropped.insert(p);
                        }
                        None => plan
                            .issues
                            .push(SchemaMismatch::DropColumnAbsent(name.clone())),
                    }
                }
            }
        }

        for (idx, label) in trimmed.iter().enumerate() {
            if dropped.contains(&idx) {
                continue;
            }
            // Unrecognized labels keep their name and feed no field.
            let field = Field::from_source_header(label)
                .map(|f| (f, Origin::Source))
                .or_else(|| Field::from_canonical_name(label).map(|f| (f, Origin::Canonical)));
            if let Some((f, origin)) = field {
                plan.bindings.entry(f).or_insert((idx, origin));
            }
        }

        for field in &self.required {
            if !plan.bindings.contains_key(field) {
                plan.issues.push(SchemaMismatch::MissingColumn {
                    layout: self.version.clone(),
                    column: field.canonical_name().to_string(),
                });
            }
        }
        plan
    }

    /// Strict check: the first mismatch between `headers` and this layout.
    pub fn check(&self, headers: &[String]) -> Result<(), SchemaMismatch> {
        match self.resolve(headers).issues.into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn renames_trimmed_source_headers() {
        let layout = SchemaLayout {
            required: vec![Field::DesignerName],
            ..SchemaLayout::default()
        };
        let plan = layout.resolve(&headers(&[" نام طراح ", "Notes"]));
        assert_eq!(plan.bindings.len(), 1);
        assert_eq!(plan.binding(Field::DesignerName), Some((0, Origin::Source)));
        assert!(plan.issues.is_empty());
    }

    #[test]
    fn canonical_headers_bind_as_canonical() {
        let plan = SchemaLayout::default().resolve(&headers(&["deadline_date"]));
        assert_eq!(plan.binding(Field::DeadlineDate), Some((0, Origin::Canonical)));
    }

    #[test]
    fn positional_drop_ignores_out_of_range() {
        let layout = SchemaLayout {
            required: vec![],
            ..SchemaLayout::positional("v2", &[0, 9])
        };
        let plan = layout.resolve(&headers(&["ردیف", "مشتری"]));
        assert_eq!(plan.binding(Field::Customer), Some((1, Origin::Source)));
        assert_eq!(
            plan.issues,
            vec![SchemaMismatch::DropPositionOutOfRange { position: 9, width: 2 }]
        );
    }

    #[test]
    fn named_drop_and_missing_required() {
        let layout = SchemaLayout {
            version: "v3".into(),
            drop: vec![ColumnSelector::Name("ردیف".into())],
            required: vec![Field::Customer, Field::EditCount],
        };
        let hs = headers(&["ردیف", "مشتری"]);
        let plan = layout.resolve(&hs);
        assert_eq!(plan.binding(Field::Customer), Some((1, Origin::Source)));
        assert_eq!(plan.issues.len(), 1);
        assert_eq!(
            layout.check(&hs),
            Err(SchemaMismatch::MissingColumn {
                layout: "v3".into(),
                column: "edit_count".into()
            })
        );
    }

    #[test]
    fn dropping_a_source_column_unbinds_it() {
        let layout = SchemaLayout {
            required: vec![Field::Customer],
            ..SchemaLayout::positional("v1", &[0])
        };
        let plan = layout.resolve(&headers(&["مشتری"]));
        assert_eq!(plan.binding(Field::Customer), None);
        assert_eq!(plan.issues.len(), 1);
    }
}
