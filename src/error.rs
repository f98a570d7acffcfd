use std::io;

use thiserror::Error;

/// Why a date, time, or timestamp cell could not be turned into a value.
///
/// Parse failures never abort normalization; they resolve to a null field
/// and are counted in the [`NormalizeReport`](crate::normalize::NormalizeReport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("empty date value")]
    Empty,
    #[error("expected year/month/day, found {0} part(s)")]
    WrongTokenCount(usize),
    #[error("non-numeric date part '{0}'")]
    NonNumeric(String),
    #[error("date {year}/{month}/{day} is out of range")]
    OutOfRange { year: i32, month: u32, day: u32 },
    #[error("unrecognized timestamp '{0}'")]
    Unrecognized(String),
}

/// The raw table does not look like the layout it was normalized against.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaMismatch {
    #[error("layout '{layout}' expects column '{column}', which is absent")]
    MissingColumn { layout: String, column: String },
    #[error("drop position {position} is outside a table of {width} column(s)")]
    DropPositionOutOfRange { position: usize, width: usize },
    #[error("drop column '{0}' is absent")]
    DropColumnAbsent(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KpiError {
    /// Zero records survived filtering; no ratio can be formed.
    #[error("no records to measure")]
    EmptyResultSet,
}

/// Failures at the edges of the pipeline: reading input, loading config,
/// writing reports.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid holiday '{value}' on line {line}: {source}")]
    Holiday {
        line: usize,
        value: String,
        source: DateParseError,
    },
    #[error(transparent)]
    Schema(#[from] SchemaMismatch),
    #[error("input has no header row")]
    MissingHeader,
}

pub type Result<T> = std::result::Result<T, PipelineError>;
