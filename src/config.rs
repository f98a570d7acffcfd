//! Pipeline configuration loaded from TOML.
//!
//! ```toml
//! [layout]
//! version = "1402-v2"
//! drop = [0, "ستون اضافه"]
//! required = ["designer_name", "task_type", "submission_timestamp"]
//!
//! [holidays]
//! dates = ["1402/01/01", "2023-04-21"]
//! ```

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::calendar::jalali_to_gregorian;
use crate::error::{DateParseError, PipelineError, Result};
use crate::schema::SchemaLayout;
use crate::types::HolidaySet;
use crate::util::{fold_digits, parse_date};

/// Years below this are read as Jalali, the rest as Gregorian.
const JALALI_YEAR_CEILING: u32 = 1700;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub layout: SchemaLayout,
    pub holidays: HolidayConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HolidayConfig {
    pub dates: Vec<String>,
}

impl PipelineConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn holiday_set(&self) -> Result<HolidaySet> {
        self.holidays
            .dates
            .iter()
            .enumerate()
            .map(|(i, value)| {
                parse_holiday(value).map_err(|source| PipelineError::Holiday {
                    line: i + 1,
                    value: value.clone(),
                    source,
                })
            })
            .collect()
    }
}

/// Parse a holiday written either as a Jalali `yyyy/mm/dd` date or as a
/// Gregorian date.
pub fn parse_holiday(value: &str) -> std::result::Result<NaiveDate, DateParseError> {
    let folded = fold_digits(value.trim());
    let leading_year = folded
        .split(['/', '-'])
        .next()
        .and_then(|y| y.trim().parse::<u32>().ok());
    match leading_year {
        Some(year) if year < JALALI_YEAR_CEILING => jalali_to_gregorian(&folded),
        _ => parse_date(&folded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnSelector, Field};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_layout_and_holidays() {
        let cfg = PipelineConfig::from_toml(
            r#"
            [layout]
            version = "1402-v2"
            drop = [0, "ستون اضافه"]
            required = ["designer_name", "task_type"]

            [holidays]
            dates = ["1402/01/01", "2023-04-21"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.layout.version, "1402-v2");
        assert_eq!(
            cfg.layout.drop,
            vec![
                ColumnSelector::Position(0),
                ColumnSelector::Name("ستون اضافه".into())
            ]
        );
        assert_eq!(cfg.layout.required, vec![Field::DesignerName, Field::TaskType]);

        let holidays = cfg.holiday_set().unwrap();
        assert!(holidays.contains(&NaiveDate::from_ymd_opt(2023, 3, 21).unwrap()));
        assert!(holidays.contains(&NaiveDate::from_ymd_opt(2023, 4, 21).unwrap()));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = PipelineConfig::from_toml("").unwrap();
        assert_eq!(cfg.layout, SchemaLayout::default());
        assert!(cfg.holiday_set().unwrap().is_empty());
    }

    #[test]
    fn bad_holiday_reports_its_line() {
        let cfg = PipelineConfig::from_toml("[holidays]\ndates = [\"2023-01-01\", \"1402/14/01\"]")
            .unwrap();
        match cfg.holiday_set() {
            Err(PipelineError::Holiday { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
    }
}
