use std::path::Path;

use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::error::Result;
use crate::types::RawTable;

pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a raw table (e.g. normalized records) with its header row.
pub fn write_table(path: impl AsRef<Path>, table: &RawTable) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown rendering of the first `max_rows` rows.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrendRow;

    fn row(bucket: &str) -> TrendRow {
        TrendRow {
            series: "Team".into(),
            bucket: bucket.into(),
            kpi: "Late submissions".into(),
            value: 1,
        }
    }

    #[test]
    fn renders_markdown_and_truncates() {
        let rendered = render_table(&[row("2023-01"), row("2023-02")], 1);
        assert!(rendered.contains("| Series"));
        assert!(rendered.contains("2023-01"));
        assert!(!rendered.contains("2023-02"));
        assert_eq!(render_table::<TrendRow>(&[], 5), "(no rows)");
    }

    #[test]
    fn writes_csv_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trend.csv");
        write_csv(&path, &[row("2023-01")]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Series,Bucket,Kpi,Value\nTeam,2023-01,Late submissions,1\n");
    }
}
