use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use tracing::info;

use crate::config::parse_holiday;
use crate::error::{PipelineError, Result};
use crate::types::{HolidaySet, RawTable};

/// Read a CSV export into a [`RawTable`]. Ragged rows are kept as-is;
/// short rows simply have fewer cells than there are headers.
pub fn load_table(path: impl AsRef<Path>) -> Result<RawTable> {
    let path = path.as_ref();
    let table = read_table(File::open(path)?)?;
    info!(
        path = %path.display(),
        columns = table.width(),
        rows = table.rows.len(),
        "loaded spreadsheet export"
    );
    Ok(table)
}

pub fn read_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(PipelineError::MissingHeader);
    }
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(RawTable::new(headers, rows))
}

/// Read a holiday list: one date per line, Jalali or Gregorian. Blank
/// lines and `#` comments are skipped.
pub fn load_holidays(path: impl AsRef<Path>) -> Result<HolidaySet> {
    read_holidays(BufReader::new(File::open(path)?))
}

pub fn read_holidays<R: BufRead>(reader: R) -> Result<HolidaySet> {
    let mut holidays = HolidaySet::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let value = line.split('#').next().unwrap_or("").trim();
        if value.is_empty() {
            continue;
        }
        let date = parse_holiday(value).map_err(|source| PipelineError::Holiday {
            line: i + 1,
            value: value.to_string(),
            source,
        })?;
        holidays.insert(date);
    }
    Ok(holidays)
}
