//! Explicit state handed to every report call: the current canonical
//! record set and the holiday set.
//!
//! The owning application replaces records wholesale on re-upload and
//! edits holidays between calls; reporting methods only borrow.

use tracing::info;

use crate::error::KpiError;
use crate::filter::RecordFilter;
use crate::kpi::{self, Kpi, KpiReading, KpiSnapshot};
use crate::normalize::{normalize_table, Normalized};
use crate::schema::SchemaLayout;
use crate::trend::{self, SeriesFilter, TrendRange, TrendSeries};
use crate::types::{CanonicalRecord, HolidaySet, RawTable};

#[derive(Debug, Clone, Default)]
pub struct ReportContext {
    records: Vec<CanonicalRecord>,
    holidays: HolidaySet,
}

impl ReportContext {
    pub fn new(records: Vec<CanonicalRecord>, holidays: HolidaySet) -> Self {
        Self { records, holidays }
    }

    /// Normalize `table` and build a context over the result. The
    /// normalization outcome is returned alongside for diagnostics.
    pub fn ingest(table: &RawTable, layout: &SchemaLayout, holidays: HolidaySet) -> (Self, Normalized) {
        let mut normalized = normalize_table(table, layout);
        let records = std::mem::take(&mut normalized.records);
        (Self::new(records, holidays), normalized)
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn holidays(&self) -> &HolidaySet {
        &self.holidays
    }

    pub fn holidays_mut(&mut self) -> &mut HolidaySet {
        &mut self.holidays
    }

    /// Swap in a freshly normalized record set, returning the old one.
    pub fn replace_records(&mut self, records: Vec<CanonicalRecord>) -> Vec<CanonicalRecord> {
        info!(old = self.records.len(), new = records.len(), "replacing record set");
        std::mem::replace(&mut self.records, records)
    }

    pub fn select(&self, filter: &RecordFilter) -> Vec<CanonicalRecord> {
        filter.apply(&self.records)
    }

    pub fn reading(&self, filter: &RecordFilter, kpi: Kpi) -> KpiReading {
        kpi::ratio(&self.select(filter), kpi, &self.holidays)
    }

    pub fn snapshot(&self, filter: &RecordFilter) -> Result<KpiSnapshot, KpiError> {
        kpi::snapshot(&self.select(filter), &self.holidays)
    }

    pub fn trend(
        &self,
        filter: &RecordFilter,
        kpi: Kpi,
        range: TrendRange,
        series: &[SeriesFilter],
    ) -> Vec<TrendSeries> {
        trend::aggregate(&self.select(filter), kpi, range, &self.holidays, series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn late_at(day: u32) -> CanonicalRecord {
        CanonicalRecord {
            submission_timestamp: Some(
                NaiveDate::from_ymd_opt(2023, 6, day)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap(),
            ),
            ..CanonicalRecord::default()
        }
    }

    #[test]
    fn holiday_edits_apply_to_later_calls() {
        let mut ctx = ReportContext::new(vec![late_at(5), late_at(6)], HolidaySet::new());
        let all = RecordFilter::all();
        assert_eq!(
            ctx.reading(&all, Kpi::Late),
            KpiReading::Measured { count: 0, total: 2 }
        );
        ctx.holidays_mut()
            .insert(NaiveDate::from_ymd_opt(2023, 6, 5).unwrap());
        assert_eq!(
            ctx.reading(&all, Kpi::Late),
            KpiReading::Measured { count: 1, total: 2 }
        );
    }

    #[test]
    fn filtered_to_nothing_is_no_data() {
        let ctx = ReportContext::new(vec![late_at(5)], HolidaySet::new());
        let nobody = RecordFilter::designer("Nobody");
        assert_eq!(ctx.reading(&nobody, Kpi::Late), KpiReading::NoData);
        assert_eq!(ctx.snapshot(&nobody), Err(KpiError::EmptyResultSet));
    }

    #[test]
    fn replace_records_swaps_the_set() {
        let mut ctx = ReportContext::default();
        let old = ctx.replace_records(vec![late_at(1)]);
        assert!(old.is_empty());
        assert_eq!(ctx.records().len(), 1);
    }
}
