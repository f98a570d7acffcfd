use std::collections::{BTreeMap, HashSet};

use crate::error::KpiError;
use crate::kpi::{self, Kpi, KpiSnapshot};
use crate::trend::{TrendSeries, TEAM_SERIES};
use crate::types::{CanonicalRecord, HolidaySet, KpiRow, SummaryStats, TrendRow};
use crate::util::format_percent;

/// Render a snapshot as one table row per KPI.
pub fn kpi_table(series: &str, snapshot: &KpiSnapshot) -> Vec<KpiRow> {
    snapshot
        .counts()
        .iter()
        .map(|(kpi, count)| KpiRow {
            series: series.to_string(),
            kpi: kpi.label().to_string(),
            count: *count,
            total: snapshot.total(),
            ratio: format_percent(snapshot.ratio(*kpi)),
        })
        .collect()
}

/// One snapshot per named designer, ordered by name. Records without a
/// designer only count towards the team.
pub fn designer_breakdown(
    records: &[CanonicalRecord],
    holidays: &HolidaySet,
) -> Vec<(String, KpiSnapshot)> {
    let mut by_designer: BTreeMap<&str, Vec<&CanonicalRecord>> = BTreeMap::new();
    for r in records {
        if let Some(name) = r.designer() {
            by_designer.entry(name).or_default().push(r);
        }
    }
    by_designer
        .into_iter()
        .filter_map(|(name, members)| {
            kpi::snapshot(members, holidays)
                .ok()
                .map(|snap| (name.to_string(), snap))
        })
        .collect()
}

/// Team KPIs, optionally followed by every designer's KPIs.
pub fn generate_kpi_report(
    records: &[CanonicalRecord],
    holidays: &HolidaySet,
    by_designer: bool,
) -> Result<Vec<KpiRow>, KpiError> {
    let team = kpi::snapshot(records, holidays)?;
    let mut rows = kpi_table(TEAM_SERIES, &team);
    if by_designer {
        for (name, snap) in designer_breakdown(records, holidays) {
            rows.extend(kpi_table(&name, &snap));
        }
    }
    Ok(rows)
}

pub fn trend_rows(series: &[TrendSeries]) -> Vec<TrendRow> {
    series
        .iter()
        .flat_map(|s| {
            s.buckets.iter().map(move |b| TrendRow {
                series: s.label.clone(),
                bucket: b.key.to_string(),
                kpi: s.kpi.label().to_string(),
                value: b.value,
            })
        })
        .collect()
}

pub fn generate_summary(records: &[CanonicalRecord], holidays: &HolidaySet) -> SummaryStats {
    let designers: HashSet<&str> = records.iter().filter_map(|r| r.designer()).collect();
    let customers: HashSet<&str> = records
        .iter()
        .filter_map(|r| r.customer.as_deref())
        .collect();
    let avg_edit_count = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| f64::from(r.edit_count)).sum::<f64>() / records.len() as f64
    };
    SummaryStats {
        total_tasks: records.len(),
        total_designers: designers.len(),
        total_customers: customers.len(),
        avg_edit_count,
        late_ratio: kpi::ratio(records, Kpi::Late, holidays).ratio(),
        designer_error_ratio: kpi::ratio(records, Kpi::DesignerError, holidays).ratio(),
    }
}
