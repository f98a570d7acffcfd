use chrono::NaiveDate;

use crate::types::CanonicalRecord;

/// Selection applied to the record set before KPIs or trends are
/// computed. Empty lists and unset bounds select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub designers: Vec<String>,
    pub customers: Vec<String>,
    /// Inclusive bounds on the submission date. Records without a
    /// submission timestamp fail any bound.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn designer(name: impl Into<String>) -> Self {
        Self {
            designers: vec![name.into()],
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &CanonicalRecord) -> bool {
        let listed = |allowed: &[String], value: Option<&str>| {
            allowed.is_empty() || value.is_some_and(|v| allowed.iter().any(|a| a == v))
        };
        if !listed(&self.designers, record.designer_name.as_deref()) {
            return false;
        }
        if !listed(&self.customers, record.customer.as_deref()) {
            return false;
        }
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(date) = record.submission_date() else {
            return false;
        };
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }

    pub fn apply(&self, records: &[CanonicalRecord]) -> Vec<CanonicalRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(designer: &str, customer: &str, day: Option<u32>) -> CanonicalRecord {
        CanonicalRecord {
            designer_name: Some(designer.into()),
            customer: Some(customer.into()),
            submission_timestamp: day.map(|d| {
                NaiveDate::from_ymd_opt(2023, 6, d)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap()
            }),
            ..CanonicalRecord::default()
        }
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let records = vec![rec("Sara", "Music", None), rec("Reza", "Movies", Some(2))];
        assert_eq!(RecordFilter::all().apply(&records).len(), 2);
    }

    #[test]
    fn designer_and_customer_lists() {
        let records = vec![
            rec("Sara", "Music", Some(1)),
            rec("Sara", "Movies", Some(1)),
            rec("Reza", "Music", Some(1)),
        ];
        let filter = RecordFilter {
            customers: vec!["Music".into()],
            ..RecordFilter::designer("Sara")
        };
        assert_eq!(filter.apply(&records), vec![records[0].clone()]);
    }

    #[test]
    fn date_bounds_are_inclusive_and_need_a_timestamp() {
        let records = vec![
            rec("Sara", "Music", Some(1)),
            rec("Sara", "Music", Some(10)),
            rec("Sara", "Music", Some(11)),
            rec("Sara", "Music", None),
        ];
        let filter = RecordFilter {
            from: NaiveDate::from_ymd_opt(2023, 6, 1),
            to: NaiveDate::from_ymd_opt(2023, 6, 10),
            ..RecordFilter::all()
        };
        assert_eq!(filter.apply(&records).len(), 2);
    }
}
