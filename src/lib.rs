//! Normalization, KPI and trend pipeline for design-task spreadsheets.
//!
//! Rows exported from the team's task sheet (Persian headers and labels,
//! Jalali deadlines) are turned into [`CanonicalRecord`]s, from which the
//! six task KPIs and their daily or monthly trends are computed.
//!
//! ```
//! use design_kpi::{normalize_table, kpi, HolidaySet, Kpi, RawTable, SchemaLayout};
//!
//! let table = RawTable::new(
//!     vec!["نام طراح".into(), "نوع کاور".into()],
//!     vec![vec!["سارا".into(), "کاور زرد".into()]],
//! );
//! let layout = SchemaLayout {
//!     required: vec![],
//!     ..SchemaLayout::default()
//! };
//! let records = normalize_table(&table, &layout).records;
//! assert_eq!(kpi::count(&records, Kpi::Burger, &HolidaySet::new()), 1);
//! ```

pub mod calendar;
pub mod category;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod kpi;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod reports;
pub mod schema;
pub mod trend;
pub mod types;
pub mod util;

pub use context::ReportContext;
pub use error::{DateParseError, KpiError, PipelineError, SchemaMismatch};
pub use filter::RecordFilter;
pub use kpi::{Kpi, KpiReading, KpiSnapshot};
pub use normalize::{normalize_table, records_to_table, Normalized};
pub use schema::{ColumnSelector, Field, SchemaLayout};
pub use trend::{SeriesFilter, TrendRange, TrendSeries};
pub use types::{CanonicalRecord, HolidaySet, Labeled, RawTable, Reason, TaskType};
