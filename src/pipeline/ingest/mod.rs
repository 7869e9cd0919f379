use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{AggregationKey, TimeSeriesRecord};
use crate::pipeline::date_key::DateKeyResolver;
use crate::pipeline::index::AggregationIndex;
use crate::source::rows::SourceRow;

pub mod biometric;
pub mod demographic;
pub mod enrolment;

pub use biometric::BiometricIngester;
pub use demographic::DemographicUpdateIngester;
pub use enrolment::EnrolmentIngester;

/// Why a row was flagged while it was folded into the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The date was missing or unreadable; the row landed in the fallback period
    UnparsedDate,
    /// The row had no state name and was keyed under the unknown region
    MissingRegion,
}

/// A row-level anomaly reported alongside the aggregated output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestWarning {
    pub dataset: &'static str,
    pub row_index: usize,
    pub kind: WarningKind,
    pub region: String,
    pub raw_date: Option<String>,
    /// Identity of the record the row was folded into
    pub record_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub rows: usize,
    pub date_fallbacks: usize,
    pub malformed_counts: usize,
}

/// Folds the rows of one dataset into the shared index.
///
/// Implementors only decide how a row's counts land on its record; key
/// resolution, get-or-create, and warning collection are shared.
pub trait Ingester {
    type Row: SourceRow;

    /// Dataset name, used in warnings and metrics
    fn dataset(&self) -> &'static str;

    /// Adds one row's coerced counts to its period record
    fn apply(&self, row: &Self::Row, record: &mut TimeSeriesRecord);

    fn ingest(
        &self,
        rows: &[Self::Row],
        index: &mut AggregationIndex,
        resolver: &DateKeyResolver,
        warnings: &mut Vec<IngestWarning>,
    ) -> IngestStats {
        let dataset = self.dataset();
        let mut stats = IngestStats::default();

        for (row_index, row) in rows.iter().enumerate() {
            let period = resolver.resolve(row.raw_date());
            let key = AggregationKey::new(row.region(), period.month.as_str(), period.year);
            let record_id = key.to_string();

            if period.is_fallback() {
                stats.date_fallbacks += 1;
                debug!(dataset, row_index, raw_date = ?row.raw_date(), "Unparsed date, using fallback period");
                warnings.push(IngestWarning {
                    dataset,
                    row_index,
                    kind: WarningKind::UnparsedDate,
                    region: row.region().to_string(),
                    raw_date: row.raw_date().map(str::to_string),
                    record_id: record_id.clone(),
                });
            }

            if row.raw_region().is_none() {
                warnings.push(IngestWarning {
                    dataset,
                    row_index,
                    kind: WarningKind::MissingRegion,
                    region: row.region().to_string(),
                    raw_date: row.raw_date().map(str::to_string),
                    record_id: record_id.clone(),
                });
            }

            stats.malformed_counts += row.counts().iter().filter(|(_, count)| count.is_malformed()).count();

            let record = index.get_or_create(&key);
            self.apply(row, record);
            stats.rows += 1;
        }

        if stats.date_fallbacks > 0 {
            warn!(
                dataset,
                fallbacks = stats.date_fallbacks,
                "Rows with unparsed dates were folded into the current period"
            );
        }

        crate::metrics::aggregate::rows_ingested(dataset, stats.rows);
        crate::metrics::aggregate::date_fallbacks(dataset, stats.date_fallbacks);
        crate::metrics::aggregate::counts_coerced(dataset, stats.malformed_counts);

        stats
    }
}
