//! Aggregation core: folds the three raw datasets into per-period records.

use serde::Serialize;
use tracing::{error, info};

use crate::domain::{StateRollup, TimeSeriesRecord};
use crate::source::rows::{BiometricRow, DemographicRow, EnrolmentRow};
use crate::source::snapshot::DatasetBundle;

pub mod coerce;
pub mod date_key;
pub mod estimate;
pub mod filter;
pub mod index;
pub mod ingest;
pub mod rollup;

use date_key::DateKeyResolver;
use estimate::UpdateSplitPolicy;
use index::AggregationIndex;
use ingest::{BiometricIngester, DemographicUpdateIngester, EnrolmentIngester, IngestStats, IngestWarning, Ingester};
use rollup::StateRollupReducer;

/// Per-dataset ingestion statistics for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub enrolment: IngestStats,
    pub demographic: IngestStats,
    pub biometric: IngestStats,
}

/// The frozen result of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct AggregationOutput {
    /// One record per period, in first-reference order
    pub records: Vec<TimeSeriesRecord>,
    pub warnings: Vec<IngestWarning>,
    pub stats: RunStats,
}

/// Runs the three ingestion passes over an index owned by a single run
pub struct AggregationPipeline {
    resolver: DateKeyResolver,
    enrolment: EnrolmentIngester,
    demographic: DemographicUpdateIngester,
    biometric: BiometricIngester,
}

impl Default for AggregationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregationPipeline {
    pub fn new() -> Self {
        Self::with_parts(DateKeyResolver::new(), Box::new(estimate::FixedProportionSplit))
    }

    pub fn with_parts(resolver: DateKeyResolver, split_policy: Box<dyn UpdateSplitPolicy>) -> Self {
        Self {
            resolver,
            enrolment: EnrolmentIngester,
            demographic: DemographicUpdateIngester::with_policy(split_policy),
            biometric: BiometricIngester,
        }
    }

    pub fn run(&self, bundle: &DatasetBundle) -> AggregationOutput {
        self.run_rows(&bundle.demographic, &bundle.enrolment, &bundle.biometric)
    }

    pub fn run_rows(
        &self,
        demographic: &[DemographicRow],
        enrolment: &[EnrolmentRow],
        biometric: &[BiometricRow],
    ) -> AggregationOutput {
        let mut index = AggregationIndex::new();
        let mut warnings = Vec::new();

        let stats = RunStats {
            enrolment: self.pass(&self.enrolment, enrolment, &mut index, &mut warnings),
            demographic: self.pass(&self.demographic, demographic, &mut index, &mut warnings),
            biometric: self.pass(&self.biometric, biometric, &mut index, &mut warnings),
        };

        let records = index.freeze();
        for record in records.iter().filter(|r| !r.is_consistent()) {
            error!(id = %record.id, "Record totals do not match their breakdowns");
        }

        info!(
            records = records.len(),
            warnings = warnings.len(),
            "Aggregation complete"
        );
        crate::metrics::aggregate::records_materialized(records.len());

        AggregationOutput { records, warnings, stats }
    }

    fn pass<I: Ingester>(
        &self,
        ingester: &I,
        rows: &[I::Row],
        index: &mut AggregationIndex,
        warnings: &mut Vec<IngestWarning>,
    ) -> IngestStats {
        let span = tracing::info_span!("ingest", dataset = ingester.dataset());
        let _enter = span.enter();

        let stats = ingester.ingest(rows, index, &self.resolver, warnings);
        info!(
            rows = stats.rows,
            date_fallbacks = stats.date_fallbacks,
            malformed_counts = stats.malformed_counts,
            index_size = index.len(),
            "Pass finished"
        );
        stats
    }
}

/// Aggregates the three raw datasets into time-series records using the
/// default resolver and estimation policy.
pub fn aggregate(
    demographic: &[DemographicRow],
    enrolment: &[EnrolmentRow],
    biometric: &[BiometricRow],
) -> Vec<TimeSeriesRecord> {
    AggregationPipeline::new().run_rows(demographic, enrolment, biometric).records
}

/// Reduces time-series records to per-region rollups using the default proxy
pub fn rollup(records: &[TimeSeriesRecord]) -> Vec<StateRollup> {
    StateRollupReducer::new().reduce(records)
}
