use super::Ingester;
use crate::constants::DEMOGRAPHIC_DATASET;
use crate::domain::TimeSeriesRecord;
use crate::pipeline::estimate::{FixedProportionSplit, UpdateSplitPolicy};
use crate::source::rows::DemographicRow;

/// Folds demographic-update rows into the update total and its estimated
/// per-type breakdown.
pub struct DemographicUpdateIngester {
    split_policy: Box<dyn UpdateSplitPolicy>,
}

impl Default for DemographicUpdateIngester {
    fn default() -> Self {
        Self::new()
    }
}

impl DemographicUpdateIngester {
    pub fn new() -> Self {
        Self::with_policy(Box::new(FixedProportionSplit))
    }

    pub fn with_policy(split_policy: Box<dyn UpdateSplitPolicy>) -> Self {
        Self { split_policy }
    }
}

impl Ingester for DemographicUpdateIngester {
    type Row = DemographicRow;

    fn dataset(&self) -> &'static str {
        DEMOGRAPHIC_DATASET
    }

    fn apply(&self, row: &DemographicRow, record: &mut TimeSeriesRecord) {
        // Upstream carries no update categories, so the split is estimated per row
        let total = row.demo_age_5_17.coerce().saturating_add(row.demo_age_17_.coerce());
        record.updates.add(total, self.split_policy.split(total));
    }
}
