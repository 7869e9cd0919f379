use std::collections::HashMap;
use tracing::debug;

use crate::domain::{StateRollup, TimeSeriesRecord};
use crate::pipeline::estimate::{ChildEnrolmentPolicy, CurrentBracketProxy};

/// Reduces time-series records to one rollup per region.
///
/// Rollups are recomputed from scratch on every call and come out in the
/// order each region first appears in the input.
pub struct StateRollupReducer {
    child_policy: Box<dyn ChildEnrolmentPolicy>,
}

impl Default for StateRollupReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl StateRollupReducer {
    pub fn new() -> Self {
        Self::with_policy(Box::new(CurrentBracketProxy))
    }

    pub fn with_policy(child_policy: Box<dyn ChildEnrolmentPolicy>) -> Self {
        Self { child_policy }
    }

    pub fn reduce(&self, records: &[TimeSeriesRecord]) -> Vec<StateRollup> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut rollups: Vec<StateRollup> = Vec::new();

        for record in records {
            let position = *positions.entry(record.region.as_str()).or_insert_with(|| {
                rollups.push(StateRollup::new(record.region.as_str()));
                rollups.len() - 1
            });
            let rollup = &mut rollups[position];

            rollup.total_enrolment = rollup.total_enrolment.saturating_add(record.enrolment.total);
            rollup.total_updates = rollup.total_updates.saturating_add(record.updates.total);
            rollup.total_address_updates =
                rollup.total_address_updates.saturating_add(record.updates.by_type.address);
            rollup.total_mobile_updates =
                rollup.total_mobile_updates.saturating_add(record.updates.by_type.mobile);
            rollup.total_bio_updates = rollup.total_bio_updates.saturating_add(record.biometrics.total);
            rollup.child_enrolments_lagged = rollup
                .child_enrolments_lagged
                .saturating_add(self.child_policy.contribution(record));
        }

        debug!(
            records = records.len(),
            regions = rollups.len(),
            policy = self.child_policy.name(),
            "Reduced records to state rollups"
        );
        crate::metrics::aggregate::rollups_computed(rollups.len());

        rollups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AggregationKey, UpdateByType};

    fn record(region: &str, month: &str, enrol: (u64, u64, u64)) -> TimeSeriesRecord {
        let mut record = TimeSeriesRecord::empty(&AggregationKey::new(region, month, 2024));
        record.enrolment.add(enrol.0, enrol.1, enrol.2);
        record
    }

    #[test]
    fn test_regions_in_first_occurrence_order() {
        let records = vec![
            record("Kerala", "Jan", (1, 0, 0)),
            record("Bihar", "Jan", (1, 0, 0)),
            record("Kerala", "Feb", (1, 0, 0)),
        ];

        let rollups = StateRollupReducer::new().reduce(&records);
        let regions: Vec<&str> = rollups.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(regions, vec!["Kerala", "Bihar"]);
        assert_eq!(rollups[0].total_enrolment, 2);
    }

    #[test]
    fn test_update_and_biometric_totals() {
        let mut first = record("Delhi", "Jan", (0, 0, 0));
        first.updates.add(100, UpdateByType { address: 40, mobile: 40, name: 10, other: 10 });
        first.biometrics.add(3, 4);
        let mut second = record("Delhi", "Feb", (0, 0, 0));
        second.updates.add(10, UpdateByType { address: 4, mobile: 4, name: 1, other: 1 });

        let rollups = StateRollupReducer::new().reduce(&[first, second]);
        assert_eq!(rollups.len(), 1);
        assert_eq!(rollups[0].total_updates, 110);
        assert_eq!(rollups[0].total_address_updates, 44);
        assert_eq!(rollups[0].total_mobile_updates, 44);
        assert_eq!(rollups[0].total_bio_updates, 7);
    }

    #[test]
    fn test_empty_input_yields_no_rollups() {
        assert!(StateRollupReducer::new().reduce(&[]).is_empty());
    }

    #[test]
    fn test_child_policy_is_swappable() {
        struct SchoolAge;
        impl ChildEnrolmentPolicy for SchoolAge {
            fn contribution(&self, record: &TimeSeriesRecord) -> u64 {
                record.enrolment.by_age.age_5_17
            }
            fn name(&self) -> &str {
                "school_age"
            }
        }

        let records = vec![record("Odisha", "Mar", (2, 9, 1))];
        let rollups = StateRollupReducer::with_policy(Box::new(SchoolAge)).reduce(&records);
        assert_eq!(rollups[0].child_enrolments_lagged, 9);
    }
}
