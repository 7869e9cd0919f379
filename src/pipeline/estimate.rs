//! Estimation policies for breakdowns the upstream data does not carry.
//!
//! Both defaults are business approximations kept for parity with the
//! published dashboard. A richer data source replaces them by supplying a
//! different policy, without touching the ingestion fold.

use crate::domain::{TimeSeriesRecord, UpdateByType};

/// Splits a demographic-update total into per-type estimates
pub trait UpdateSplitPolicy: Send + Sync {
    fn split(&self, total: u64) -> UpdateByType;

    fn name(&self) -> &str;
}

/// Address 40% (floor), Mobile 40% (floor), Name 10% (floor), Other 10% (ceil).
///
/// Components are not reconciled with the total, so their sum can drift from
/// it when the total is not a multiple of ten.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedProportionSplit;

impl UpdateSplitPolicy for FixedProportionSplit {
    fn split(&self, total: u64) -> UpdateByType {
        // u128 keeps total * 4 exact for any u64 total
        let wide = total as u128;
        let forty = (wide * 4 / 10) as u64;
        UpdateByType {
            address: forty,
            mobile: forty,
            name: (wide / 10) as u64,
            other: wide.div_ceil(10) as u64,
        }
    }

    fn name(&self) -> &str {
        "fixed_proportion_40_40_10_10"
    }
}

/// Per-record contribution to a region's "child enrolments" figure
pub trait ChildEnrolmentPolicy: Send + Sync {
    fn contribution(&self, record: &TimeSeriesRecord) -> u64;

    fn name(&self) -> &str;
}

/// Uses the record's own 0-5 enrolment bucket as a stand-in for a lagged
/// child cohort.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentBracketProxy;

impl ChildEnrolmentPolicy for CurrentBracketProxy {
    fn contribution(&self, record: &TimeSeriesRecord) -> u64 {
        record.enrolment.by_age.age_0_5
    }

    fn name(&self) -> &str {
        "current_0_5_bracket_proxy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AggregationKey;

    fn split(total: u64) -> (u64, u64, u64, u64) {
        let s = FixedProportionSplit.split(total);
        (s.address, s.mobile, s.name, s.other)
    }

    #[test]
    fn test_even_total_splits_exactly() {
        assert_eq!(split(100), (40, 40, 10, 10));
        assert_eq!(split(0), (0, 0, 0, 0));
    }

    #[test]
    fn test_uneven_totals_follow_floor_and_ceil() {
        assert_eq!(split(101), (40, 40, 10, 11));
        assert_eq!(split(7), (2, 2, 0, 1));
        // 30 is where float multiplication would overshoot the ceiling
        assert_eq!(split(30), (12, 12, 3, 3));
    }

    #[test]
    fn test_drift_is_not_reconciled() {
        let s = FixedProportionSplit.split(7);
        assert_eq!(s.sum(), 5);

        let s = FixedProportionSplit.split(3);
        assert_eq!((s.address, s.mobile, s.name, s.other), (1, 1, 0, 1));
        assert_eq!(s.sum(), 3);
    }

    #[test]
    fn test_large_totals_do_not_overflow() {
        let s = FixedProportionSplit.split(u64::MAX);
        assert_eq!(s.address, (u64::MAX as u128 * 4 / 10) as u64);
        assert_eq!(s.other, (u64::MAX as u128).div_ceil(10) as u64);
    }

    #[test]
    fn test_child_proxy_reads_zero_to_five_bucket() {
        let mut record = TimeSeriesRecord::empty(&AggregationKey::new("Delhi", "Mar", 2024));
        record.enrolment.add(12, 30, 40);
        assert_eq!(CurrentBracketProxy.contribution(&record), 12);
    }
}
