use tracing::warn;

use crate::constants::is_known_region;
use crate::domain::TimeSeriesRecord;

/// Region/year selection over time-series records; `None` matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub region: Option<String>,
    pub year: Option<i32>,
}

impl RecordFilter {
    pub fn new(region: Option<String>, year: Option<i32>) -> Self {
        let region = region.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        if let Some(region) = &region {
            if !is_known_region(region) {
                warn!(region = %region, "Filtering on a region outside the known state list");
            }
        }
        Self { region, year }
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.year.is_none()
    }

    pub fn matches(&self, record: &TimeSeriesRecord) -> bool {
        self.region.as_deref().map_or(true, |r| r == record.region)
            && self.year.map_or(true, |y| y == record.year)
    }

    pub fn apply(&self, records: Vec<TimeSeriesRecord>) -> Vec<TimeSeriesRecord> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
