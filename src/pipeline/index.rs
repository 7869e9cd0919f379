use std::collections::HashMap;

use crate::domain::{AggregationKey, TimeSeriesRecord};

/// Get-or-create store of per-period accumulators for one pipeline run.
///
/// Records are kept in first-reference order. Nothing is ever removed;
/// [`AggregationIndex::freeze`] consumes the index once all passes are done.
#[derive(Debug, Default)]
pub struct AggregationIndex {
    positions: HashMap<String, usize>,
    records: Vec<TimeSeriesRecord>,
}

impl AggregationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the accumulator for `key`, creating a zeroed one on first use
    pub fn get_or_create(&mut self, key: &AggregationKey) -> &mut TimeSeriesRecord {
        let id = key.to_string();
        let position = match self.positions.get(&id) {
            Some(&position) => position,
            None => {
                self.records.push(TimeSeriesRecord::empty(key));
                let position = self.records.len() - 1;
                self.positions.insert(id, position);
                position
            }
        };
        &mut self.records[position]
    }

    pub fn get(&self, id: &str) -> Option<&TimeSeriesRecord> {
        self.positions.get(id).map(|&position| &self.records[position])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ends accumulation and hands out the records in first-reference order
    pub fn freeze(self) -> Vec<TimeSeriesRecord> {
        self.records
    }
}
