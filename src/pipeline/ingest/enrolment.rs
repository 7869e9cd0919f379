use super::Ingester;
use crate::constants::ENROLMENT_DATASET;
use crate::domain::TimeSeriesRecord;
use crate::source::rows::EnrolmentRow;

/// Folds enrolment rows into the 0-5, 5-17 and 18+ buckets
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrolmentIngester;

impl Ingester for EnrolmentIngester {
    type Row = EnrolmentRow;

    fn dataset(&self) -> &'static str {
        ENROLMENT_DATASET
    }

    fn apply(&self, row: &EnrolmentRow, record: &mut TimeSeriesRecord) {
        record
            .enrolment
            .add(row.age_0_5.coerce(), row.age_5_17.coerce(), row.age_18_greater.coerce());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::date_key::DateKeyResolver;
    use crate::pipeline::index::AggregationIndex;
    use serde_json::json;

    fn rows(values: serde_json::Value) -> Vec<EnrolmentRow> {
        serde_json::from_value(values).unwrap()
    }

    #[test]
    fn test_rows_for_same_period_accumulate() {
        let rows = rows(json!([
            { "state": "Delhi", "date": "01-03-2024", "age_0_5": 10, "age_5_17": 20, "age_18_greater": 70 },
            { "state": "Delhi", "date": "28-03-2024", "age_0_5": "5", "age_5_17": "0", "age_18_greater": "5" }
        ]));

        let mut index = AggregationIndex::new();
        let mut warnings = Vec::new();
        let stats = EnrolmentIngester.ingest(&rows, &mut index, &DateKeyResolver::new(), &mut warnings);

        assert_eq!(stats.rows, 2);
        assert_eq!(stats.date_fallbacks, 0);
        assert!(warnings.is_empty());

        let record = index.get("Delhi-Mar-2024").unwrap();
        assert_eq!(record.enrolment.total, 110);
        assert_eq!(record.enrolment.by_age.age_0_5, 15);
        assert_eq!(record.enrolment.by_age.age_18_plus, 75);
        assert!(record.is_consistent());
    }

    #[test]
    fn test_malformed_counts_are_tallied_and_zeroed() {
        let rows = rows(json!([
            { "state": "Punjab", "date": "02-01-2024", "age_0_5": "N/A", "age_5_17": 3, "age_18_greater": "?" }
        ]));

        let mut index = AggregationIndex::new();
        let mut warnings = Vec::new();
        let stats = EnrolmentIngester.ingest(&rows, &mut index, &DateKeyResolver::new(), &mut warnings);

        assert_eq!(stats.malformed_counts, 2);
        assert_eq!(index.get("Punjab-Jan-2024").unwrap().enrolment.total, 3);
    }
}
