use super::Ingester;
use crate::constants::BIOMETRIC_DATASET;
use crate::domain::TimeSeriesRecord;
use crate::source::rows::BiometricRow;

/// Folds biometric-update rows into the 5-17 and 18+ buckets
#[derive(Debug, Clone, Copy, Default)]
pub struct BiometricIngester;

impl Ingester for BiometricIngester {
    type Row = BiometricRow;

    fn dataset(&self) -> &'static str {
        BIOMETRIC_DATASET
    }

    fn apply(&self, row: &BiometricRow, record: &mut TimeSeriesRecord) {
        record.biometrics.add(row.bio_age_5_17.coerce(), row.bio_age_17_.coerce());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::date_key::DateKeyResolver;
    use crate::pipeline::index::AggregationIndex;
    use crate::pipeline::ingest::WarningKind;
    use serde_json::json;

    #[test]
    fn test_buckets_and_total() {
        let rows: Vec<BiometricRow> = serde_json::from_value(json!([
            { "state": "Assam", "date": "03-02-2025", "bio_age_5_17": 8, "bio_age_17_": "12" }
        ]))
        .unwrap();

        let mut index = AggregationIndex::new();
        BiometricIngester.ingest(&rows, &mut index, &DateKeyResolver::new(), &mut Vec::new());

        let record = index.get("Assam-Feb-2025").unwrap();
        assert_eq!(record.biometrics.total, 20);
        assert_eq!(record.biometrics.by_age.age_5_17, 8);
        assert_eq!(record.biometrics.by_age.age_18_plus, 12);
        assert_eq!(record.enrolment.total, 0);
    }

    #[test]
    fn test_missing_region_is_warned_and_keyed_unknown() {
        let rows: Vec<BiometricRow> =
            serde_json::from_value(json!([{ "date": "03-02-2025", "bio_age_5_17": 1 }])).unwrap();

        let mut index = AggregationIndex::new();
        let mut warnings = Vec::new();
        BiometricIngester.ingest(&rows, &mut index, &DateKeyResolver::new(), &mut warnings);

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::MissingRegion);
        assert_eq!(warnings[0].record_id, "Unknown-Feb-2025");
        assert!(index.get("Unknown-Feb-2025").is_some());
    }
}
