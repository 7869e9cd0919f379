use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::constants::{BIOMETRIC_DATASET, DEMOGRAPHIC_DATASET, ENROLMENT_DATASET};
use crate::error::{PulseError, Result};
use crate::source::rows::{BiometricRow, DemographicRow, EnrolmentRow};

/// The on-disk snapshot written by the fetch step, rows kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub demographic: Vec<Value>,
    pub enrolment: Vec<Value>,
    pub biometric: Vec<Value>,
    pub timestamp: DateTime<Utc>,
}

/// The three validated, typed datasets ready for aggregation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetBundle {
    pub demographic: Vec<DemographicRow>,
    pub enrolment: Vec<EnrolmentRow>,
    pub biometric: Vec<BiometricRow>,
    /// When the snapshot was taken, if the document says
    pub fetched_at: Option<String>,
    /// Array entries that were not row objects and were left out
    pub skipped_rows: usize,
}

/// Loose view of a snapshot used for validation; each array may be absent
#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    demographic: Option<Vec<Value>>,
    #[serde(default)]
    enrolment: Option<Vec<Value>>,
    #[serde(default)]
    biometric: Option<Vec<Value>>,
    #[serde(default)]
    timestamp: Option<Value>,
}

impl DatasetBundle {
    /// Parses and validates a snapshot document.
    ///
    /// Fails with [`PulseError::MissingDataset`] if any of the three arrays is
    /// absent or null, before any row is aggregated. Entries that are not
    /// objects are skipped and counted in `skipped_rows`.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(content)?;

        let demographic = raw
            .demographic
            .ok_or_else(|| PulseError::MissingDataset(DEMOGRAPHIC_DATASET.to_string()))?;
        let enrolment = raw
            .enrolment
            .ok_or_else(|| PulseError::MissingDataset(ENROLMENT_DATASET.to_string()))?;
        let biometric = raw
            .biometric
            .ok_or_else(|| PulseError::MissingDataset(BIOMETRIC_DATASET.to_string()))?;

        let mut skipped_rows = 0;
        let demographic = typed_rows(DEMOGRAPHIC_DATASET, demographic, &mut skipped_rows);
        let enrolment = typed_rows(ENROLMENT_DATASET, enrolment, &mut skipped_rows);
        let biometric = typed_rows(BIOMETRIC_DATASET, biometric, &mut skipped_rows);

        let fetched_at = match raw.timestamp {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };

        Ok(Self {
            demographic,
            enrolment,
            biometric,
            fetched_at,
            skipped_rows,
        })
    }

    pub fn total_rows(&self) -> usize {
        self.demographic.len() + self.enrolment.len() + self.biometric.len()
    }
}

fn typed_rows<T: DeserializeOwned>(dataset: &'static str, values: Vec<Value>, skipped: &mut usize) -> Vec<T> {
    let mut rows = Vec::with_capacity(values.len());
    for (row_index, value) in values.into_iter().enumerate() {
        if !value.is_object() {
            warn!(dataset, row_index, "Skipping snapshot entry that is not a row object");
            *skipped += 1;
            continue;
        }
        match serde_json::from_value(value) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!(dataset, row_index, error = %e, "Skipping unreadable snapshot row");
                *skipped += 1;
            }
        }
    }
    rows
}

/// Reads and validates a snapshot file
pub fn load_bundle(path: &Path) -> Result<DatasetBundle> {
    let content = fs::read_to_string(path)?;
    let bundle = DatasetBundle::from_json_str(&content)?;

    info!(
        path = %path.display(),
        demographic = bundle.demographic.len(),
        enrolment = bundle.enrolment.len(),
        biometric = bundle.biometric.len(),
        skipped = bundle.skipped_rows,
        "Loaded snapshot"
    );
    Ok(bundle)
}

/// Writes a snapshot as pretty JSON, creating parent directories
pub fn save_snapshot(path: &Path, document: &SnapshotDocument) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(document)?;
    fs::write(path, json)?;

    debug!(path = %path.display(), "Snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_document_parses() {
        let content = json!({
            "demographic": [{ "state": "Kerala", "date": "15-06-2023", "demo_age_5_17": 50, "demo_age_17_": 50 }],
            "enrolment": [],
            "biometric": [{ "state": "Kerala", "date": "15-06-2023", "bio_age_5_17": 1 }],
            "timestamp": "2025-01-01T00:00:00Z"
        })
        .to_string();

        let bundle = DatasetBundle::from_json_str(&content).unwrap();
        assert_eq!(bundle.demographic.len(), 1);
        assert!(bundle.enrolment.is_empty());
        assert_eq!(bundle.total_rows(), 2);
        assert_eq!(bundle.fetched_at.as_deref(), Some("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn test_each_missing_array_is_named() {
        for missing in ["demographic", "enrolment", "biometric"] {
            let mut doc = json!({ "demographic": [], "enrolment": [], "biometric": [] });
            doc.as_object_mut().unwrap().remove(missing);

            match DatasetBundle::from_json_str(&doc.to_string()) {
                Err(PulseError::MissingDataset(name)) => assert_eq!(name, missing),
                other => panic!("expected MissingDataset for {missing}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_null_array_counts_as_missing() {
        let content = json!({ "demographic": [], "enrolment": null, "biometric": [] }).to_string();
        assert!(matches!(
            DatasetBundle::from_json_str(&content),
            Err(PulseError::MissingDataset(name)) if name == "enrolment"
        ));
    }

    #[test]
    fn test_non_object_rows_are_skipped() {
        let content = json!({
            "demographic": [1, null],
            "enrolment": [
                "Delhi",
                { "state": "Delhi", "date": "01-03-2024", "age_0_5": 10 },
                [1, 2]
            ],
            "biometric": [{ "state": "Delhi", "date": "01-03-2024", "bio_age_5_17": 2 }]
        })
        .to_string();

        let bundle = DatasetBundle::from_json_str(&content).unwrap();
        assert!(bundle.demographic.is_empty());
        assert_eq!(bundle.enrolment.len(), 1);
        assert_eq!(bundle.enrolment[0].age_0_5.coerce(), 10);
        assert_eq!(bundle.biometric.len(), 1);
        assert_eq!(bundle.skipped_rows, 4);
    }

    #[test]
    fn test_non_array_dataset_is_json_error() {
        let content = json!({ "demographic": {}, "enrolment": [], "biometric": [] }).to_string();
        assert!(matches!(DatasetBundle::from_json_str(&content), Err(PulseError::Json(_))));
    }

    #[test]
    fn test_non_json_is_json_error() {
        assert!(matches!(DatasetBundle::from_json_str("not json"), Err(PulseError::Json(_))));
    }
}
