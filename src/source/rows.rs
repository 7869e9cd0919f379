use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::UNKNOWN_REGION;
use crate::pipeline::coerce::RawCount;

/// Fields every dataset row carries for period resolution
pub trait SourceRow {
    /// The raw state name, if the row has a usable one
    fn raw_region(&self) -> Option<&str>;

    fn raw_date(&self) -> Option<&str>;

    /// Named count fields, for malformed-value accounting
    fn counts(&self) -> Vec<(&'static str, &RawCount)>;

    /// The region used in the aggregation key
    fn region(&self) -> &str {
        self.raw_region().unwrap_or(UNKNOWN_REGION)
    }
}

/// A row of the enrolment dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrolmentRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: Option<String>,
    /// Alternate name for `state`; `state` wins when both are usable
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default)]
    pub age_0_5: RawCount,
    #[serde(default)]
    pub age_5_17: RawCount,
    #[serde(default)]
    pub age_18_greater: RawCount,
}

/// A row of the demographic-update dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: Option<String>,
    /// Alternate name for `state`; `state` wins when both are usable
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default)]
    pub demo_age_5_17: RawCount,
    #[serde(default)]
    pub demo_age_17_: RawCount,
}

/// A row of the biometric-update dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiometricRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: Option<String>,
    /// Alternate name for `state`; `state` wins when both are usable
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default)]
    pub bio_age_5_17: RawCount,
    #[serde(default)]
    pub bio_age_17_: RawCount,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn preferred_region<'a>(state: &'a Option<String>, region: &'a Option<String>) -> Option<&'a str> {
    non_blank(state).or_else(|| non_blank(region))
}

impl SourceRow for EnrolmentRow {
    fn raw_region(&self) -> Option<&str> {
        preferred_region(&self.state, &self.region)
    }

    fn raw_date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn counts(&self) -> Vec<(&'static str, &RawCount)> {
        vec![
            ("age_0_5", &self.age_0_5),
            ("age_5_17", &self.age_5_17),
            ("age_18_greater", &self.age_18_greater),
        ]
    }
}

impl SourceRow for DemographicRow {
    fn raw_region(&self) -> Option<&str> {
        preferred_region(&self.state, &self.region)
    }

    fn raw_date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn counts(&self) -> Vec<(&'static str, &RawCount)> {
        vec![
            ("demo_age_5_17", &self.demo_age_5_17),
            ("demo_age_17_", &self.demo_age_17_),
        ]
    }
}

impl SourceRow for BiometricRow {
    fn raw_region(&self) -> Option<&str> {
        preferred_region(&self.state, &self.region)
    }

    fn raw_date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn counts(&self) -> Vec<(&'static str, &RawCount)> {
        vec![
            ("bio_age_5_17", &self.bio_age_5_17),
            ("bio_age_17_", &self.bio_age_17_),
        ]
    }
}

/// Accepts strings and stringifies numbers; any other shape becomes `None`
/// so a single odd cell cannot reject a whole document.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enrolment_row_from_upstream_shape() {
        let row: EnrolmentRow = serde_json::from_value(json!({
            "date": "01-03-2024",
            "state": "Delhi",
            "district": "New Delhi",
            "pincode": "110001",
            "age_0_5": "10",
            "age_5_17": 20,
            "age_18_greater": "N/A"
        }))
        .unwrap();

        assert_eq!(row.region(), "Delhi");
        assert_eq!(row.raw_date(), Some("01-03-2024"));
        assert_eq!(row.age_0_5.coerce(), 10);
        assert_eq!(row.age_5_17.coerce(), 20);
        assert_eq!(row.age_18_greater.coerce(), 0);
        assert!(row.age_18_greater.is_malformed());
    }

    #[test]
    fn test_region_key_is_accepted() {
        let row: DemographicRow = serde_json::from_value(json!({
            "region": "Kerala",
            "date": "15-06-2023",
            "demo_age_5_17": 50,
            "demo_age_17_": 50
        }))
        .unwrap();

        assert_eq!(row.region(), "Kerala");
        assert_eq!(row.demo_age_17_.coerce(), 50);
    }

    #[test]
    fn test_missing_fields_default() {
        let row: BiometricRow = serde_json::from_value(json!({})).unwrap();
        assert_eq!(row.region(), UNKNOWN_REGION);
        assert_eq!(row.raw_date(), None);
        assert_eq!(row.bio_age_5_17.coerce(), 0);
        assert!(row.counts().iter().all(|(_, c)| !c.is_malformed()));
    }

    #[test]
    fn test_odd_cell_types_do_not_reject_row() {
        let row: EnrolmentRow = serde_json::from_value(json!({
            "state": 42,
            "date": ["01-03-2024"],
            "age_0_5": {"value": 1}
        }))
        .unwrap();

        assert_eq!(row.region(), "42");
        assert_eq!(row.raw_date(), None);
        assert_eq!(row.age_0_5.coerce(), 0);
    }

    #[test]
    fn test_state_and_region_together_prefer_state() {
        let rows: Vec<EnrolmentRow> = serde_json::from_value(json!([
            { "state": "Delhi", "region": "NCT of Delhi", "date": "01-03-2024", "age_0_5": 4 },
            { "state": " ", "region": "Kerala", "date": "01-03-2024" }
        ]))
        .unwrap();

        assert_eq!(rows[0].region(), "Delhi");
        assert_eq!(rows[0].age_0_5.coerce(), 4);
        assert_eq!(rows[1].region(), "Kerala");
    }

    #[test]
    fn test_blank_region_resolves_to_unknown() {
        let row: EnrolmentRow = serde_json::from_value(json!({ "state": "   " })).unwrap();
        assert_eq!(row.region(), UNKNOWN_REGION);
    }
}
