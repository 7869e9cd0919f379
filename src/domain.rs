use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one time-series record: a (region, month, year) period
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregationKey {
    pub region: String,
    /// Three-letter English month abbreviation (`Jan`..`Dec`)
    pub month: String,
    pub year: i32,
}

impl AggregationKey {
    pub fn new(region: impl Into<String>, month: impl Into<String>, year: i32) -> Self {
        Self {
            region: region.into(),
            month: month.into(),
            year,
        }
    }

    /// Display label for the period, e.g. `Mar-2024`
    pub fn period_label(&self) -> String {
        format!("{}-{:04}", self.month, self.year)
    }
}

/// The canonical string identity, e.g. `Delhi-Mar-2024`
impl fmt::Display for AggregationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:04}", self.region, self.month, self.year)
    }
}

/// Per-period statistics across the three datasets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesRecord {
    pub id: String,
    #[serde(rename = "state")]
    pub region: String,
    pub year: i32,
    pub month: String,
    pub period: String,
    pub enrolment: EnrolmentStats,
    pub updates: UpdateStats,
    pub biometrics: BiometricStats,
}

impl TimeSeriesRecord {
    /// A zeroed accumulator for `key`
    pub fn empty(key: &AggregationKey) -> Self {
        Self {
            id: key.to_string(),
            region: key.region.clone(),
            year: key.year,
            month: key.month.clone(),
            period: key.period_label(),
            enrolment: EnrolmentStats::default(),
            updates: UpdateStats::default(),
            biometrics: BiometricStats::default(),
        }
    }

    /// Whether every measured total equals the sum of its buckets.
    ///
    /// Update totals are excluded: their breakdown is an estimate and may drift.
    pub fn is_consistent(&self) -> bool {
        self.enrolment.is_consistent() && self.biometrics.is_consistent()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolmentStats {
    pub total: u64,
    #[serde(rename = "byAge")]
    pub by_age: EnrolmentByAge,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolmentByAge {
    #[serde(rename = "0-5")]
    pub age_0_5: u64,
    #[serde(rename = "5-17")]
    pub age_5_17: u64,
    #[serde(rename = "18+")]
    pub age_18_plus: u64,
}

impl EnrolmentStats {
    pub fn add(&mut self, age_0_5: u64, age_5_17: u64, age_18_plus: u64) {
        self.by_age.age_0_5 = self.by_age.age_0_5.saturating_add(age_0_5);
        self.by_age.age_5_17 = self.by_age.age_5_17.saturating_add(age_5_17);
        self.by_age.age_18_plus = self.by_age.age_18_plus.saturating_add(age_18_plus);
        self.total = self
            .total
            .saturating_add(age_0_5)
            .saturating_add(age_5_17)
            .saturating_add(age_18_plus);
    }

    pub fn is_consistent(&self) -> bool {
        let b = &self.by_age;
        b.age_0_5.checked_add(b.age_5_17).and_then(|s| s.checked_add(b.age_18_plus)) == Some(self.total)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStats {
    pub total: u64,
    #[serde(rename = "byType")]
    pub by_type: UpdateByType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateByType {
    pub address: u64,
    pub mobile: u64,
    pub name: u64,
    pub other: u64,
}

impl UpdateByType {
    pub fn sum(&self) -> u64 {
        self.address
            .saturating_add(self.mobile)
            .saturating_add(self.name)
            .saturating_add(self.other)
    }
}

impl UpdateStats {
    /// Adds a measured total together with its estimated per-type split.
    ///
    /// Each component is added independently; the split is not reconciled
    /// against the total.
    pub fn add(&mut self, total: u64, split: UpdateByType) {
        self.total = self.total.saturating_add(total);
        self.by_type.address = self.by_type.address.saturating_add(split.address);
        self.by_type.mobile = self.by_type.mobile.saturating_add(split.mobile);
        self.by_type.name = self.by_type.name.saturating_add(split.name);
        self.by_type.other = self.by_type.other.saturating_add(split.other);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiometricStats {
    pub total: u64,
    #[serde(rename = "byAge")]
    pub by_age: BiometricByAge,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiometricByAge {
    #[serde(rename = "5-17")]
    pub age_5_17: u64,
    #[serde(rename = "18+")]
    pub age_18_plus: u64,
}

impl BiometricStats {
    pub fn add(&mut self, age_5_17: u64, age_18_plus: u64) {
        self.by_age.age_5_17 = self.by_age.age_5_17.saturating_add(age_5_17);
        self.by_age.age_18_plus = self.by_age.age_18_plus.saturating_add(age_18_plus);
        self.total = self.total.saturating_add(age_5_17).saturating_add(age_18_plus);
    }

    pub fn is_consistent(&self) -> bool {
        self.by_age.age_5_17.checked_add(self.by_age.age_18_plus) == Some(self.total)
    }
}

/// Region-level totals across every period of that region
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRollup {
    #[serde(rename = "state")]
    pub region: String,
    pub total_enrolment: u64,
    pub total_updates: u64,
    pub total_address_updates: u64,
    pub total_mobile_updates: u64,
    pub total_bio_updates: u64,
    /// Approximation of a lagged child-cohort metric, see `ChildEnrolmentPolicy`
    pub child_enrolments_lagged: u64,
}

impl StateRollup {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }
}
