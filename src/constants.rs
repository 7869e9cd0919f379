/// Dataset names as they appear as top-level keys in a snapshot document
pub const DEMOGRAPHIC_DATASET: &str = "demographic";
pub const ENROLMENT_DATASET: &str = "enrolment";
pub const BIOMETRIC_DATASET: &str = "biometric";

// data.gov.in resource identifiers for the three Aadhaar datasets
pub const DEMOGRAPHIC_RESOURCE: &str = "19eac040-0b94-49fa-b239-4f2fd8677d53";
pub const ENROLMENT_RESOURCE: &str = "ecd49b12-3084-4521-8f7e-ca8bf72069ba";
pub const BIOMETRIC_RESOURCE: &str = "65454dab-1517-40a3-ac1d-47d4dfe6891c";

pub const DEFAULT_BASE_URL: &str = "https://api.data.gov.in/resource";
pub const DEFAULT_FETCH_LIMIT: u32 = 2000;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_SNAPSHOT_PATH: &str = "public/data.json";
pub const DEFAULT_CONFIG_PATH: &str = "pulse.toml";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Status string the upstream API reports on success
pub const API_STATUS_OK: &str = "ok";

/// Region used when a row carries no usable state name
pub const UNKNOWN_REGION: &str = "Unknown";

/// Date layout of the `date` field in every upstream dataset (dd-mm-yyyy)
pub const SOURCE_DATE_FORMAT: &str = "%d-%m-%Y";

/// Regions offered by the dashboard's state filter
pub const KNOWN_REGIONS: [&str; 18] = [
    "Uttar Pradesh",
    "Maharashtra",
    "Bihar",
    "West Bengal",
    "Madhya Pradesh",
    "Tamil Nadu",
    "Rajasthan",
    "Karnataka",
    "Gujarat",
    "Andhra Pradesh",
    "Odisha",
    "Telangana",
    "Kerala",
    "Jharkhand",
    "Assam",
    "Punjab",
    "Haryana",
    "Delhi",
];

/// Whether a region is one the dashboard knows how to filter on
pub fn is_known_region(region: &str) -> bool {
    KNOWN_REGIONS.contains(&region)
}
