//! Collaborators that supply the raw datasets: row schemas, snapshot files,
//! and the upstream fetcher.

pub mod fetch;
pub mod rows;
pub mod snapshot;

pub use rows::{BiometricRow, DemographicRow, EnrolmentRow, SourceRow};
pub use snapshot::{load_bundle, save_snapshot, DatasetBundle, SnapshotDocument};
