pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod source;

pub use domain::{AggregationKey, StateRollup, TimeSeriesRecord};
pub use error::{PulseError, Result};
pub use pipeline::{aggregate, rollup, AggregationOutput, AggregationPipeline};
