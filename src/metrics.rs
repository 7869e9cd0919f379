use std::net::SocketAddr;
use tracing::{info, warn};

/// Installs the Prometheus exporter. Must be called from within a tokio runtime.
pub fn init_metrics(port: u16) {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    info!("Attempting to install Prometheus exporter on {}", addr);
    match builder.install() {
        Ok(()) => {
            info!("Prometheus exporter listening on http://{}/metrics", addr);
        }
        Err(e) => {
            warn!("Prometheus exporter install failed (possibly already installed): {}", e);
        }
    }
}

/// Aggregation pipeline metrics
pub mod aggregate {
    /// Record rows folded into the index for a dataset
    pub fn rows_ingested(dataset: &'static str, rows: usize) {
        ::metrics::counter!("pulse_rows_ingested_total", "dataset" => dataset).increment(rows as u64);
    }

    /// Record rows whose date could not be parsed and fell back to the clock
    pub fn date_fallbacks(dataset: &'static str, count: usize) {
        ::metrics::counter!("pulse_date_fallbacks_total", "dataset" => dataset).increment(count as u64);
    }

    /// Record count fields that were present but unparseable
    pub fn counts_coerced(dataset: &'static str, count: usize) {
        ::metrics::counter!("pulse_counts_coerced_total", "dataset" => dataset).increment(count as u64);
    }

    /// Record how many time-series records a run produced
    pub fn records_materialized(count: usize) {
        ::metrics::gauge!("pulse_records_materialized").set(count as f64);
    }

    /// Record a completed rollup computation
    pub fn rollups_computed(regions: usize) {
        ::metrics::counter!("pulse_rollups_computed_total").increment(1);
        ::metrics::histogram!("pulse_rollup_regions").record(regions as f64);
    }
}

/// Fetch collaborator metrics
pub mod fetch {
    /// Record rows received from the upstream API for a dataset
    pub fn rows_received(dataset: &'static str, rows: usize) {
        ::metrics::counter!("pulse_fetch_rows_total", "dataset" => dataset).increment(rows as u64);
    }

    /// Record an upstream response that did not report `ok`
    pub fn upstream_error(dataset: &'static str) {
        ::metrics::counter!("pulse_fetch_errors_total", "dataset" => dataset).increment(1);
    }
}
