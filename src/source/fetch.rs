use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

use crate::config::SourceConfig;
use crate::constants::{API_STATUS_OK, BIOMETRIC_DATASET, DEMOGRAPHIC_DATASET, ENROLMENT_DATASET};
use crate::error::{PulseError, Result};
use crate::source::snapshot::SnapshotDocument;

/// One of the three upstream datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Demographic,
    Enrolment,
    Biometric,
}

impl Dataset {
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Demographic => DEMOGRAPHIC_DATASET,
            Dataset::Enrolment => ENROLMENT_DATASET,
            Dataset::Biometric => BIOMETRIC_DATASET,
        }
    }
}

/// Body returned by the data.gov.in resource API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub records: Vec<Value>,
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        self.status == API_STATUS_OK
    }
}

#[async_trait]
pub trait DatasetClient: Send + Sync {
    async fn fetch(&self, dataset: Dataset) -> Result<ApiResponse>;
}

/// `reqwest`-backed client for the public resource API
pub struct HttpDatasetClient {
    client: reqwest::Client,
    config: SourceConfig,
    api_key: String,
}

impl HttpDatasetClient {
    pub fn new(config: SourceConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    fn resource_for(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::Demographic => &self.config.demographic_resource,
            Dataset::Enrolment => &self.config.enrolment_resource,
            Dataset::Biometric => &self.config.biometric_resource,
        }
    }

    fn url_for(&self, dataset: Dataset) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.resource_for(dataset)
        )
    }
}

#[async_trait]
impl DatasetClient for HttpDatasetClient {
    async fn fetch(&self, dataset: Dataset) -> Result<ApiResponse> {
        let limit = self.config.limit.to_string();
        let response = self
            .client
            .get(self.url_for(dataset))
            .query(&[
                ("api-key", self.api_key.as_str()),
                ("format", "json"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let body: ApiResponse = response.json().await?;
        Ok(body)
    }
}

/// Fetches all three datasets concurrently and stamps them into a snapshot.
///
/// Any response whose status is not `ok` fails the whole fetch; nothing is
/// retried.
pub async fn fetch_snapshot(client: &dyn DatasetClient) -> Result<SnapshotDocument> {
    info!("Starting data fetch");

    let (demographic, enrolment, biometric) = tokio::try_join!(
        client.fetch(Dataset::Demographic),
        client.fetch(Dataset::Enrolment),
        client.fetch(Dataset::Biometric),
    )?;

    if !(demographic.is_ok() && enrolment.is_ok() && biometric.is_ok()) {
        let mut message = format!(
            "upstream statuses: demographic={}, enrolment={}, biometric={}",
            demographic.status, enrolment.status, biometric.status
        );
        for (dataset, response) in [
            (Dataset::Demographic, &demographic),
            (Dataset::Enrolment, &enrolment),
            (Dataset::Biometric, &biometric),
        ] {
            if response.is_ok() {
                continue;
            }
            crate::metrics::fetch::upstream_error(dataset.name());
            if let Some(detail) = &response.message {
                message.push_str(&format!("; {}: {}", dataset.name(), detail));
            }
        }
        error!("{}", message);
        return Err(PulseError::Api { message });
    }

    for (dataset, response) in [
        (Dataset::Demographic, &demographic),
        (Dataset::Enrolment, &enrolment),
        (Dataset::Biometric, &biometric),
    ] {
        crate::metrics::fetch::rows_received(dataset.name(), response.records.len());
    }
    info!(
        demographic = demographic.records.len(),
        enrolment = enrolment.records.len(),
        biometric = biometric.records.len(),
        "Fetched datasets"
    );

    Ok(SnapshotDocument {
        demographic: demographic.records,
        enrolment: enrolment.records,
        biometric: biometric.records,
        timestamp: Utc::now(),
    })
}
