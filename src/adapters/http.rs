use crate::config::ApiConfig;
use crate::domain::model::{
    DeviceDetailBody, DeviceInfo, DeviceInfoListBody, DeviceListBody, DeviceRecord, DiskListBody,
    Label, LabelsBody, PortInfo,
};
use crate::domain::ports::{InventoryClient, TokenProvider};
use crate::utils::error::{CdsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::{Position, Url};

pub const LABELS_PATH: [&str; 2] = ["v1", "cds-labels"];
pub const DEVICES_PATH: [&str; 2] = ["v1", "cds"];
const ICACHES_PATH: [&str; 2] = ["v1", "icaches"];
const AUTH_HEADER: &str = "X-auth-token";

/// Returns a fixed token taken from configuration.
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String> {
        if self.token.trim().is_empty() {
            return Err(CdsError::MissingConfigError {
                field: "api.token".to_string(),
            });
        }
        Ok(self.token.clone())
    }
}

/// Fleet API client. Every call is bounded by the configured timeout.
#[derive(Clone)]
pub struct HttpInventoryClient {
    client: Client,
    host: String,
    base: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpInventoryClient {
    pub fn new(
        host: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| CdsError::ConfigError {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        let host = host.into().trim_end_matches('/').to_string();
        let base = Url::parse(&host).map_err(|e| CdsError::InvalidConfigValueError {
            field: "api.host".to_string(),
            value: host.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(CdsError::InvalidConfigValueError {
                field: "api.host".to_string(),
                value: host,
                reason: "URL cannot carry a path".to_string(),
            });
        }

        Ok(Self {
            client,
            host,
            base,
            tokens,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(
            config.host.clone(),
            Arc::new(StaticToken::new(config.token.clone())),
            config.timeout(),
            config.accept_invalid_certs,
        )
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Appends percent-encoded path segments to the configured host.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CdsError::ConfigError {
                message: format!("host {} cannot carry a path", self.host),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let api = url[Position::BeforePath..].to_string();
        let token = self.tokens.token().await?;

        tracing::debug!("Making API request to: {}", url);
        let response = self
            .client
            .get(url)
            .header(AUTH_HEADER, token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(&api, e))?;

        let status = response.status();
        tracing::debug!("API response status for {}: {}", api, status);
        if status != reqwest::StatusCode::OK {
            return Err(CdsError::StatusError {
                endpoint: api,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&api, e))?;
        serde_json::from_slice(&body).map_err(|e| CdsError::decode(&api, e.to_string()))
    }

    /// Every device visible to the token, for the `list` command.
    pub async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let body: DeviceInfoListBody = self.get_json(self.endpoint(DEVICES_PATH)?).await?;
        Ok(body.cds)
    }

    /// `None` when the API knows no device with this serial number.
    pub async fn device_detail(&self, serial_number: &str) -> Result<Option<DeviceInfo>> {
        let url = self.endpoint(DEVICES_PATH.into_iter().chain([serial_number]))?;
        let body: DeviceDetailBody = self.get_json(url).await?;
        Ok(body.cds.filter(|device| !device.sn.is_empty()))
    }

    pub async fn device_port(&self, serial_number: &str) -> Result<PortInfo> {
        let url = self.endpoint(ICACHES_PATH.into_iter().chain([serial_number, "ports"]))?;
        self.get_json(url).await
    }
}

fn transport_error(api: &str, e: reqwest::Error) -> CdsError {
    let message = if e.is_timeout() {
        format!("timed out: {}", e)
    } else {
        e.to_string()
    };
    CdsError::transport(api, message)
}

#[async_trait]
impl InventoryClient for HttpInventoryClient {
    async fn fetch_labels(&self) -> Result<Vec<Label>> {
        let body: LabelsBody = self.get_json(self.endpoint(LABELS_PATH)?).await?;
        Ok(body.into_labels())
    }

    async fn devices_by_label(&self, label_id: i64) -> Result<Vec<DeviceRecord>> {
        let mut url = self.endpoint(DEVICES_PATH)?;
        url.query_pairs_mut().append_pair("label", &label_id.to_string());
        let body: DeviceListBody = self.get_json(url).await?;
        Ok(body.cds)
    }

    async fn disk_count(&self, serial_number: &str) -> Result<usize> {
        let url = self.endpoint(ICACHES_PATH.into_iter().chain([serial_number, "disks"]))?;
        let body: DiskListBody = self.get_json(url).await?;
        Ok(body.disks.len())
    }
}
