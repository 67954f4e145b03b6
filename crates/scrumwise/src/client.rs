use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::ScrumwiseConfig;
use crate::error::{Result, ScrumwiseError};
use crate::models::ApiEnvelope;
use crate::requests::ApiCall;

/// A GET request ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub endpoint: String,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub username: String,
    pub password: String,
}

impl HttpRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends authenticated GET requests.
///
/// Implementations return `Ok` for any response the server produced, whatever
/// its status; `Err` is reserved for requests that never got an answer.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ScrumwiseConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder.timeout(std::time::Duration::from_secs(config.timeout_secs));
        }
        #[cfg(target_arch = "wasm32")]
        let _ = config;

        let client = builder.build().map_err(|e| ScrumwiseError::Config {
            message: format!("Failed to create HTTP client: {}", e),
        })?;
        Ok(Self { client })
    }

    fn format_reqwest_error(e: reqwest::Error, url: &str) -> String {
        if e.is_timeout() {
            format!(
                "timeout calling {} - request took too long (check network or increase timeout_secs)",
                url
            )
        } else if {
            #[cfg(not(target_arch = "wasm32"))]
            {
                e.is_connect()
            }
            #[cfg(target_arch = "wasm32")]
            {
                false
            }
        } {
            format!(
                "connection error calling {} - check host, port and network connectivity. Error: {}",
                url, e
            )
        } else if e.is_request() {
            format!(
                "request error calling {} - invalid URL or malformed parameters. Error: {}",
                url, e
            )
        } else if e.is_decode() {
            format!("decode error reading response from {}. Error: {}", url, e)
        } else {
            format!("{} calling {}. Debug details: {:?}", e, url, e)
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Transport for HttpTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let network_error = |message: String| {
            error!("[HttpTransport] {}", message);
            ScrumwiseError::Network {
                endpoint: request.endpoint.clone(),
                message,
            }
        };

        let response = self
            .client
            .get(&request.url)
            .basic_auth(&request.username, Some(&request.password))
            .query(&request.query)
            .send()
            .await
            .map_err(|e| network_error(Self::format_reqwest_error(e, &request.url)))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            network_error(format!(
                "Failed to read response body from {}: {}",
                request.url, e
            ))
        })?;

        Ok(HttpResponse { status, body })
    }
}

/// The parsed outcome of one successful call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub data_version: i64,
    pub result: Option<Value>,
}

/// Connection parameters plus the last data version the server reported.
pub struct Connection {
    config: ScrumwiseConfig,
    transport: Arc<dyn Transport>,
    last_data_version: i64,
}

impl Connection {
    pub fn new(config: ScrumwiseConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            last_data_version: 0,
        }
    }

    pub fn config(&self) -> &ScrumwiseConfig {
        &self.config
    }

    pub fn last_data_version(&self) -> i64 {
        self.last_data_version
    }

    pub fn set_last_data_version(&mut self, version: i64) {
        self.last_data_version = version;
    }

    pub fn build_request(&self, call: &ApiCall, require_version: bool) -> HttpRequest {
        let mut query: Vec<(String, String)> = call
            .params()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        if require_version {
            query.push((
                "requiredDataVersion".to_string(),
                self.last_data_version.to_string(),
            ));
        }

        HttpRequest {
            endpoint: call.endpoint().to_string(),
            url: self.config.endpoint_url(call.endpoint()),
            query,
            username: self.config.username.clone(),
            password: self.config.api_key.clone(),
        }
    }

    /// Sends one call and records the data version it reports.
    ///
    /// The version is recorded even when the status is not a success, as long
    /// as the body carries one; the call still fails in that case.
    pub async fn execute(&mut self, call: &ApiCall, require_version: bool) -> Result<ApiResponse> {
        let request = self.build_request(call, require_version);
        debug!(
            "[Connection] Executing {} (require_version={})",
            call, require_version
        );

        let response = self.transport.get(&request).await?;

        let envelope = serde_json::from_str::<ApiEnvelope>(&response.body).ok();
        let data_version = envelope.as_ref().and_then(|e| e.data_version);
        if let Some(version) = data_version {
            if version < self.last_data_version {
                warn!(
                    "[Connection] {} reported dataVersion {} below last known {}",
                    request.endpoint, version, self.last_data_version
                );
            }
            self.last_data_version = version;
        }

        if !response.is_success() {
            let body = if response.body.len() > 500 {
                format!(
                    "{}... (truncated)",
                    response.body.chars().take(500).collect::<String>()
                )
            } else {
                response.body
            };
            error!(
                "[Connection] HTTP {} error from {}: {}",
                response.status, request.endpoint, body
            );
            return Err(ScrumwiseError::Http {
                endpoint: request.endpoint,
                status: response.status,
                body,
            });
        }

        let Some(data_version) = data_version else {
            error!(
                "[Connection] Response from {} carries no dataVersion",
                request.endpoint
            );
            return Err(ScrumwiseError::MissingDataVersion {
                endpoint: request.endpoint,
            });
        };

        info!(
            "[Connection] {} succeeded: dataVersion={}",
            request.endpoint, data_version
        );
        Ok(ApiResponse {
            data_version,
            result: envelope.and_then(|e| e.result),
        })
    }
}
