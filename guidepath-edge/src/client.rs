//! HTTP client for the processing node

use crate::error::ClientError;
use guidepath_core::config::EdgeConfig;
use guidepath_core::protocol::{AnalyzeResponse, HealthResponse, ANALYZE_PATH, HEALTH_PATH, IMAGE_FIELD};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct GuideClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
    health_timeout: Duration,
}

impl GuideClient {
    pub fn new(config: &EdgeConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ClientError::Unreachable(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            request_timeout: timeout("request_timeout_secs", config.request_timeout_secs)?,
            health_timeout: timeout("health_timeout_secs", config.health_timeout_secs)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the node answers its health route with 200 and reports
    /// itself running
    pub async fn check_health(&self) -> bool {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);
        let response = match self.client.get(&url).timeout(self.health_timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Health check failed: {}", e);
                return false;
            }
        };
        if response.status() != StatusCode::OK {
            debug!("Health check returned {}", response.status());
            return false;
        }

        match response.json::<HealthResponse>().await {
            Ok(health) => health.is_running(),
            Err(e) => {
                debug!("Unreadable health response: {}", e);
                false
            }
        }
    }

    /// Upload one JPEG frame and parse the instruction
    pub async fn analyze(&self, jpeg: Vec<u8>) -> Result<AnalyzeResponse, ClientError> {
        let part = Part::bytes(jpeg)
            .file_name("frame.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| ClientError::Encode(e.to_string()))?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let url = format!("{}{}", self.base_url, ANALYZE_PATH);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        AnalyzeResponse::from_slice(&body).map_err(|e| ClientError::Protocol(e.to_string()))
    }
}

fn timeout(name: &str, secs: f64) -> Result<Duration, ClientError> {
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(ClientError::Config(format!("{} must be positive and finite, got {}", name, secs))),
    }
}
