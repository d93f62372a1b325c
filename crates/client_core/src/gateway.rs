use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{
    domain::{Language, Verification},
    error::failure_reason_from_body,
    protocol::{
        FactCheckRequest, SummarizeSourceRequest, SummarizeSourceResponse, TranslateRequest,
        TranslateResponse,
    },
};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    FactCheck,
    SummarizeSource,
    Translate,
}

impl Endpoint {
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::FactCheck => "fact-check",
            Endpoint::SummarizeSource => "summarize-source",
            Endpoint::Translate => "translate",
        }
    }

    fn path(self) -> &'static str {
        match self {
            Endpoint::FactCheck => "api/fact-check",
            Endpoint::SummarizeSource => "api/summarize-source",
            Endpoint::Translate => "api/translate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No response came back.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Remote { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid request payload: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Uniform call into the backend's named operations.
///
/// Implementations report every failure through `GatewayError` and never
/// retry on their own.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn call(&self, endpoint: Endpoint, payload: Value) -> Result<Value, GatewayError>;

    async fn fact_check(&self, statement: &str) -> Result<Verification, GatewayError> {
        let payload = encode(&FactCheckRequest {
            statement: statement.to_string(),
        })?;
        decode(self.call(Endpoint::FactCheck, payload).await?)
    }

    async fn summarize_source(
        &self,
        source: &str,
        target_language: Language,
    ) -> Result<SummarizeSourceResponse, GatewayError> {
        let payload = encode(&SummarizeSourceRequest {
            source: source.to_string(),
            target_language,
        })?;
        decode(self.call(Endpoint::SummarizeSource, payload).await?)
    }

    async fn translate(
        &self,
        text: &str,
        target_language: Language,
    ) -> Result<TranslateResponse, GatewayError> {
        let payload = encode(&TranslateRequest {
            text: text.to_string(),
            target_language,
        })?;
        decode(self.call(Endpoint::Translate, payload).await?)
    }
}

fn encode<T: Serialize>(body: &T) -> Result<Value, GatewayError> {
    serde_json::to_value(body).map_err(|err| GatewayError::InvalidRequest(err.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|err| GatewayError::InvalidResponse(err.to_string()))
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    base_url: Url,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized)
            .with_context(|| format!("invalid fact-check server url '{base_url}'"))?;
        Ok(Self {
            base_url,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, GatewayError> {
        self.base_url.join(endpoint.path()).map_err(|err| {
            GatewayError::InvalidRequest(format!("cannot build {} url: {err}", endpoint.name()))
        })
    }
}

pub struct HttpGateway {
    http: Client,
    config: GatewayConfig,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn call(&self, endpoint: Endpoint, payload: Value) -> Result<Value, GatewayError> {
        let url = self.config.endpoint_url(endpoint)?;
        let started = Instant::now();
        debug!(endpoint = endpoint.name(), %url, "gateway: sending request");

        let response = match self.http.post(url).json(&payload).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    endpoint = endpoint.name(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    error = %err,
                    "gateway: no response"
                );
                return Err(GatewayError::Transport(err.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = failure_reason_from_body(&body);
            warn!(
                endpoint = endpoint.name(),
                status = status.as_u16(),
                duration_ms = started.elapsed().as_millis() as u64,
                reason = %message,
                "gateway: remote operation failed"
            );
            return Err(GatewayError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|err| GatewayError::InvalidResponse(err.to_string()))?;
        info!(
            endpoint = endpoint.name(),
            status = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "gateway: remote operation completed"
        );
        Ok(body)
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
