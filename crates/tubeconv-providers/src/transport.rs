use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// A fully built POST to a provider endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub endpoint: Url,
    pub body: RequestBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// The HTTP client seam. Implementations only move bytes; interpreting
/// the reply is left to the provider.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(&self, request: &ProviderRequest) -> Result<HttpReply, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent("tubeconv/0.1")
            .timeout(timeout)
            .build()
            .expect("failed to build http client");
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, request: &ProviderRequest) -> Result<HttpReply, TransportError> {
        let builder = self
            .client
            .post(request.endpoint.clone())
            .header("Accept", "application/json");
        let builder = match &request.body {
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(fields) => builder.form(fields),
        };

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError(format!("{err}")))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError(format!("failed to read response body: {err}")))?;

        Ok(HttpReply { status, body })
    }
}
