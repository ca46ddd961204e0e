use std::cmp::Reverse;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};
use tubeconv_core::{ConversionRequest, ConversionResult, ConvertError, ConvertResult};

use crate::provider::Provider;
use crate::transport::HttpTransport;

pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub download_url: String,
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainState {
    TryingPrimary,
    TryingSecondary,
    Succeeded(Conversion),
    Exhausted,
}

/// Sends a conversion to the primary provider and, if that fails, once to
/// the fallback. Holds no mutable state, so one instance can serve many
/// concurrent requests.
pub struct Orchestrator {
    transport: Arc<dyn HttpTransport>,
    primary: Box<dyn Provider>,
    fallback: Option<Box<dyn Provider>>,
    attempt_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        primary: Box<dyn Provider>,
        fallback: Box<dyn Provider>,
    ) -> Self {
        Self {
            transport,
            primary,
            fallback: Some(fallback),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    pub fn primary_only(transport: Arc<dyn HttpTransport>, primary: Box<dyn Provider>) -> Self {
        Self {
            transport,
            primary,
            fallback: None,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        std::iter::once(self.primary.name())
            .chain(self.fallback.as_deref().map(|p| p.name()))
            .collect()
    }

    pub async fn convert(&self, request: &ConversionRequest) -> ConversionResult {
        match self.run(request).await {
            Ok(conversion) => ConversionResult::Success {
                download_url: conversion.download_url,
                provider: conversion.provider,
            },
            Err(err) => ConversionResult::failure(err.to_string()),
        }
    }

    pub async fn run(&self, request: &ConversionRequest) -> ConvertResult<Conversion> {
        let mut failures = Vec::new();
        let mut state = ChainState::TryingPrimary;

        loop {
            debug!(video_id = request.video_id(), state = ?state, "conversion chain");
            state = match state {
                ChainState::TryingPrimary => {
                    match self.attempt(self.primary.as_ref(), request).await {
                        Ok(conversion) => ChainState::Succeeded(conversion),
                        Err(err) => {
                            failures.push(err);
                            if self.fallback.is_some() {
                                ChainState::TryingSecondary
                            } else {
                                ChainState::Exhausted
                            }
                        }
                    }
                }
                ChainState::TryingSecondary => match self.fallback.as_deref() {
                    Some(fallback) => match self.attempt(fallback, request).await {
                        Ok(conversion) => ChainState::Succeeded(conversion),
                        Err(err) => {
                            failures.push(err);
                            ChainState::Exhausted
                        }
                    },
                    None => ChainState::Exhausted,
                },
                ChainState::Succeeded(conversion) => {
                    info!(
                        video_id = request.video_id(),
                        provider = %conversion.provider,
                        "conversion succeeded"
                    );
                    return Ok(conversion);
                }
                ChainState::Exhausted => return Err(exhausted(failures)),
            };
        }
    }

    async fn attempt(
        &self,
        provider: &dyn Provider,
        request: &ConversionRequest,
    ) -> ConvertResult<Conversion> {
        let result = self.send(provider, request).await;
        if let Err(err) = &result {
            warn!(provider = provider.name(), error = %err, "provider attempt failed");
        }
        result
    }

    async fn send(
        &self,
        provider: &dyn Provider,
        request: &ConversionRequest,
    ) -> ConvertResult<Conversion> {
        let outgoing = provider.build_request(request)?;
        let transport_error = |message: String| ConvertError::ProviderTransport {
            provider: provider.name().to_string(),
            message,
        };

        let reply = match timeout(self.attempt_timeout, self.transport.post(&outgoing)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => return Err(transport_error(err.to_string())),
            Err(_) => {
                return Err(transport_error(format!(
                    "timed out after {}s",
                    self.attempt_timeout.as_secs_f32()
                )));
            }
        };

        let download_url = provider.parse_response(&reply)?;
        Ok(Conversion {
            download_url,
            provider: provider.name().to_string(),
        })
    }
}

/// Folds per-provider failures into one error. An explicit provider message
/// is shown verbatim; otherwise every failure is listed, most informative
/// first. Ties keep provider order.
fn exhausted(failures: Vec<ConvertError>) -> ConvertError {
    let mut ranked: Vec<&ConvertError> = failures.iter().collect();
    ranked.sort_by_key(|err| Reverse(err.informativeness()));

    let message = match ranked.first() {
        Some(ConvertError::ProviderRejected { message, .. }) => message.clone(),
        Some(_) => format!(
            "all conversion providers failed: {}",
            ranked
                .iter()
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        ),
        None => "no conversion provider configured".to_string(),
    };

    ConvertError::AllProvidersExhausted {
        message,
        attempts: failures,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tubeconv_core::TargetFormat;
    use url::Url;

    use super::*;
    use crate::transport::{HttpReply, ProviderRequest, TransportError};
    use crate::{FormApiProvider, FormApiSettings, JsonApiProvider, JsonApiSettings};

    const PRIMARY: &str = "https://primary.test/api/json";
    const FALLBACK: &str = "https://fallback.test/convert";

    enum Script {
        Reply(u16, &'static str),
        Fail(&'static str),
        Hang,
    }

    #[derive(Default)]
    struct ScriptedTransport {
        scripts: HashMap<String, Script>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn on(mut self, endpoint: &str, script: Script) -> Self {
            self.scripts.insert(endpoint.to_string(), script);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn post(&self, request: &ProviderRequest) -> Result<HttpReply, TransportError> {
            let endpoint = request.endpoint.to_string();
            self.calls.lock().unwrap().push(endpoint.clone());
            match self.scripts.get(&endpoint) {
                Some(Script::Reply(status, body)) => Ok(HttpReply::new(*status, *body)),
                Some(Script::Fail(message)) => Err(TransportError(message.to_string())),
                Some(Script::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(TransportError("unreachable".to_string()))
                }
                None => Err(TransportError("connection refused".to_string())),
            }
        }
    }

    fn orchestrator(transport: Arc<ScriptedTransport>) -> Orchestrator {
        Orchestrator::new(
            transport,
            Box::new(JsonApiProvider::new(
                Url::parse(PRIMARY).unwrap(),
                JsonApiSettings::default(),
            )),
            Box::new(FormApiProvider::new(
                Url::parse(FALLBACK).unwrap(),
                FormApiSettings::default(),
            )),
        )
    }

    fn request() -> ConversionRequest {
        ConversionRequest::new("dQw4w9WgXcQ", TargetFormat::Video)
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .on(PRIMARY, Script::Reply(200, r#"{"url":"https://x/file.mp4"}"#)),
        );
        let result = orchestrator(transport.clone()).convert(&request()).await;

        assert_eq!(
            result,
            ConversionResult::Success {
                download_url: "https://x/file.mp4".to_string(),
                provider: "json-api".to_string(),
            }
        );
        assert_eq!(transport.calls(), vec![PRIMARY.to_string()]);
    }

    #[tokio::test]
    async fn primary_server_error_falls_back() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .on(PRIMARY, Script::Reply(500, "internal error"))
                .on(
                    FALLBACK,
                    Script::Reply(200, r#"{"download_url":"https://y/file.mp3"}"#),
                ),
        );
        let result = orchestrator(transport.clone()).convert(&request()).await;

        assert_eq!(result.download_url(), Some("https://y/file.mp3"));
        assert_eq!(
            transport.calls(),
            vec![PRIMARY.to_string(), FALLBACK.to_string()]
        );
    }

    #[tokio::test]
    async fn primary_explicit_error_is_preferred_when_both_fail() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .on(PRIMARY, Script::Reply(200, r#"{"error":"rate limited"}"#))
                .on(FALLBACK, Script::Reply(503, "")),
        );
        let result = orchestrator(transport).convert(&request()).await;

        assert_eq!(result, ConversionResult::failure("rate limited"));
    }

    #[tokio::test]
    async fn fallback_explicit_error_beats_primary_transport_error() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .on(PRIMARY, Script::Fail("dns error"))
                .on(FALLBACK, Script::Reply(200, r#"{"error":"video unavailable"}"#)),
        );
        let result = orchestrator(transport).convert(&request()).await;

        assert_eq!(result, ConversionResult::failure("video unavailable"));
    }

    #[tokio::test]
    async fn transport_failures_list_every_provider() {
        let transport = Arc::new(ScriptedTransport::default());
        let err = orchestrator(transport).run(&request()).await.unwrap_err();

        match err {
            ConvertError::AllProvidersExhausted { message, attempts } => {
                assert!(message.starts_with("all conversion providers failed"));
                assert!(message.contains("json-api"));
                assert!(message.contains("form-api"));
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0].provider(), Some("json-api"));
            }
            other => panic!("Expected AllProvidersExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn response_error_is_listed_before_transport_error() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .on(PRIMARY, Script::Fail("connection reset"))
                .on(FALLBACK, Script::Reply(502, "bad gateway")),
        );
        let err = orchestrator(transport).run(&request()).await.unwrap_err();
        let message = err.to_string();

        let response_at = message.find("status=502").unwrap();
        let transport_at = message.find("connection reset").unwrap();
        assert!(response_at < transport_at);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_primary_times_out_and_falls_back() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .on(PRIMARY, Script::Hang)
                .on(
                    FALLBACK,
                    Script::Reply(200, r#"{"download_url":"https://y/file.mp4"}"#),
                ),
        );
        let orchestrator =
            orchestrator(transport.clone()).with_attempt_timeout(Duration::from_secs(15));
        let conversion = orchestrator.run(&request()).await.unwrap();

        assert_eq!(conversion.provider, "form-api");
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn primary_only_chain_exhausts_after_one_attempt() {
        let transport = Arc::new(
            ScriptedTransport::default().on(PRIMARY, Script::Reply(200, r#"{"error":"nope"}"#)),
        );
        let orchestrator = Orchestrator::primary_only(
            transport.clone(),
            Box::new(JsonApiProvider::new(
                Url::parse(PRIMARY).unwrap(),
                JsonApiSettings::default(),
            )),
        );

        assert_eq!(orchestrator.provider_names(), vec!["json-api"]);
        assert_eq!(
            orchestrator.convert(&request()).await,
            ConversionResult::failure("nope")
        );
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_requests_are_independent() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .on(PRIMARY, Script::Reply(200, r#"{"url":"https://x/file.mp4"}"#)),
        );
        let orchestrator = orchestrator(transport.clone());
        let audio = ConversionRequest::new("abc", TargetFormat::Audio);
        let video = ConversionRequest::new("def", TargetFormat::Video);

        let (first, second) = tokio::join!(orchestrator.convert(&audio), orchestrator.convert(&video));

        assert!(first.is_success());
        assert!(second.is_success());
        assert_eq!(transport.calls().len(), 2);
    }
}
