use serde::Deserialize;
use tubeconv_core::{ConversionRequest, ConvertResult, TargetFormat};
use url::Url;

use crate::provider::{Provider, interpret_reply};
use crate::transport::{HttpReply, ProviderRequest, RequestBody};

/// Numeric format codes understood by the form endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormApiSettings {
    pub audio_format: u32,
    pub video_format: u32,
}

impl Default for FormApiSettings {
    fn default() -> Self {
        Self {
            audio_format: 140,
            video_format: 18,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormApiProvider {
    endpoint: Url,
    settings: FormApiSettings,
}

impl FormApiProvider {
    pub fn new(endpoint: Url, settings: FormApiSettings) -> Self {
        Self { endpoint, settings }
    }

    fn format_code(&self, format: TargetFormat) -> u32 {
        match format {
            TargetFormat::Audio => self.settings.audio_format,
            TargetFormat::Video => self.settings.video_format,
        }
    }
}

impl Provider for FormApiProvider {
    fn name(&self) -> &str {
        "form-api"
    }

    fn build_request(&self, request: &ConversionRequest) -> ConvertResult<ProviderRequest> {
        Ok(ProviderRequest {
            endpoint: self.endpoint.clone(),
            body: RequestBody::Form(vec![
                ("url".to_string(), request.source_url()),
                (
                    "format".to_string(),
                    self.format_code(request.format()).to_string(),
                ),
            ]),
        })
    }

    fn parse_response(&self, reply: &HttpReply) -> ConvertResult<String> {
        interpret_reply::<FormApiResponse, _>(self.name(), reply, |payload| {
            (payload.download_url, payload.error)
        })
    }
}

#[derive(Debug, Deserialize)]
struct FormApiResponse {
    download_url: Option<String>,
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use tubeconv_core::ConvertError;

    use super::*;

    fn provider() -> FormApiProvider {
        FormApiProvider::new(
            Url::parse("https://fallback.test/convert").unwrap(),
            FormApiSettings::default(),
        )
    }

    #[test]
    fn form_body_uses_configured_codes() {
        let audio = ConversionRequest::new("abc123", TargetFormat::Audio);
        let built = provider().build_request(&audio).unwrap();
        assert_eq!(
            built.body,
            RequestBody::Form(vec![
                (
                    "url".to_string(),
                    "https://www.youtube.com/watch?v=abc123".to_string()
                ),
                ("format".to_string(), "140".to_string()),
            ])
        );

        let video = ConversionRequest::new("abc123", TargetFormat::Video);
        match provider().build_request(&video).unwrap().body {
            RequestBody::Form(fields) => assert_eq!(fields[1].1, "18"),
            other => panic!("Expected form body, got {other:?}"),
        }
    }

    #[test]
    fn parses_download_url() {
        let reply = HttpReply::new(200, r#"{"download_url":"https://y/file.mp3"}"#);
        assert_eq!(provider().parse_response(&reply).unwrap(), "https://y/file.mp3");
    }

    #[test]
    fn missing_download_url_fails() {
        let reply = HttpReply::new(200, r#"{"success":true}"#);
        match provider().parse_response(&reply) {
            Err(ConvertError::ProviderResponse { provider, message }) => {
                assert_eq!(provider, "form-api");
                assert!(message.contains("missing download url"));
            }
            other => panic!("Expected ProviderResponse, got {other:?}"),
        }
    }
}
