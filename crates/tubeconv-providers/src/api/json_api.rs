use serde::{Deserialize, Serialize};
use tubeconv_core::{ConversionRequest, ConvertError, ConvertResult};
use url::Url;

use crate::provider::{Provider, interpret_reply};
use crate::transport::{HttpReply, ProviderRequest, RequestBody};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonApiSettings {
    pub video_codec: String,
    pub audio_codec: String,
    pub video_quality: Option<String>,
}

impl Default for JsonApiSettings {
    fn default() -> Self {
        Self {
            video_codec: "h264".to_string(),
            audio_codec: "mp3".to_string(),
            video_quality: Some("720".to_string()),
        }
    }
}

/// Primary provider: JSON in, `{url}` or `{error}` out.
#[derive(Debug, Clone)]
pub struct JsonApiProvider {
    endpoint: Url,
    settings: JsonApiSettings,
}

impl JsonApiProvider {
    pub fn new(endpoint: Url, settings: JsonApiSettings) -> Self {
        Self { endpoint, settings }
    }
}

impl Provider for JsonApiProvider {
    fn name(&self) -> &str {
        "json-api"
    }

    fn build_request(&self, request: &ConversionRequest) -> ConvertResult<ProviderRequest> {
        let audio = request.format().is_audio();
        let body = JsonApiBody {
            url: request.source_url(),
            v_codec: (!audio).then_some(self.settings.video_codec.as_str()),
            a_codec: audio.then_some(self.settings.audio_codec.as_str()),
            is_audio_only: audio,
            youtube_video_quality: if audio {
                None
            } else {
                self.settings.video_quality.as_deref()
            },
        };
        let body = serde_json::to_value(&body).map_err(|err| ConvertError::RequestEncoding {
            provider: self.name().to_string(),
            message: err.to_string(),
        })?;

        Ok(ProviderRequest {
            endpoint: self.endpoint.clone(),
            body: RequestBody::Json(body),
        })
    }

    fn parse_response(&self, reply: &HttpReply) -> ConvertResult<String> {
        interpret_reply::<JsonApiResponse, _>(self.name(), reply, |payload| {
            (payload.url, payload.error.and_then(ErrorPayload::into_message))
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonApiBody<'a> {
    url: String,
    v_codec: Option<&'a str>,
    a_codec: Option<&'a str>,
    is_audio_only: bool,
    youtube_video_quality: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct JsonApiResponse {
    url: Option<String>,
    error: Option<ErrorPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorPayload {
    Text(String),
    Detail {
        code: Option<String>,
        message: Option<String>,
    },
}

impl ErrorPayload {
    fn into_message(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Detail { code, message } => message.or(code),
        }
    }
}
