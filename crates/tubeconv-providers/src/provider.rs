use serde::de::DeserializeOwned;
use tubeconv_core::{ConversionRequest, ConvertError, ConvertResult};
use url::Url;

use crate::transport::{HttpReply, ProviderRequest};

const BODY_SNIPPET_LEN: usize = 200;

/// One third-party conversion service: how to ask it, and how to read its answer.
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn build_request(&self, request: &ConversionRequest) -> ConvertResult<ProviderRequest>;

    /// Returns the download URL, or the reason this provider failed.
    fn parse_response(&self, reply: &HttpReply) -> ConvertResult<String>;
}

/// Decodes a JSON reply into `(download_url, explicit_error)` and applies the
/// failure rules shared by all providers. An explicit error payload wins over
/// the HTTP status so the provider's own wording reaches the user.
pub(crate) fn interpret_reply<T, F>(provider: &str, reply: &HttpReply, extract: F) -> ConvertResult<String>
where
    T: DeserializeOwned,
    F: FnOnce(T) -> (Option<String>, Option<String>),
{
    let (link, error) = match serde_json::from_str::<T>(&reply.body) {
        Ok(payload) => extract(payload),
        Err(err) if reply.is_success() => {
            return Err(response_error(
                provider,
                format!("response parse failed: {err}"),
            ));
        }
        Err(_) => return Err(status_error(provider, reply)),
    };

    if let Some(message) = error.filter(|message| !message.trim().is_empty()) {
        return Err(ConvertError::ProviderRejected {
            provider: provider.to_string(),
            message,
        });
    }

    if !reply.is_success() {
        return Err(status_error(provider, reply));
    }

    let raw = link.ok_or_else(|| response_error(provider, "response missing download url"))?;
    usable_link(&raw)
        .ok_or_else(|| response_error(provider, format!("unusable download url: {raw}")))
}

fn usable_link(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let url = Url::parse(raw).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| raw.to_string())
}

fn status_error(provider: &str, reply: &HttpReply) -> ConvertError {
    response_error(
        provider,
        format!("status={} body={}", reply.status, snippet(&reply.body)),
    )
}

fn response_error(provider: &str, message: impl Into<String>) -> ConvertError {
    ConvertError::ProviderResponse {
        provider: provider.to_string(),
        message: message.into(),
    }
}

fn snippet(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(BODY_SNIPPET_LEN) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
