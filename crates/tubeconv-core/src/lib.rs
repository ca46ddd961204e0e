mod error;
mod request;
mod result;

pub use error::{ConvertError, ConvertResult};
pub use request::{ConversionRequest, TargetFormat};
pub use result::ConversionResult;

/// Parses a provider endpoint, accepting only http(s) URLs.
pub fn parse_endpoint(endpoint: &str) -> ConvertResult<url::Url> {
    let url = url::Url::parse(endpoint)
        .map_err(|err| ConvertError::Config(format!("invalid endpoint url: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConvertError::Config(format!(
            "invalid endpoint url: unsupported scheme {scheme}"
        ))),
    }
}
