use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid youtube url: {0}")]
    InvalidUrl(String),
    #[error("cannot identify video: {0}")]
    UnresolvableIdentifier(String),
    #[error("{provider}: request failed: {message}")]
    ProviderTransport { provider: String, message: String },
    #[error("{provider}: failed to encode request: {message}")]
    RequestEncoding { provider: String, message: String },
    #[error("{provider}: bad response: {message}")]
    ProviderResponse { provider: String, message: String },
    #[error("{provider}: {message}")]
    ProviderRejected { provider: String, message: String },
    #[error("{message}")]
    AllProvidersExhausted {
        message: String,
        attempts: Vec<ConvertError>,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("failed to open link: {0}")]
    LinkOpen(String),
}

impl ConvertError {
    /// Name of the provider a per-attempt error belongs to.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::ProviderTransport { provider, .. }
            | Self::RequestEncoding { provider, .. }
            | Self::ProviderResponse { provider, .. }
            | Self::ProviderRejected { provider, .. } => Some(provider),
            _ => None,
        }
    }

    /// Higher is more useful to show the user when every provider failed.
    pub fn informativeness(&self) -> u8 {
        match self {
            Self::ProviderRejected { .. } => 3,
            Self::ProviderResponse { .. } | Self::RequestEncoding { .. } => 2,
            Self::ProviderTransport { .. } => 1,
            _ => 0,
        }
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::ConvertError;

    #[test]
    fn rejected_outranks_response_and_transport() {
        let rejected = ConvertError::ProviderRejected {
            provider: "a".to_string(),
            message: "rate limited".to_string(),
        };
        let response = ConvertError::ProviderResponse {
            provider: "a".to_string(),
            message: "status=500".to_string(),
        };
        let transport = ConvertError::ProviderTransport {
            provider: "a".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(rejected.informativeness() > response.informativeness());
        assert!(response.informativeness() > transport.informativeness());
        assert_eq!(rejected.provider(), Some("a"));
    }

    #[test]
    fn request_encoding_is_attributed_to_its_provider() {
        let err = ConvertError::RequestEncoding {
            provider: "json-api".to_string(),
            message: "key must be a string".to_string(),
        };
        assert_eq!(err.provider(), Some("json-api"));
        assert_eq!(
            err.to_string(),
            "json-api: failed to encode request: key must be a string"
        );
    }

    #[test]
    fn exhausted_displays_bare_message() {
        let err = ConvertError::AllProvidersExhausted {
            message: "rate limited".to_string(),
            attempts: Vec::new(),
        };
        assert_eq!(err.to_string(), "rate limited");
    }
}
