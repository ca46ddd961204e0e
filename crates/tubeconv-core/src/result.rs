use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ConversionResult {
    Success {
        download_url: String,
        provider: String,
    },
    Failure {
        message: String,
    },
}

impl ConversionResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn download_url(&self) -> Option<&str> {
        match self {
            Self::Success { download_url, .. } => Some(download_url),
            Self::Failure { .. } => None,
        }
    }
}
