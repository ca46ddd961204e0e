use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConvertError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Audio,
    Video,
}

impl TargetFormat {
    pub fn is_audio(self) -> bool {
        matches!(self, Self::Audio)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
        }
    }
}

impl FromStr for TargetFormat {
    type Err = ConvertError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "audio" | "mp3" => Ok(Self::Audio),
            "video" | "mp4" => Ok(Self::Video),
            other => Err(ConvertError::InvalidInput(format!(
                "unknown format: {other} (expected audio or video)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    video_id: String,
    format: TargetFormat,
}

impl ConversionRequest {
    pub fn new(video_id: impl Into<String>, format: TargetFormat) -> Self {
        Self {
            video_id: video_id.into(),
            format,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn format(&self) -> TargetFormat {
        self.format
    }

    /// Canonical watch URL handed to providers.
    pub fn source_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}
