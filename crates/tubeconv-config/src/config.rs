use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    pub primary_endpoint: Option<String>,
    pub fallback_endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PrimaryConfig {
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub video_quality: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FallbackConfig {
    pub audio_format: Option<u32>,
    pub video_format: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DefaultConfig {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub simple: Option<bool>,
    pub open: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TubeconvConfig {
    pub providers: ProvidersConfig,
    pub primary: PrimaryConfig,
    pub fallback: FallbackConfig,
    pub default: DefaultConfig,
    pub output: OutputConfig,
}

impl TubeconvConfig {
    /// Every settable key with its current value, in file order.
    pub fn entries(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("providers.primary_endpoint", self.providers.primary_endpoint.clone()),
            ("providers.fallback_endpoint", self.providers.fallback_endpoint.clone()),
            ("providers.timeout_secs", self.providers.timeout_secs.map(|v| v.to_string())),
            ("primary.video_codec", self.primary.video_codec.clone()),
            ("primary.audio_codec", self.primary.audio_codec.clone()),
            ("primary.video_quality", self.primary.video_quality.clone()),
            ("fallback.audio_format", self.fallback.audio_format.map(|v| v.to_string())),
            ("fallback.video_format", self.fallback.video_format.map(|v| v.to_string())),
            ("default.format", self.default.format.clone()),
            ("output.simple", self.output.simple.map(|v| v.to_string())),
            ("output.open", self.output.open.map(|v| v.to_string())),
        ]
    }

    pub fn get(&self, key_path: &str) -> Option<String> {
        self.entries()
            .into_iter()
            .find(|(key, _)| *key == key_path)
            .and_then(|(_, value)| value)
    }
}
