mod config;

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use tubeconv_core::{ConvertError, ConvertResult, TargetFormat, parse_endpoint};
use url::Url;

pub use config::{
    DefaultConfig, FallbackConfig, OutputConfig, PrimaryConfig, ProvidersConfig, TubeconvConfig,
};

pub const DEFAULT_PRIMARY_ENDPOINT: &str = "https://api.cobalt.tools/api/json";
pub const DEFAULT_FALLBACK_ENDPOINT: &str = "https://loader.to/ajax/download.php";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub fn config_path() -> ConvertResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ConvertError::Config("home directory not found".to_string()))?;
    Ok(home.join(".tubeconv").join("config.toml"))
}

pub fn load_config() -> ConvertResult<TubeconvConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(TubeconvConfig::default());
    }
    let content = fs::read_to_string(&path)
        .map_err(|err| ConvertError::Config(format!("failed to read config: {err}")))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> ConvertResult<TubeconvConfig> {
    toml::from_str(content)
        .map_err(|err| ConvertError::Config(format!("failed to parse config: {err}")))
}

pub fn save_config(config: &TubeconvConfig) -> ConvertResult<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| ConvertError::Config(format!("failed to create config dir: {err}")))?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|err| ConvertError::Config(format!("failed to serialize config: {err}")))?;
    fs::write(&path, content)
        .map_err(|err| ConvertError::Config(format!("failed to write config: {err}")))?;
    Ok(())
}

pub fn set_config_value(key_path: &str, value: &str) -> ConvertResult<()> {
    let path = config_path()?;
    let content = if path.exists() {
        fs::read_to_string(&path)
            .map_err(|err| ConvertError::Config(format!("failed to read config: {err}")))?
    } else {
        String::new()
    };

    let content = apply_config_value(&content, key_path, value)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| ConvertError::Config(format!("failed to create config dir: {err}")))?;
    }
    fs::write(&path, content)
        .map_err(|err| ConvertError::Config(format!("failed to write config: {err}")))?;

    Ok(())
}

/// Sets `key_path` inside an existing TOML document, keeping its formatting.
pub fn apply_config_value(content: &str, key_path: &str, value: &str) -> ConvertResult<String> {
    let known = TubeconvConfig::default()
        .entries()
        .iter()
        .any(|(key, _)| *key == key_path);
    if !known {
        return Err(ConvertError::Config(format!("unknown config key: {key_path}")));
    }

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|err| ConvertError::Config(format!("failed to parse config: {err}")))?;

    let Some((table_name, key)) = key_path.split_once('.') else {
        return Err(ConvertError::Config(format!(
            "key path must look like 'table.key': {key_path}"
        )));
    };

    let table = doc
        .as_table_mut()
        .entry(table_name)
        .or_insert(toml_edit::Item::Table(Default::default()))
        .as_table_mut()
        .ok_or_else(|| ConvertError::Config(format!("cannot set nested value in '{key_path}'")))?;
    table[key] = typed_value(key_path, value)?;

    let updated = doc.to_string();
    parse_config(&updated)?;
    Ok(updated)
}

fn typed_value(key_path: &str, value: &str) -> ConvertResult<toml_edit::Item> {
    let invalid = |expected: &str| {
        ConvertError::Config(format!("{key_path} expects {expected}, got '{value}'"))
    };
    match key_path {
        "providers.timeout_secs" | "fallback.audio_format" | "fallback.video_format" => value
            .trim()
            .parse::<u32>()
            .map(|number| toml_edit::value(i64::from(number)))
            .map_err(|_| invalid("a non-negative integer")),
        "output.simple" | "output.open" => parse_flag(value)
            .map(toml_edit::value)
            .ok_or_else(|| invalid("true or false")),
        "default.format" => value
            .parse::<TargetFormat>()
            .map(|format| toml_edit::value(format.to_string())),
        _ => Ok(toml_edit::value(value)),
    }
}

pub fn open_in_editor() -> ConvertResult<()> {
    let path = config_path()?;
    if !path.exists() {
        save_config(&TubeconvConfig::default())?;
    }

    let editor = env::var("EDITOR").unwrap_or_else(|_| {
        if cfg!(target_os = "windows") {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "vim".to_string()
        } else {
            "nano".to_string()
        }
    });

    let status = Command::new(&editor).arg(&path).status().map_err(|err| {
        ConvertError::Config(format!("failed to open editor '{editor}': {err}"))
    })?;

    if !status.success() {
        return Err(ConvertError::Config(format!(
            "editor exited with status: {status}"
        )));
    }

    Ok(())
}

/// Effective settings after layering environment over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub primary_endpoint: Url,
    pub fallback_endpoint: Url,
    pub timeout: Duration,
    pub video_codec: String,
    pub audio_codec: String,
    pub video_quality: Option<String>,
    pub audio_format: u32,
    pub video_format: u32,
    pub default_format: Option<TargetFormat>,
    pub simple: bool,
    pub open_links: bool,
}

pub fn resolve_settings(config: &TubeconvConfig) -> ConvertResult<ResolvedSettings> {
    resolve_settings_from(config, |key| env::var(key).ok())
}

pub fn resolve_settings_from<F>(config: &TubeconvConfig, env_var: F) -> ConvertResult<ResolvedSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let env_value = |key: &str| env_var(key).filter(|value| !value.trim().is_empty());

    let primary_endpoint = env_value("TUBECONV_PRIMARY_ENDPOINT")
        .or_else(|| config.providers.primary_endpoint.clone())
        .unwrap_or_else(|| DEFAULT_PRIMARY_ENDPOINT.to_string());
    let fallback_endpoint = env_value("TUBECONV_FALLBACK_ENDPOINT")
        .or_else(|| config.providers.fallback_endpoint.clone())
        .unwrap_or_else(|| DEFAULT_FALLBACK_ENDPOINT.to_string());

    let timeout_secs = match env_value("TUBECONV_TIMEOUT_SECS") {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
            ConvertError::Config(format!("TUBECONV_TIMEOUT_SECS must be an integer, got '{raw}'"))
        })?,
        None => config.providers.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
    };
    if timeout_secs == 0 {
        return Err(ConvertError::Config("timeout must be at least 1 second".to_string()));
    }

    let default_format = env_value("TUBECONV_DEFAULT_FORMAT")
        .or_else(|| config.default.format.clone())
        .map(|raw| raw.parse::<TargetFormat>())
        .transpose()?;

    let simple = env_value("TUBECONV_OUTPUT_SIMPLE")
        .and_then(|raw| parse_flag(&raw))
        .or(config.output.simple)
        .unwrap_or(false);
    let open_links = env_value("TUBECONV_OPEN")
        .and_then(|raw| parse_flag(&raw))
        .or(config.output.open)
        .unwrap_or(true);

    Ok(ResolvedSettings {
        primary_endpoint: parse_endpoint(&primary_endpoint)?,
        fallback_endpoint: parse_endpoint(&fallback_endpoint)?,
        timeout: Duration::from_secs(timeout_secs),
        video_codec: config
            .primary
            .video_codec
            .clone()
            .unwrap_or_else(|| "h264".to_string()),
        audio_codec: config
            .primary
            .audio_codec
            .clone()
            .unwrap_or_else(|| "mp3".to_string()),
        video_quality: config
            .primary
            .video_quality
            .clone()
            .or_else(|| Some("720".to_string())),
        audio_format: config.fallback.audio_format.unwrap_or(140),
        video_format: config.fallback.video_format.unwrap_or(18),
        default_format,
        simple,
        open_links,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
