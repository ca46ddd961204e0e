mod notifier;

use std::sync::Arc;

use tracing::debug;
use tubeconv_config::ResolvedSettings;
use tubeconv_providers::{
    FormApiProvider, FormApiSettings, JsonApiProvider, JsonApiSettings, Orchestrator,
    ReqwestTransport,
};

pub use notifier::{CollectingNotifier, ConsoleNotifier, LinkOpener, Notifier, SystemOpener};
pub use tubeconv_core::{ConversionRequest, ConversionResult, ConvertError, ConvertResult, TargetFormat};

/// Validates the raw input and turns it into a request. No network access.
pub fn prepare(raw_url: &str, format: TargetFormat) -> ConvertResult<ConversionRequest> {
    tubeconv_url::ensure_valid(raw_url)?;
    let video_id = tubeconv_url::resolve_id(raw_url)?;
    Ok(ConversionRequest::new(video_id, format))
}

/// Runs one submission end to end and reports it through `notifier`.
pub async fn submit(
    raw_url: &str,
    format: TargetFormat,
    orchestrator: &Orchestrator,
    notifier: &dyn Notifier,
) -> ConversionResult {
    let result = match prepare(raw_url, format) {
        Ok(request) => {
            debug!(video_id = request.video_id(), %format, "submitting conversion");
            orchestrator.convert(&request).await
        }
        Err(err) => {
            debug!(input = raw_url, error = %err, "rejected before conversion");
            ConversionResult::failure(err.to_string())
        }
    };
    notifier.notify(&result);
    result
}

pub fn build_orchestrator(settings: &ResolvedSettings) -> Orchestrator {
    let transport = Arc::new(ReqwestTransport::new(settings.timeout));
    let primary = JsonApiProvider::new(
        settings.primary_endpoint.clone(),
        JsonApiSettings {
            video_codec: settings.video_codec.clone(),
            audio_codec: settings.audio_codec.clone(),
            video_quality: settings.video_quality.clone(),
        },
    );
    let fallback = FormApiProvider::new(
        settings.fallback_endpoint.clone(),
        FormApiSettings {
            audio_format: settings.audio_format,
            video_format: settings.video_format,
        },
    );
    Orchestrator::new(transport, Box::new(primary), Box::new(fallback))
        .with_attempt_timeout(settings.timeout)
}
