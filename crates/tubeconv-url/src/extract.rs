use tubeconv_core::{ConvertError, ConvertResult};
use url::Url;

pub fn extract_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let url = if has_http_scheme(input) {
        Url::parse(input)
    } else {
        Url::parse(&format!("https://{input}"))
    }
    .ok()?;

    if let Some((_, value)) = url.query_pairs().find(|(key, _)| key == "v")
        && !value.is_empty()
    {
        return is_video_id(&value).then(|| value.to_string());
    }

    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let segment = if is_youtube_host(url.host_str()?) {
        // youtube.com paths only carry an id under these routes;
        // /playlist, /results, /channel/<id> and friends do not.
        match segments.as_slice() {
            [route, id] if ID_ROUTES.contains(&route.to_ascii_lowercase().as_str()) => *id,
            _ => return None,
        }
    } else {
        *segments.last()?
    };
    is_video_id(segment).then(|| segment.to_string())
}

pub fn resolve_id(input: &str) -> ConvertResult<String> {
    extract_id(input).ok_or_else(|| ConvertError::UnresolvableIdentifier(input.trim().to_string()))
}

const ID_ROUTES: [&str; 5] = ["shorts", "embed", "live", "v", "e"];

fn has_http_scheme(input: &str) -> bool {
    let lower = input.get(..8).unwrap_or(input).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn is_youtube_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "youtube.com" || host.ends_with(".youtube.com")
}

fn is_video_id(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
