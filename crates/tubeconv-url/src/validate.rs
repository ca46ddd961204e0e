use regex::Regex;
use tubeconv_core::{ConvertError, ConvertResult};

const YOUTUBE_URL_PATTERN: &str =
    r"(?i)^(?:https?://)?(?:(?:www|m|music)\.)?(?:youtube\.com|youtu\.be)/\S+$";

pub fn validate(input: &str) -> bool {
    let input = input.trim();
    if input.is_empty() {
        return false;
    }
    Regex::new(YOUTUBE_URL_PATTERN)
        .map(|regex| regex.is_match(input))
        .unwrap_or(false)
}

pub fn ensure_valid(input: &str) -> ConvertResult<()> {
    if validate(input) {
        Ok(())
    } else {
        Err(ConvertError::InvalidUrl(input.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_watch_and_short_urls() {
        assert!(validate("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(validate("http://youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(validate("https://youtu.be/dQw4w9WgXcQ"));
        assert!(validate("youtu.be/dQw4w9WgXcQ"));
        assert!(validate("www.youtube.com/shorts/abc123"));
        assert!(validate("https://m.youtube.com/watch?v=abc"));
        assert!(validate("  https://music.youtube.com/watch?v=abc  "));
    }

    #[test]
    fn rejects_other_hosts() {
        assert!(!validate("https://vimeo.com/12345"));
        assert!(!validate("https://open.spotify.com/track/4Km5HrUvYTaSUfiSGPJeQR"));
        assert!(!validate("https://notyoutube.com/watch?v=abc"));
        assert!(!validate("https://youtube.com.evil.example/watch?v=abc"));
        assert!(!validate("ftp://youtube.com/watch?v=abc"));
    }

    #[test]
    fn rejects_empty_and_malformed_input() {
        assert!(!validate(""));
        assert!(!validate("   "));
        assert!(!validate("not a url"));
        assert!(!validate("https://youtube.com"));
        assert!(!validate("https://youtube.com/"));
        assert!(!validate("https://youtu.be/ "));
    }

    #[test]
    fn ensure_valid_reports_invalid_url() {
        match ensure_valid("not a url") {
            Err(ConvertError::InvalidUrl(input)) => assert_eq!(input, "not a url"),
            _ => panic!("Expected InvalidUrl error"),
        }
        assert!(ensure_valid("https://youtu.be/dQw4w9WgXcQ").is_ok());
    }
}
