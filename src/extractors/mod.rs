use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

pub mod youtube;

use crate::{FlashcardError, Result};

/// Title and transcript of a single video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoTranscript {
    /// Video title, used for the output filename
    pub title: String,

    /// Full transcript as one whitespace-normalized string
    pub transcript: String,
}

/// Trait for fetching transcripts from a video platform
///
/// Implementations fail with [`FlashcardError::InvalidLocator`] when the locator
/// cannot name a video and [`FlashcardError::NoTranscriptAvailable`] when the
/// video exists but has no usable transcript.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch title and transcript for a video
    async fn fetch(&self, locator: &str) -> Result<VideoTranscript>;

    /// Get the name of this platform
    fn platform_name(&self) -> &'static str;
}

const VIDEO_ID_LEN: usize = 11;

/// Extract the YouTube video id from a URL or a bare id
pub fn parse_video_id(locator: &str) -> std::result::Result<String, FlashcardError> {
    let locator = locator.trim();
    let invalid = || FlashcardError::InvalidLocator(locator.to_string());

    if is_video_id(locator) {
        return Ok(locator.to_string());
    }

    let parsed = Url::parse(locator).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid());
    }

    let host = parsed.host_str().ok_or_else(invalid)?.to_lowercase();
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(&host);

    let mut segments = parsed.path_segments().into_iter().flatten();
    let candidate = match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "youtube-nocookie.com" => match segments.next() {
            Some("watch") => parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("embed") | Some("shorts") | Some("v") | Some("live") => {
                segments.next().map(str::to_string)
            }
            _ => None,
        },
        _ => None,
    };

    candidate.filter(|id| is_video_id(id)).ok_or_else(invalid)
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Normalize transcript text: drop caption noise and collapse whitespace
pub fn clean_text(text: &str) -> String {
    text.replace("[Music]", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_id_url_forms() {
        let id = "jIhkYHycv4M";
        for url in [
            "https://www.youtube.com/watch?v=jIhkYHycv4M",
            "https://youtube.com/watch?feature=shared&v=jIhkYHycv4M",
            "http://m.youtube.com/watch?v=jIhkYHycv4M",
            "https://youtu.be/jIhkYHycv4M?feature=shared",
            "https://www.youtube.com/embed/jIhkYHycv4M",
            "https://www.youtube.com/shorts/jIhkYHycv4M",
            "jIhkYHycv4M",
        ] {
            assert_eq!(parse_video_id(url).unwrap(), id, "locator: {url}");
        }
    }

    #[test]
    fn test_parse_video_id_rejects_garbage() {
        for locator in [
            "",
            "not-a-url",
            "https://vimeo.com/123456",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/channel/UC123",
            "ftp://youtube.com/watch?v=jIhkYHycv4M",
        ] {
            assert!(
                matches!(parse_video_id(locator), Err(FlashcardError::InvalidLocator(_))),
                "locator: {locator}"
            );
        }
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("hello\u{a0}world\n[Music]  again "), "hello world again");
        assert_eq!(clean_text("   "), "");
    }
}
