use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;

use super::{clean_text, parse_video_id, TranscriptSource, VideoTranscript};
use crate::{FlashcardError, Result};

const CAPTION_LANGUAGE: &str = "en";
const CAPTION_FORMAT: &str = "json3";

/// Subset of `yt-dlp --dump-json` we rely on
#[derive(Debug, Deserialize)]
struct VideoInfo {
    title: String,
    #[serde(default)]
    subtitles: HashMap<String, Vec<CaptionTrack>>,
    #[serde(default)]
    automatic_captions: HashMap<String, Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    ext: String,
    url: String,
}

/// YouTube timed-text document in `json3` format
#[derive(Debug, Deserialize)]
struct Json3Captions {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// YouTube transcript source using yt-dlp for metadata and caption URLs
pub struct YoutubeTranscriptSource {
    yt_dlp_path: String,
    client: reqwest::Client,
}

impl YoutubeTranscriptSource {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        crate::utils::check_command_available(&self.yt_dlp_path).await
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<VideoInfo> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--skip-download", "--no-playlist", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to run yt-dlp")?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        serde_json::from_slice(&output.stdout).context("Failed to parse yt-dlp output")
    }

    /// Download a caption track and flatten it into plain text
    async fn download_captions(&self, track_url: &str) -> Result<String> {
        tracing::debug!("Downloading captions from: {}", track_url);

        let response = self
            .client
            .get(track_url)
            .send()
            .await
            .context("Failed to download captions")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download captions: HTTP {}", response.status());
        }

        let captions: Json3Captions = response
            .json()
            .await
            .context("Failed to parse caption track")?;

        Ok(captions_to_text(&captions))
    }
}

/// Pick an English `json3` track, preferring uploaded subtitles over auto-generated ones
fn select_caption_track(info: &VideoInfo) -> Option<&CaptionTrack> {
    [&info.subtitles, &info.automatic_captions]
        .into_iter()
        .find_map(|tracks| {
            let exact = tracks.get(CAPTION_LANGUAGE);
            let regional = move || {
                let mut keys: Vec<&String> = tracks
                    .keys()
                    .filter(|key| key.starts_with(&format!("{CAPTION_LANGUAGE}-")))
                    .collect();
                keys.sort();
                keys.first().and_then(|key| tracks.get(*key))
            };

            exact
                .or_else(regional)
                .and_then(|formats| formats.iter().find(|track| track.ext == CAPTION_FORMAT))
        })
}

fn captions_to_text(captions: &Json3Captions) -> String {
    let raw = captions
        .events
        .iter()
        .map(|event| event.segs.iter().map(|seg| seg.utf8.as_str()).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");

    clean_text(&raw)
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    async fn fetch(&self, locator: &str) -> Result<VideoTranscript> {
        let video_id = parse_video_id(locator)?;
        let url = format!("https://www.youtube.com/watch?v={video_id}");

        if !self.check_availability().await {
            anyhow::bail!("yt-dlp is not available. Please install it: https://github.com/yt-dlp/yt-dlp");
        }

        let info = self.get_video_info(&url).await?;
        let track = select_caption_track(&info).ok_or(FlashcardError::NoTranscriptAvailable)?;

        let transcript = self.download_captions(&track.url).await?;
        if transcript.is_empty() {
            return Err(FlashcardError::NoTranscriptAvailable.into());
        }

        tracing::info!(
            "Fetched transcript for \"{}\" ({} characters)",
            info.title,
            transcript.len()
        );

        Ok(VideoTranscript {
            title: clean_text(&info.title),
            transcript,
        })
    }

    fn platform_name(&self) -> &'static str {
        "YouTube"
    }
}

impl Default for YoutubeTranscriptSource {
    fn default() -> Self {
        Self::new()
    }
}
