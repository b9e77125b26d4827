//! lyrics.ovh client: plain lyrics by exact artist and title

use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

use super::{LyricsResult, Source, TrackInfo, subtitles};

const BASE_URL: &str = "https://api.lyrics.ovh/v1";

#[derive(Debug, Deserialize)]
struct OvhResponse {
    #[serde(default)]
    lyrics: String,
}

#[derive(Debug, Clone)]
pub struct OvhClient {
    client: reqwest::Client,
    base_url: String,
}

impl OvhClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        Self::with_base_url(BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build lyrics.ovh client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn get_lyrics(&self, artist: &str, title: &str) -> anyhow::Result<Option<LyricsResult>> {
        let url = format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        );

        let response = self.client.get(&url).send().await.context("send lyrics.ovh request")?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            anyhow::bail!("lyrics.ovh API error: {}", response.status());
        }

        let body: OvhResponse = response.json().await.context("parse lyrics.ovh json")?;
        Ok(into_result(body, artist, title))
    }
}

fn into_result(body: OvhResponse, artist: &str, title: &str) -> Option<LyricsResult> {
    LyricsResult::new(
        Some(subtitles::clean_lyrics(&body.lyrics)),
        None,
        TrackInfo {
            title: title.to_string(),
            artist: artist.to_string(),
            artwork_url: None,
        },
        Source::LyricsOvh,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_result() {
        let body: OvhResponse =
            serde_json::from_str(r#"{"lyrics": "Paroles de la chanson\r\nFirst line\r\n\r\nSecond line"}"#).unwrap();
        let result = into_result(body, "Queen", "Bohemian Rhapsody").unwrap();
        assert_eq!(result.source, Source::LyricsOvh);
        assert_eq!(
            result.plain_text.as_deref(),
            Some("Paroles de la chanson\nFirst line\nSecond line")
        );
        assert!(!result.is_synced());
    }

    #[test]
    fn test_empty_lyrics() {
        let body: OvhResponse = serde_json::from_str(r#"{"lyrics": ""}"#).unwrap();
        assert!(into_result(body, "a", "b").is_none());
    }
}
