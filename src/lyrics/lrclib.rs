//! LRCLIB API client
//!
//! LRCLIB is a free lyrics API that provides synchronized (LRC format) lyrics.
//! API Documentation: https://lrclib.net/docs

use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

use super::{LyricsResult, Source, TrackInfo, parser, subtitles};

/// LRCLIB API response
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LrclibResponse {
    #[allow(dead_code)]
    pub id: i64,
    pub track_name: String,
    pub artist_name: String,
    #[allow(dead_code)]
    pub album_name: Option<String>,
    #[allow(dead_code)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub instrumental: bool,
    pub plain_lyrics: Option<String>,
    pub synced_lyrics: Option<String>,
}

impl LrclibResponse {
    pub fn into_result(self) -> Option<LyricsResult> {
        if self.instrumental {
            return None;
        }
        let lines = self
            .synced_lyrics
            .as_deref()
            .map(parser::parse_lrc)
            .filter(|l| !l.is_empty());
        let plain = self
            .plain_lyrics
            .as_deref()
            .map(subtitles::clean_lyrics)
            .filter(|t| !t.is_empty())
            .or_else(|| lines.as_deref().map(subtitles::flatten));
        LyricsResult::new(
            plain,
            lines,
            TrackInfo {
                title: self.track_name,
                artist: self.artist_name,
                artwork_url: None,
            },
            Source::Lrclib,
        )
    }
}

/// Lookup parameters for `/get` and `/get-cached`
#[derive(Debug, Clone, Default)]
pub struct LrclibQuery<'a> {
    pub track_name: &'a str,
    pub artist_name: &'a str,
    pub album_name: Option<&'a str>,
    pub duration_secs: Option<u32>,
}

/// LRCLIB API client
#[derive(Debug, Clone)]
pub struct LrclibClient {
    client: reqwest::Client,
    base_url: String,
}

impl LrclibClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://lrclib.net/api";
    const USER_AGENT: &'static str = concat!("mxlyrics/", env!("CARGO_PKG_VERSION"));

    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .timeout(timeout)
            .build()
            .context("build lrclib client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exact match, falling back to search. This is what the CLI uses.
    pub async fn find(&self, title: &str, artist: &str) -> anyhow::Result<Option<LyricsResult>> {
        let query = LrclibQuery {
            track_name: title,
            artist_name: artist,
            ..Default::default()
        };
        if let Some(hit) = self.get_lyrics(&query).await?
            && let Some(result) = hit.into_result()
        {
            return Ok(Some(result));
        }

        let results = self.search(title, artist).await?;
        // Prefer a result with synced lyrics
        let best = results
            .iter()
            .find(|r| r.synced_lyrics.is_some())
            .or_else(|| results.first());
        Ok(best.cloned().and_then(LrclibResponse::into_result))
    }

    /// `/get`: exact match, may hit external sources on the LRCLIB side
    pub async fn get_lyrics(&self, query: &LrclibQuery<'_>) -> anyhow::Result<Option<LrclibResponse>> {
        self.get_exact("get", query).await
    }

    /// `/get-cached`: exact match against LRCLIB's own database only
    pub async fn get_cached_lyrics(
        &self,
        query: &LrclibQuery<'_>,
    ) -> anyhow::Result<Option<LrclibResponse>> {
        self.get_exact("get-cached", query).await
    }

    async fn get_exact(
        &self,
        endpoint: &str,
        query: &LrclibQuery<'_>,
    ) -> anyhow::Result<Option<LrclibResponse>> {
        let mut url = format!(
            "{}/{}?track_name={}&artist_name={}",
            self.base_url,
            endpoint,
            urlencoding::encode(query.track_name),
            urlencoding::encode(query.artist_name)
        );

        if let Some(album) = query.album_name {
            url.push_str(&format!("&album_name={}", urlencoding::encode(album)));
        }

        if let Some(duration) = query.duration_secs {
            url.push_str(&format!("&duration={}", duration));
        }

        let response = self.client.get(&url).send().await.context("send lrclib request")?;

        if response.status().is_success() {
            let lyrics: LrclibResponse = response.json().await.context("parse lrclib json")?;
            Ok(Some(lyrics))
        } else if response.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            anyhow::bail!("LRCLIB API error: {}", response.status());
        }
    }

    /// `/search` by track and artist name, or by free text when `artist` is empty
    pub async fn search(&self, track_name: &str, artist_name: &str) -> anyhow::Result<Vec<LrclibResponse>> {
        let url = if artist_name.is_empty() {
            format!("{}/search?q={}", self.base_url, urlencoding::encode(track_name))
        } else {
            format!(
                "{}/search?track_name={}&artist_name={}",
                self.base_url,
                urlencoding::encode(track_name),
                urlencoding::encode(artist_name)
            )
        };

        let response = self.client.get(&url).send().await.context("send lrclib search")?;

        if response.status().is_success() {
            Ok(response.json().await.context("parse lrclib search json")?)
        } else if response.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(Vec::new())
        } else {
            anyhow::bail!("LRCLIB search error: {}", response.status());
        }
    }
}
