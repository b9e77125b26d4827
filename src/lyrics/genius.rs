//! Genius API client
//!
//! Genius does not serve lyrics through its API; this only finds the song
//! page URL. Requests need an access token from https://genius.com/api-clients.

use anyhow::Context;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.genius.com";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: T,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    result: GeniusSong,
}

#[derive(Debug, Deserialize)]
struct SongBody {
    song: GeniusSong,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeniusSong {
    pub id: u64,
    #[serde(default)]
    pub full_title: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct GeniusClient {
    client: reqwest::Client,
}

impl GeniusClient {
    pub fn new(access_token: &str, timeout: Duration) -> anyhow::Result<Self> {
        if access_token.is_empty() {
            anyhow::bail!("genius access token not set (genius.access_token in config)");
        }
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", access_token)).context("genius auth header")?,
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("build genius client")?;
        Ok(Self { client })
    }

    /// Search songs, best match first.
    pub async fn search(&self, query: &str) -> anyhow::Result<Vec<GeniusSong>> {
        let url = format!("{}/search?q={}", BASE_URL, urlencoding::encode(query));
        let v: Envelope<SearchBody> = self.get_json(&url).await.context("genius search")?;
        Ok(v.response.hits.into_iter().map(|h| h.result).collect())
    }

    /// Lyrics page URL for a song id.
    pub async fn lyrics_url(&self, song_id: u64) -> anyhow::Result<String> {
        let url = format!("{}/songs/{}", BASE_URL, song_id);
        let v: Envelope<SongBody> = self.get_json(&url).await.context("genius song")?;
        Ok(v.response.song.url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> anyhow::Result<T> {
        let response = self.client.get(url).send().await.context("send genius request")?;
        if !response.status().is_success() {
            anyhow::bail!("Genius API error: {}", response.status());
        }
        response.json().await.context("parse genius json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_body() {
        let raw = r#"{"meta": {"status": 200}, "response": {"hits": [
            {"type": "song", "result": {"id": 3047, "full_title": "Believer by Imagine Dragons",
             "url": "https://genius.com/Imagine-dragons-believer-lyrics"}}
        ]}}"#;
        let v: Envelope<SearchBody> = serde_json::from_str(raw).unwrap();
        assert_eq!(v.response.hits.len(), 1);
        assert_eq!(v.response.hits[0].result.id, 3047);
    }

    #[test]
    fn test_missing_token() {
        assert!(GeniusClient::new("", Duration::from_secs(1)).is_err());
    }
}
