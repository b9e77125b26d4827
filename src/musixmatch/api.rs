use crate::musixmatch::models::{MacroBundle, MxmTrack};
use crate::musixmatch::session::TokenSource;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://apic-desktop.musixmatch.com/ws/1.1";
const APP_ID: &str = "web-desktop-app-v1.0";

/// Remote lookups the resolver needs. Implemented over HTTP by
/// [`MusixmatchClient`]; tests substitute in-memory fakes.
#[async_trait]
pub trait MusixmatchApi: Send + Sync {
    /// `macro.subtitles.get`: matcher, plain lyrics and synced subtitles in one call.
    async fn macro_lookup(&self, artist: &str, title: &str, token: &str) -> anyhow::Result<MacroBundle>;

    /// `track.search`: top-ranked track for a free-text query.
    async fn search_track(&self, query: &str, token: &str) -> anyhow::Result<Option<MxmTrack>>;

    /// `track.subtitle.get`: LRC subtitle body for one track.
    async fn track_subtitle(&self, track_id: u64, token: &str) -> anyhow::Result<Option<String>>;
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Clone)]
pub struct MusixmatchClient {
    inner: Arc<Inner>,
}

impl MusixmatchClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Musixmatch/3.14.4564-master.20200505002 Chrome/78.0.3904.130 Electron/7.1.5 Safari/537.36"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        // Musixmatch ties the token to the session cookies set by token.get
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .context("build reqwest client")?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    fn url(&self, method: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}/{}?app_id={}", self.inner.base_url, method, APP_ID);
        for (k, v) in params {
            url.push_str(&format!("&{}={}", k, urlencoding::encode(v)));
        }
        url
    }

    async fn get_json(&self, url: &str, what: &str) -> anyhow::Result<Value> {
        debug!("musixmatch {}", what);
        let v: Value = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("send {} request", what))?
            .error_for_status()
            .with_context(|| format!("{} http status", what))?
            .json()
            .await
            .with_context(|| format!("parse {} json", what))?;
        Ok(v)
    }
}

#[async_trait]
impl TokenSource for MusixmatchClient {
    async fn fetch_token(&self) -> anyhow::Result<String> {
        let v = self.get_json(&self.url("token.get", &[]), "token.get").await?;
        extract_token(&v)
    }
}

#[async_trait]
impl MusixmatchApi for MusixmatchClient {
    async fn macro_lookup(&self, artist: &str, title: &str, token: &str) -> anyhow::Result<MacroBundle> {
        let url = self.url(
            "macro.subtitles.get",
            &[
                ("format", "json"),
                ("namespace", "lyrics_richsynched"),
                ("subtitle_format", "mxm"),
                ("q_artist", artist),
                ("q_track", title),
                ("usertoken", token),
            ],
        );
        let v = self.get_json(&url, "macro.subtitles.get").await?;
        extract_macro(&v)
    }

    async fn search_track(&self, query: &str, token: &str) -> anyhow::Result<Option<MxmTrack>> {
        let url = self.url(
            "track.search",
            &[
                ("page_size", "3"),
                ("page", "1"),
                ("s_track_rating", "desc"),
                ("q_track", query),
                ("usertoken", token),
            ],
        );
        let v = self.get_json(&url, "track.search").await?;
        extract_top_track(&v)
    }

    async fn track_subtitle(&self, track_id: u64, token: &str) -> anyhow::Result<Option<String>> {
        let id = track_id.to_string();
        let url = self.url(
            "track.subtitle.get",
            &[("subtitle_format", "lrc"), ("track_id", &id), ("usertoken", token)],
        );
        let v = self.get_json(&url, "track.subtitle.get").await?;
        extract_subtitle(&v)
    }
}

fn status_code(v: &Value) -> Option<u64> {
    v.pointer("/message/header/status_code").and_then(Value::as_u64)
}

fn ensure_ok(v: &Value, what: &str) -> anyhow::Result<()> {
    match status_code(v) {
        Some(200) => Ok(()),
        code => {
            let hint = v
                .pointer("/message/header/hint")
                .and_then(Value::as_str)
                .unwrap_or("no hint");
            anyhow::bail!("{} returned status {:?} ({})", what, code, hint)
        }
    }
}

fn non_empty_str(v: &Value, pointer: &str) -> Option<String> {
    v.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn extract_token(v: &Value) -> anyhow::Result<String> {
    ensure_ok(v, "token.get")?;
    non_empty_str(v, "/message/body/user_token").context("token.get response has no user_token")
}

fn extract_macro(v: &Value) -> anyhow::Result<MacroBundle> {
    ensure_ok(v, "macro.subtitles.get")?;
    let calls = v
        .pointer("/message/body/macro_calls")
        .context("macro.subtitles.get response has no macro_calls")?;

    // Failed sub-calls come back with an empty list as body, so every path is optional
    let track = calls
        .pointer("/matcher.track.get/message/body/track")
        .cloned()
        .and_then(|t| serde_json::from_value::<MxmTrack>(t).ok());

    Ok(MacroBundle {
        track,
        lyrics_body: non_empty_str(calls, "/track.lyrics.get/message/body/lyrics/lyrics_body"),
        subtitle_body: non_empty_str(
            calls,
            "/track.subtitles.get/message/body/subtitle_list/0/subtitle/subtitle_body",
        ),
    })
}

fn extract_top_track(v: &Value) -> anyhow::Result<Option<MxmTrack>> {
    ensure_ok(v, "track.search")?;
    match v.pointer("/message/body/track_list/0/track") {
        Some(t) => Ok(Some(
            serde_json::from_value(t.clone()).context("decode track.search track")?,
        )),
        None => Ok(None),
    }
}

fn extract_subtitle(v: &Value) -> anyhow::Result<Option<String>> {
    if status_code(v) == Some(404) {
        return Ok(None);
    }
    ensure_ok(v, "track.subtitle.get")?;
    Ok(non_empty_str(v, "/message/body/subtitle/subtitle_body"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_token() {
        let v = json!({"message": {"header": {"status_code": 200}, "body": {"user_token": "abc123"}}});
        assert_eq!(extract_token(&v).unwrap(), "abc123");

        let v = json!({"message": {"header": {"status_code": 401, "hint": "captcha"}, "body": ""}});
        let err = extract_token(&v).unwrap_err().to_string();
        assert!(err.contains("captcha"));
    }

    #[test]
    fn test_extract_macro() {
        let v = json!({"message": {"header": {"status_code": 200}, "body": {"macro_calls": {
            "matcher.track.get": {"message": {"header": {"status_code": 200}, "body": {"track": {
                "track_id": 123, "track_name": "Believer", "artist_name": "Imagine Dragons",
                "album_coverart_350x350": "https://example.com/art.jpg"
            }}}},
            "track.lyrics.get": {"message": {"header": {"status_code": 200}, "body": {"lyrics": {
                "lyrics_body": "First things first\nI'ma say all the words"
            }}}},
            "track.subtitles.get": {"message": {"header": {"status_code": 200}, "body": {"subtitle_list": [
                {"subtitle": {"subtitle_body": "[{\"text\":\"First things first\",\"time\":{\"total\":0.5}}]"}}
            ]}}}
        }}}});
        let bundle = extract_macro(&v).unwrap();
        let track = bundle.track.unwrap();
        assert_eq!(track.track_id, 123);
        assert_eq!(track.artist_name, "Imagine Dragons");
        assert!(bundle.lyrics_body.unwrap().starts_with("First things first"));
        assert!(bundle.subtitle_body.is_some());
    }

    #[test]
    fn test_extract_macro_failed_subcalls() {
        let v = json!({"message": {"header": {"status_code": 200}, "body": {"macro_calls": {
            "matcher.track.get": {"message": {"header": {"status_code": 404}, "body": []}},
            "track.lyrics.get": {"message": {"header": {"status_code": 404}, "body": []}},
            "track.subtitles.get": {"message": {"header": {"status_code": 404}, "body": []}}
        }}}});
        let bundle = extract_macro(&v).unwrap();
        assert!(bundle.track.is_none());
        assert!(bundle.lyrics_body.is_none());
        assert!(bundle.subtitle_body.is_none());
    }

    #[test]
    fn test_extract_top_track() {
        let v = json!({"message": {"header": {"status_code": 200}, "body": {"track_list": [
            {"track": {"track_id": 1, "track_name": "First", "artist_name": "A"}},
            {"track": {"track_id": 2, "track_name": "Second", "artist_name": "B"}}
        ]}}});
        assert_eq!(extract_top_track(&v).unwrap().unwrap().track_id, 1);

        let empty = json!({"message": {"header": {"status_code": 200}, "body": {"track_list": []}}});
        assert!(extract_top_track(&empty).unwrap().is_none());
    }

    #[test]
    fn test_extract_subtitle() {
        let v = json!({"message": {"header": {"status_code": 200}, "body": {"subtitle": {
            "subtitle_body": "[00:00.50] First things first"
        }}}});
        assert_eq!(extract_subtitle(&v).unwrap().as_deref(), Some("[00:00.50] First things first"));

        let missing = json!({"message": {"header": {"status_code": 404}, "body": ""}});
        assert!(extract_subtitle(&missing).unwrap().is_none());

        let denied = json!({"message": {"header": {"status_code": 401}, "body": ""}});
        assert!(extract_subtitle(&denied).is_err());
    }

    #[test]
    fn test_url_encodes_params() {
        let client = MusixmatchClient::new(DEFAULT_BASE_URL, Duration::from_secs(1)).unwrap();
        let url = client.url("track.search", &[("q_track", "AC/DC - T.N.T.")]);
        assert_eq!(
            url,
            "https://apic-desktop.musixmatch.com/ws/1.1/track.search?app_id=web-desktop-app-v1.0&q_track=AC%2FDC%20-%20T.N.T."
        );
    }
}
