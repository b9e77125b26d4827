//! Tiered Musixmatch lookup
//!
//! A query goes through up to three lookups, in order, and the first one
//! that yields synced or plain lyrics wins:
//! 1. `macro.subtitles.get` with the parsed artist and title (needs an artist)
//! 2. `track.search` with the raw query, then `track.subtitle.get` for the top hit
//! 3. `macro.subtitles.get` with the title alone

use crate::error::LyricsError;
use crate::lyrics::{LyricsResult, ParsedQuery, Source, SubtitleLine, TrackInfo, parser, query, subtitles};
use crate::musixmatch::api::MusixmatchApi;
use crate::musixmatch::models::MxmTrack;
use crate::musixmatch::session::SessionManager;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    ArtistTitle,
    Search,
    TitleOnly,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::ArtistTitle => "artist+title lookup",
            Tier::Search => "track search",
            Tier::TitleOnly => "title-only lookup",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct LyricsResolver {
    api: Arc<dyn MusixmatchApi>,
    session: SessionManager,
}

impl LyricsResolver {
    pub fn new(api: Arc<dyn MusixmatchApi>, session: SessionManager) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Find lyrics for a free-text query.
    ///
    /// `Ok(None)` means nothing was found. `Upstream` is only returned when
    /// every attempted tier failed; a tier that fails is otherwise treated as
    /// having found nothing.
    pub async fn resolve(&self, raw: &str) -> Result<Option<LyricsResult>, LyricsError> {
        let parsed = query::parse(raw);
        if parsed.is_empty() {
            debug!("query {:?} has nothing searchable", raw);
            return Ok(None);
        }

        let token = self.session.token().await?;

        let tiers: &[Tier] = if parsed.artist.is_some() {
            &[Tier::ArtistTitle, Tier::Search, Tier::TitleOnly]
        } else {
            &[Tier::Search, Tier::TitleOnly]
        };

        let mut failures = Vec::new();
        for &tier in tiers {
            match self.run_tier(tier, raw.trim(), &parsed, &token).await {
                Ok(Some(result)) => {
                    info!("lyrics for {:?} found by {}", raw, tier);
                    return Ok(Some(result));
                }
                Ok(None) => debug!("{} found nothing for {:?}", tier, raw),
                Err(e) => {
                    debug!("{} failed for {:?}: {:#}", tier, raw, e);
                    failures.push(format!("{}: {:#}", tier, e));
                }
            }
        }

        if failures.len() == tiers.len() {
            warn!("every musixmatch lookup failed for {:?}", raw);
            return Err(LyricsError::Upstream(failures.join("; ")));
        }
        info!("no musixmatch lyrics for {:?}", raw);
        Ok(None)
    }

    async fn run_tier(
        &self,
        tier: Tier,
        raw: &str,
        parsed: &ParsedQuery,
        token: &str,
    ) -> anyhow::Result<Option<LyricsResult>> {
        match tier {
            Tier::ArtistTitle => {
                let artist = parsed.artist.as_deref().unwrap_or_default();
                let bundle = self.api.macro_lookup(artist, &parsed.title, token).await?;
                Ok(normalize(
                    bundle.lyrics_body.as_deref(),
                    bundle.subtitle_body.as_deref(),
                    bundle.track,
                    parsed,
                ))
            }
            Tier::Search => {
                let Some(track) = self.api.search_track(raw, token).await? else {
                    return Ok(None);
                };
                let body = self.api.track_subtitle(track.track_id, token).await?;
                // An LRC or plain body doubles as the lyrics text
                let text = body.as_deref().filter(|b| subtitles::decode(b).is_none());
                Ok(normalize(text, body.as_deref(), Some(track), parsed))
            }
            Tier::TitleOnly => {
                let bundle = self.api.macro_lookup("", &parsed.title, token).await?;
                Ok(normalize(
                    bundle.lyrics_body.as_deref(),
                    bundle.subtitle_body.as_deref(),
                    bundle.track,
                    parsed,
                ))
            }
        }
    }
}

/// Map one tier's raw payload into a [`LyricsResult`].
fn normalize(
    lyrics_body: Option<&str>,
    subtitle_body: Option<&str>,
    track: Option<MxmTrack>,
    parsed: &ParsedQuery,
) -> Option<LyricsResult> {
    let lines = subtitle_body.and_then(decode_subtitle_body);
    let plain = lyrics_body
        .map(subtitles::clean_lyrics)
        .filter(|t| !t.is_empty())
        .or_else(|| lines.as_deref().map(subtitles::flatten));
    LyricsResult::new(plain, lines, track_info(track, parsed), Source::Musixmatch)
}

/// `mxm` JSON from the macro call, LRC from `track.subtitle.get`.
fn decode_subtitle_body(body: &str) -> Option<Vec<SubtitleLine>> {
    subtitles::decode(body)
        .or_else(|| Some(parser::parse_lrc(body)))
        .filter(|l| !l.is_empty())
}

fn track_info(track: Option<MxmTrack>, parsed: &ParsedQuery) -> TrackInfo {
    let track = track.unwrap_or_default();
    TrackInfo {
        title: non_empty(track.track_name).unwrap_or_else(|| parsed.title.clone()),
        artist: non_empty(track.artist_name)
            .or_else(|| parsed.artist.clone())
            .unwrap_or_default(),
        artwork_url: track.album_coverart_350x350.and_then(non_empty),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}
