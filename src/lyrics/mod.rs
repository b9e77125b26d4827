//! Provider-independent lyrics types and helpers
//!
//! This module provides:
//! - The normalized `LyricsResult` every provider is mapped into
//! - Query parsing for free-text "artist - title" searches
//! - Musixmatch subtitle decoding and LRC parsing
//! - Auxiliary providers (LRCLIB, lyrics.ovh, Genius)
//! - Pagination of lyrics text for display

pub mod genius;
pub mod lrclib;
pub mod ovh;
pub mod pages;
pub mod parser;
pub mod query;
pub mod subtitles;

use std::fmt;

pub use lrclib::LrclibClient;
pub use query::ParsedQuery;

/// One time-synced lyrics line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleLine {
    /// Offset from the start of the track in milliseconds
    pub offset_ms: u64,
    pub text: String,
}

impl SubtitleLine {
    pub fn new(offset_ms: u64, text: impl Into<String>) -> Self {
        Self {
            offset_ms,
            text: text.into(),
        }
    }

    /// LRC timestamp tag, e.g. `[01:02.34]`.
    pub fn lrc_tag(&self) -> String {
        let minutes = self.offset_ms / 60_000;
        let seconds = (self.offset_ms % 60_000) / 1000;
        let hundredths = (self.offset_ms % 1000) / 10;
        format!("[{:02}:{:02}.{:02}]", minutes, seconds, hundredths)
    }
}

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Musixmatch,
    Lrclib,
    LyricsOvh,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Musixmatch => "Musixmatch",
            Source::Lrclib => "LRCLIB",
            Source::LyricsOvh => "lyrics.ovh",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub title: String,
    pub artist: String,
    pub artwork_url: Option<String>,
}

/// Normalized lyrics, whatever the provider.
#[derive(Debug, Clone)]
pub struct LyricsResult {
    pub plain_text: Option<String>,
    pub lines: Option<Vec<SubtitleLine>>,
    pub track: TrackInfo,
    pub source: Source,
}

impl LyricsResult {
    /// Build a result, returning `None` when there is neither plain text nor
    /// synced lines. Empty text and empty line lists count as absent.
    pub fn new(
        plain_text: Option<String>,
        lines: Option<Vec<SubtitleLine>>,
        track: TrackInfo,
        source: Source,
    ) -> Option<Self> {
        let plain_text = plain_text.filter(|t| !t.trim().is_empty());
        let lines = lines.filter(|l| !l.is_empty());
        if plain_text.is_none() && lines.is_none() {
            return None;
        }
        Some(Self {
            plain_text,
            lines,
            track,
            source,
        })
    }

    pub fn is_synced(&self) -> bool {
        self.lines.is_some()
    }

    /// Plain text, or the synced lines flattened when there is none.
    pub fn text(&self) -> String {
        match (&self.plain_text, &self.lines) {
            (Some(text), _) => text.clone(),
            (None, Some(lines)) => subtitles::flatten(lines),
            (None, None) => String::new(),
        }
    }

    /// Synced lines rendered as LRC.
    pub fn to_lrc(&self) -> Option<String> {
        let lines = self.lines.as_ref()?;
        Some(
            lines
                .iter()
                .map(|l| format!("{} {}", l.lrc_tag(), l.text))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}
