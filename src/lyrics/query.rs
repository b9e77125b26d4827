//! Free-text query splitting
//!
//! Turns a search string like `Imagine Dragons - Believer (Official Video)`
//! into an optional artist and a title.

use once_cell::sync::Lazy;
use regex::Regex;

static NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:official\s+music\s+video|official\s+video|official\s+audio|lyric\s+video|lyrics|vevo)\b",
    )
    .expect("valid noise regex")
});

static EMPTY_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*\)|\[\s*\]").expect("valid bracket regex"));

static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s*[-–—~]\s*(.+)$").expect("valid separator regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub artist: Option<String>,
    pub title: String,
}

impl ParsedQuery {
    /// True when nothing searchable survived cleaning.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
    }
}

/// Split a raw query into artist and title.
///
/// A dash/tilde separator wins. Without one, the last word is taken as the
/// title and everything before it as the artist, which is wrong for
/// multi-word titles but is only a best-effort guess.
pub fn parse(raw: &str) -> ParsedQuery {
    let cleaned = clean(raw);

    if let Some(caps) = SEPARATOR.captures(&cleaned) {
        let artist = caps[1].trim();
        let title = caps[2].trim();
        // "- Believer" has a separator but no artist
        if artist.is_empty() {
            return ParsedQuery {
                artist: None,
                title: title.to_string(),
            };
        }
        if !title.is_empty() {
            return ParsedQuery {
                artist: Some(artist.to_string()),
                title: title.to_string(),
            };
        }
    }

    if let Some(idx) = cleaned.rfind(' ') {
        return ParsedQuery {
            artist: Some(cleaned[..idx].trim().to_string()),
            title: cleaned[idx + 1..].trim().to_string(),
        };
    }

    ParsedQuery {
        artist: None,
        title: cleaned,
    }
}

fn clean(raw: &str) -> String {
    let without_noise = NOISE.replace_all(raw, "");
    let without_brackets = EMPTY_BRACKETS.replace_all(&without_noise, "");
    without_brackets.split_whitespace().collect::<Vec<_>>().join(" ")
}
