//! Musixmatch `mxm` subtitle decoding and plain-text cleanup
//!
//! The `mxm` subtitle body is a JSON array serialized into a string:
//! [{"text": "First line", "time": {"total": 12.34, "minutes": 0, "seconds": 12, "hundredths": 34}}, ...]

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::SubtitleLine;

static TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d+:\d+(?:[.:]\d+)?\]").expect("valid timestamp regex"));

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    text: String,
    time: EntryTime,
}

#[derive(Debug, Deserialize)]
struct EntryTime {
    /// Seconds from the start of the track
    total: f64,
}

/// Decode an `mxm` subtitle body.
///
/// Returns `None` when the payload is not a well-formed entry array; callers
/// treat that as "no synced lyrics".
pub fn decode(payload: &str) -> Option<Vec<SubtitleLine>> {
    let entries: Vec<Entry> = serde_json::from_str(payload).ok()?;
    Some(
        entries
            .into_iter()
            .map(|e| {
                let ms = (e.time.total * 1000.0).round().max(0.0) as u64;
                SubtitleLine::new(ms, e.text)
            })
            .collect(),
    )
}

/// Strip `[mm:ss]`, `[mm:ss.xx]` and `[mm:ss:xx]` markers, trim every line
/// and drop blank ones.
pub fn clean_lyrics(text: &str) -> String {
    TIMESTAMP
        .replace_all(text, "")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join line texts in order, one per line. Instrumental gaps (empty text)
/// are left out, so the result matches [`clean_lyrics`] of the same LRC.
pub fn flatten(lines: &[SubtitleLine]) -> String {
    lines
        .iter()
        .map(|l| l.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"[
        {"text": "First things first", "time": {"total": 0.5, "minutes": 0, "seconds": 0, "hundredths": 50}},
        {"text": "I'ma say all the words inside my head", "time": {"total": 2.84, "minutes": 0, "seconds": 2, "hundredths": 84}},
        {"text": "I'm fired up and tired", "time": {"total": 6.1, "minutes": 0, "seconds": 6, "hundredths": 10}}
    ]"#;

    #[test]
    fn test_decode() {
        let lines = decode(PAYLOAD).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], SubtitleLine::new(500, "First things first"));
        assert_eq!(lines[1].offset_ms, 2840);
        assert_eq!(lines[2].offset_ms, 6100);
        assert!(lines.windows(2).all(|w| w[0].offset_ms <= w[1].offset_ms));
    }

    #[test]
    fn test_decode_malformed() {
        assert!(decode("[{\"text\": \"cut off").is_none());
        assert!(decode("[00:01.00] not json").is_none());
        assert!(decode("{\"text\": \"object\"}").is_none());
    }

    #[test]
    fn test_decode_empty_array() {
        assert_eq!(decode("[]"), Some(vec![]));
    }

    #[test]
    fn test_flatten_matches_cleaned_plain_text() {
        let lines = decode(PAYLOAD).unwrap();
        let lrc = "[00:00.50] First things first\n\n[00:02.84] I'ma say all the words inside my head\n[00:06.10] I'm fired up and tired\n";
        assert_eq!(flatten(&lines), clean_lyrics(lrc));
    }

    #[test]
    fn test_clean_lyrics() {
        let raw = "  First line  \n\n   \n[00:12.34]Second line\r\nThird";
        assert_eq!(clean_lyrics(raw), "First line\nSecond line\nThird");
        assert_eq!(clean_lyrics("[00:01] One\n[00:02:50]Two"), "One\nTwo");
        assert_eq!(clean_lyrics("no markers here"), "no markers here");
    }

    #[test]
    fn test_flatten_skips_instrumental_gaps() {
        let lines = vec![
            SubtitleLine::new(1000, "First"),
            SubtitleLine::new(5000, ""),
            SubtitleLine::new(9000, "Second"),
        ];
        assert_eq!(flatten(&lines), "First\nSecond");
        assert_eq!(flatten(&lines), clean_lyrics("[00:01.00] First\n[00:05.00]\n[00:09.00] Second"));
    }
}
