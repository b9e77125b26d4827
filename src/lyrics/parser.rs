//! LRC format parser
//!
//! Parses synchronized lyrics in LRC format:
//! [mm:ss.xx] Lyrics line here
//!
//! Example:
//! [00:12.34] Hello world
//! [00:15.00] Another line

use super::SubtitleLine;

/// Parse LRC text into timed lines, ordered by offset.
///
/// Metadata tags (`[ti:...]`, `[ar:...]`) and lines without a timestamp are
/// skipped. A line carrying several timestamps yields one entry per timestamp.
pub fn parse_lrc(content: &str) -> Vec<SubtitleLine> {
    let mut lines = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || is_metadata(line) {
            continue;
        }
        if let Some(parsed) = parse_timed_line(line) {
            lines.extend(parsed);
        }
    }

    // Stable, so repeated timestamps keep file order
    lines.sort_by_key(|l| l.offset_ms);
    lines
}

/// Metadata tag like [ti:Title]
fn is_metadata(line: &str) -> bool {
    let Some(end) = line.find(']') else {
        return false;
    };
    if !line.starts_with('[') {
        return false;
    }
    let tag_content = &line[1..end];
    match tag_content.find(':') {
        Some(colon) => {
            let tag = &tag_content[..colon];
            tag.len() <= 3 && !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

/// Timed line like [00:12.34]Lyrics or [00:12.34][00:15.00]Lyrics
fn parse_timed_line(line: &str) -> Option<Vec<SubtitleLine>> {
    let mut timestamps = Vec::new();
    let mut pos = 0;

    while line[pos..].starts_with('[') {
        let Some(end) = line[pos..].find(']') else {
            break;
        };
        match parse_timestamp(&line[pos + 1..pos + end]) {
            Some(ms) => {
                timestamps.push(ms);
                pos += end + 1;
            }
            None => break,
        }
    }

    if timestamps.is_empty() {
        return None;
    }

    let text = line[pos..].trim();
    Some(
        timestamps
            .into_iter()
            .map(|ts| SubtitleLine::new(ts, text))
            .collect(),
    )
}

/// Timestamp like "00:12.34", "00:12:34" or "00:12" to milliseconds
fn parse_timestamp(s: &str) -> Option<u64> {
    let parts: Vec<&str> = s.split([':', '.']).collect();

    let (min, sec, frac) = match parts.as_slice() {
        [m, s] => (*m, *s, None),
        [m, s, f] => (*m, *s, Some(*f)),
        _ => return None,
    };
    let min: u64 = min.parse().ok()?;
    let sec: u64 = sec.parse().ok()?;
    // "34" is centiseconds, "340" milliseconds
    let ms = match frac {
        None => 0,
        Some(f) => match f.len() {
            1 => f.parse::<u64>().ok()? * 100,
            2 => f.parse::<u64>().ok()? * 10,
            3 => f.parse().ok()?,
            _ => return None,
        },
    };
    min.checked_mul(60_000)?
        .checked_add(sec.checked_mul(1000)?)?
        .checked_add(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("00:12"), Some(12000));
        assert_eq!(parse_timestamp("01:30"), Some(90000));
        assert_eq!(parse_timestamp("00:12.34"), Some(12340));
        assert_eq!(parse_timestamp("00:12.340"), Some(12340));
        assert_eq!(parse_timestamp("00:12:34"), Some(12340));
        assert_eq!(parse_timestamp("ti:Song"), None);
    }

    #[test]
    fn test_huge_timestamp_is_skipped() {
        assert_eq!(parse_timestamp("999999999999999999:00.00"), None);
        let lines = parse_lrc("[999999999999999999:00.00] boom\n[00:01.00] ok");
        assert_eq!(lines, vec![SubtitleLine::new(1000, "ok")]);
    }

    #[test]
    fn test_parse_lrc() {
        let lrc = r#"
[ti:Believer]
[ar:Imagine Dragons]
[00:15.00]Second line
[00:12.34]First line
plain line without time
"#;
        let lines = parse_lrc(lrc);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], SubtitleLine::new(12340, "First line"));
        assert_eq!(lines[1].text, "Second line");
    }

    #[test]
    fn test_repeated_timestamps() {
        let lines = parse_lrc("[00:01.00][00:20.00]Chorus\n[00:10.00]Verse");
        let offsets: Vec<u64> = lines.iter().map(|l| l.offset_ms).collect();
        assert_eq!(offsets, vec![1000, 10000, 20000]);
        assert_eq!(lines[2].text, "Chorus");
    }
}
