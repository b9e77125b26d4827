//! Splitting lyrics into display pages

/// Default page size in characters
pub const DEFAULT_PAGE_CHARS: usize = 1000;

/// Split lyrics text into pages of at most `max_chars` characters.
///
/// Line endings are normalized and blank lines dropped. Lines are packed
/// greedily; a single line longer than `max_chars` gets a page of its own.
pub fn paginate(text: &str, max_chars: usize) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.is_empty() {
        return Vec::new();
    }

    let joined = lines.join("\n");
    if joined.chars().count() <= max_chars {
        return vec![joined];
    }

    let mut pages = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in lines {
        let line_len = line.chars().count();
        if current_len > 0 && current_len + line_len + 1 > max_chars {
            pages.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        pages.push(current);
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_page() {
        let pages = paginate("First\r\n\r\n  Second  \rThird", 100);
        assert_eq!(pages, vec!["First\nSecond\nThird".to_string()]);
    }

    #[test]
    fn test_empty_text() {
        assert!(paginate("  \n\n ", 100).is_empty());
    }

    #[test]
    fn test_pages_respect_limit() {
        let text = (0..50).map(|i| format!("line number {i}")).collect::<Vec<_>>().join("\n");
        let pages = paginate(&text, 100);
        assert!(pages.len() > 1);
        assert!(pages.iter().all(|p| p.chars().count() <= 100));
        assert_eq!(pages.join("\n"), text);
    }

    #[test]
    fn test_overlong_line_gets_own_page() {
        let long = "x".repeat(30);
        let pages = paginate(&format!("a\n{long}\nb"), 10);
        assert_eq!(pages, vec!["a".to_string(), long, "b".to_string()]);
    }
}
