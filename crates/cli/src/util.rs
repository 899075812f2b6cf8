//! Shared utilities for CLI commands

use chrono::{DateTime, Utc};

/// Format a Unix-millisecond timestamp relative to `now` ("2 hours ago")
pub fn relative_time(ts_ms: i64, now: DateTime<Utc>) -> String {
    let Some(then) = DateTime::<Utc>::from_timestamp_millis(ts_ms) else {
        return "at an unknown time".to_string();
    };

    let seconds = (now - then).num_seconds();
    if seconds < 0 {
        return "in the future".to_string();
    }

    let (count, unit) = match seconds {
        0..=59 => (seconds, "second"),
        60..=3_599 => (seconds / 60, "minute"),
        3_600..=86_399 => (seconds / 3_600, "hour"),
        86_400..=604_799 => (seconds / 86_400, "day"),
        _ => (seconds / 604_800, "week"),
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("{} {}{} ago", count, unit, plural)
}

/// Format a Unix-millisecond timestamp as "2024-01-03 14:30"
pub fn absolute_time(ts_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "invalid date".to_string())
}

/// Flatten an upstream HTML fragment into terminal text
///
/// Paragraph and line breaks become newlines, every other tag is dropped and
/// the handful of entities upstream emits are decoded.
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let tag = rest[start + 1..start + end].trim().to_ascii_lowercase();
        if tag == "p" || tag.starts_with("p ") {
            out.push_str("\n\n");
        } else if tag.starts_with("br") {
            out.push('\n');
        }
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);

    decode_entities(out.trim())
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|end| *end <= 8).and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => numeric_entity(entity),
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

/// Cut `text` to at most `max` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_relative_time_units() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let ms = |secs_ago: i64| (now.timestamp() - secs_ago) * 1000;

        assert_eq!(relative_time(ms(1), now), "1 second ago");
        assert_eq!(relative_time(ms(150), now), "2 minutes ago");
        assert_eq!(relative_time(ms(3 * 3600), now), "3 hours ago");
        assert_eq!(relative_time(ms(86_400), now), "1 day ago");
        assert_eq!(relative_time(ms(21 * 86_400), now), "3 weeks ago");
        assert_eq!(relative_time(ms(-60), now), "in the future");
    }

    #[test]
    fn test_absolute_time() {
        assert_eq!(absolute_time(0), "1970-01-01 00:00");
    }

    #[test]
    fn test_html_to_text() {
        let html = "First &amp; foremost<p>See <a href=\"x\">this</a> &#x2F; that&#39;s it";
        assert_eq!(html_to_text(html), "First & foremost\n\nSee this / that's it");
    }

    #[test]
    fn test_html_to_text_leaves_bare_ampersands() {
        assert_eq!(html_to_text("a & b &unknown; c"), "a & b &unknown; c");
        assert_eq!(html_to_text("1 < 2"), "1 < 2");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
