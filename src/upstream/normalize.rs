//! Repair and parsing of upstream payloads, and ID scraping from raw pages.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::upstream::error::UpstreamError;

/// `(From "Movie")` inside a string value breaks the JSON quoting upstream.
static FROM_QUOTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\(From \\?"([^"\\]+)\\?"\)"#).expect("valid regex"));

/// Unescapes the payload, repairs known quoting breakage and parses it.
pub fn normalize(raw: &str) -> Result<Value, UpstreamError> {
    let text = unescape_unicode(raw);
    let text = repair_quotes(&text);
    serde_json::from_str(&text).map_err(|e| UpstreamError::Parse(e.to_string()))
}

pub fn repair_quotes(text: &str) -> String {
    FROM_QUOTES.replace_all(text, "(From '$1')").into_owned()
}

/// Decodes `\uXXXX` escapes (surrogate pairs included) into characters.
///
/// Escapes that would decode to a control character, a quote or a backslash
/// are kept as they are, as are all other backslash escapes.
pub fn unescape_unicode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        if bytes.get(i + 1) == Some(&b'u') {
            if let Some((ch, len)) = decode_escape(&text[i..]) {
                out.push_str(&text[copied..i]);
                out.push(ch);
                i += len;
                copied = i;
                continue;
            }
        }
        // skip the escaped character so `\\u0041` stays an escaped backslash
        i += 2;
    }
    out.push_str(&text[copied..]);
    out
}

fn hex_unit(escape: &str) -> Option<u16> {
    let hex = escape.strip_prefix("\\u")?.get(..4)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(hex, 16).ok()
}

fn decode_escape(escape: &str) -> Option<(char, usize)> {
    let unit = hex_unit(escape)?;
    let (code, len) = if (0xD800..0xDC00).contains(&unit) {
        let low = hex_unit(escape.get(6..)?)?;
        if !(0xDC00..0xE000).contains(&low) {
            return None;
        }
        let code = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
        (code, 12)
    } else {
        (u32::from(unit), 6)
    };
    let ch = char::from_u32(code)?;
    if ch.is_control() || ch == '"' || ch == '\\' {
        return None;
    }
    Some((ch, len))
}

/// One way of locating an ID in a raw page.
///
/// The candidate is the text after the first `anchor`, up to the next
/// `anchor`, cut at the first `terminator`. With `last_after` set, only the
/// part after the last occurrence of that marker is kept.
#[derive(Debug, Clone, Copy)]
pub struct IdPattern {
    pub anchor: &'static str,
    pub terminator: &'static str,
    pub last_after: Option<&'static str>,
}

impl IdPattern {
    pub const fn new(anchor: &'static str, terminator: &'static str) -> Self {
        Self {
            anchor,
            terminator,
            last_after: None,
        }
    }

    pub fn find<'a>(&self, text: &'a str) -> Option<&'a str> {
        let (_, after) = text.split_once(self.anchor)?;
        let segment = after.split_once(self.anchor).map_or(after, |(s, _)| s);
        let mut value = segment
            .split_once(self.terminator)
            .map_or(segment, |(s, _)| s);
        if let Some(marker) = self.last_after {
            value = value.rsplit(marker).next().unwrap_or(value);
        }
        Some(value).filter(|v| !v.is_empty())
    }
}

/// Ordered patterns for one kind of entity; earlier patterns win.
#[derive(Debug, Clone, Copy)]
pub struct IdPatterns {
    pub kind: &'static str,
    pub patterns: &'static [IdPattern],
}

pub const SONG_ID: IdPatterns = IdPatterns {
    kind: "song",
    patterns: &[
        IdPattern::new(r#""pid":""#, r#"",""#),
        IdPattern {
            anchor: r#""song":{"type":""#,
            terminator: r#"","image":"#,
            last_after: Some(r#""id":""#),
        },
    ],
};

pub const ALBUM_ID: IdPatterns = IdPatterns {
    kind: "album",
    patterns: &[
        IdPattern::new(r#""album_id":""#, r#"""#),
        IdPattern::new(r#""page_id",""#, r#"",""#),
    ],
};

pub const PLAYLIST_ID: IdPatterns = IdPatterns {
    kind: "playlist",
    patterns: &[
        IdPattern::new(r#""type":"playlist","id":""#, r#"""#),
        IdPattern::new(r#""page_id",""#, r#"",""#),
    ],
};

pub fn extract_id(patterns: &IdPatterns, text: &str) -> Result<String, UpstreamError> {
    patterns
        .patterns
        .iter()
        .find_map(|pattern| pattern.find(text))
        .map(str::to_string)
        .ok_or(UpstreamError::IdResolution {
            kind: patterns.kind,
        })
}
