//! Primitive sanitizers. Pure functions, no state.

use serde_json::Value;
use tracing::debug;
use url::Url;

/// Base every link is resolved against. Anything that still points at
/// this host after resolution was a relative reference and is rejected.
pub const URL_BASE: &str = "https://pagelet.invalid/";

/// Inert link target used wherever a URL was rejected.
pub const INERT_HREF: &str = "#";

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Clamp a dynamic value to at most `max_len` characters.
///
/// Non-string input yields an empty string. Truncation is the contract;
/// nothing is rejected.
pub fn clamp_text(value: &Value, max_len: usize) -> String {
    match value {
        Value::String(s) => clamp_str(s, max_len),
        _ => String::new(),
    }
}

/// Character-boundary-safe truncation.
pub fn clamp_str(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

/// Coerce a caller string into inert text content.
///
/// The result is only ever inserted as a text node, which the serializer
/// escapes, so it can never become markup. Control characters other than
/// tab and newline are removed so they cannot confuse downstream consumers.
pub fn to_plain_text(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Restrict an element id to `[A-Za-z0-9_:-]`, capped at `max_len`.
/// Falls back to `fallback` when nothing usable remains.
pub fn sanitize_identifier(raw: &str, fallback: &str, max_len: usize) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
        .take(max_len)
        .collect();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

/// Normalize a declared action name into a safe lookup key.
///
/// Trims, caps the length, and replaces every character outside
/// `[A-Za-z0-9_.:-]` with `_`.
pub fn sanitize_action_name(raw: &str, max_len: usize) -> String {
    raw.trim()
        .chars()
        .take(max_len)
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Accept a URL only when it resolves to an absolute http, https, mailto or
/// tel target. Returns the normalized URL, or an empty string when rejected.
pub fn sanitize_url(raw: &Value, max_len: usize) -> String {
    let Value::String(s) = raw else {
        return String::new();
    };
    sanitize_url_str(s, max_len)
}

pub fn sanitize_url_str(raw: &str, max_len: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > max_len {
        return String::new();
    }
    let resolved = Url::parse(URL_BASE).and_then(|base| base.join(trimmed));
    let url = match resolved {
        Ok(url) => url,
        Err(err) => {
            debug!(reason = %err, "url rejected: parse failure");
            return String::new();
        }
    };
    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        debug!(scheme = url.scheme(), "url rejected: scheme not allowed");
        return String::new();
    }
    if url.host_str() == Some("pagelet.invalid") {
        debug!("url rejected: relative reference");
        return String::new();
    }
    url.to_string()
}

/// Link target for an interactive element: the sanitized URL or the inert
/// placeholder. The element always gets an href.
pub fn safe_href(raw: &Value, max_len: usize) -> String {
    let url = sanitize_url(raw, max_len);
    if url.is_empty() {
        INERT_HREF.to_string()
    } else {
        url
    }
}

/// Stringify a scalar JSON value for display. Containers become empty.
pub fn value_to_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clamp_text() {
        assert_eq!(clamp_text(&json!("hello"), 3), "hel");
        assert_eq!(clamp_text(&json!("hé"), 5), "hé");
        assert_eq!(clamp_text(&json!("ééé"), 2), "éé");
        assert_eq!(clamp_text(&json!(42), 10), "");
        assert_eq!(clamp_text(&Value::Null, 10), "");
    }

    #[test]
    fn test_to_plain_text_drops_controls() {
        assert_eq!(to_plain_text("a\u{0}b\u{7}c\nd"), "abc\nd");
        assert_eq!(to_plain_text("<b>x</b>"), "<b>x</b>");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("faq-1", "x", 64), "faq-1");
        assert_eq!(sanitize_identifier("\"><x", "x", 64), "x");
        assert_eq!(sanitize_identifier("a b\"c", "x", 64), "abc");
        assert_eq!(sanitize_identifier("!!!", "fallback", 64), "fallback");
        assert_eq!(sanitize_identifier("abcdef", "x", 3), "abc");
    }

    #[test]
    fn test_sanitize_action_name() {
        assert_eq!(sanitize_action_name("  go  ", 64), "go");
        assert_eq!(sanitize_action_name("open modal<x>", 64), "open_modal_x_");
        assert_eq!(sanitize_action_name("cart.add:sku-1", 64), "cart.add:sku-1");
        assert_eq!(sanitize_action_name("abcdef", 4), "abcd");
    }

    #[test]
    fn test_sanitize_url_allowlist() {
        assert_eq!(sanitize_url_str("https://example.com/a?b=1", 2048), "https://example.com/a?b=1");
        assert_eq!(sanitize_url_str("http://example.com", 2048), "http://example.com/");
        assert_eq!(sanitize_url_str("mailto:a@b.c", 2048), "mailto:a@b.c");
        assert_eq!(sanitize_url_str("tel:+15551234", 2048), "tel:+15551234");
        assert_eq!(sanitize_url_str("javascript:alert(1)", 2048), "");
        assert_eq!(sanitize_url_str("JaVaScRiPt:alert(1)", 2048), "");
        assert_eq!(sanitize_url_str("java\nscript:alert(1)", 2048), "");
        assert_eq!(sanitize_url_str("data:text/html,<b>", 2048), "");
        assert_eq!(sanitize_url_str("/relative/path", 2048), "");
        assert_eq!(sanitize_url_str("//example.com/x", 2048), "https://example.com/x");
    }

    #[test]
    fn test_sanitize_url_length_and_type() {
        let long = format!("https://example.com/{}", "a".repeat(100));
        assert_eq!(sanitize_url_str(&long, 50), "");
        assert_eq!(sanitize_url(&json!(5), 2048), "");
        assert_eq!(safe_href(&json!("javascript:x"), 2048), "#");
        assert_eq!(safe_href(&Value::Null, 2048), "#");
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&json!(true)), "true");
        assert_eq!(value_to_text(&json!(3.5)), "3.5");
        assert_eq!(value_to_text(&json!({"a": 1})), "");
    }
}
