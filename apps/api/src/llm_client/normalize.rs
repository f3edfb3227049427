//! Response normalization — coerces raw LLM reply text into parsed JSON.
//!
//! Models wrap JSON in fences, prepend commentary, leave trailing commas,
//! and occasionally emit single-quoted or bare-key pseudo-JSON. Each defect
//! gets its own named repair pass, applied in a fixed order; a pass that does
//! not apply leaves the text unchanged. The final step is a standard
//! `serde_json` parse.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// How much of the raw reply to keep in error diagnostics.
const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("no JSON object or array found in reply (preview: {preview})")]
    NoJsonSpan { preview: String },

    #[error("reply failed to parse after repair: {source} (preview: {preview})")]
    Parse {
        source: serde_json::Error,
        preview: String,
    },
}

/// Runs the full repair pipeline and parses the result.
/// Never panics — any unrecoverable input becomes a `NormalizeError`.
pub fn normalize(raw: &str) -> Result<Value, NormalizeError> {
    let text = strip_code_fences(raw);

    let span = bound_json_span(&text).ok_or_else(|| NormalizeError::NoJsonSpan {
        preview: preview(raw),
    })?;

    let cleaned = strip_invisible_chars(span);

    // Well-formed JSON must round-trip untouched: the repair passes below are
    // heuristic rewrites and only run once a strict parse has failed.
    if let Ok(value) = serde_json::from_str(&cleaned) {
        return Ok(value);
    }

    let repaired = collapse_blank_lines(&cleaned);
    let repaired = quote_bare_keys(&repaired);
    let repaired = normalize_single_quotes(&repaired);
    let repaired = strip_trailing_commas(&repaired);

    serde_json::from_str(&repaired).map_err(|source| NormalizeError::Parse {
        source,
        preview: preview(raw),
    })
}

fn preview(raw: &str) -> String {
    raw.chars().take(PREVIEW_CHARS).collect()
}

/// Drops Markdown code-fence lines (``` or ```json) wherever they appear.
fn strip_code_fences(text: &str) -> String {
    if !text.contains("```") {
        return text.to_string();
    }
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns the span from the first `{`/`[` to the last matching `}`/`]`,
/// discarding any commentary outside it. `None` when no span exists.
fn bound_json_span(text: &str) -> Option<&str> {
    let open = text.find(['{', '['])?;
    let close_char = if text.as_bytes()[open] == b'{' {
        '}'
    } else {
        ']'
    };
    let close = text.rfind(close_char)?;
    if close < open {
        return None;
    }
    Some(&text[open..=close])
}

/// Removes zero-width and other invisible control characters that break the
/// parser. Ordinary whitespace (newline, tab, carriage return) survives.
fn strip_invisible_chars(text: &str) -> String {
    if !text.chars().any(is_invisible) {
        return text.to_string();
    }
    text.chars().filter(|&c| !is_invisible(c)).collect()
}

fn is_invisible(c: char) -> bool {
    matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}')
        || (c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
}

/// Squeezes runs of blank lines down to a single newline.
fn collapse_blank_lines(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?:[ \t]*\r?\n){2,}").unwrap());
    re.replace_all(text, "\n").into_owned()
}

/// Double-quotes bare object keys: `{key: 1}` → `{"key": 1}`.
fn quote_bare_keys(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r#"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:"#).unwrap());
    re.replace_all(text, "$1\"$2\":").into_owned()
}

/// Rewrites single-quoted strings in structural positions to double-quoted.
/// Only fires when the opening quote follows `{`, `[`, `:` or `,`, so
/// apostrophes inside double-quoted values are left alone.
fn normalize_single_quotes(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r#"([{\[:,]\s*)'([^']*)'"#).unwrap());
    re.replace_all(text, |caps: &regex::Captures| {
        format!("{}\"{}\"", &caps[1], caps[2].replace('"', "\\\""))
    })
    .into_owned()
}

/// Removes trailing commas before a closing brace or bracket.
fn strip_trailing_commas(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r",\s*([}\]])").unwrap());
    re.replace_all(text, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_clean_json_unchanged() {
        let value = normalize(r#"{"title": "Opening", "points": [1, 2, 3]}"#).unwrap();
        assert_eq!(value, json!({"title": "Opening", "points": [1, 2, 3]}));
    }

    #[test]
    fn extracts_json_from_fences_and_commentary_losslessly() {
        let raw = "Sure! Here is the outline you asked for:\n```json\n{\"chapters\": [{\"title\": \"Why now\"}]}\n```\nLet me know if you need changes.";
        let value = normalize(raw).unwrap();
        assert_eq!(value, json!({"chapters": [{"title": "Why now"}]}));
    }

    #[test]
    fn repairs_trailing_comma_inside_fences() {
        // A fenced object with one trailing comma must equal its clean form.
        let raw = "```json\n{\"steps\": [\"open\", \"close\",]}\n```";
        let value = normalize(raw).unwrap();
        assert_eq!(value, json!({"steps": ["open", "close"]}));
    }

    #[test]
    fn repairs_bare_keys() {
        let value = normalize("{title: \"Opening\", order: 1}").unwrap();
        assert_eq!(value, json!({"title": "Opening", "order": 1}));
    }

    #[test]
    fn repairs_single_quoted_strings() {
        let value = normalize("{\"title\": 'The big idea', \"tags\": ['a', 'b']}").unwrap();
        assert_eq!(value, json!({"title": "The big idea", "tags": ["a", "b"]}));
    }

    #[test]
    fn keeps_apostrophes_inside_double_quoted_values() {
        let value = normalize(r#"{"title": "It's time to change"}"#).unwrap();
        assert_eq!(value, json!({"title": "It's time to change"}));
    }

    #[test]
    fn well_formed_values_with_key_like_patterns_survive_untouched() {
        let raw = r#"{"note": "Open, then: ask for the meeting"}"#;
        let value = normalize(raw).unwrap();
        assert_eq!(value, json!({"note": "Open, then: ask for the meeting"}));
    }

    #[test]
    fn strips_zero_width_characters() {
        let raw = "{\u{FEFF}\"title\":\u{200B} \"Opening\"}";
        let value = normalize(raw).unwrap();
        assert_eq!(value, json!({"title": "Opening"}));
    }

    #[test]
    fn collapses_blank_line_runs() {
        let raw = "{\n\n\n\"title\": \"Opening\"\n\n\n}";
        let value = normalize(raw).unwrap();
        assert_eq!(value, json!({"title": "Opening"}));
    }

    #[test]
    fn picks_array_span_when_reply_is_an_array() {
        let raw = "Here you go: [\"one\", \"two\"] — enjoy";
        let value = normalize(raw).unwrap();
        assert_eq!(value, json!(["one", "two"]));
    }

    #[test]
    fn combined_defects_parse_to_the_clean_structure() {
        let raw = "```\n{title: 'Opening', steps: [{order: 1,},],}\n```";
        let value = normalize(raw).unwrap();
        assert_eq!(value, json!({"title": "Opening", "steps": [{"order": 1}]}));
    }

    #[test]
    fn no_json_span_is_a_typed_error() {
        let err = normalize("I'm sorry, I can't produce an outline for that.").unwrap_err();
        assert!(matches!(err, NormalizeError::NoJsonSpan { .. }));
    }

    #[test]
    fn unparseable_span_is_a_typed_error_with_preview() {
        let err = normalize("{\"title\": }").unwrap_err();
        match err {
            NormalizeError::Parse { preview, .. } => assert!(preview.contains("title")),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn preview_is_truncated() {
        let raw = "x".repeat(1000);
        let err = normalize(&raw).unwrap_err();
        match err {
            NormalizeError::NoJsonSpan { preview } => {
                assert_eq!(preview.chars().count(), PREVIEW_CHARS)
            }
            other => panic!("expected NoJsonSpan, got {other:?}"),
        }
    }

    // Individual passes leave non-applicable input untouched.

    #[test]
    fn fence_strip_passes_through_without_fences() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn invisible_strip_passes_through_plain_text() {
        assert_eq!(strip_invisible_chars("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn trailing_comma_strip_passes_through_clean_json() {
        assert_eq!(strip_trailing_commas("[1, 2]"), "[1, 2]");
    }

    #[test]
    fn bound_span_rejects_reversed_delimiters() {
        assert!(bound_json_span("} nothing {").is_none());
    }
}
