// Cross-cutting prompt fragments and prompt-building utilities.
// Each artifact that needs LLM calls defines its own prompts.rs alongside it.

/// Instruction appended to every generation prompt to keep output specific.
pub const SPECIFICITY_INSTRUCTION: &str = "\
    CRITICAL: Ground every sentence in the speaker background, audience \
    profile, and product details supplied above. Do NOT produce generic \
    filler that could apply to any talk. If a detail is not supported by \
    the supplied answers, leave it out.";

/// Escapes user-supplied text so it can be embedded verbatim inside a prompt
/// that asks for a JSON reply. Quotes, backslashes, and line breaks would
/// otherwise leak into the reply shape.
pub fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(escape_text(r#"say "hi" \ bye"#), r#"say \"hi\" \\ bye"#);
    }

    #[test]
    fn escapes_line_breaks_and_tabs() {
        assert_eq!(escape_text("a\nb\tc\rd"), "a\\nb\\tc\\rd");
    }

    #[test]
    fn backslash_is_escaped_before_quotes() {
        // A pre-escaped quote must not double-escape into garbage.
        assert_eq!(escape_text("\\\""), "\\\\\\\"");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape_text("plain text"), "plain text");
    }
}
