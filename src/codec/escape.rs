//! Escaping for text placed inside a backtick literal.
//!
//! Exactly three characters are syntactically special inside the literal:
//! the delimiter itself, the escape character, and the interpolation
//! marker. Everything else, newlines included, passes through unchanged so
//! multi-line text stays multi-line in the document. The parser's literal
//! rule recognizes exactly these three sequences and nothing more; the two
//! sides must stay in lockstep or round-tripping breaks.

/// Escape `text` to form the body of a backtick literal.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '`' => out.push_str("\\`"),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_delimiter() {
        assert_eq!(escape_text("a`b"), "a\\`b");
    }

    #[test]
    fn test_escapes_escape_character() {
        assert_eq!(escape_text("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_escapes_interpolation_marker() {
        assert_eq!(escape_text("${x}"), "\\${x}");
    }

    #[test]
    fn test_newlines_pass_through() {
        assert_eq!(escape_text("one\ntwo\n"), "one\ntwo\n");
    }

    #[test]
    fn test_combined() {
        assert_eq!(escape_text("`${a}` \\n"), "\\`\\${a}\\` \\\\n");
    }

    #[test]
    fn test_empty() {
        assert_eq!(escape_text(""), "");
    }
}
