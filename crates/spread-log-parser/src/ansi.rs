//! ANSI escape sequence removal using ansi-parser crate

use ansi_parser::{AnsiParser, Output};
use std::borrow::Cow;

const ESCAPE: char = '\x1b';

/// Remove every ANSI escape sequence from `text`, keeping only the text blocks
///
/// Lines without an escape character are returned borrowed.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    if !text.contains(ESCAPE) {
        return Cow::Borrowed(text);
    }

    let mut plain = String::with_capacity(text.len());
    for output in text.ansi_parse() {
        // Cursor movement and styling carry no content
        if let Output::TextBlock(block) = output {
            plain.push_str(block);
        }
    }
    Cow::Owned(plain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_borrowed() {
        let line = "2026-01-13 11:15:15 Preparing garden:host:tests/a (garden:host)...";
        assert!(matches!(strip_ansi(line), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_color_codes() {
        let line = "\x1b[1m2026-01-13 11:15:15\x1b[0m \x1b[38;5;9mExecuting\x1b[0m rest";
        assert_eq!(strip_ansi(line), "2026-01-13 11:15:15 Executing rest");
    }
}
