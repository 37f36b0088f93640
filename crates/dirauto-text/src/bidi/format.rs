//! Unicode explicit directional formatting characters.

use std::borrow::Cow;

use crate::bidi::Direction;

/// Left-to-right embedding.
pub const LRE: char = '\u{202A}';
/// Right-to-left embedding.
pub const RLE: char = '\u{202B}';
/// Pop directional formatting.
pub const PDF: char = '\u{202C}';

/// Embedding character that opens a run in `direction`.
pub fn embedding_for(direction: Direction) -> Option<char> {
    match direction {
        Direction::Ltr => Some(LRE),
        Direction::Rtl => Some(RLE),
        Direction::Neutral => None,
    }
}

/// Wrap `text` in an embedding for `direction` followed by PDF.
/// Neutral leaves the text untouched.
pub fn apply_dir_to_text(direction: Direction, text: &str) -> Cow<'_, str> {
    match embedding_for(direction) {
        Some(open) => {
            let mut out = String::with_capacity(text.len() + 2 * open.len_utf8());
            out.push(open);
            out.push_str(text);
            out.push(PDF);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_rtl_text() {
        assert_eq!(apply_dir_to_text(Direction::Rtl, "x"), "\u{202B}x\u{202C}");
    }

    #[test]
    fn wraps_ltr_text() {
        assert_eq!(apply_dir_to_text(Direction::Ltr, "x"), "\u{202A}x\u{202C}");
    }

    #[test]
    fn neutral_borrows() {
        assert!(matches!(apply_dir_to_text(Direction::Neutral, "x"), Cow::Borrowed("x")));
    }
}
