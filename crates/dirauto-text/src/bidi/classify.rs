use std::borrow::Cow;

use unicode_bidi::{BidiClass, bidi_class};

use crate::bidi::Direction;

/// Strong directional class of a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrongClass {
    Ltr,
    Rtl,
    Neutral,
}

/// Classify a character by its Unicode `Bidi_Class`.
///
/// `L` is strong LTR, `R` and `AL` are strong RTL. Numbers, separators,
/// whitespace and explicit formatting characters are neutral.
pub fn strong_class(ch: char) -> StrongClass {
    match bidi_class(ch) {
        BidiClass::L => StrongClass::Ltr,
        BidiClass::R | BidiClass::AL => StrongClass::Rtl,
        _ => StrongClass::Neutral,
    }
}

/// Direction of the first strong character in `text`.
pub fn first_strong_direction(text: &str) -> Direction {
    for ch in text.chars() {
        match strong_class(ch) {
            StrongClass::Ltr => return Direction::Ltr,
            StrongClass::Rtl => return Direction::Rtl,
            StrongClass::Neutral => {}
        }
    }
    Direction::Neutral
}

/// RTL-dominant estimate: any strong RTL character makes the text RTL,
/// otherwise any strong LTR character makes it LTR.
///
/// This is the per-character form of the rule used by
/// [`DirectionStatus`](crate::bidi::DirectionStatus), so
/// `estimate_direction(a + b) == estimate_direction(a).merge(estimate_direction(b))`.
pub fn estimate_direction(text: &str) -> Direction {
    let mut seen_ltr = false;
    for ch in text.chars() {
        match strong_class(ch) {
            StrongClass::Rtl => return Direction::Rtl,
            StrongClass::Ltr => seen_ltr = true,
            StrongClass::Neutral => {}
        }
    }
    if seen_ltr {
        Direction::Ltr
    } else {
        Direction::Neutral
    }
}

/// Replace markup tags (`<...>`) and character references (`&...;`)
/// with a single space so they do not count as text.
pub fn strip_markup(text: &str) -> Cow<'_, str> {
    if !text.contains(['<', '&']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(['<', '&']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let skip = if tail.starts_with('<') {
            tail.find('>').map(|end| end + 1)
        } else {
            // Only `&name;` and `&#...;` shapes count as references.
            let body = tail[1..]
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '#'))
                .unwrap_or(tail.len() - 1);
            (body > 0 && tail[1 + body..].starts_with(';')).then_some(body + 2)
        };
        match skip {
            Some(len) => {
                out.push(' ');
                rest = &tail[len..];
            }
            None => {
                out.push_str(&tail[..1]);
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Which rule turns a string into a [`Direction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heuristic {
    /// See [`estimate_direction`].
    #[default]
    RtlDominant,
    /// See [`first_strong_direction`].
    FirstStrong,
}

/// Text classifier used by the aggregator and the escape policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    heuristic: Heuristic,
}

impl Classifier {
    pub fn new(heuristic: Heuristic) -> Self {
        Self { heuristic }
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Classify plain text.
    pub fn classify(&self, text: &str) -> Direction {
        match self.heuristic {
            Heuristic::RtlDominant => estimate_direction(text),
            Heuristic::FirstStrong => first_strong_direction(text),
        }
    }

    /// Classify text that may be markup; tags and entities are ignored
    /// when `is_markup` is set.
    pub fn classify_fragment(&self, text: &str, is_markup: bool) -> Direction {
        if is_markup {
            self.classify(&strip_markup(text))
        } else {
            self.classify(text)
        }
    }
}

/// Classify `text` with the default heuristic.
pub fn classify(text: &str) -> Direction {
    Classifier::default().classify(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEAK_RTL_TEXT: &str = "someText \u{05d0}";

    #[test]
    fn empty_text_is_neutral() {
        assert_eq!(classify(""), Direction::Neutral);
        assert_eq!(first_strong_direction(""), Direction::Neutral);
    }

    #[test]
    fn latin_is_ltr() {
        assert_eq!(classify("abc"), Direction::Ltr);
        assert_eq!(first_strong_direction("abc"), Direction::Ltr);
    }

    #[test]
    fn leading_hebrew_is_rtl() {
        assert_eq!(classify("\u{05d0}bc"), Direction::Rtl);
        assert_eq!(first_strong_direction("\u{05d0}bc"), Direction::Rtl);
    }

    #[test]
    fn arabic_letters_are_rtl() {
        assert_eq!(strong_class('\u{0627}'), StrongClass::Rtl);
        assert_eq!(classify("\u{0645}\u{0631}\u{062d}\u{0628}\u{0627}"), Direction::Rtl);
    }

    #[test]
    fn digits_punctuation_and_space_are_neutral() {
        assert_eq!(classify("123 ,.!? -"), Direction::Neutral);
        assert_eq!(strong_class('7'), StrongClass::Neutral);
        assert_eq!(strong_class(' '), StrongClass::Neutral);
    }

    #[test]
    fn heuristics_disagree_on_weak_rtl() {
        assert_eq!(estimate_direction(WEAK_RTL_TEXT), Direction::Rtl);
        assert_eq!(first_strong_direction(WEAK_RTL_TEXT), Direction::Ltr);
        assert_eq!(
            Classifier::new(Heuristic::FirstStrong).classify(WEAK_RTL_TEXT),
            Direction::Ltr
        );
    }

    #[test]
    fn estimate_of_concatenation_matches_merge() {
        let parts = ["", "abc", "123", "\u{05d0}", "x \u{05d1}", "  "];
        for a in parts {
            for b in parts {
                let joined = format!("{a}{b}");
                assert_eq!(
                    estimate_direction(&joined),
                    estimate_direction(a).merge(estimate_direction(b)),
                    "{joined:?}"
                );
            }
        }
    }

    #[test]
    fn formatting_characters_do_not_count() {
        assert_eq!(classify("\u{202B}123\u{202C}"), Direction::Neutral);
    }

    #[test]
    fn strip_markup_removes_tags_and_entities() {
        assert_eq!(strip_markup("<b> x </b>"), "  x  ");
        assert_eq!(strip_markup("a&amp;b"), "a b");
        assert!(matches!(strip_markup("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn strip_markup_keeps_unterminated_delimiters() {
        assert_eq!(strip_markup("1 < 2"), "1 < 2");
        assert_eq!(strip_markup("a & b"), "a & b");
        assert_eq!(strip_markup("&;"), "&;");
        assert_eq!(strip_markup("Tom & Jerry; x"), "Tom & Jerry; x");
        assert_eq!(strip_markup("a&b c;"), "a&b c;");
    }

    #[test]
    fn strip_markup_removes_numeric_references() {
        assert_eq!(strip_markup("x&#1488;y"), "x y");
        assert_eq!(strip_markup("x&#x5d0;y"), "x y");
    }

    #[test]
    fn markup_tag_names_are_not_text() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify_fragment("<b> </b>", true), Direction::Neutral);
        assert_eq!(classifier.classify_fragment("<b> </b>", false), Direction::Ltr);
        assert_eq!(
            classifier.classify_fragment("<b> someText \u{05d0} </b>", true),
            Direction::Rtl
        );
    }
}
