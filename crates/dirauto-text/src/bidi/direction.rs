use core::fmt;

/// Estimated direction of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Left-to-right.
    Ltr,
    /// Right-to-left.
    Rtl,
    /// No strong directional character was seen.
    #[default]
    Neutral,
}

impl Direction {
    /// Value for the HTML `dir` property. Neutral maps to the empty
    /// string, which leaves the element's direction unset.
    pub fn as_html_dir(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
            Direction::Neutral => "",
        }
    }

    /// Parse an HTML `dir` value. Anything other than `ltr`/`rtl`
    /// (case-insensitive, surrounding whitespace ignored) is neutral.
    pub fn from_html_dir(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("ltr") {
            Direction::Ltr
        } else if value.eq_ignore_ascii_case("rtl") {
            Direction::Rtl
        } else {
            Direction::Neutral
        }
    }

    pub fn is_neutral(self) -> bool {
        self == Direction::Neutral
    }

    /// Replace `Neutral` with `default`.
    pub fn or(self, default: Direction) -> Direction {
        match self {
            Direction::Neutral => default,
            strong => strong,
        }
    }

    /// Combine two directions with RTL dominance: any RTL wins, then
    /// any LTR, otherwise neutral.
    pub fn merge(self, other: Direction) -> Direction {
        match (self, other) {
            (Direction::Rtl, _) | (_, Direction::Rtl) => Direction::Rtl,
            (Direction::Ltr, _) | (_, Direction::Ltr) => Direction::Ltr,
            _ => Direction::Neutral,
        }
    }

    /// `true` when both directions are strong and disagree.
    pub fn conflicts_with(self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Ltr, Direction::Rtl) | (Direction::Rtl, Direction::Ltr)
        )
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ltr => f.write_str("ltr"),
            Direction::Rtl => f.write_str("rtl"),
            Direction::Neutral => f.write_str("neutral"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_dir_round_trips_strong_directions() {
        assert_eq!(Direction::from_html_dir(Direction::Ltr.as_html_dir()), Direction::Ltr);
        assert_eq!(Direction::from_html_dir(Direction::Rtl.as_html_dir()), Direction::Rtl);
        assert_eq!(Direction::Neutral.as_html_dir(), "");
    }

    #[test]
    fn unknown_html_dir_is_neutral() {
        assert_eq!(Direction::from_html_dir("auto"), Direction::Neutral);
        assert_eq!(Direction::from_html_dir(" RTL "), Direction::Rtl);
        assert_eq!(Direction::from_html_dir(""), Direction::Neutral);
    }

    #[test]
    fn merge_prefers_rtl() {
        assert_eq!(Direction::Ltr.merge(Direction::Rtl), Direction::Rtl);
        assert_eq!(Direction::Neutral.merge(Direction::Ltr), Direction::Ltr);
        assert_eq!(Direction::Neutral.merge(Direction::Neutral), Direction::Neutral);
    }

    #[test]
    fn only_strong_opposites_conflict() {
        assert!(Direction::Ltr.conflicts_with(Direction::Rtl));
        assert!(Direction::Rtl.conflicts_with(Direction::Ltr));
        assert!(!Direction::Ltr.conflicts_with(Direction::Ltr));
        assert!(!Direction::Neutral.conflicts_with(Direction::Rtl));
        assert!(!Direction::Rtl.conflicts_with(Direction::Neutral));
    }
}
