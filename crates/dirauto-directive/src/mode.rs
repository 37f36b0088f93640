use crate::template::Interpolation;

/// Declared value of an element's `dir` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirMode {
    Ltr,
    Rtl,
    /// Direction follows the element's text.
    Auto,
    /// Direction of the current locale.
    Locale,
    /// `dir="{{expr}}"`; resolved on every digest.
    Interpolated(Interpolation),
    /// Empty or unknown value. No direction is applied.
    Unset,
}

impl DirMode {
    pub fn parse(value: &str) -> Self {
        if let Some(template) = Interpolation::parse(value) {
            return DirMode::Interpolated(template);
        }
        let value = value.trim();
        if value.eq_ignore_ascii_case("ltr") {
            DirMode::Ltr
        } else if value.eq_ignore_ascii_case("rtl") {
            DirMode::Rtl
        } else if value.eq_ignore_ascii_case("auto") {
            DirMode::Auto
        } else if value.eq_ignore_ascii_case("locale") {
            DirMode::Locale
        } else {
            DirMode::Unset
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, DirMode::Auto)
    }
}
