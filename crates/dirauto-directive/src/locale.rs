use dirauto_text::bidi::{Direction, locale_direction};

/// Supplies the direction used by `dir="locale"`.
pub trait LocaleProvider {
    fn locale_direction(&self) -> Direction;
}

/// Locale given by its id (`en`, `ar`, `he-IL`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleId(pub String);

impl LocaleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl LocaleProvider for LocaleId {
    fn locale_direction(&self) -> Direction {
        locale_direction(&self.0)
    }
}

/// A fixed direction, independent of any locale.
impl LocaleProvider for Direction {
    fn locale_direction(&self) -> Direction {
        *self
    }
}
