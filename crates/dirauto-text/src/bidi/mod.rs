//! Direction estimation for `dir="auto"` style text.
//!
//! - Per-string classification from Unicode bidi classes
//! - Incremental aggregation over many changing fragments
//! - Embedding markers and locale direction lookup

pub mod classify;
pub mod direction;
pub mod format;
pub mod incremental;
pub mod locale;

pub use classify::{
    Classifier, Heuristic, StrongClass, classify, estimate_direction, first_strong_direction,
    strip_markup, strong_class,
};
pub use direction::Direction;
pub use format::{LRE, PDF, RLE, apply_dir_to_text, embedding_for};
pub use incremental::{DirectionStatus, Fragment};
pub use locale::{is_rtl_locale, locale_direction};
