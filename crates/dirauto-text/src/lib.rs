//! dirauto-text: bidirectional direction estimation.
//!
//! Classifies strings into LTR/RTL/neutral, aggregates fragment
//! directions incrementally and marks up text that runs against its
//! surrounding direction.

pub mod bidi;

pub use bidi::{
    Classifier, Direction, DirectionStatus, Fragment, Heuristic, apply_dir_to_text, classify,
    locale_direction,
};
