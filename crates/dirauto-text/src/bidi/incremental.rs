use tracing::warn;

use crate::bidi::{Classifier, Direction};

/// Incremental direction estimate over a changing set of text fragments.
///
/// Each fragment contributes its classified direction; the status only
/// keeps per-direction counts, so every update and read is O(1). Any RTL
/// contribution makes the whole status RTL.
#[derive(Debug, Clone, Default)]
pub struct DirectionStatus {
    ltr_count: usize,
    rtl_count: usize,
    classifier: Classifier,
}

/// A fragment's contribution to a [`DirectionStatus`].
///
/// Not `Clone`: a contribution can only be released once.
#[derive(Debug)]
#[must_use = "dropping a fragment leaves its contribution in the status"]
pub struct Fragment {
    direction: Direction,
}

impl Fragment {
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl DirectionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(classifier: Classifier) -> Self {
        Self {
            classifier,
            ..Self::default()
        }
    }

    pub fn classifier(&self) -> Classifier {
        self.classifier
    }

    pub fn add(&mut self, direction: Direction) -> &mut Self {
        match direction {
            Direction::Ltr => self.ltr_count += 1,
            Direction::Rtl => self.rtl_count += 1,
            Direction::Neutral => {}
        }
        self
    }

    /// Remove one contribution of `direction`.
    ///
    /// Removing a direction that was never added clamps at zero and logs
    /// a warning instead of failing.
    pub fn remove(&mut self, direction: Direction) -> &mut Self {
        let counter = match direction {
            Direction::Ltr => &mut self.ltr_count,
            Direction::Rtl => &mut self.rtl_count,
            Direction::Neutral => return self,
        };
        match counter.checked_sub(1) {
            Some(next) => *counter = next,
            None => warn!(%direction, "direction status underflow; removal ignored"),
        }
        self
    }

    pub fn add_text(&mut self, text: &str, is_markup: bool) -> &mut Self {
        let direction = self.classifier.classify_fragment(text, is_markup);
        self.add(direction)
    }

    pub fn remove_text(&mut self, text: &str, is_markup: bool) -> &mut Self {
        let direction = self.classifier.classify_fragment(text, is_markup);
        self.remove(direction)
    }

    /// Add a fragment and return the token that releases it.
    pub fn insert(&mut self, text: &str, is_markup: bool) -> Fragment {
        let direction = self.classifier.classify_fragment(text, is_markup);
        self.add(direction);
        Fragment { direction }
    }

    /// Swap the fragment's contribution for the direction of `text`.
    pub fn replace(&mut self, fragment: &mut Fragment, text: &str, is_markup: bool) {
        let direction = self.classifier.classify_fragment(text, is_markup);
        self.remove(fragment.direction).add(direction);
        fragment.direction = direction;
    }

    pub fn release(&mut self, fragment: Fragment) {
        self.remove(fragment.direction);
    }

    /// Aggregate direction: RTL if any fragment is RTL, else LTR if any
    /// fragment is LTR, else neutral.
    pub fn get(&self) -> Direction {
        if self.rtl_count > 0 {
            Direction::Rtl
        } else if self.ltr_count > 0 {
            Direction::Ltr
        } else {
            Direction::Neutral
        }
    }

    /// [`get`](Self::get) with neutral replaced by `default`.
    pub fn resolve(&self, default: Direction) -> Direction {
        self.get().or(default)
    }

    pub fn ltr_count(&self) -> usize {
        self.ltr_count
    }

    pub fn rtl_count(&self) -> usize {
        self.rtl_count
    }

    pub fn is_empty(&self) -> bool {
        self.ltr_count == 0 && self.rtl_count == 0
    }
}
