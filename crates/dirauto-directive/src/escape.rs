use std::borrow::Cow;
use std::collections::HashSet;

use dirauto_config::EscapeConfig;
use dirauto_text::bidi::{Classifier, Direction, apply_dir_to_text};

/// Tag wildcard in the exemption table.
pub const ANY_TAG: &str = "*";

/// Decides how interpolated attribute values are marked up for direction.
///
/// Values whose own direction conflicts with the element's direction are
/// wrapped in an embedding (LRE or RLE) and a closing PDF. Exempt
/// `(tag, attribute)` pairs pass through untouched.
#[derive(Debug, Clone)]
pub struct EscapePolicy {
    exempt: HashSet<(String, String)>,
    classifier: Classifier,
}

impl EscapePolicy {
    pub fn new<'a, I>(exemptions: I, classifier: Classifier) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let exempt = exemptions
            .into_iter()
            .map(|(tag, attr)| (tag.to_ascii_lowercase(), attr.to_ascii_lowercase()))
            .collect();
        Self { exempt, classifier }
    }

    pub fn from_config(config: &EscapeConfig, classifier: Classifier) -> Self {
        Self::new(config.exemptions(), classifier)
    }

    pub fn classifier(&self) -> Classifier {
        self.classifier
    }

    pub fn is_exempt(&self, tag: &str, attribute: &str) -> bool {
        let attribute = attribute.to_ascii_lowercase();
        self.exempt.contains(&(ANY_TAG.to_string(), attribute.clone()))
            || self.exempt.contains(&(tag.to_ascii_lowercase(), attribute))
    }

    /// Escape `value` for `attribute` on a `tag` element whose direction
    /// is `element_dir`.
    pub fn escape<'v>(
        &self,
        element_dir: Direction,
        attribute: &str,
        tag: &str,
        value: &'v str,
    ) -> Cow<'v, str> {
        if element_dir.is_neutral() || self.is_exempt(tag, attribute) {
            return Cow::Borrowed(value);
        }
        let value_dir = self.classifier.classify(value);
        if value_dir.conflicts_with(element_dir) {
            apply_dir_to_text(value_dir, value)
        } else {
            Cow::Borrowed(value)
        }
    }
}

impl Default for EscapePolicy {
    fn default() -> Self {
        Self::from_config(&EscapeConfig::default(), Classifier::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirauto_text::bidi::{LRE, PDF, RLE};

    const LTR_TEXT: &str = "someText";
    const RTL_VALUE: &str = "someText\u{05d0}";

    #[test]
    fn ltr_value_in_ltr_element_is_unchanged() {
        let policy = EscapePolicy::default();
        assert_eq!(policy.escape(Direction::Ltr, "title", "div", LTR_TEXT), LTR_TEXT);
    }

    #[test]
    fn rtl_value_in_ltr_element_is_embedded() {
        let policy = EscapePolicy::default();
        assert_eq!(
            policy.escape(Direction::Ltr, "title", "div", RTL_VALUE),
            format!("{RLE}{RTL_VALUE}{PDF}")
        );
    }

    #[test]
    fn ltr_value_in_rtl_element_is_embedded() {
        let policy = EscapePolicy::default();
        assert_eq!(
            policy.escape(Direction::Rtl, "title", "div", LTR_TEXT),
            format!("{LRE}{LTR_TEXT}{PDF}")
        );
    }

    #[test]
    fn neutral_values_and_unknown_elements_pass_through() {
        let policy = EscapePolicy::default();
        assert_eq!(policy.escape(Direction::Rtl, "title", "div", "123"), "123");
        assert_eq!(policy.escape(Direction::Rtl, "title", "div", ""), "");
        assert_eq!(policy.escape(Direction::Neutral, "title", "div", RTL_VALUE), RTL_VALUE);
    }

    #[test]
    fn default_exemptions() {
        let policy = EscapePolicy::default();
        assert_eq!(policy.escape(Direction::Ltr, "dir", "span", RTL_VALUE), RTL_VALUE);
        assert_eq!(
            policy.escape(Direction::Ltr, "ng-bind-template", "div", RTL_VALUE),
            RTL_VALUE
        );
        assert_eq!(policy.escape(Direction::Ltr, "value", "INPUT", RTL_VALUE), RTL_VALUE);
        assert_eq!(policy.escape(Direction::Ltr, "value", "textarea", RTL_VALUE), RTL_VALUE);
        assert_ne!(policy.escape(Direction::Ltr, "value", "div", RTL_VALUE), RTL_VALUE);
    }

    #[test]
    fn custom_exemptions_replace_defaults() {
        let policy = EscapePolicy::new([("img", "alt")], Classifier::default());
        assert!(policy.is_exempt("IMG", "ALT"));
        assert!(!policy.is_exempt("div", "alt"));
        assert!(!policy.is_exempt("span", "dir"));
    }
}
