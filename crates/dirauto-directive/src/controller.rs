//! Per-element direction state.

use std::borrow::Cow;
use std::path::Path;
use std::rc::Rc;

use dirauto_config::{DirConfig, HeuristicSetting};
use dirauto_text::bidi::{Classifier, Direction, DirectionStatus, Heuristic};
use tracing::debug;

use crate::{
    error::Result,
    escape::EscapePolicy,
    locale::{LocaleId, LocaleProvider},
    mode::DirMode,
};

/// Shared settings every controller of a view is created from.
#[derive(Clone)]
pub struct DirContext {
    enabled: bool,
    policy: Rc<EscapePolicy>,
    locale: Rc<dyn LocaleProvider>,
}

impl DirContext {
    pub fn new(policy: EscapePolicy, locale: impl LocaleProvider + 'static) -> Self {
        Self {
            enabled: true,
            policy: Rc::new(policy),
            locale: Rc::new(locale),
        }
    }

    pub fn from_config(config: &DirConfig) -> Self {
        let heuristic = match config.bidi.heuristic {
            HeuristicSetting::RtlDominant => Heuristic::RtlDominant,
            HeuristicSetting::FirstStrong => Heuristic::FirstStrong,
        };
        let policy = EscapePolicy::from_config(&config.escape, Classifier::new(heuristic));
        let mut context = Self::new(policy, LocaleId::new(config.bidi.locale.clone()));
        context.enabled = config.bidi.enabled;
        context
    }

    /// Load `path` and build a context from it.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = DirConfig::load_from_file(path)?;
        Ok(Self::from_config(&config))
    }

    pub fn with_locale(mut self, locale: impl LocaleProvider + 'static) -> Self {
        self.locale = Rc::new(locale);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// When disabled no controllers are created: `dir` attributes are
    /// left as written and attribute values are never escaped.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn policy(&self) -> &EscapePolicy {
        &self.policy
    }

    pub fn locale_direction(&self) -> Direction {
        self.locale.locale_direction()
    }
}

impl Default for DirContext {
    fn default() -> Self {
        Self::from_config(&DirConfig::default())
    }
}

impl std::fmt::Debug for DirContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirContext")
            .field("enabled", &self.enabled)
            .field("policy", &self.policy)
            .field("locale", &self.locale.locale_direction())
            .finish()
    }
}

/// Direction controller for one element carrying a `dir` attribute.
#[derive(Debug)]
pub struct DirController {
    mode: DirMode,
    dir: Direction,
    status: Option<DirectionStatus>,
    policy: Rc<EscapePolicy>,
}

impl DirController {
    /// Create a controller for `mode`.
    ///
    /// `static_text` is the text already present in the element; it seeds
    /// the estimate in auto mode and is ignored otherwise.
    pub fn new(mode: DirMode, static_text: &str, context: &DirContext) -> Self {
        let mut status = None;
        let dir = match &mode {
            DirMode::Ltr => Direction::Ltr,
            DirMode::Rtl => Direction::Rtl,
            DirMode::Auto => {
                let mut seeded = DirectionStatus::with_classifier(context.policy.classifier());
                seeded.add_text(static_text, false);
                let dir = seeded.get();
                status = Some(seeded);
                dir
            }
            DirMode::Locale => context.locale_direction(),
            DirMode::Interpolated(_) | DirMode::Unset => Direction::Neutral,
        };
        Self {
            mode,
            dir,
            status,
            policy: Rc::clone(&context.policy),
        }
    }

    pub fn mode(&self) -> &DirMode {
        &self.mode
    }

    pub fn is_auto(&self) -> bool {
        self.status.is_some()
    }

    /// Current direction; neutral when none is known.
    pub fn dir(&self) -> Direction {
        self.dir
    }

    /// Register a text fragment whose current content is `initial`.
    ///
    /// Only auto controllers track text; others return `None`.
    pub fn create_text_changer(&self, initial: &str, is_markup: bool) -> Option<TextChanger> {
        self.is_auto().then(|| TextChanger {
            current: initial.to_string(),
            is_markup,
        })
    }

    /// Feed the evaluated value of an interpolated `dir` attribute.
    /// Returns `true` if the direction changed.
    pub fn observe_dir(&mut self, value: &str) -> bool {
        if !matches!(self.mode, DirMode::Interpolated(_)) {
            return false;
        }
        let dir = Direction::from_html_dir(value);
        let changed = dir != self.dir;
        self.dir = dir;
        changed
    }

    /// Prepare `value` for `attribute` on a `tag` element under this
    /// controller.
    pub fn escape_attribute_value<'v>(
        &self,
        tag: &str,
        attribute: &str,
        value: &'v str,
    ) -> Cow<'v, str> {
        self.policy.escape(self.dir, attribute, tag, value)
    }
}

/// Handle for one text fragment inside an auto controller.
#[derive(Debug, Clone)]
pub struct TextChanger {
    current: String,
    is_markup: bool,
}

impl TextChanger {
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Replace the fragment's text. Returns the controller's new direction
    /// when it changed.
    pub fn apply(&mut self, controller: &mut DirController, text: &str) -> Option<Direction> {
        if self.current == text {
            return None;
        }
        let status = controller.status.as_mut()?;
        let before = status.get();
        status
            .remove_text(&self.current, self.is_markup)
            .add_text(text, self.is_markup);
        let after = status.get();
        self.current = text.to_string();

        if before == after {
            return None;
        }
        debug!(from = %before, to = %after, "auto direction changed");
        controller.dir = after;
        Some(after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LTR_TEXT: &str = "someText";
    const WEAK_RTL_TEXT: &str = "someText \u{05d0}";

    fn auto(static_text: &str) -> DirController {
        DirController::new(DirMode::Auto, static_text, &DirContext::default())
    }

    #[test]
    fn auto_mode_is_seeded_from_static_text() {
        assert_eq!(auto("").dir(), Direction::Neutral);
        assert_eq!(auto(LTR_TEXT).dir(), Direction::Ltr);
        assert_eq!(auto(WEAK_RTL_TEXT).dir(), Direction::Rtl);
    }

    #[test]
    fn text_changer_tracks_direction() {
        let mut controller = auto("");
        let mut changer = controller.create_text_changer("", false).unwrap();

        assert_eq!(changer.apply(&mut controller, LTR_TEXT), Some(Direction::Ltr));
        assert_eq!(changer.apply(&mut controller, LTR_TEXT), None);
        assert_eq!(changer.apply(&mut controller, WEAK_RTL_TEXT), Some(Direction::Rtl));
        assert_eq!(changer.apply(&mut controller, LTR_TEXT), Some(Direction::Ltr));
        assert_eq!(changer.apply(&mut controller, "other"), None);
        assert_eq!(changer.current(), "other");
        assert_eq!(controller.dir(), Direction::Ltr);
    }

    #[test]
    fn changer_over_seeded_text_removes_the_seed() {
        let mut controller = auto(LTR_TEXT);
        let mut changer = controller.create_text_changer(LTR_TEXT, false).unwrap();
        assert_eq!(changer.apply(&mut controller, ""), Some(Direction::Neutral));
    }

    #[test]
    fn markup_changer_ignores_tags() {
        let mut controller = auto("");
        let mut changer = controller.create_text_changer("", true).unwrap();
        assert_eq!(changer.apply(&mut controller, "<b>  </b>"), None);
        assert_eq!(
            changer.apply(&mut controller, "<b> someText </b>"),
            Some(Direction::Ltr)
        );
    }

    #[test]
    fn non_auto_controllers_do_not_track_text() {
        let context = DirContext::default();
        for mode in [DirMode::Ltr, DirMode::Rtl, DirMode::Locale, DirMode::Unset] {
            let controller = DirController::new(mode, LTR_TEXT, &context);
            assert!(controller.create_text_changer("", false).is_none());
        }
    }

    #[test]
    fn locale_mode_uses_provider() {
        let context = DirContext::default().with_locale(LocaleId::new("ar"));
        let controller = DirController::new(DirMode::Locale, "", &context);
        assert_eq!(controller.dir(), Direction::Rtl);

        let context = DirContext::default().with_locale(Direction::Ltr);
        let controller = DirController::new(DirMode::Locale, "", &context);
        assert_eq!(controller.dir(), Direction::Ltr);
    }

    #[test]
    fn interpolated_mode_follows_observed_value() {
        let mode = DirMode::parse("{{dir}}");
        let mut controller = DirController::new(mode, "", &DirContext::default());
        assert_eq!(controller.dir(), Direction::Neutral);
        assert!(controller.observe_dir("rtl"));
        assert!(!controller.observe_dir("rtl"));
        assert_eq!(controller.dir(), Direction::Rtl);
        assert!(controller.observe_dir("bogus"));
        assert_eq!(controller.dir(), Direction::Neutral);
    }

    #[test]
    fn fixed_mode_ignores_observations() {
        let mut controller = DirController::new(DirMode::Ltr, "", &DirContext::default());
        assert!(!controller.observe_dir("rtl"));
        assert_eq!(controller.dir(), Direction::Ltr);
    }

    #[test]
    fn escaping_uses_current_direction() {
        let mut controller = auto(LTR_TEXT);
        assert_eq!(
            controller.escape_attribute_value("span", "title", LTR_TEXT),
            LTR_TEXT
        );
        let mut changer = controller.create_text_changer(LTR_TEXT, false).unwrap();
        changer.apply(&mut controller, WEAK_RTL_TEXT);
        assert_eq!(
            controller.escape_attribute_value("span", "title", LTR_TEXT),
            "\u{202A}someText\u{202C}"
        );
    }

    #[test]
    fn config_selects_heuristic() {
        let mut config = DirConfig::default();
        config.bidi.heuristic = HeuristicSetting::FirstStrong;
        let context = DirContext::from_config(&config);
        let controller = DirController::new(DirMode::Auto, WEAK_RTL_TEXT, &context);
        assert_eq!(controller.dir(), Direction::Ltr);
    }
}
