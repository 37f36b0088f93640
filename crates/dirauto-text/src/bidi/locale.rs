//! Locale direction lookup for `dir="locale"`.

use crate::bidi::Direction;

/// Primary language subtags written right-to-left by default.
const RTL_LANGUAGES: &[&str] = &[
    "ar", "ckb", "dv", "he", "iw", "fa", "nqo", "ps", "sd", "ug", "ur", "yi",
];

/// Script subtags that are right-to-left.
const RTL_SCRIPTS: &[&str] = &["adlm", "arab", "hebr", "nkoo", "rohg", "thaa"];

/// Script subtags that switch an RTL language back to LTR.
const LTR_SCRIPTS: &[&str] = &["latn", "cyrl"];

fn matches_any(subtag: &str, set: &[&str]) -> bool {
    set.iter().any(|candidate| subtag.eq_ignore_ascii_case(candidate))
}

/// `true` for locale ids such as `ar`, `he-IL`, `fa_IR` or `pa-Arab`.
///
/// A later Latin or Cyrillic script subtag wins over an RTL language or
/// script (`az-Arab-Latn` is LTR, `ar-Latn` is LTR).
pub fn is_rtl_locale(locale_id: &str) -> bool {
    let subtags: Vec<&str> = locale_id.trim().split(['-', '_']).collect();
    let Some(primary) = subtags.first() else {
        return false;
    };

    let triggers = subtags
        .iter()
        .enumerate()
        .filter(|(idx, subtag)| {
            if *idx == 0 {
                matches_any(primary, RTL_LANGUAGES)
            } else {
                matches_any(subtag, RTL_SCRIPTS)
            }
        })
        .map(|(idx, _)| idx);

    for trigger in triggers {
        let overridden = subtags[trigger + 1..]
            .iter()
            .any(|subtag| matches_any(subtag, LTR_SCRIPTS));
        if !overridden {
            return true;
        }
    }
    false
}

/// Direction of the locale's script.
pub fn locale_direction(locale_id: &str) -> Direction {
    if is_rtl_locale(locale_id) {
        Direction::Rtl
    } else {
        Direction::Ltr
    }
}
