//! `{{name}}` interpolation over a flat string scope.

use std::collections::BTreeMap;

/// Values available to interpolations and bindings.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    values: BTreeMap<String, String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Value bound to `key`; unbound keys read as the empty string.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key.trim()).map(String::as_str).unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Scope {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut scope = Scope::new();
        for (key, value) in iter {
            scope.set(key, value);
        }
        scope
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Expr(String),
}

/// A string with one or more `{{expr}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
    parts: Vec<Part>,
}

impl Interpolation {
    /// Returns `None` when `source` has no complete placeholder.
    pub fn parse(source: &str) -> Option<Self> {
        let mut parts = Vec::new();
        let mut rest = source;
        let mut has_expr = false;

        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                break;
            };
            if start > 0 {
                parts.push(Part::Literal(rest[..start].to_string()));
            }
            let expr = rest[start + 2..start + 2 + len].trim();
            parts.push(Part::Expr(expr.to_string()));
            has_expr = true;
            rest = &rest[start + 2 + len + 2..];
        }
        if !rest.is_empty() {
            parts.push(Part::Literal(rest.to_string()));
        }

        has_expr.then_some(Self { parts })
    }

    pub fn render(&self, scope: &Scope) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Expr(expr) => out.push_str(scope.get(expr)),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_an_interpolation() {
        assert!(Interpolation::parse("someText").is_none());
        assert!(Interpolation::parse("{{open").is_none());
    }

    #[test]
    fn renders_placeholders_and_literals() {
        let scope: Scope = [("name", "world"), ("n", "2")].into_iter().collect();
        let template = Interpolation::parse("hello {{ name }}, {{n}}x").unwrap();
        assert_eq!(template.render(&scope), "hello world, 2x");
    }

    #[test]
    fn missing_keys_render_empty() {
        let template = Interpolation::parse("<{{missing}}>").unwrap();
        assert_eq!(template.render(&Scope::new()), "<>");
    }

    #[test]
    fn trailing_unterminated_braces_stay_literal() {
        let scope: Scope = [("a", "x")].into_iter().collect();
        let template = Interpolation::parse("{{a}} {{b").unwrap();
        assert_eq!(template.render(&scope), "x {{b");
    }
}
