//! dirauto-directive: `dir="auto"` for HTML templates.
//!
//! Computes an element's direction from the text it contains, keeps it in
//! sync as bound text changes, resolves `dir="locale"` and escapes
//! interpolated attribute values that run against their element's
//! direction.
//!
//! ```
//! use dirauto_directive::{Scope, View};
//!
//! let mut view = View::compile(r#"<div dir="auto">{{text}}</div>"#).unwrap();
//! let mut scope = Scope::new();
//! scope.set("text", "\u{05e9}\u{05dc}\u{05d5}\u{05dd}");
//! view.digest(&scope);
//! assert_eq!(view.dir_property(view.root()), "rtl");
//! ```

pub mod controller;
pub mod error;
pub mod escape;
pub mod locale;
pub mod mode;
pub mod template;
pub mod view;

pub use controller::{DirContext, DirController, TextChanger};
pub use error::{DirError, Result};
pub use escape::EscapePolicy;
pub use locale::{LocaleId, LocaleProvider};
pub use mode::DirMode;
pub use template::{Interpolation, Scope};
pub use view::{NodeId, STRUCTURAL_DIRECTIVES, View};
