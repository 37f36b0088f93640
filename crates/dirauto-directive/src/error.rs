//! Error types for template compilation.

use thiserror::Error;

/// Result type for directive operations.
pub type Result<T> = std::result::Result<T, DirError>;

/// Errors raised while compiling a template.
#[derive(Error, Debug)]
pub enum DirError {
    /// A directive that adds or removes content on its own sits inside a
    /// `dir="auto"` element, whose direction could then go stale.
    #[error("dir=auto does not support structural directive `{directive}` on a descendant <{tag}>")]
    UnsupportedStructure { directive: String, tag: String },

    /// The template contains no element.
    #[error("template has no root element")]
    EmptyTemplate,

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] dirauto_config::ConfigError),
}
