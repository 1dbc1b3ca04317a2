//! Error types
//!
//! Most failure modes in the hero widgets are handled in place (skipped
//! frames, degenerate geometry). What remains are usage and setup errors.

use thiserror::Error;

/// Errors surfaced by the hero widgets.
#[derive(Error, Debug)]
pub enum HeroError {
    /// Toast API used without a live `ToastProvider`.
    #[error("toast API used outside of a ToastProvider")]
    NoToastProvider,

    /// Settings JSON could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// Settings parsed but hold a value the widgets cannot run with.
    #[error("invalid setting `{field}`: {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    /// A required page element was not found while mounting.
    #[error("missing page element: {0}")]
    MissingElement(String),
}
