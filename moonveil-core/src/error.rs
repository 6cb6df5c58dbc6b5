//! Errors for constructs a pass declines to transform.
//!
//! These never abort a run. A pass that hits one logs it at debug level and
//! emits the original text for that construct, so the output script stays
//! runnable no matter what the input looks like.

use thiserror::Error;

/// Why a single literal was left unchanged.
#[derive(Debug, Error)]
pub enum SkipReason {
    /// The numeric value cannot be split without changing what it evaluates
    /// to, e.g. an integer past f64's exact range.
    #[error("numeric literal cannot be split exactly: {0}")]
    UnsupportedLiteral(String),

    /// The string literal uses an escape or form the decoder does not
    /// understand, so its runtime bytes are unknown.
    #[error("string literal cannot be decoded: {0}")]
    UndecodableString(String),
}
