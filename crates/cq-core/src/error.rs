//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CqError` as one variant
//! via `#[from]`.

use thiserror::Error;

use crate::ClassId;

/// Configuration and setup errors.  All of them are fatal before the first
/// epoch runs; nothing in the epoch loop itself returns `CqError`.
#[derive(Debug, Error)]
pub enum CqError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{what} has length {got}, expected {expected}")]
    LengthMismatch {
        what:     &'static str,
        expected: usize,
        got:      usize,
    },

    #[error("class {0} is not configured")]
    UnknownClass(ClassId),
}

/// Shorthand result type for all `cq-*` crates.
pub type CqResult<T> = Result<T, CqError>;
