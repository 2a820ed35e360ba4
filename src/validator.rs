//! Final length and content checks for a candidate post.

use crate::persona::LengthBounds;

/// Why a candidate post was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    /// Nothing left after normalization.
    #[error("empty")]
    Empty,
    /// Shorter than the active minimum.
    #[error("too short: {len} chars, minimum {min}")]
    TooShort {
        /// Candidate length in chars.
        len: usize,
        /// Active minimum.
        min: usize,
    },
    /// Longer than the active maximum.
    #[error("too long: {len} chars, maximum {max}")]
    TooLong {
        /// Candidate length in chars.
        len: usize,
        /// Active maximum.
        max: usize,
    },
    /// No alphabetic character anywhere in the text.
    #[error("no alphabetic content")]
    NoAlphabetic,
}

/// Check `text` against `bounds`. Length is counted in chars.
///
/// # Errors
///
/// Returns the first failing check.
pub fn validate(text: &str, bounds: LengthBounds) -> Result<(), ValidationFailure> {
    if text.trim().is_empty() {
        return Err(ValidationFailure::Empty);
    }
    let len = text.chars().count();
    if len < bounds.min {
        return Err(ValidationFailure::TooShort {
            len,
            min: bounds.min,
        });
    }
    if len > bounds.max {
        return Err(ValidationFailure::TooLong {
            len,
            max: bounds.max,
        });
    }
    if !text.chars().any(char::is_alphabetic) {
        return Err(ValidationFailure::NoAlphabetic);
    }
    Ok(())
}
