//! Short code generation and validation utilities.
//!
//! Codes are drawn uniformly from `[A-Za-z0-9]`. Uniqueness is not checked
//! here: the caller draws again when the store reports the code as taken.

use rand::{Rng, distr::Alphanumeric};

/// Default length of generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 10;

/// Accepted range for the configured code length.
pub const CODE_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 6..=64;

/// Generates random alphanumeric short codes of a fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortCodeGenerator {
    length: usize,
}

impl ShortCodeGenerator {
    /// Creates a generator; `length` is clamped to [`CODE_LENGTH_RANGE`].
    pub fn new(length: usize) -> Self {
        Self {
            length: length.clamp(*CODE_LENGTH_RANGE.start(), *CODE_LENGTH_RANGE.end()),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Draws a new code.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let code = ShortCodeGenerator::new(10).generate();
    /// assert_eq!(code.len(), 10);
    /// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    /// ```
    pub fn generate(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

impl Default for ShortCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

/// Checks that `code` could have been produced by a generator.
///
/// Any length within [`CODE_LENGTH_RANGE`] is accepted so that links survive
/// a change of the configured length.
pub fn is_valid_code(code: &str) -> bool {
    CODE_LENGTH_RANGE.contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphanumeric())
}
