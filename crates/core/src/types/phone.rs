//! Contact phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhoneError {
    /// The input contains no digits.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains something other than digits and separators.
    #[error("phone number contains an invalid character '{found}'")]
    InvalidCharacter {
        /// The first offending character.
        found: char,
    },
    /// The number of digits is wrong.
    #[error("phone number must have exactly {expected} digits (got {actual})")]
    WrongLength {
        /// Required digit count.
        expected: usize,
        /// Digit count after removing separators.
        actual: usize,
    },
    /// The number does not start with the required country prefix.
    #[error("phone number must start with +{expected}")]
    WrongPrefix {
        /// Required country prefix.
        expected: String,
    },
}

/// The shape a valid phone number must have.
///
/// Defaults to Uzbek mobile numbers: `+998` followed by nine digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneRule {
    /// Country calling code, digits only (e.g., "998").
    pub country_prefix: String,
    /// Total digit count including the country prefix.
    pub digits: usize,
}

impl Default for PhoneRule {
    fn default() -> Self {
        Self {
            country_prefix: "998".to_owned(),
            digits: 12,
        }
    }
}

/// A validated phone number, stored as its digits only.
///
/// ## Constraints
///
/// - Separators (spaces, `-`, `(`, `)`, `.`) are ignored, as is a single
///   leading `+`
/// - The remaining characters must all be ASCII digits
/// - The digit count must equal [`PhoneRule::digits`]
/// - The digits must start with [`PhoneRule::country_prefix`]
///
/// ## Examples
///
/// ```
/// use presto_core::{PhoneNumber, PhoneRule};
///
/// let rule = PhoneRule::default();
/// assert!(PhoneNumber::parse("+998 (90) 123-45-67", &rule).is_ok());
/// assert!(PhoneNumber::parse("998901234567", &rule).is_ok());
///
/// assert!(PhoneNumber::parse("", &rule).is_err());              // empty
/// assert!(PhoneNumber::parse("+998 90 123", &rule).is_err());   // too short
/// assert!(PhoneNumber::parse("+7 901 234 56 78", &rule).is_err()); // wrong prefix
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a `PhoneNumber` against a rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Has no digits
    /// - Contains characters other than digits and separators
    /// - Has the wrong number of digits
    /// - Does not start with the country prefix
    pub fn parse(s: &str, rule: &PhoneRule) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix('+').unwrap_or(trimmed);

        let mut digits = String::with_capacity(body.len());
        for ch in body.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
            } else if !is_separator(ch) {
                return Err(PhoneError::InvalidCharacter { found: ch });
            }
        }

        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }

        if digits.len() != rule.digits {
            return Err(PhoneError::WrongLength {
                expected: rule.digits,
                actual: digits.len(),
            });
        }

        if !digits.starts_with(&rule.country_prefix) {
            return Err(PhoneError::WrongPrefix {
                expected: rule.country_prefix.clone(),
            });
        }

        Ok(Self(digits))
    }

    /// Returns the digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns its digits.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the number in international form (`+998901234567`).
    #[must_use]
    pub fn international(&self) -> String {
        format!("+{}", self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}", self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

const fn is_separator(ch: char) -> bool {
    matches!(ch, ' ' | '-' | '(' | ')' | '.')
}
