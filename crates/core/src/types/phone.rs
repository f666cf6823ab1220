//! Phone number type with progressive formatting.
//!
//! Checkout and profile phone numbers use the canonical `NN-NNN-NNNN`
//! format. [`Phone::format_partial`] reshapes arbitrary digit input into
//! that format as the user types, so a prefix of a valid number is always
//! displayed with the separators already in place.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Number of significant digits in a canonical phone number.
const PHONE_DIGITS: usize = 9;

/// Digit offsets after which a `-` separator is inserted.
const SEPARATOR_OFFSETS: [usize; 2] = [2, 5];

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input does not match the canonical `NN-NNN-NNNN` format.
    #[error("phone number must match the format NN-NNN-NNNN")]
    InvalidFormat,
}

/// A phone number in canonical `NN-NNN-NNNN` format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a `Phone` from a string already in canonical format.
    ///
    /// Input that merely contains the right digits but lacks separators is
    /// rejected; run it through [`Phone::format_partial`] first.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::Empty`] for empty input and
    /// [`PhoneError::InvalidFormat`] for anything that is not exactly
    /// `NN-NNN-NNNN`.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        if Self::is_canonical(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(PhoneError::InvalidFormat)
        }
    }

    /// Whether a string is exactly `NN-NNN-NNNN`.
    #[must_use]
    pub fn is_canonical(s: &str) -> bool {
        let bytes = s.as_bytes();
        if bytes.len() != 11 {
            return false;
        }
        bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 6 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
    }

    /// Reformat arbitrary input into a (possibly partial) canonical number.
    ///
    /// Strips every non-digit character, keeps at most the first nine
    /// digits, and re-inserts `-` separators after the second and fifth
    /// digit. A prefix of a valid number formats to a prefix of the
    /// canonical form, so this can run on every keystroke:
    ///
    /// ```
    /// use kingsway_core::Phone;
    ///
    /// assert_eq!(Phone::format_partial(""), "");
    /// assert_eq!(Phone::format_partial("12"), "12");
    /// assert_eq!(Phone::format_partial("12345"), "12-345");
    /// assert_eq!(Phone::format_partial("123456789"), "12-345-6789");
    /// assert_eq!(Phone::format_partial("12-34x5"), "12-345");
    /// // Digits beyond the ninth are ignored
    /// assert_eq!(Phone::format_partial("12345678901"), "12-345-6789");
    /// ```
    #[must_use]
    pub fn format_partial(raw: &str) -> String {
        let mut out = String::with_capacity(PHONE_DIGITS + SEPARATOR_OFFSETS.len());
        let mut digits = 0usize;

        for c in raw.chars().filter(char::is_ascii_digit) {
            if digits == PHONE_DIGITS {
                break;
            }
            if SEPARATOR_OFFSETS.contains(&digits) {
                out.push('-');
            }
            out.push(c);
            digits += 1;
        }

        out
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Phone {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Phone {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Phone {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_partial_progressive() {
        assert_eq!(Phone::format_partial(""), "");
        assert_eq!(Phone::format_partial("1"), "1");
        assert_eq!(Phone::format_partial("12"), "12");
        assert_eq!(Phone::format_partial("123"), "12-3");
        assert_eq!(Phone::format_partial("12345"), "12-345");
        assert_eq!(Phone::format_partial("123456"), "12-345-6");
        assert_eq!(Phone::format_partial("12345678"), "12-345-678");
        assert_eq!(Phone::format_partial("123456789"), "12-345-6789");
    }

    #[test]
    fn test_format_partial_ignores_excess_digits() {
        assert_eq!(Phone::format_partial("12345678901"), "12-345-6789");
        assert_eq!(Phone::format_partial("1234567890123456"), "12-345-6789");
    }

    #[test]
    fn test_format_partial_strips_non_digits() {
        assert_eq!(Phone::format_partial("70-123-4567"), "70-123-4567");
        assert_eq!(Phone::format_partial("(70) 123 4567"), "70-123-4567");
        assert_eq!(Phone::format_partial("7a0b1c2d3"), "70-123");
        assert_eq!(Phone::format_partial("abc"), "");
    }

    #[test]
    fn test_format_partial_is_idempotent() {
        for raw in ["", "12", "12-345", "12-345-678", "70-123-4567"] {
            assert_eq!(Phone::format_partial(raw), raw);
        }
    }

    #[test]
    fn test_parse_canonical() {
        let phone = Phone::parse("70-123-4567").unwrap();
        assert_eq!(phone.as_str(), "70-123-4567");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(Phone::parse(""), Err(PhoneError::Empty)));
    }

    #[test]
    fn test_parse_rejects_unseparated() {
        assert!(matches!(
            Phone::parse("701234567"),
            Err(PhoneError::InvalidFormat)
        ));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "7-0123-4567",
            "70-123-456",
            "70-123-45678",
            "70-1a3-4567",
            "70_123_4567",
        ] {
            assert!(Phone::parse(bad).is_err(), "expected {bad:?} to fail");
        }
    }

    #[test]
    fn test_parse_accepts_format_partial_output() {
        let formatted = Phone::format_partial("701234567");
        assert_eq!(formatted, "70-123-4567");
        assert!(Phone::parse(&formatted).is_ok());
    }
}
