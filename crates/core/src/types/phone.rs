//! Bangladeshi mobile phone numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input is not an 11-digit `01XXXXXXXXX` number.
    #[error("enter a valid 11-digit Bangladeshi number (01XXXXXXXXX)")]
    Invalid,
}

/// A mobile number in local `01XXXXXXXXX` form.
///
/// Spaces and dashes are ignored, and the `+880` / `880` country prefix is
/// folded into the local leading zero so that the unique phone constraint on
/// `person` sees one spelling per number.
///
/// ```
/// use chaldal_core::Phone;
///
/// assert_eq!(Phone::parse("+880 1711-223344").unwrap().as_str(), "01711223344");
/// assert!(Phone::parse("1711223344").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Number of digits in the local form.
    pub const LOCAL_DIGITS: usize = 11;

    /// Parse and normalize a phone number.
    ///
    /// # Errors
    ///
    /// Returns `PhoneError::Empty` for blank input and `PhoneError::Invalid`
    /// for anything that does not normalize to `01` followed by nine digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let compact: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();

        if compact.is_empty() {
            return Err(PhoneError::Empty);
        }

        let digits = compact.strip_prefix('+').unwrap_or(&compact);
        let local = match digits.strip_prefix("880") {
            Some(rest) => format!("0{rest}"),
            None => digits.to_owned(),
        };

        let valid = local.len() == Self::LOCAL_DIGITS
            && local.starts_with("01")
            && local.chars().all(|c| c.is_ascii_digit());

        if !valid {
            return Err(PhoneError::Invalid);
        }

        Ok(Self(local))
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Operator prefix and last three digits only, for logs: `017*****344`.
    #[must_use]
    pub fn masked(&self) -> String {
        let (head, rest) = self.0.split_at_checked(3).unwrap_or((&self.0, ""));
        let tail = rest.get(rest.len().saturating_sub(3)..).unwrap_or_default();
        format!("{head}*****{tail}")
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_form() {
        assert_eq!(Phone::parse("01711223344").unwrap().as_str(), "01711223344");
    }

    #[test]
    fn test_parse_strips_separators() {
        assert_eq!(
            Phone::parse(" 017-1122 3344 ").unwrap().as_str(),
            "01711223344"
        );
    }

    #[test]
    fn test_parse_country_prefix() {
        assert_eq!(
            Phone::parse("+8801911000111").unwrap().as_str(),
            "01911000111"
        );
        assert_eq!(
            Phone::parse("8801911000111").unwrap().as_str(),
            "01911000111"
        );
    }

    #[test]
    fn test_masked_hides_subscriber_digits() {
        let phone = Phone::parse("01711223344").unwrap();
        assert_eq!(phone.masked(), "017*****344");
        assert!(!phone.masked().contains("11223"));
    }

    #[test]
    fn test_parse_rejects_bad_numbers() {
        assert_eq!(Phone::parse(""), Err(PhoneError::Empty));
        assert_eq!(Phone::parse("0171122334"), Err(PhoneError::Invalid));
        assert_eq!(Phone::parse("021122334455"), Err(PhoneError::Invalid));
        assert_eq!(Phone::parse("0171122334x"), Err(PhoneError::Invalid));
        assert_eq!(Phone::parse("02711223344"), Err(PhoneError::Invalid));
    }
}
