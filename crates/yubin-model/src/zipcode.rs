use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::family::ValidationError;

pub const ZIPCODE_LEN: usize = 7;

/// Seven-digit postal code kept as text so leading zeros survive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZipCode(String);

impl ZipCode {
    /// Accepts `0600000` and `060-0000`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        let digits: String = match s.split_once('-') {
            Some((head, tail)) if head.len() == 3 && tail.len() == 4 => format!("{head}{tail}"),
            Some(_) => {
                return Err(ValidationError(format!(
                    "zipcode `{s}` must be NNNNNNN or NNN-NNNN"
                )))
            }
            None => s.to_string(),
        };
        if digits.len() != ZIPCODE_LEN || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError(format!(
                "zipcode `{s}` must be {ZIPCODE_LEN} ASCII digits"
            )));
        }
        Ok(Self(digits))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for ZipCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::ZipCode;

    #[test]
    fn parse_accepts_plain_and_hyphenated_forms() {
        assert_eq!(ZipCode::parse("0600000").expect("plain").as_str(), "0600000");
        assert_eq!(ZipCode::parse(" 060-0000 ").expect("dash").as_str(), "0600000");
    }

    #[test]
    fn parse_rejects_wrong_shapes() {
        for bad in ["", "060000", "06000000", "0600-000", "06OOOOO", "060-00-00"] {
            assert!(ZipCode::parse(bad).is_err(), "{bad} must be rejected");
        }
    }
}
