//! Link entities: owners, short codes and stored link records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// Number of characters in every generated short code.
pub const SHORT_CODE_LEN: usize = 16;

/// Opaque identity of the caller who created a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Owner(String);

impl Owner {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Owner {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 16-character lowercase hexadecimal short code.
///
/// Codes are minted by [`crate::utils::code_generator::generate_code`];
/// parsing via [`FromStr`] accepts only the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    /// Wraps a string without checking its shape.
    ///
    /// Used for values read back from a store that only ever holds
    /// generated codes.
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ShortCode {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != SHORT_CODE_LEN {
            return Err(StoreError::invalid_input(format!(
                "short code must be {SHORT_CODE_LEN} characters, got {}",
                s.len()
            )));
        }

        if !s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
            return Err(StoreError::invalid_input(
                "short code must be lowercase hexadecimal",
            ));
        }

        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored mapping from short code to origin.
///
/// `is_deleted` only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub short_code: ShortCode,
    pub origin: String,
    pub is_deleted: bool,
}

impl LinkRecord {
    pub fn new(short_code: ShortCode, origin: String) -> Self {
        Self {
            short_code,
            origin,
            is_deleted: false,
        }
    }

    /// Marks the record deleted. Returns `true` if the flag changed.
    pub fn mark_deleted(&mut self) -> bool {
        let changed = !self.is_deleted;
        self.is_deleted = true;
        changed
    }
}

/// Result of saving an origin for an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedLink {
    pub code: ShortCode,
    /// `false` when the owner had already shortened this origin and the
    /// existing code was returned.
    pub created: bool,
}

impl SavedLink {
    pub fn created(code: ShortCode) -> Self {
        Self {
            code,
            created: true,
        }
    }

    pub fn existing(code: ShortCode) -> Self {
        Self {
            code,
            created: false,
        }
    }
}

/// Aggregate counters over a whole store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StoreStats {
    /// Distinct owners with at least one link.
    pub owners: u64,
    /// Links ever created, deleted ones included.
    pub links: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_code_parse_valid() {
        let code: ShortCode = "0123456789abcdef".parse().unwrap();
        assert_eq!(code.as_str(), "0123456789abcdef");
    }

    #[test]
    fn test_short_code_parse_wrong_length() {
        let result = "abc123".parse::<ShortCode>();
        assert!(matches!(result, Err(StoreError::InvalidInput(_))));
    }

    #[test]
    fn test_short_code_parse_uppercase_rejected() {
        let result = "0123456789ABCDEF".parse::<ShortCode>();
        assert!(matches!(result, Err(StoreError::InvalidInput(_))));
    }

    #[test]
    fn test_short_code_parse_non_hex_rejected() {
        let result = "0123456789abcdeg".parse::<ShortCode>();
        assert!(result.is_err());
    }

    #[test]
    fn test_mark_deleted_is_monotone() {
        let mut record = LinkRecord::new(
            ShortCode::new_unchecked("0123456789abcdef"),
            "http://a.test".to_string(),
        );

        assert!(!record.is_deleted);
        assert!(record.mark_deleted());
        assert!(record.is_deleted);
        assert!(!record.mark_deleted());
        assert!(record.is_deleted);
    }

    #[test]
    fn test_saved_link_constructors() {
        let code = ShortCode::new_unchecked("0123456789abcdef");
        assert!(SavedLink::created(code.clone()).created);
        assert!(!SavedLink::existing(code).created);
    }

    #[test]
    fn test_owner_serializes_as_plain_string() {
        let owner = Owner::from("u1");
        assert_eq!(serde_json::to_string(&owner).unwrap(), "\"u1\"");
    }
}
