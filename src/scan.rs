use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Positive integer identifier decoded from a QR payload.
///
/// Navigation passes ids as strings; `ItemId` is the validated form used by
/// the lookup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(i64);

impl ItemId {
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ScanError {
    #[error("QR code data is empty")]
    Empty,

    #[error("QR code must contain a valid numeric ID")]
    NotNumeric,

    #[error("ID must be a positive number")]
    NotPositive,
}

/// Validates the raw text decoded from a QR code.
///
/// The parse is deliberately lenient about trailing garbage: an optional
/// sign followed by a base-10 digit prefix is accepted and anything after
/// the last digit is ignored, so "123abc" yields 123. Hex prefixes are not
/// honored; "0x10" parses as 0 and is rejected as non-positive. A digit
/// prefix that does not fit in `i64` is rejected as non-numeric.
pub fn validate_payload(raw: &str) -> Result<ItemId, ScanError> {
    if raw.is_empty() {
        return Err(ScanError::Empty);
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScanError::Empty);
    }

    let (negative, digits_onward) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let prefix_len = digits_onward
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits_onward.len());

    if prefix_len == 0 {
        return Err(ScanError::NotNumeric);
    }

    let magnitude: i64 = digits_onward[..prefix_len]
        .parse()
        .map_err(|_| ScanError::NotNumeric)?;

    let value = if negative { -magnitude } else { magnitude };
    if value <= 0 {
        return Err(ScanError::NotPositive);
    }

    Ok(ItemId(value))
}
