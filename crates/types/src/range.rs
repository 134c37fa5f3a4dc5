use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

use crate::luhn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("range bound '{field}' is empty")]
    EmptyBound { field: &'static str },

    #[error("range bound '{field}' is not numeric: {value}")]
    NonNumericBound { field: &'static str, value: String },

    #[error("range bounds differ in length: start has {start_len} digits, end has {end_len}")]
    LengthMismatch { start_len: usize, end_len: usize },

    #[error("range start {start} is greater than end {end}")]
    Inverted { start: String, end: String },
}

/// Inclusive ICCID range identifying eSIM profiles.
///
/// Bounds are fixed-length digit strings, so equal-length identifiers can be
/// compared lexicographically without parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRange", into = "RawRange")]
pub struct IdentifierRange {
    start: String,
    end: String,
}

#[derive(Serialize, Deserialize)]
struct RawRange {
    start: String,
    end: String,
}

impl TryFrom<RawRange> for IdentifierRange {
    type Error = RangeError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl From<IdentifierRange> for RawRange {
    fn from(range: IdentifierRange) -> Self {
        RawRange {
            start: range.start,
            end: range.end,
        }
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn check_bound(field: &'static str, value: &str) -> Result<(), RangeError> {
    if value.is_empty() {
        return Err(RangeError::EmptyBound { field });
    }
    if !is_digits(value) {
        return Err(RangeError::NonNumericBound {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

impl IdentifierRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Result<Self, RangeError> {
        let start = start.into().trim().to_string();
        let end = end.into().trim().to_string();

        check_bound("start", &start)?;
        check_bound("end", &end)?;

        if start.len() != end.len() {
            return Err(RangeError::LengthMismatch {
                start_len: start.len(),
                end_len: end.len(),
            });
        }

        if start > end {
            return Err(RangeError::Inverted { start, end });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    /// Number of digits in each bound.
    pub fn width(&self) -> usize {
        self.start.len()
    }

    /// Decides whether `identifier` denotes an eSIM profile.
    ///
    /// - same width as the bounds: lexicographic `start <= id <= end`
    /// - one digit wider: the last digit must be a valid Luhn check digit,
    ///   after which the stripped value is compared as above
    /// - any other width: integer comparison of the values
    ///
    /// Never panics; empty or non-numeric input is simply not an eSIM.
    pub fn is_esim(&self, identifier: &str) -> bool {
        self.canonical(identifier).is_some()
    }

    /// The ICCID to use for `identifier` when it is an eSIM.
    ///
    /// A Luhn check digit is stripped, so both forms of one profile map to
    /// the same value. Other matching identifiers are returned unchanged.
    pub fn canonical<'a>(&self, identifier: &'a str) -> Option<&'a str> {
        if !is_digits(identifier) {
            return None;
        }

        let width = self.width();
        let candidate = match identifier.len().cmp(&width) {
            Ordering::Equal => identifier,
            Ordering::Greater if identifier.len() == width + 1 => {
                if !luhn::is_valid(identifier) {
                    return None;
                }
                &identifier[..width]
            }
            _ => {
                return self.contains_numeric(identifier).then_some(identifier);
            }
        };

        self.contains_same_width(candidate).then_some(candidate)
    }

    fn contains_same_width(&self, identifier: &str) -> bool {
        self.start.as_str() <= identifier && identifier <= self.end.as_str()
    }

    /// Integer comparison of digit strings of any length.
    fn contains_numeric(&self, identifier: &str) -> bool {
        let value = significant_digits(identifier);
        compare_numeric(significant_digits(&self.start), value) != Ordering::Greater
            && compare_numeric(value, significant_digits(&self.end)) != Ordering::Greater
    }
}

fn significant_digits(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}

/// Orders digit strings without leading zeros by numeric value.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl fmt::Display for IdentifierRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..={}]", self.start, self.end)
    }
}
