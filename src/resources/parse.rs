//! # Resource text grammar.
//!
//! A resource is line-oriented text (`\n` or `\r\n`). Every line holds zero or
//! more tokens separated by spaces; every token is an optional single leading
//! `-` followed by decimal digits and must fit in an `i64`.
//!
//! ```text
//! token := "-"? digit+
//! line  := " "* (token (" "+ token)*)? " "*
//! ```
//!
//! Blank lines are ignored. Anything else (`12a`, `+3`, `--1`, a lone `-`,
//! a tab or form feed) is a [`ResourceError::Parse`] for the whole resource.

use crate::error::ResourceError;
use crate::resources::ResourceId;

/// Parses one token according to the grammar above.
///
/// ```
/// use evensum::resources::parse::parse_token;
///
/// assert_eq!(parse_token("-42"), Ok(-42));
/// assert!(parse_token("12a").is_err());
/// assert!(parse_token("+3").is_err());
/// ```
pub fn parse_token(token: &str) -> Result<i64, String> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid token {token:?}"));
    }
    token
        .parse::<i64>()
        .map_err(|_| format!("token {token:?} out of range"))
}

/// True for values strictly greater than zero and divisible by two.
#[inline]
pub fn is_positive_even(value: i64) -> bool {
    value > 0 && value % 2 == 0
}

/// Sums the positive even values of `text`, attributing errors to `resource`.
///
/// ```
/// use evensum::ResourceId;
/// use evensum::resources::parse::sum_positive_evens;
///
/// let sum = sum_positive_evens(ResourceId::new(1), "2\n-4\n3\n").unwrap();
/// assert_eq!(sum, 2);
/// ```
pub fn sum_positive_evens(resource: ResourceId, text: &str) -> Result<u64, ResourceError> {
    let mut sum: u64 = 0;
    for (idx, line) in text.lines().enumerate() {
        for token in line.split(' ').filter(|t| !t.is_empty()) {
            let value = parse_token(token).map_err(|reason| ResourceError::Parse {
                resource,
                line: idx + 1,
                reason,
            })?;
            if !is_positive_even(value) {
                continue;
            }
            sum = sum
                .checked_add(value as u64)
                .ok_or_else(|| ResourceError::Parse {
                    resource,
                    line: idx + 1,
                    reason: "sum overflow".to_string(),
                })?;
        }
    }
    Ok(sum)
}
