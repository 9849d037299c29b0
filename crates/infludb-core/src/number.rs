//! Parsing of human-formatted follower counts such as `"12.3K"` or `"1,234"`.
//!
//! Arithmetic is done on the decimal digits directly rather than through
//! `f64`, so `"4.1K"` yields exactly 4100.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not parse number from \"{input}\"")]
pub struct ParseError {
    pub input: String,
}

/// Convert a human-formatted count into an integer.
///
/// - surrounding and inner whitespace is ignored
/// - a trailing `K`/`k` multiplies by 1,000 and `M`/`m` by 1,000,000
/// - `,` thousands separators are stripped
/// - a decimal mantissa is accepted; any fractional remainder after scaling
///   is truncated
///
/// # Errors
///
/// Returns [`ParseError`] if nothing numeric remains after separator and
/// suffix removal, or if the value does not fit in a `u64`.
pub fn parse_number(text: &str) -> Result<u64, ParseError> {
    let err = || ParseError {
        input: text.to_string(),
    };

    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    let (mantissa, multiplier): (&str, u64) = match compact.chars().last() {
        Some('k' | 'K') => (&compact[..compact.len() - 1], 1_000),
        Some('m' | 'M') => (&compact[..compact.len() - 1], 1_000_000),
        Some(_) => (compact.as_str(), 1),
        None => return Err(err()),
    };

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(err());
    }
    if !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(err());
    }

    let whole_value: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| err())?
    };
    let scaled_whole = whole_value.checked_mul(multiplier).ok_or_else(err)?;

    // Only the fraction digits that can still matter after scaling.
    let mut fraction_value = 0u64;
    let mut scale = multiplier;
    for digit in fraction.chars() {
        scale /= 10;
        if scale == 0 {
            break;
        }
        let d = u64::from(digit.to_digit(10).ok_or_else(err)?);
        fraction_value += d * scale;
    }

    scaled_whole.checked_add(fraction_value).ok_or_else(err)
}
