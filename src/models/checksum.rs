//! Check digit of a land-register book number
//!
//! The register validates `REGION + NUMBER` (12 characters) with a weighted
//! sum mod 10. Letters map through a 23-letter alphabet that has no Q, V or X.

use crate::error::IdentifierError;

/// Letters allowed in a region code, 1-based
const ALPHABET: &str = "ABCDEFGHIJKLMNOPRSTUWYZ";

/// Positional weights
const WEIGHTS: [u32; 12] = [1, 3, 7, 1, 3, 7, 1, 3, 7, 1, 3, 7];

const CODE_LEN: usize = 12;
const REGION_LEN: usize = 4;

/// Computes the check digit for `REGION/NUMBER` (or `REGIONNUMBER`)
///
/// # Arguments
/// - `code`: region code followed by the 8-digit book number, `/` separators allowed
///
/// # Returns
/// The check digit 0-9, or `InvalidIdentifier` for any character outside the
/// register's alphabet
pub fn checksum(code: &str) -> Result<u8, IdentifierError> {
    let normalized: Vec<char> = code
        .chars()
        .filter(|c| *c != '/')
        .flat_map(char::to_uppercase)
        .collect();

    if normalized.len() != CODE_LEN {
        return Err(IdentifierError::invalid(
            code,
            format!("expected {} characters, got {}", CODE_LEN, normalized.len()),
        ));
    }

    let mut sum = 0u32;
    for (pos, ch) in normalized.iter().enumerate() {
        let value = match pos {
            0 | 1 | 3 => letter_value(*ch),
            2 => ch.to_digit(10).or_else(|| letter_value(*ch)),
            _ => ch.to_digit(10),
        }
        .ok_or_else(|| {
            IdentifierError::invalid(code, format!("unexpected '{}' at position {}", ch, pos))
        })?;
        sum += value * WEIGHTS[pos];
    }

    Ok((sum % 10) as u8)
}

/// Checks that a region code is four characters the checksum accepts
pub fn validate_region(region: &str) -> Result<(), IdentifierError> {
    if region.chars().count() != REGION_LEN {
        return Err(IdentifierError::invalid(
            region,
            format!("region must have {} characters", REGION_LEN),
        ));
    }
    checksum(&format!("{}00000000", region)).map(|_| ())
}

fn letter_value(ch: char) -> Option<u32> {
    ALPHABET.find(ch).map(|idx| idx as u32 + 1)
}
