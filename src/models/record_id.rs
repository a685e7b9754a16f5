use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::IdentifierError;
use crate::models::checksum::{checksum, validate_region};

/// Highest book number the register can express (8 digits)
pub const MAX_BOOK_NUMBER: u32 = 99_999_999;

/// Land-register book identifier, `REGION/NNNNNNNN/D`
///
/// Always carries the check digit that matches its region and number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId {
    region: String,
    number: u32,
    check_digit: u8,
}

impl RecordId {
    /// Builds an identifier and computes its check digit
    pub fn new(region: &str, number: u32) -> Result<Self, IdentifierError> {
        if number > MAX_BOOK_NUMBER {
            return Err(IdentifierError::invalid(
                format!("{}/{}", region, number),
                format!("book number exceeds {}", MAX_BOOK_NUMBER),
            ));
        }
        let region = region.to_uppercase();
        validate_region(&region)?;
        let check_digit = checksum(&format!("{}{:08}", region, number))?;

        Ok(Self {
            region,
            number,
            check_digit,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn check_digit(&self) -> u8 {
        self.check_digit
    }

    /// Book number as typed into the search form
    pub fn padded_number(&self) -> String {
        format!("{:08}", self.number)
    }

    /// Per-record directory name, `NNNNNNNN-D`
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.padded_number(), self.check_digit)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:08}/{}", self.region, self.number, self.check_digit)
    }
}

impl FromStr for RecordId {
    type Err = IdentifierError;

    /// Parses `REGION/NNNNNNNN/D`, rejecting a digit that does not match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        let [region, number, digit] = parts.as_slice() else {
            return Err(IdentifierError::invalid(s, "expected REGION/NUMBER/DIGIT"));
        };

        if number.len() != 8 {
            return Err(IdentifierError::invalid(s, "book number must have 8 digits"));
        }
        let number: u32 = number
            .parse()
            .map_err(|_| IdentifierError::invalid(s, "book number is not numeric"))?;
        let digit: u8 = digit
            .parse()
            .map_err(|_| IdentifierError::invalid(s, "check digit is not numeric"))?;

        let id = Self::new(region, number)?;
        if id.check_digit != digit {
            return Err(IdentifierError::invalid(
                s,
                format!("check digit should be {}", id.check_digit),
            ));
        }
        Ok(id)
    }
}
