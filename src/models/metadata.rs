//! Header data scraped from a found book
//!
//! One [`ExtractedMetadata`] becomes exactly one CSV row of 9 fields.

/// Number of address fields in a CSV row
pub const LOCATION_FIELDS: usize = 6;

/// Fields per CSV row: book number, book type, location, owner
pub const CSV_FIELDS: usize = 2 + LOCATION_FIELDS + 1;

const CSV_DELIMITER: &str = ";";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMetadata {
    pub book_number: String,
    pub book_type: String,
    /// Comma-split address fragments
    pub location: Vec<String>,
    pub owner: String,
}

impl ExtractedMetadata {
    /// Splits the location line on commas
    pub fn parse_location(line: &str) -> Vec<String> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }
        line.split(',').map(|part| part.trim().to_string()).collect()
    }

    /// Renders the CSV line (without the trailing newline)
    ///
    /// Location is padded or truncated to [`LOCATION_FIELDS`]. Owner lines
    /// are joined with `, ` so the row keeps [`CSV_FIELDS`] fields.
    pub fn csv_row(&self) -> String {
        let mut fields = Vec::with_capacity(CSV_FIELDS);
        fields.push(sanitize(&self.book_number));
        fields.push(sanitize(&self.book_type));
        fields.extend(
            self.location
                .iter()
                .map(|part| sanitize(part))
                .chain(std::iter::repeat(String::new()))
                .take(LOCATION_FIELDS),
        );
        fields.push(sanitize(&self.owner));

        fields.join(CSV_DELIMITER)
    }
}

/// Collapses line breaks and delimiters inside a field
fn sanitize(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
        .replace(CSV_DELIMITER, ",")
}
