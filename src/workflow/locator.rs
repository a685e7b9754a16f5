//! Named element locators of the register pages

use std::time::Duration;

use crate::models::Section;

/// Every element the workflow touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// Search form: region code
    RegionInput,
    /// Search form: book number
    NumberInput,
    /// Search form: check digit
    CheckDigitInput,
    /// Search form: submit button
    SearchButton,
    /// Result area holding the "not found" message
    ResultSection,
    BookNumber,
    BookType,
    /// Address line, absent for some book types
    Location,
    /// Owner block, absent for some book types
    Owner,
    /// "Plain printout" button
    PlainPrintout,
    /// Section button on the printout page
    SectionButton(Section),
}

impl Locator {
    /// CSS selector
    pub fn css(&self) -> String {
        match self {
            Locator::RegionInput => "#kodWydzialuInput".to_string(),
            Locator::NumberInput => "#numerKsiegiWieczystej".to_string(),
            Locator::CheckDigitInput => "#cyfraKontrolna".to_string(),
            Locator::SearchButton => "#wyszukaj".to_string(),
            Locator::ResultSection => "div.section".to_string(),
            Locator::BookNumber => header_field(1),
            Locator::BookType => header_field(2),
            Locator::Location => format!("{} > p", header_field(6)),
            Locator::Owner => header_field(7),
            Locator::PlainPrintout => "#przyciskWydrukZwykly".to_string(),
            Locator::SectionButton(section) => {
                format!(r#"input[value="{}"]"#, section.button_label())
            }
        }
    }

    /// Optional elements are looked up once instead of waited for
    pub fn is_optional(&self) -> bool {
        matches!(self, Locator::Location | Locator::Owner)
    }

    /// Wait budget, given the configured element timeout
    pub fn timeout(&self, element_timeout: Duration) -> Duration {
        if self.is_optional() {
            Duration::ZERO
        } else {
            element_timeout
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::SectionButton(section) => write!(f, "SectionButton({})", section),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Value cell of the n-th row of the book header table
fn header_field(row: usize) -> String {
    format!(
        "#content-wrapper > div > div:nth-child(4) > div:nth-child({}) > div.content-column-50 > div",
        row
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_selectors() {
        assert_eq!(Locator::RegionInput.css(), "#kodWydzialuInput");
        assert_eq!(Locator::SearchButton.css(), "#wyszukaj");
    }

    #[test]
    fn test_section_button_selector() {
        assert_eq!(
            Locator::SectionButton(Section::ISp).css(),
            r#"input[value="Dział I-Sp"]"#
        );
    }

    #[test]
    fn test_header_selectors() {
        assert!(Locator::BookType.css().contains("div:nth-child(2) > div.content-column-50"));
        assert!(Locator::Location.css().ends_with("> div > p"));
    }

    #[test]
    fn test_timeouts() {
        let timeout = Duration::from_secs(60);
        assert_eq!(Locator::BookNumber.timeout(timeout), timeout);
        assert_eq!(Locator::Owner.timeout(timeout), Duration::ZERO);
        assert_eq!(Locator::SectionButton(Section::IO).to_string(), "SectionButton(I-O)");
    }
}
