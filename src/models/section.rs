/// Register sections, in the order the printout shows them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Dział I-O, property designation
    IO,
    /// Dział I-Sp, rights attached to ownership
    ISp,
    /// Dział II, ownership
    II,
    /// Dział III, limited rights and restrictions
    III,
    /// Dział IV, mortgages
    IV,
}

impl Section {
    /// Fixed extraction order
    pub const ALL: [Section; 5] = [
        Section::IO,
        Section::ISp,
        Section::II,
        Section::III,
        Section::IV,
    ];

    /// Short name used in logs
    pub fn name(self) -> &'static str {
        match self {
            Section::IO => "I-O",
            Section::ISp => "I-Sp",
            Section::II => "II",
            Section::III => "III",
            Section::IV => "IV",
        }
    }

    /// Label of the section button on the printout page
    pub fn button_label(self) -> String {
        format!("Dział {}", self.name())
    }

    /// File stem of the section's artifacts
    pub fn file_stem(self) -> String {
        format!("dzial_{}", self.name())
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Artifact kinds a section can be captured as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    Pdf,
    Png,
    Text,
}

impl CaptureKind {
    pub fn extension(self) -> &'static str {
        match self {
            CaptureKind::Pdf => "pdf",
            CaptureKind::Png => "png",
            CaptureKind::Text => "txt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_labels() {
        assert_eq!(Section::IO.button_label(), "Dział I-O");
        assert_eq!(Section::ISp.file_stem(), "dzial_I-Sp");
        assert_eq!(Section::IV.to_string(), "IV");
    }

    #[test]
    fn test_order() {
        let names: Vec<_> = Section::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["I-O", "I-Sp", "II", "III", "IV"]);
    }
}
