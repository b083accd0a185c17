//! Reader configuration types
//!
//! File naming of a definition directory. The defaults match the layout
//! shipped with the diagnostic database; only unusual installs need to
//! change anything here.

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::UdsReader`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Extension shared by all definition files, including the dot
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Stem of the redirect file (segment `DIR`)
    #[serde(default = "default_redirect_stem")]
    pub redirect_stem: String,

    /// Stem of the value-name file (segment `DOP`)
    #[serde(default = "default_value_name_stem")]
    pub value_name_stem: String,

    /// File name pattern of the text dictionary, without extension
    #[serde(default = "default_text_pattern")]
    pub text_pattern: String,

    /// File name pattern of the unit dictionary, without extension
    #[serde(default = "default_unit_pattern")]
    pub unit_pattern: String,

    /// Fall back to an ASCII case-insensitive directory search when an
    /// exact file name does not exist
    #[serde(default = "default_true")]
    pub case_insensitive_files: bool,
}

fn default_file_extension() -> String {
    ".rodtxt".to_string()
}

fn default_redirect_stem() -> String {
    "ReDir".to_string()
}

fn default_value_name_stem() -> String {
    "TTDOP".to_string()
}

fn default_text_pattern() -> String {
    "TTText*".to_string()
}

fn default_unit_pattern() -> String {
    "Unit*".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            file_extension: default_file_extension(),
            redirect_stem: default_redirect_stem(),
            value_name_stem: default_value_name_stem(),
            text_pattern: default_text_pattern(),
            unit_pattern: default_unit_pattern(),
            case_insensitive_files: true,
        }
    }
}

impl ReaderConfig {
    /// Create a new reader configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the definition file extension (leading dot optional)
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.file_extension = if extension.starts_with('.') || extension.is_empty() {
            extension
        } else {
            format!(".{}", extension)
        };
        self
    }

    /// Builder method: set the redirect file stem
    pub fn with_redirect_stem(mut self, stem: impl Into<String>) -> Self {
        self.redirect_stem = stem.into();
        self
    }

    /// Builder method: set the value-name file stem
    pub fn with_value_name_stem(mut self, stem: impl Into<String>) -> Self {
        self.value_name_stem = stem.into();
        self
    }

    /// Builder method: set the text dictionary pattern
    pub fn with_text_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.text_pattern = pattern.into();
        self
    }

    /// Builder method: set the unit dictionary pattern
    pub fn with_unit_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.unit_pattern = pattern.into();
        self
    }

    /// Builder method: enable or disable case-insensitive file lookup
    pub fn with_case_insensitive_files(mut self, enabled: bool) -> Self {
        self.case_insensitive_files = enabled;
        self
    }

    /// File name for a stem, e.g. `RM` -> `RM.rodtxt`
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}{}", stem, self.file_extension)
    }

    /// Extension without the leading dot, as `Path::set_extension` expects it
    pub(crate) fn bare_extension(&self) -> &str {
        self.file_extension.trim_start_matches('.')
    }

    /// True if `stem` names one of the shared tables rather than a module file
    pub fn is_table_stem(&self, stem: &str) -> bool {
        stem.eq_ignore_ascii_case(&self.redirect_stem)
            || stem.eq_ignore_ascii_case(&self.value_name_stem)
            || crate::files::wildcard_match(&self.text_pattern, stem)
            || crate::files::wildcard_match(&self.unit_pattern, stem)
            || crate::types::SegmentKind::ALL
                .iter()
                .any(|kind| stem.eq_ignore_ascii_case(kind.base_file_stem()))
    }
}
