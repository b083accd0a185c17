//! Text and unit dictionaries
//!
//! A dictionary maps a numeric key to the text fields following it on its
//! row. It is loaded from exactly one file found by name pattern.

use crate::fields::parse_u32;
use crate::files::find_unique_file;
use crate::segments::{extract_segment, Row};
use crate::types::{DecoderError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Segment marker of the general text dictionary
pub const TEXT_SEGMENT: &str = "TXT";
/// Segment marker of the unit dictionary
pub const UNIT_SEGMENT: &str = "UNT";

/// Key to text fields mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDictionary {
    entries: HashMap<u32, Vec<String>>,
}

impl TextDictionary {
    /// Locate the single file matching `file_pattern` in `dir` and build the
    /// dictionary from its `segment_name` segment.
    pub fn load(dir: &Path, file_pattern: &str, segment_name: &str) -> Result<Self> {
        let path = find_unique_file(dir, file_pattern)?;
        log::debug!("Loading [{}] dictionary from {:?}", segment_name, path);

        let rows = extract_segment(&[&path], segment_name)?;
        let dict = Self::from_rows(rows).map_err(|e| match e {
            DecoderError::Format(msg) => DecoderError::Format(format!("{:?}: {}", path, msg)),
            other => other,
        })?;

        log::debug!("Dictionary {:?}: {} keys", path, dict.len());
        Ok(dict)
    }

    /// Build from rows of `key,text...`.
    ///
    /// Every row needs a key and at least one text field, and keys must be
    /// unique.
    pub fn from_rows(rows: Vec<Row>) -> Result<Self> {
        let mut entries = HashMap::with_capacity(rows.len());

        for (line, mut row) in rows.into_iter().enumerate() {
            if row.len() < 2 {
                return Err(DecoderError::Format(format!(
                    "Dictionary row {} has {} fields, expected at least 2",
                    line + 1,
                    row.len()
                )));
            }

            let key = parse_u32(&row[0]).ok_or_else(|| {
                DecoderError::Format(format!(
                    "Dictionary row {}: invalid key {:?}",
                    line + 1,
                    row[0]
                ))
            })?;

            if entries.contains_key(&key) {
                return Err(DecoderError::Format(format!(
                    "Dictionary row {}: duplicate key {}",
                    line + 1,
                    key
                )));
            }

            row.remove(0);
            entries.insert(key, row);
        }

        Ok(Self { entries })
    }

    /// Text fields stored under `key`
    pub fn get(&self, key: u32) -> Option<&[String]> {
        self.entries.get(&key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
