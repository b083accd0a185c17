//! Redirect table
//!
//! Maps an upper-cased module file stem to the stem of the file that
//! actually holds its definition, or to the `EMPTY` sentinel.

use crate::segments::Row;
use crate::types::{DecoderError, Result};
use std::collections::HashMap;

/// Sentinel target meaning "this module has no definition"
const EMPTY_TARGET: &str = "EMPTY";

/// Outcome of a redirect lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect<'a> {
    /// Definition lives in the file with this stem
    To(&'a str),
    /// Module is intentionally undefined
    Empty,
}

/// The redirect table from the `DIR` segment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectMap {
    entries: HashMap<String, String>,
}

impl RedirectMap {
    /// Build from `DIR` rows; every row must have exactly three fields
    /// (`id,source,target`) and a source stem may appear only once.
    pub fn from_rows(rows: &[Row]) -> Result<Self> {
        let mut entries = HashMap::with_capacity(rows.len());

        for (line, row) in rows.iter().enumerate() {
            let [_, source, target] = row.as_slice() else {
                return Err(DecoderError::Format(format!(
                    "Redirect row {} has {} fields, expected 3",
                    line + 1,
                    row.len()
                )));
            };

            let source = source.to_uppercase();
            if entries.contains_key(&source) {
                return Err(DecoderError::Format(format!(
                    "Duplicate redirect for {}",
                    source
                )));
            }
            entries.insert(source, target.clone());
        }

        Ok(Self { entries })
    }

    /// Look up a file stem (case-insensitive)
    pub fn lookup(&self, stem: &str) -> Option<Redirect<'_>> {
        self.entries.get(&stem.to_uppercase()).map(|target| {
            if target.trim().eq_ignore_ascii_case(EMPTY_TARGET) {
                Redirect::Empty
            } else {
                Redirect::To(target.as_str())
            }
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
