//! Value-name lookup
//!
//! Rows of the `DOP` segment describe the named ranges of enumerated
//! values. Several rows share one key, one per named range.

use crate::fields::{field, parse_i32_bound, parse_u32};
use crate::segments::Row;
use crate::tables::TextDictionary;
use crate::types::{DecoderError, Result, ValueName};
use std::collections::HashMap;

/// Segment marker of the value-name table
pub const VALUE_NAME_SEGMENT: &str = "DOP";

/// Minimum number of fields a row needs to describe a value name
pub const VALUE_NAME_MIN_FIELDS: usize = 5;

/// One-to-many mapping from value type key to its value-name rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueNameLookup {
    groups: HashMap<u32, Vec<Row>>,
    num_rows: usize,
}

impl ValueNameLookup {
    /// Group `DOP` rows by their first field.
    ///
    /// Rows keep their file order inside a group. A first field that is not
    /// a number makes the whole table invalid.
    pub fn from_rows(rows: Vec<Row>) -> Result<Self> {
        let num_rows = rows.len();
        let mut groups: HashMap<u32, Vec<Row>> = HashMap::new();

        for (line, row) in rows.into_iter().enumerate() {
            let key = parse_u32(field(&row, 0)).ok_or_else(|| {
                DecoderError::Format(format!(
                    "Value name row {}: invalid key {:?}",
                    line + 1,
                    field(&row, 0)
                ))
            })?;
            groups.entry(key).or_default().push(row);
        }

        Ok(Self { groups, num_rows })
    }

    /// Raw rows stored under `key`, empty if none
    pub fn rows(&self, key: u32) -> &[Row] {
        self.groups.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Build the value names for `key`.
    ///
    /// Rows with fewer than five fields are ignored. A name key that parses
    /// but is missing from `texts` drops that entry only.
    pub fn value_names(&self, key: u32, texts: &TextDictionary) -> Vec<ValueName> {
        self.rows(key)
            .iter()
            .filter(|row| row.len() >= VALUE_NAME_MIN_FIELDS)
            .filter_map(|row| build_value_name(row, texts))
            .collect()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of rows over all keys
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }
}

fn build_value_name(row: &Row, texts: &TextDictionary) -> Option<ValueName> {
    let name = match parse_u32(&row[3]) {
        Some(name_key) => match texts.get(name_key) {
            Some(name) => Some(name.to_vec()),
            None => {
                log::warn!(
                    "Value name {:?}: text key {} not found, entry skipped",
                    row,
                    name_key
                );
                return None;
            }
        },
        None => None,
    };

    Some(ValueName {
        fields: row.clone(),
        min_value: parse_i32_bound(&row[1]),
        max_value: parse_i32_bound(&row[2]),
        name,
    })
}
