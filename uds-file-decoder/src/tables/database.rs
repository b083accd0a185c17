//! Definition database
//!
//! Everything loaded once from a definition directory: the redirect table,
//! both dictionaries, the value-name lookup and one base table per segment
//! kind. Loading is all-or-nothing.

use crate::config::ReaderConfig;
use crate::files::locate_file;
use crate::segments::{extract_segment, Row};
use crate::tables::{
    RedirectMap, TextDictionary, ValueNameLookup, TEXT_SEGMENT, UNIT_SEGMENT, VALUE_NAME_SEGMENT,
};
use crate::types::{DecoderError, Result, SegmentKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Segment marker of the redirect table
const REDIRECT_SEGMENT: &str = "DIR";

/// Canonical rows of one segment kind, addressed 1-based
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseTable {
    rows: Vec<Row>,
}

impl BaseTable {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Row at 1-based `index`; 0 and anything past the end yield `None`
    pub fn row(&self, index: u32) -> Option<&Row> {
        let index = usize::try_from(index).ok()?.checked_sub(1)?;
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// All tables of one definition directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionDatabase {
    pub(crate) redirects: RedirectMap,
    pub(crate) texts: TextDictionary,
    pub(crate) units: TextDictionary,
    pub(crate) value_names: ValueNameLookup,
    pub(crate) base_tables: BTreeMap<SegmentKind, BaseTable>,
}

impl DefinitionDatabase {
    /// Load all tables from `dir`, failing on the first error
    pub fn load(dir: &Path, config: &ReaderConfig) -> Result<Self> {
        let table_file = |stem: &str| -> Result<PathBuf> {
            let file_name = config.file_name(stem);
            locate_file(dir, &file_name, config.case_insensitive_files).ok_or_else(|| {
                DecoderError::io(
                    dir.join(&file_name),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "table file not found"),
                )
            })
        };

        let redirect_rows =
            extract_segment(&[table_file(&config.redirect_stem)?], REDIRECT_SEGMENT)?;
        let redirects = RedirectMap::from_rows(&redirect_rows)?;
        log::debug!("Loaded {} redirects", redirects.len());

        let texts = TextDictionary::load(
            dir,
            &format!("{}{}", config.text_pattern, config.file_extension),
            TEXT_SEGMENT,
        )?;
        let units = TextDictionary::load(
            dir,
            &format!("{}{}", config.unit_pattern, config.file_extension),
            UNIT_SEGMENT,
        )?;

        let value_name_rows =
            extract_segment(&[table_file(&config.value_name_stem)?], VALUE_NAME_SEGMENT)?;
        let value_names = ValueNameLookup::from_rows(value_name_rows)?;
        log::debug!(
            "Loaded {} value name rows for {} value types",
            value_names.num_rows(),
            value_names.len()
        );

        let mut base_tables = BTreeMap::new();
        for kind in SegmentKind::ALL {
            let rows = extract_segment(&[table_file(kind.base_file_stem())?], kind.marker())?;
            log::debug!("Base table {}: {} rows", kind, rows.len());
            base_tables.insert(kind, BaseTable::new(rows));
        }

        Ok(Self {
            redirects,
            texts,
            units,
            value_names,
            base_tables,
        })
    }

    pub fn redirects(&self) -> &RedirectMap {
        &self.redirects
    }

    pub fn texts(&self) -> &TextDictionary {
        &self.texts
    }

    pub fn units(&self) -> &TextDictionary {
        &self.units
    }

    pub fn value_names(&self) -> &ValueNameLookup {
        &self.value_names
    }

    /// Base table of `kind`; every kind is present after a successful load
    pub fn base_table(&self, kind: SegmentKind) -> &BaseTable {
        static EMPTY: BaseTable = BaseTable { rows: Vec::new() };
        self.base_tables.get(&kind).unwrap_or(&EMPTY)
    }

    /// Get database statistics
    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            base_rows: self
                .base_tables
                .iter()
                .map(|(kind, table)| (*kind, table.len()))
                .collect(),
            num_texts: self.texts.len(),
            num_units: self.units.len(),
            num_redirects: self.redirects.len(),
            num_value_name_rows: self.value_names.num_rows(),
        }
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    /// Row count per base table
    pub base_rows: BTreeMap<SegmentKind, usize>,
    /// Number of text dictionary entries
    pub num_texts: usize,
    /// Number of unit dictionary entries
    pub num_units: usize,
    /// Number of redirect entries
    pub num_redirects: usize,
    /// Number of value-name rows
    pub num_value_name_rows: usize,
}
