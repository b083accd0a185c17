//! Main reader API
//!
//! This module provides the primary interface of the library. A
//! [`UdsReader`] is created by loading a definition directory; after that it
//! is read-only and can be shared between threads.

use crate::config::ReaderConfig;
use crate::files::{collect_includes, resolve_definition_file};
use crate::record_decoder::RecordDecoder;
use crate::segments::extract_segment;
use crate::tables::{BaseTable, DatabaseStats, DefinitionDatabase};
use crate::types::{DecodedRecord, DecoderError, PlainRecord, Result, SegmentKind, ValueName};
use std::path::{Path, PathBuf};

/// Reader for one definition directory
#[derive(Debug, Clone)]
pub struct UdsReader {
    dir: PathBuf,
    config: ReaderConfig,
    db: DefinitionDatabase,
}

impl UdsReader {
    /// Load a definition directory with the default configuration
    ///
    /// # Example
    /// ```no_run
    /// use uds_file_decoder::{SegmentKind, UdsReader};
    /// use std::path::Path;
    ///
    /// let reader = UdsReader::init(Path::new("/data/uds")).unwrap();
    /// let files = reader.file_list(Path::new("/data/uds/EV_ECM20TFS.prg")).unwrap();
    /// for record in reader.resolve(&files, SegmentKind::Mwb).unwrap() {
    ///     println!("{:?}", record.fields());
    /// }
    /// ```
    pub fn init(dir: &Path) -> Result<Self> {
        Self::init_with_config(dir, ReaderConfig::default())
    }

    /// Load a definition directory.
    ///
    /// All tables are loaded or none: any failure is returned and no reader
    /// exists afterwards.
    pub fn init_with_config(dir: &Path, config: ReaderConfig) -> Result<Self> {
        log::info!("Loading definition directory: {:?}", dir);

        let db = DefinitionDatabase::load(dir, &config).map_err(|e| {
            log::error!("Loading {:?} failed: {}", dir, e);
            e
        })?;

        let stats = db.stats();
        log::info!(
            "Definition directory loaded: {} texts, {} units, {} redirects, {} value names",
            stats.num_texts,
            stats.num_units,
            stats.num_redirects,
            stats.num_value_name_rows
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            config,
            db,
        })
    }

    /// Ordered list of files making up the definition of `requested`:
    /// the resolved definition file followed by its includes.
    ///
    /// Returns [`DecoderError::UndefinedModule`] if the module is redirected
    /// to `EMPTY`.
    pub fn file_list(&self, requested: &Path) -> Result<Vec<PathBuf>> {
        let root = resolve_definition_file(requested, &self.db.redirects, &self.config)?;
        let files = collect_includes(&root, &self.config)?;
        log::debug!("File list for {:?}: {:?}", requested, files);
        Ok(files)
    }

    /// Resolve the index rows of `kind` found in `files` against the base
    /// table of that kind.
    ///
    /// Fails as a whole on the first malformed row; rows are never skipped.
    pub fn resolve<P: AsRef<Path>>(
        &self,
        files: &[P],
        kind: SegmentKind,
    ) -> Result<Vec<DecodedRecord>> {
        let table = self.db.base_table(kind);
        let rows = extract_segment(files, kind.marker())?;

        let records = rows
            .iter()
            .enumerate()
            .map(|(line, row)| self.resolve_row(table, kind, line + 1, row))
            .collect::<Result<Vec<_>>>()?;

        log::debug!("Resolved {} {} records", records.len(), kind);
        Ok(records)
    }

    fn resolve_row(
        &self,
        table: &BaseTable,
        kind: SegmentKind,
        line: usize,
        row: &[String],
    ) -> Result<DecodedRecord> {
        if row.len() < 2 {
            return Err(DecoderError::Format(format!(
                "{} index row {} has {} fields, expected at least 2",
                kind,
                line,
                row.len()
            )));
        }

        let index = crate::fields::parse_u32(&row[0]).ok_or_else(|| {
            DecoderError::Format(format!(
                "{} index row {}: invalid index {:?}",
                kind, line, row[0]
            ))
        })?;

        let base_row = table.row(index).ok_or_else(|| {
            DecoderError::Reference(format!(
                "{} index row {}: index {} outside base table 1..={}",
                kind,
                line,
                index,
                table.len()
            ))
        })?;

        match kind {
            SegmentKind::Mwb => Ok(DecodedRecord::MeasurementBlock(
                RecordDecoder::decode_measurement_block(base_row, &self.db)?,
            )),
            _ => Ok(DecodedRecord::Plain(PlainRecord {
                fields: base_row.clone(),
            })),
        }
    }

    /// Convenience: [`Self::file_list`] followed by [`Self::resolve`]
    pub fn resolve_module(
        &self,
        requested: &Path,
        kind: SegmentKind,
    ) -> Result<Vec<DecodedRecord>> {
        let files = self.file_list(requested)?;
        self.resolve(&files, kind)
    }

    /// Directory this reader was loaded from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// All loaded tables
    pub fn database(&self) -> &DefinitionDatabase {
        &self.db
    }

    pub fn base_table(&self, kind: SegmentKind) -> &BaseTable {
        self.db.base_table(kind)
    }

    /// Text dictionary entry
    pub fn text(&self, key: u32) -> Option<&[String]> {
        self.db.texts().get(key)
    }

    /// Unit dictionary entry
    pub fn unit(&self, key: u32) -> Option<&[String]> {
        self.db.units().get(key)
    }

    /// Value names enumerated under `key`
    pub fn value_names(&self, key: u32) -> Vec<ValueName> {
        self.db.value_names().value_names(key, self.db.texts())
    }

    /// Get statistics about the loaded tables
    pub fn stats(&self) -> DatabaseStats {
        self.db.stats()
    }
}
