//! UDS Definition File Decoder Library
//!
//! A read-only decoder for the segmented, comma separated definition files
//! describing the diagnostic services of a control unit (measurement blocks,
//! adaptations, trouble codes, ...).
//!
//! # Architecture
//!
//! A module's data is split over shared base tables, loaded once, and per
//! module index files whose rows reference base table rows by 1-based
//! position:
//! - [`UdsReader::init`] loads the redirect table, the text and unit
//!   dictionaries, the value-name lookup and the seven base tables
//! - [`UdsReader::file_list`] maps a module name to its definition file
//!   (following redirects) plus all included files
//! - [`UdsReader::resolve`] joins the index rows of one segment kind with
//!   the base table; measurement blocks are decoded into structured records
//!
//! The library does NOT:
//! - Write or regenerate definition files
//! - Check the diagnostic meaning of the data, only its structure
//! - Present records (see uds-file-cli)
//!
//! # Example Usage
//!
//! ```no_run
//! use uds_file_decoder::{DecodedRecord, SegmentKind, UdsReader};
//! use std::path::Path;
//!
//! let reader = UdsReader::init(Path::new("/data/uds")).unwrap();
//!
//! match reader.file_list(Path::new("/data/uds/EV_ECM20TFS.prg")) {
//!     Ok(files) => {
//!         for record in reader.resolve(&files, SegmentKind::Mwb).unwrap() {
//!             if let DecodedRecord::MeasurementBlock(block) = record {
//!                 println!("{:?} {}", block.display_name(), block.data_type_id);
//!             }
//!         }
//!     }
//!     Err(e) if e.is_undefined_module() => println!("No definition"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

// Public modules
pub mod config;
pub mod files;
pub mod reader;
pub mod segments;
pub mod tables;
pub mod types;

// Re-export main types for convenience
pub use config::ReaderConfig;
pub use reader::UdsReader;
pub use record_decoder::MWB_MIN_FIELDS;
pub use segments::{extract_segment, Row};
pub use tables::{BaseTable, DatabaseStats, DefinitionDatabase};
pub use types::{
    data_type_id_to_string, DataType, DataTypeId, DecodedRecord, DecoderError, ErrorKind,
    MeasurementBlock, PlainRecord, Result, SegmentKind, ValueName,
};

// Internal modules (not exposed in public API)
mod encoding;
mod fields;
mod record_decoder;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
