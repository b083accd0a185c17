//! Core types for the UDS definition file decoder
//!
//! This module defines the error type, the segment kinds known to the reader
//! and the records a resolution call hands back. Records are plain owned data:
//! once created they no longer reference the reader that produced them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that can occur while loading or resolving definition files
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Format error: {0}")]
    Format(String),

    #[error("Reference error: {0}")]
    Reference(String),

    #[error("Module {0} has no diagnostic definition")]
    UndefinedModule(String),
}

/// Payload-free classification of a [`DecoderError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// File missing or unreadable
    Io,
    /// Structurally malformed input
    Format,
    /// Index or key pointing at nothing
    Reference,
    /// Redirect resolves to the `EMPTY` sentinel
    UndefinedModule,
}

impl DecoderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DecoderError::Io {
            path: path.into(),
            source,
        }
    }

    /// Kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecoderError::Io { .. } => ErrorKind::Io,
            DecoderError::Format(_) => ErrorKind::Format,
            DecoderError::Reference(_) => ErrorKind::Reference,
            DecoderError::UndefinedModule(_) => ErrorKind::UndefinedModule,
        }
    }

    /// True if the module intentionally has no definition.
    ///
    /// This is an expected outcome rather than a corrupt install, so callers
    /// usually report it differently from other failures.
    pub fn is_undefined_module(&self) -> bool {
        matches!(self, DecoderError::UndefinedModule(_))
    }
}

/// The seven module segment kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Adp,
    Dtc,
    Ffmux,
    Ges,
    Mwb,
    Sot,
    Xpl,
}

impl SegmentKind {
    /// All kinds in table order
    pub const ALL: [SegmentKind; 7] = [
        SegmentKind::Adp,
        SegmentKind::Dtc,
        SegmentKind::Ffmux,
        SegmentKind::Ges,
        SegmentKind::Mwb,
        SegmentKind::Sot,
        SegmentKind::Xpl,
    ];

    /// Bracket marker name, e.g. `MWB` for `[MWB]`
    pub fn marker(self) -> &'static str {
        match self {
            SegmentKind::Adp => "ADP",
            SegmentKind::Dtc => "DTC",
            SegmentKind::Ffmux => "FFMUX",
            SegmentKind::Ges => "GES",
            SegmentKind::Mwb => "MWB",
            SegmentKind::Sot => "SOT",
            SegmentKind::Xpl => "XPL",
        }
    }

    /// Stem of the file holding this kind's base table
    pub fn base_file_stem(self) -> &'static str {
        match self {
            SegmentKind::Adp => "RA",
            SegmentKind::Dtc => "RD",
            SegmentKind::Ffmux => "RF",
            SegmentKind::Ges => "RG",
            SegmentKind::Mwb => "RM",
            SegmentKind::Sot => "RS",
            SegmentKind::Xpl => "RX",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

impl FromStr for SegmentKind {
    type Err = DecoderError;

    fn from_str(s: &str) -> Result<Self> {
        SegmentKind::ALL
            .into_iter()
            .find(|kind| kind.marker().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DecoderError::Format(format!("Unknown segment kind: {}", s)))
    }
}

/// Base data type of a measurement value (low 6 bits of the data type id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Float = 0,
    Integer = 2,
    ValueName = 3,
    ExtTable = 4,
    Binary = 5,
    HexBytes = 7,
    String = 8,
}

impl DataType {
    /// Map an enum value to its data type; gaps yield `None`
    pub fn from_enum_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(DataType::Float),
            2 => Some(DataType::Integer),
            3 => Some(DataType::ValueName),
            4 => Some(DataType::ExtTable),
            5 => Some(DataType::Binary),
            7 => Some(DataType::HexBytes),
            8 => Some(DataType::String),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DataType::Float => "Float",
            DataType::Integer => "Integer",
            DataType::ValueName => "ValueName",
            DataType::ExtTable => "ExtTable",
            DataType::Binary => "Binary",
            DataType::HexBytes => "HexBytes",
            DataType::String => "String",
        }
    }
}

/// Raw data type id as stored in a measurement block row
///
/// Bits 0..=5 carry the [`DataType`] enum value, bit 6 marks swapped byte
/// order and bit 7 marks a value that carries a physical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataTypeId(pub u32);

impl DataTypeId {
    pub const MASK_ENUM: u32 = 0x3F;
    pub const MASK_SWAPPED: u32 = 0x40;
    pub const MASK_UNIT: u32 = 0x80;

    pub fn enum_value(self) -> u32 {
        self.0 & Self::MASK_ENUM
    }

    pub fn data_type(self) -> Option<DataType> {
        DataType::from_enum_value(self.enum_value())
    }

    pub fn is_swapped(self) -> bool {
        self.0 & Self::MASK_SWAPPED != 0
    }

    pub fn has_unit(self) -> bool {
        self.0 & Self::MASK_UNIT != 0
    }
}

impl fmt::Display for DataTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data_type() {
            Some(data_type) => write!(f, "{}", data_type.name())?,
            None => write!(f, "{}", self.enum_value())?,
        }
        if self.is_swapped() {
            write!(f, " (Swapped)")?;
        }
        if self.has_unit() {
            write!(f, " (Unit)")?;
        }
        Ok(())
    }
}

/// Render a raw data type id, e.g. `Integer (Swapped) (Unit)` for `0xC2`
pub fn data_type_id_to_string(data_type_id: u32) -> String {
    DataTypeId(data_type_id).to_string()
}

/// One named sub-range of an enumerated measurement value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueName {
    /// Raw value-name row
    pub fields: Vec<String>,
    /// Inclusive lower bound, `None` if unbounded
    pub min_value: Option<i32>,
    /// Inclusive upper bound, `None` if unbounded
    pub max_value: Option<i32>,
    /// Display name text fields, `None` if the row carries no name key
    pub name: Option<Vec<String>>,
}

impl ValueName {
    /// True if `value` lies within this entry's bounds
    pub fn contains(&self, value: i64) -> bool {
        self.min_value.map_or(true, |min| value >= i64::from(min))
            && self.max_value.map_or(true, |max| value <= i64::from(max))
    }
}

/// A base-table row resolved without further decoding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlainRecord {
    pub fields: Vec<String>,
}

/// A decoded measurement block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementBlock {
    /// Raw base-table row
    pub fields: Vec<String>,
    pub service_id: u32,
    pub data_type_id: DataTypeId,
    /// Name text fields
    pub name: Vec<String>,
    /// Detail name text fields
    pub name_detail: Option<Vec<String>>,
    pub scale_offset: Option<f64>,
    pub scale_mult: Option<f64>,
    pub scale_div: Option<f64>,
    /// Unit text (only when the data type id carries the unit flag)
    pub unit: Option<String>,
    /// Position of the value inside the response telegram
    pub byte_offset: Option<u32>,
    pub bit_offset: Option<u32>,
    pub bit_length: Option<u32>,
    /// Enumerated names, present only for [`DataType::ValueName`]
    pub value_names: Option<Vec<ValueName>>,
}

impl MeasurementBlock {
    pub fn data_type(&self) -> Option<DataType> {
        self.data_type_id.data_type()
    }

    /// First name text, if any
    pub fn display_name(&self) -> Option<&str> {
        self.name.first().map(String::as_str)
    }

    /// Look up the enumerated name for a raw value
    pub fn value_name_for(&self, raw: i64) -> Option<&ValueName> {
        self.value_names
            .as_ref()?
            .iter()
            .find(|entry| entry.contains(raw))
    }
}

/// Result of resolving one index row against a base table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecodedRecord {
    Plain(PlainRecord),
    MeasurementBlock(MeasurementBlock),
}

impl DecodedRecord {
    /// Raw base-table row behind this record
    pub fn fields(&self) -> &[String] {
        match self {
            DecodedRecord::Plain(record) => &record.fields,
            DecodedRecord::MeasurementBlock(record) => &record.fields,
        }
    }

    pub fn as_measurement_block(&self) -> Option<&MeasurementBlock> {
        match self {
            DecodedRecord::MeasurementBlock(record) => Some(record),
            DecodedRecord::Plain(_) => None,
        }
    }
}
