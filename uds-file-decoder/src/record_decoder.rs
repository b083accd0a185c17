//! Measurement block decoding
//!
//! Turns a raw `MWB` base-table row into a [`MeasurementBlock`]. The row
//! layout is:
//!
//! | field | content                                     |
//! |-------|---------------------------------------------|
//! | 0     | name text key (mandatory)                   |
//! | 1     | service id (mandatory)                      |
//! | 2     | data type extra, value-name key (optional)  |
//! | 3     | data type id with flag bits (mandatory)     |
//! | 4-6   | scale offset / multiplier / divisor         |
//! | 7     | unit key, mandatory if the unit flag is set |
//! | 8-10  | byte offset / bit offset / bit length       |
//! | 11    | detail name text key (optional)             |

use crate::fields::{parse_f64, parse_u32};
use crate::segments::Row;
use crate::tables::DefinitionDatabase;
use crate::types::{DataType, DataTypeId, DecoderError, MeasurementBlock, Result};

/// Minimum number of fields of a measurement block row
pub const MWB_MIN_FIELDS: usize = 14;

const FIELD_NAME: usize = 0;
const FIELD_SERVICE_ID: usize = 1;
const FIELD_TYPE_EXTRA: usize = 2;
const FIELD_DATA_TYPE: usize = 3;
const FIELD_SCALE_OFFSET: usize = 4;
const FIELD_SCALE_MULT: usize = 5;
const FIELD_SCALE_DIV: usize = 6;
const FIELD_UNIT: usize = 7;
const FIELD_BYTE_OFFSET: usize = 8;
const FIELD_BIT_OFFSET: usize = 9;
const FIELD_BIT_LENGTH: usize = 10;
const FIELD_NAME_DETAIL: usize = 11;

/// Measurement block decoder
pub struct RecordDecoder;

impl RecordDecoder {
    /// Decode one measurement block row.
    ///
    /// Mandatory fields that are missing, malformed or unresolvable fail
    /// the decode; optional fields that do not parse are simply absent.
    pub fn decode_measurement_block(
        row: &Row,
        db: &DefinitionDatabase,
    ) -> Result<MeasurementBlock> {
        if row.len() < MWB_MIN_FIELDS {
            return Err(DecoderError::Format(format!(
                "Measurement block row has {} fields, expected at least {}",
                row.len(),
                MWB_MIN_FIELDS
            )));
        }

        let name_key = Self::mandatory_u32(row, FIELD_NAME, "name key")?;
        let name = db
            .texts()
            .get(name_key)
            .ok_or_else(|| DecoderError::Reference(format!("Text key {} not found", name_key)))?
            .to_vec();

        let service_id = Self::mandatory_u32(row, FIELD_SERVICE_ID, "service id")?;
        let data_type_id = DataTypeId(Self::mandatory_u32(row, FIELD_DATA_TYPE, "data type")?);
        let type_extra = parse_u32(&row[FIELD_TYPE_EXTRA]);

        let name_detail = match parse_u32(&row[FIELD_NAME_DETAIL]) {
            Some(key) => Some(
                db.texts()
                    .get(key)
                    .ok_or_else(|| {
                        DecoderError::Reference(format!("Detail text key {} not found", key))
                    })?
                    .to_vec(),
            ),
            None => None,
        };

        let unit = if data_type_id.has_unit() {
            Some(Self::resolve_unit(row, db)?)
        } else {
            None
        };

        let value_names = match data_type_id.data_type() {
            Some(DataType::ValueName) => Some(match type_extra {
                Some(key) => db.value_names().value_names(key, db.texts()),
                None => Vec::new(),
            }),
            _ => None,
        };

        Ok(MeasurementBlock {
            fields: row.clone(),
            service_id,
            data_type_id,
            name,
            name_detail,
            scale_offset: parse_f64(&row[FIELD_SCALE_OFFSET]),
            scale_mult: parse_f64(&row[FIELD_SCALE_MULT]),
            scale_div: parse_f64(&row[FIELD_SCALE_DIV]),
            unit,
            byte_offset: parse_u32(&row[FIELD_BYTE_OFFSET]),
            bit_offset: parse_u32(&row[FIELD_BIT_OFFSET]),
            bit_length: parse_u32(&row[FIELD_BIT_LENGTH]),
            value_names,
        })
    }

    fn mandatory_u32(row: &Row, index: usize, what: &str) -> Result<u32> {
        parse_u32(&row[index]).ok_or_else(|| {
            DecoderError::Format(format!(
                "Invalid {} in field {}: {:?}",
                what, index, row[index]
            ))
        })
    }

    /// First unit dictionary entry for the row's unit key
    fn resolve_unit(row: &Row, db: &DefinitionDatabase) -> Result<String> {
        let key = parse_u32(&row[FIELD_UNIT]).ok_or_else(|| {
            DecoderError::Reference(format!(
                "Unit required but unit key {:?} is not a number",
                row[FIELD_UNIT]
            ))
        })?;

        db.units()
            .get(key)
            .and_then(|unit| unit.first())
            .cloned()
            .ok_or_else(|| DecoderError::Reference(format!("Unit key {} not found", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{RedirectMap, TextDictionary, ValueNameLookup};
    use std::collections::BTreeMap;

    fn row(fields: &[&str]) -> Row {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn database() -> DefinitionDatabase {
        DefinitionDatabase {
            redirects: RedirectMap::default(),
            texts: TextDictionary::from_rows(vec![
                row(&["100", "Engine speed"]),
                row(&["101", "Bank 1", "Sensor 2"]),
                row(&["1001", "Off"]),
                row(&["1002", "On"]),
            ])
            .unwrap(),
            units: TextDictionary::from_rows(vec![row(&["5", "rpm"]), row(&["6", "\u{b0}C"])])
                .unwrap(),
            value_names: ValueNameLookup::from_rows(vec![
                row(&["7", "0", "3", "1001", "x"]),
                row(&["7", "4", "9", "1002", "x"]),
            ])
            .unwrap(),
            base_tables: BTreeMap::new(),
        }
    }

    #[test]
    fn test_decode_full_row() {
        let fields = row(&[
            "100", "0x22", "", "194", "-40", "0.25", "2", "5", "3", "4", "12", "101", "", "",
        ]);
        // service id must be decimal
        assert!(RecordDecoder::decode_measurement_block(&fields, &database()).is_err());

        let fields = row(&[
            "100", "34", "", "194", "-40", "0.25", "2", "5", "3", "4", "12", "101", "", "",
        ]);
        let block = RecordDecoder::decode_measurement_block(&fields, &database()).unwrap();

        assert_eq!(block.service_id, 34);
        assert_eq!(block.data_type(), Some(DataType::Integer));
        assert!(block.data_type_id.is_swapped());
        assert!(block.data_type_id.has_unit());
        assert_eq!(block.name, vec!["Engine speed"]);
        assert_eq!(
            block.name_detail,
            Some(vec!["Bank 1".to_string(), "Sensor 2".to_string()])
        );
        assert_eq!(block.scale_offset, Some(-40.0));
        assert_eq!(block.scale_mult, Some(0.25));
        assert_eq!(block.scale_div, Some(2.0));
        assert_eq!(block.unit.as_deref(), Some("rpm"));
        assert_eq!(block.byte_offset, Some(3));
        assert_eq!(block.bit_offset, Some(4));
        assert_eq!(block.bit_length, Some(12));
        assert!(block.value_names.is_none());
        assert_eq!(block.fields, fields);
    }

    #[test]
    fn test_optional_fields_absent() {
        let fields = row(&[
            "100", "1", "", "0", "", "x", "", "", "", "-1", "", "", "", "",
        ]);
        let block = RecordDecoder::decode_measurement_block(&fields, &database()).unwrap();

        assert_eq!(block.data_type(), Some(DataType::Float));
        assert_eq!(block.scale_offset, None);
        assert_eq!(block.scale_mult, None);
        assert_eq!(block.scale_div, None);
        assert_eq!(block.unit, None);
        assert_eq!(block.byte_offset, None);
        assert_eq!(block.bit_offset, None);
        assert_eq!(block.bit_length, None);
        assert_eq!(block.name_detail, None);
    }

    #[test]
    fn test_short_row_fails() {
        let fields = row(&["100", "1", "", "0", "", "", "", "", "", "", "", "", ""]);
        let err = RecordDecoder::decode_measurement_block(&fields, &database()).unwrap_err();
        assert!(matches!(err, DecoderError::Format(_)));
    }

    #[test]
    fn test_unresolved_names_fail() {
        let fields = row(&[
            "999", "1", "", "0", "", "", "", "", "", "", "", "", "", "",
        ]);
        let err = RecordDecoder::decode_measurement_block(&fields, &database()).unwrap_err();
        assert!(matches!(err, DecoderError::Reference(_)));

        let fields = row(&[
            "100", "1", "", "0", "", "", "", "", "", "", "", "998", "", "",
        ]);
        let err = RecordDecoder::decode_measurement_block(&fields, &database()).unwrap_err();
        assert!(matches!(err, DecoderError::Reference(_)));
    }

    #[test]
    fn test_unit_required_but_unresolvable() {
        // 130 = ValueName | unit flag, unit field empty
        let fields = row(&[
            "100", "5", "", "130", "0", "1", "1", "", "", "", "", "", "", "",
        ]);
        let err = RecordDecoder::decode_measurement_block(&fields, &database()).unwrap_err();
        assert!(matches!(err, DecoderError::Reference(_)));

        let fields = row(&[
            "100", "5", "", "130", "0", "1", "1", "77", "", "", "", "", "", "",
        ]);
        let err = RecordDecoder::decode_measurement_block(&fields, &database()).unwrap_err();
        assert!(matches!(err, DecoderError::Reference(_)));
    }

    #[test]
    fn test_value_name_enumeration() {
        let fields = row(&[
            "100", "5", "7", "3", "", "", "", "", "0", "0", "8", "", "", "",
        ]);
        let block = RecordDecoder::decode_measurement_block(&fields, &database()).unwrap();

        let names = block.value_names.as_ref().unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!((names[0].min_value, names[0].max_value), (Some(0), Some(3)));
        assert_eq!((names[1].min_value, names[1].max_value), (Some(4), Some(9)));
        assert_eq!(
            block.value_name_for(5).and_then(|v| v.name.as_ref()),
            Some(&vec!["On".to_string()])
        );
    }

    #[test]
    fn test_value_name_without_entries() {
        // unknown value type key
        let fields = row(&[
            "100", "5", "8", "3", "", "", "", "", "", "", "", "", "", "",
        ]);
        let block = RecordDecoder::decode_measurement_block(&fields, &database()).unwrap();
        assert_eq!(block.value_names, Some(Vec::new()));

        // no value type key at all
        let fields = row(&[
            "100", "5", "", "3", "", "", "", "", "", "", "", "", "", "",
        ]);
        let block = RecordDecoder::decode_measurement_block(&fields, &database()).unwrap();
        assert_eq!(block.value_names, Some(Vec::new()));
    }
}
