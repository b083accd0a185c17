//! Text rendering of decoded records and statistics

use std::fmt;
use std::path::PathBuf;
use uds_file_decoder::{DatabaseStats, DecodedRecord, DecoderError, MeasurementBlock};

/// Outcome of resolving one module during a scan
#[derive(Debug)]
pub enum ScanOutcome {
    Records(usize),
    Undefined,
    Failed(String),
}

impl From<&Result<Vec<DecodedRecord>, DecoderError>> for ScanOutcome {
    fn from(result: &Result<Vec<DecodedRecord>, DecoderError>) -> Self {
        match result {
            Ok(records) => ScanOutcome::Records(records.len()),
            Err(e) if e.is_undefined_module() => ScanOutcome::Undefined,
            Err(e) => ScanOutcome::Failed(e.to_string()),
        }
    }
}

/// Table statistics as text
pub struct StatsReport<'a>(pub &'a DatabaseStats);

impl fmt::Display for StatsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.0;
        writeln!(f, "Definition tables:")?;
        for (kind, rows) in &stats.base_rows {
            writeln!(f, "  {:<6} {:>8} rows", kind.to_string(), rows)?;
        }
        writeln!(f, "  Texts:       {}", stats.num_texts)?;
        writeln!(f, "  Units:       {}", stats.num_units)?;
        writeln!(f, "  Redirects:   {}", stats.num_redirects)?;
        writeln!(f, "  Value names: {}", stats.num_value_name_rows)
    }
}

/// Decoded records as text, numbered from 1
pub struct RecordsReport<'a>(pub &'a [DecodedRecord]);

impl fmt::Display for RecordsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, record) in self.0.iter().enumerate() {
            match record {
                DecodedRecord::Plain(plain) => {
                    writeln!(f, "{:>4}: {}", index + 1, plain.fields.join(","))?;
                }
                DecodedRecord::MeasurementBlock(block) => {
                    write_measurement_block(f, index + 1, block)?;
                }
            }
        }
        Ok(())
    }
}

fn write_measurement_block(
    f: &mut fmt::Formatter<'_>,
    number: usize,
    block: &MeasurementBlock,
) -> fmt::Result {
    writeln!(
        f,
        "{:>4}: {} (service 0x{:04X})",
        number,
        block.name.join(" / "),
        block.service_id
    )?;
    if let Some(detail) = &block.name_detail {
        writeln!(f, "      detail:   {}", detail.join(" / "))?;
    }
    writeln!(f, "      type:     {}", block.data_type_id)?;
    if let Some(unit) = &block.unit {
        writeln!(f, "      unit:     {}", unit)?;
    }

    let scale: Vec<String> = [
        ("offset", block.scale_offset),
        ("mult", block.scale_mult),
        ("div", block.scale_div),
    ]
    .iter()
    .filter_map(|(label, value)| value.map(|v| format!("{}={}", label, v)))
    .collect();
    if !scale.is_empty() {
        writeln!(f, "      scale:    {}", scale.join(" "))?;
    }

    if block.byte_offset.is_some() || block.bit_offset.is_some() || block.bit_length.is_some() {
        writeln!(
            f,
            "      position: byte {} bit {} length {}",
            opt(block.byte_offset),
            opt(block.bit_offset),
            opt(block.bit_length)
        )?;
    }

    for entry in block.value_names.iter().flatten() {
        let name = entry
            .name
            .as_ref()
            .map(|n| n.join(" / "))
            .unwrap_or_default();
        writeln!(
            f,
            "      [{}..{}] {}",
            opt(entry.min_value),
            opt(entry.max_value),
            name
        )?;
    }
    Ok(())
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Per-module scan outcomes followed by a summary line
pub struct ScanReport<'a>(pub &'a [(PathBuf, ScanOutcome)]);

impl fmt::Display for ScanReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (mut ok, mut undefined, mut failed) = (0, 0, 0);

        for (path, outcome) in self.0 {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            match outcome {
                ScanOutcome::Records(count) => {
                    ok += 1;
                    writeln!(f, "{:<32} {} records", name, count)?;
                }
                ScanOutcome::Undefined => {
                    undefined += 1;
                    writeln!(f, "{:<32} no diagnostic definition", name)?;
                }
                ScanOutcome::Failed(error) => {
                    failed += 1;
                    writeln!(f, "{:<32} ERROR {}", name, error)?;
                }
            }
        }

        writeln!(
            f,
            "\n{} modules: {} ok, {} undefined, {} failed",
            self.0.len(),
            ok,
            undefined,
            failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uds_file_decoder::{DataTypeId, PlainRecord, SegmentKind, ValueName};

    #[test]
    fn test_render_plain_and_block() {
        let records = vec![
            DecodedRecord::Plain(PlainRecord {
                fields: vec!["a".to_string(), "b".to_string()],
            }),
            DecodedRecord::MeasurementBlock(MeasurementBlock {
                fields: vec![],
                service_id: 0x22,
                data_type_id: DataTypeId(0x83),
                name: vec!["Status".to_string()],
                name_detail: None,
                scale_offset: None,
                scale_mult: Some(0.5),
                scale_div: None,
                unit: Some("V".to_string()),
                byte_offset: Some(1),
                bit_offset: None,
                bit_length: Some(8),
                value_names: Some(vec![ValueName {
                    fields: vec![],
                    min_value: Some(0),
                    max_value: Some(3),
                    name: Some(vec!["Off".to_string()]),
                }]),
            }),
        ];

        let text = RecordsReport(&records).to_string();
        assert!(text.contains("   1: a,b"));
        assert!(text.contains("Status (service 0x0022)"));
        assert!(text.contains("type:     ValueName (Unit)"));
        assert!(text.contains("scale:    mult=0.5"));
        assert!(text.contains("position: byte 1 bit - length 8"));
        assert!(text.contains("[0..3] Off"));
    }

    #[test]
    fn test_render_stats() {
        let stats = DatabaseStats {
            base_rows: [(SegmentKind::Mwb, 12)].into_iter().collect(),
            num_texts: 5,
            num_units: 2,
            num_redirects: 1,
            num_value_name_rows: 0,
        };

        let text = StatsReport(&stats).to_string();
        assert!(text.starts_with("Definition tables:\n"));
        assert!(text.contains("  MWB          12 rows"));
        assert!(text.ends_with("  Value names: 0\n"));
    }

    #[test]
    fn test_render_scan_summary() {
        let results = vec![
            (PathBuf::from("/d/EV_A.rodtxt"), ScanOutcome::Records(3)),
            (PathBuf::from("/d/EV_B.rodtxt"), ScanOutcome::Undefined),
            (
                PathBuf::from("/d/EV_C.rodtxt"),
                ScanOutcome::Failed("bad".to_string()),
            ),
        ];
        let text = ScanReport(&results).to_string();
        assert!(text.contains("EV_B"));
        assert!(text.contains("no diagnostic definition"));
        assert!(text.contains("3 modules: 1 ok, 1 undefined, 1 failed"));
    }
}
