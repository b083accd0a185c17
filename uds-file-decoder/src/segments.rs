//! Segment extraction
//!
//! A definition file is a sequence of lines. Lines starting with `[` are
//! control lines; `[NAME]` opens and `[/NAME]` closes a segment. Every other
//! line inside the requested segment becomes one row of comma separated
//! fields. Segments of the same name may occur repeatedly and are
//! concatenated.

use crate::encoding::decode_file_content;
use crate::types::{DecoderError, Result};
use std::path::Path;

/// One line of a segment split into its fields
pub type Row = Vec<String>;

/// Extract all rows of segment `segment_name` from `files`, in file order.
///
/// Segment state is scoped to one file: a segment left open at the end of
/// a file does not continue into the next one. Any read error fails the
/// whole extraction.
pub fn extract_segment<P: AsRef<Path>>(files: &[P], segment_name: &str) -> Result<Vec<Row>> {
    let mut rows = Vec::new();

    for file in files {
        let path = file.as_ref();
        let bytes = std::fs::read(path).map_err(|e| DecoderError::io(path, e))?;
        let content = decode_file_content(&bytes);
        let before = rows.len();
        extract_segment_from_str(&content, segment_name, &mut rows);
        log::trace!(
            "Segment [{}] in {:?}: {} rows",
            segment_name,
            path,
            rows.len() - before
        );
    }

    Ok(rows)
}

/// Scan already decoded text and append the rows of `segment_name` to `rows`
pub fn extract_segment_from_str(content: &str, segment_name: &str, rows: &mut Vec<Row>) {
    let segment_start = format!("[{}]", segment_name);
    let segment_end = format!("[/{}]", segment_name);

    let mut in_segment = false;
    for line in content.lines() {
        if line.starts_with('[') {
            if line.eq_ignore_ascii_case(&segment_start) {
                in_segment = true;
            } else if line.eq_ignore_ascii_case(&segment_end) {
                in_segment = false;
            }
            continue;
        }

        if in_segment {
            rows.push(line.split(',').map(str::to_string).collect());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn rows_of(content: &str, segment: &str) -> Vec<Row> {
        let mut rows = Vec::new();
        extract_segment_from_str(content, segment, &mut rows);
        rows
    }

    #[test]
    fn test_extract_simple_segment() {
        let rows = rows_of("[MWB]\n1,2,3\n4,5\n[/MWB]\n", "MWB");
        assert_eq!(rows, vec![vec!["1", "2", "3"], vec!["4", "5"]]);
    }

    #[test]
    fn test_segment_isolation() {
        let alone = rows_of("[MWB]\n1,a\n2,b\n[/MWB]\n", "MWB");
        let mixed = rows_of(
            "header\n[ADP]\n9,x\n[/ADP]\n[MWB]\n1,a\n[INFO]\n2,b\n[/MWB]\n[DTC]\n7,y\n[/DTC]\n",
            "MWB",
        );
        assert_eq!(alone, mixed);
    }

    #[test]
    fn test_marker_case_insensitive_and_cumulative() {
        let rows = rows_of("[mwb]\n1,a\n[/Mwb]\nskip\n[MWB]\n2,b\n[/MWB]\n", "MWB");
        assert_eq!(rows, vec![vec!["1", "a"], vec!["2", "b"]]);
    }

    #[test]
    fn test_crlf_and_empty_lines() {
        let rows = rows_of("[TXT]\r\n1,a\r\n\r\n2,b\r\n[/TXT]\r\n", "TXT");
        assert_eq!(rows, vec![vec!["1", "a"], vec![""], vec!["2", "b"]]);
    }

    #[test]
    fn test_last_line_without_terminator() {
        // Unclosed segment at end of file, no final newline
        let rows = rows_of("[MWB]\n1,a\n2,b", "MWB");
        assert_eq!(rows, vec![vec!["1", "a"], vec!["2", "b"]]);
    }

    #[test]
    fn test_no_row_after_final_terminator() {
        let rows = rows_of("[MWB]\n1,a\n2,b\n", "MWB");
        assert_eq!(rows, vec![vec!["1", "a"], vec!["2", "b"]]);

        let rows = rows_of("[MWB]\r\n1,a\r\n", "MWB");
        assert_eq!(rows, vec![vec!["1", "a"]]);
    }

    #[test]
    fn test_similar_marker_names_do_not_match() {
        let rows = rows_of("[MWBX]\n1,a\n[/MWBX]\n[ MWB]\n2,b\n", "MWB");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_segment_state_is_file_scoped() {
        // First file never closes its segment
        let mut first = NamedTempFile::new().unwrap();
        first.write_all(b"[MWB]\n1,a\n").unwrap();
        let mut second = NamedTempFile::new().unwrap();
        second.write_all(b"2,leak\n[MWB]\n3,c\n[/MWB]\n").unwrap();

        let rows = extract_segment(&[first.path(), second.path()], "MWB").unwrap();
        assert_eq!(rows, vec![vec!["1", "a"], vec!["3", "c"]]);
    }

    #[test]
    fn test_missing_file_fails_whole_extraction() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[MWB]\n1,a\n[/MWB]\n").unwrap();
        let missing = file.path().with_extension("missing");

        let result = extract_segment(&[file.path().to_path_buf(), missing], "MWB");
        assert!(matches!(result, Err(DecoderError::Io { .. })));
    }

    #[test]
    fn test_windows_1252_fields() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[UNT]\r\n1,\xB0C\r\n2,\x80\r\n[/UNT]\r\n").unwrap();

        let rows = extract_segment(&[file.path()], "UNT").unwrap();
        assert_eq!(rows, vec![vec!["1", "°C"], vec!["2", "€"]]);
    }
}
