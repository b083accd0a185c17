//! Standalone module dump tool
//!
//! Loads a definition directory and prints the decoded records of one
//! module for every segment kind.
//!
//! Usage:
//!   dump_module <definition_dir> <module>
//!
//! Example:
//!   RUST_LOG=debug dump_module /data/uds EV_ECM20TFS

use std::env;
use std::path::PathBuf;
use uds_file_decoder::{DecodedRecord, SegmentKind, UdsReader};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <definition_dir> <module>", args[0]);
        std::process::exit(1);
    }

    let dir = PathBuf::from(&args[1]);
    let reader = match UdsReader::init(&dir) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("Failed to load {:?}: {}", dir, e);
            std::process::exit(1);
        }
    };

    let files = match reader.file_list(&dir.join(&args[2])) {
        Ok(files) => files,
        Err(e) if e.is_undefined_module() => {
            println!("{}: no diagnostic definition", args[2]);
            return;
        }
        Err(e) => {
            eprintln!("Failed to resolve {}: {}", args[2], e);
            std::process::exit(1);
        }
    };

    println!("Files:");
    for file in &files {
        println!("  {}", file.display());
    }

    for kind in SegmentKind::ALL {
        match reader.resolve(&files, kind) {
            Ok(records) if records.is_empty() => {}
            Ok(records) => {
                println!("\n[{}] {} records", kind, records.len());
                for record in records {
                    match record {
                        DecodedRecord::MeasurementBlock(block) => println!(
                            "  {:<40} {:<28} {}",
                            block.name.join(" "),
                            block.data_type_id.to_string(),
                            block.unit.as_deref().unwrap_or("")
                        ),
                        DecodedRecord::Plain(plain) => println!("  {}", plain.fields.join(",")),
                    }
                }
            }
            Err(e) => eprintln!("\n[{}] error: {}", kind, e),
        }
    }
}
