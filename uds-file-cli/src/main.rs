//! UDS Definition File CLI Application
//!
//! Command-line front end for the uds-file-decoder library:
//! - Table statistics of a definition directory
//! - File list (redirects and includes) of a module
//! - Decoded records of a module as text or JSON
//! - Parallel scan over all modules of a directory

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use uds_file_decoder::{ReaderConfig, SegmentKind, UdsReader};

mod config;
mod report;

use config::AppConfig;
use report::{RecordsReport, ScanOutcome, ScanReport, StatsReport};

/// UDS File Reader - Decode diagnostic definition files
#[derive(Parser, Debug)]
#[command(name = "uds-file-cli")]
#[command(about = "Decode UDS diagnostic definition files", long_about = None)]
#[command(version)]
struct Args {
    /// Definition directory (overrides data_dir from the config file)
    #[arg(short, long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Definition file extension (overrides reader.file_extension)
    #[arg(long, value_name = "EXT", global = true)]
    extension: Option<String>,

    /// Text dictionary file pattern, e.g. "TTText_DE*"
    #[arg(long, value_name = "PATTERN", global = true)]
    text_pattern: Option<String>,

    /// Unit dictionary file pattern, e.g. "Unit_DE*"
    #[arg(long, value_name = "PATTERN", global = true)]
    unit_pattern: Option<String>,

    /// Value-name table file stem
    #[arg(long, value_name = "STEM", global = true)]
    value_name_stem: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the directory and show table statistics
    Info,

    /// Show the files making up a module definition
    Files {
        /// Module name, e.g. EV_ECM20TFS
        module: String,
    },

    /// Decode the records of a module
    Resolve {
        /// Module name, e.g. EV_ECM20TFS
        module: String,

        /// Segment kind (adp, dtc, ffmux, ges, mwb, sot, xpl)
        #[arg(short, long, default_value = "mwb", value_parser = parse_segment_kind)]
        segment: SegmentKind,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Resolve every module definition file in the directory
    Scan {
        /// Segment kind (adp, dtc, ffmux, ges, mwb, sot, xpl)
        #[arg(short, long, default_value = "mwb", value_parser = parse_segment_kind)]
        segment: SegmentKind,
    },
}

fn parse_segment_kind(s: &str) -> std::result::Result<SegmentKind, String> {
    s.parse::<SegmentKind>().map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("UDS File Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", uds_file_decoder::VERSION);

    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    let Some(data_dir) = args.data_dir.clone().or_else(|| app_config.data_dir.clone()) else {
        bail!("No definition directory given (use --data-dir or data_dir in the config file)");
    };

    let reader_config = reader_config(&args, app_config.reader.clone());
    let reader = UdsReader::init_with_config(&data_dir, reader_config)
        .with_context(|| format!("Failed to load definition directory {:?}", data_dir))?;

    match &args.command {
        Command::Info => {
            let stats = reader.stats();
            if app_config.output.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", StatsReport(&stats));
            }
        }
        Command::Files { module } => {
            let Some(files) = module_files(&reader, module)? else {
                return Ok(());
            };
            for file in files {
                println!("{}", file.display());
            }
        }
        Command::Resolve {
            module,
            segment,
            json,
        } => {
            let Some(files) = module_files(&reader, module)? else {
                return Ok(());
            };
            let records = reader
                .resolve(&files, *segment)
                .with_context(|| format!("Failed to resolve {} records of {}", segment, module))?;

            if *json || app_config.output.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print!("{}", RecordsReport(&records));
            }
        }
        Command::Scan { segment } => {
            let results = scan_directory(&reader, *segment)?;
            print!("{}", ScanReport(&results));
        }
    }

    Ok(())
}

/// Apply command-line overrides on top of the configured reader settings
fn reader_config(args: &Args, mut config: ReaderConfig) -> ReaderConfig {
    if let Some(extension) = &args.extension {
        config = config.with_file_extension(extension.as_str());
    }
    if let Some(pattern) = &args.text_pattern {
        config = config.with_text_pattern(pattern.as_str());
    }
    if let Some(pattern) = &args.unit_pattern {
        config = config.with_unit_pattern(pattern.as_str());
    }
    if let Some(stem) = &args.value_name_stem {
        config = config.with_value_name_stem(stem.as_str());
    }
    config
}

/// File list of a module; `None` if the module has no definition
fn module_files(reader: &UdsReader, module: &str) -> Result<Option<Vec<PathBuf>>> {
    match reader.file_list(&reader.dir().join(module)) {
        Ok(files) => Ok(Some(files)),
        Err(e) if e.is_undefined_module() => {
            println!("{}: no diagnostic definition", module);
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to resolve files of {}", module)),
    }
}

/// Resolve all module definition files in parallel with one shared reader
fn scan_directory(
    reader: &UdsReader,
    segment: SegmentKind,
) -> Result<Vec<(PathBuf, ScanOutcome)>> {
    let modules = module_definition_files(reader.dir(), reader)?;
    log::info!("Scanning {} module files", modules.len());

    let results = modules
        .into_par_iter()
        .map(|path| {
            let result = reader.resolve_module(&path, segment);
            if let Err(e) = &result {
                log::debug!("{:?}: {}", path, e);
            }
            let outcome = ScanOutcome::from(&result);
            (path, outcome)
        })
        .collect();

    Ok(results)
}

/// Definition files of `dir` that are not shared tables, sorted by name
fn module_definition_files(dir: &Path, reader: &UdsReader) -> Result<Vec<PathBuf>> {
    let config = reader.config();
    let mut modules = Vec::new();

    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))? {
        let path = entry?.path();
        let is_definition = path.file_name().and_then(|n| n.to_str()).is_some_and(|n| {
            n.to_ascii_lowercase()
                .ends_with(&config.file_extension.to_ascii_lowercase())
        });
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");

        if path.is_file() && is_definition && !config.is_table_stem(stem) {
            modules.push(path);
        }
    }

    modules.sort();
    Ok(modules)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
