//! CLI tool to import, validate and re-export GDV files.

use clap::{Parser, ValueEnum};
use gdv_records::{Config, Package, Registry, SEGMENT_WIDTH, parse_layouts};
use std::fs;
use std::io::{self, BufWriter};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

/// Read a GDV file, optionally validate it and write it back out.
///
/// Record types without a layout are kept as they are and reported by
/// --validate.
#[derive(Parser)]
#[command(name = "gdv-xport")]
struct Cli {
    /// Input GDV file (default: stdin)
    #[arg(long)]
    import: Option<String>,

    /// Write the records to file instead of stdout
    #[arg(long)]
    export: Option<String>,

    /// Layout definition file, may be given more than once
    #[arg(long)]
    layout: Vec<String>,

    /// Print violations on stderr; exit code 2 if there are any
    #[arg(long)]
    validate: bool,

    /// Bytes per line
    #[arg(long, default_value_t = SEGMENT_WIDTH)]
    width: usize,

    /// Marker written after each exported line
    #[arg(long, value_enum, default_value_t = EndOfRecord::None)]
    eod: EndOfRecord,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum EndOfRecord {
    None,
    Lf,
    Crlf,
}

impl EndOfRecord {
    fn marker(self) -> &'static str {
        match self {
            EndOfRecord::None => "",
            EndOfRecord::Lf => "\n",
            EndOfRecord::Crlf => "\r\n",
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .init();

    let config = Config::default()
        .with_segment_width(cli.width)
        .with_end_marker(cli.eod.marker());
    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    let mut registry = Registry::standard();
    for path in &cli.layout {
        let text = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading layout file '{path}': {e}");
                process::exit(1);
            }
        };
        match parse_layouts(&text) {
            Ok(layouts) => {
                for layout in layouts {
                    let record_type = layout.record_type;
                    if let Err(e) = registry.register_layout_checked(layout, &config) {
                        eprintln!("Error in layout file '{path}', record {record_type:04}: {e}");
                        process::exit(1);
                    }
                }
            }
            Err(e) => {
                eprintln!("Error in layout file '{path}': {e}");
                process::exit(1);
            }
        }
    }

    let mut package = Package::with_registry(config, registry);
    let imported = match &cli.import {
        Some(path) => package.import_file(path),
        None => package.import_from(io::stdin().lock()),
    };
    if let Err(e) = imported {
        eprintln!("Error reading '{}': {e}", cli.import.as_deref().unwrap_or("(stdin)"));
        process::exit(1);
    }

    let exported = if let Some(out_path) = &cli.export {
        if let Some(parent) = Path::new(out_path.as_str()).parent()
            && !parent.as_os_str().is_empty()
            && fs::create_dir_all(parent).is_err()
        {
            eprintln!("Error creating output directory for '{out_path}'");
            process::exit(1);
        }
        package.export_file(out_path)
    } else {
        package.export_to(BufWriter::new(io::stdout().lock()))
    };
    if let Err(e) = exported {
        eprintln!("Error writing output: {e}");
        process::exit(1);
    }

    if cli.verbose {
        eprintln!("Records:  {}", package.len());
    }

    if cli.validate {
        let violations = package.validate();
        for violation in &violations {
            eprintln!("{violation}");
        }
        if !violations.is_empty() {
            eprintln!("{} violation(s)", violations.len());
            process::exit(2);
        }
    }
}
