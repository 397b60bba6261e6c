//! Command-line arguments of the `arbor` binary.

use clap::Parser;

/// Render an Arbor diagram description to SVG
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the TOML diagram description
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output SVG file, overriding `diagram.output`
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
