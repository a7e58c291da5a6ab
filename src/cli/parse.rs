//! CLI parse: clap types for strctx. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// strctx - Inspect and manipulate string context
///
/// Context is given as compact elements: `<path>` for a plain path,
/// `=<drv>` for a whole derivation, `!<output>!<drv>` for one output.
#[derive(Parser)]
#[command(name = "strctx")]
#[command(about = "Inspect and manipulate the provenance context of strings")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project directory (strctx.toml is read from here)
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Local store index (overrides store.db_path)
    #[arg(long)]
    pub store_db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the context grouped by path
    Get {
        /// Output format (json or table)
        #[arg(long, default_value = "json")]
        format: String,
        /// Context elements
        elements: Vec<String>,
    },
    /// Print whether the context is non-empty
    Has {
        elements: Vec<String>,
    },
    /// Drop every context element
    Discard {
        /// Text the context is attached to
        #[arg(long, default_value = "")]
        text: String,
        elements: Vec<String>,
    },
    /// Downgrade whole-derivation references to plain path references
    DiscardOutputs {
        #[arg(long, default_value = "")]
        text: String,
        elements: Vec<String>,
    },
    /// Merge a JSON context record into the given context
    Append {
        /// JSON file with the record, or "-" for stdin
        #[arg(long)]
        info: String,
        /// Do not realise the referenced paths
        #[arg(long)]
        read_only: bool,
        #[arg(long, default_value = "")]
        text: String,
        elements: Vec<String>,
    },
    /// Local store index
    Store {
        #[command(subcommand)]
        command: StoreCommands,
    },
}

#[derive(Subcommand)]
pub enum StoreCommands {
    /// Register a path as present
    Register {
        path: String,
        /// Derivation that produced the path
        #[arg(long)]
        deriver: Option<String>,
    },
    /// List registered paths
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
