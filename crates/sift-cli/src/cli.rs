//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sift: filter tabular data into views and reconcile edits made against them
#[derive(Parser)]
#[command(name = "sift")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show each column's inferred kind, domain and legal filter shapes
    Profile {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Declare a column kind: COL=KIND[:level,level,...]
        /// (kinds: numeric, boolean, temporal, text, categorical, ordered)
        #[arg(short, long, value_name = "DECLARATION")]
        declare: Vec<String>,
    },

    /// Print the rows that satisfy every filter
    Filter {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Column filter: COL:SHAPE=ARGS, e.g. "age:range=18..59",
        /// "risk:in=low,med", "name:contains=ann", "flag:eq=true", "notes:null"
        #[arg(short = 'w', long = "where", value_name = "EXPR")]
        filters: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Maximum number of rows to print
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Declare a column kind: COL=KIND[:level,level,...]
        #[arg(short, long, value_name = "DECLARATION")]
        declare: Vec<String>,
    },

    /// Apply a JSON list of edits to the filtered view and export the result
    Edit {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Column filter: COL:SHAPE=ARGS
        #[arg(short = 'w', long = "where", value_name = "EXPR")]
        filters: Vec<String>,

        /// JSON file holding a list of edit operations
        #[arg(short, long, value_name = "EDITS")]
        edits: PathBuf,

        /// Output path for the edited data (default: <file>_edited.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "csv")]
        format: OutputFormat,

        /// Print the conflict report as JSON
        #[arg(long)]
        json: bool,

        /// Declare a column kind: COL=KIND[:level,level,...]
        #[arg(short, long, value_name = "DECLARATION")]
        declare: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
}

impl OutputFormat {
    /// Field delimiter for this format.
    pub fn delimiter(&self) -> u8 {
        match self {
            OutputFormat::Csv => b',',
            OutputFormat::Tsv => b'\t',
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            _ => Err(format!("Unknown format: {}. Use csv or tsv.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Tsv => write!(f, "tsv"),
        }
    }
}
