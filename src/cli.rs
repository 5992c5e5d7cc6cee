use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "symdex")]
#[command(about = "Fuzzy, type-aware search over documentation symbol indexes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a query against an index file
    Search {
        /// Query text; `kind:` prefixes, quotes, `->` signatures, and
        /// comma-separated batches all work
        query: String,
        /// Path to the raw index JSON
        #[arg(short, long)]
        index: PathBuf,
        /// Restrict matching to one compilation unit
        #[arg(short = 'u', long = "unit")]
        unit: Option<String>,
        /// Unit that wins distance ties and owns the alias table
        #[arg(long = "current-unit")]
        current_unit: Option<String>,
        /// Rows to print per bucket
        #[arg(short = 'n', long, default_value = "25")]
        limit: usize,
    },
    /// List the compilation units in an index file
    Units {
        /// Path to the raw index JSON
        #[arg(short, long)]
        index: PathBuf,
    },
}
