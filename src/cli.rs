use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fixmap")]
#[command(about = "Pattern-based issue scanner and remediation plan generator", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a source tree and generate a remediation plan
    Scan {
        /// Path to scan
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// File extensions to include (overrides config)
        #[arg(long, value_delimiter = ',')]
        extensions: Option<Vec<String>>,

        /// Directory names to exclude (overrides config)
        #[arg(long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,

        /// Maximum file size in bytes
        #[arg(long)]
        max_file_size: Option<u64>,

        /// Number of worker threads (defaults to available cores)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
    Markdown,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => Self::Terminal,
            OutputFormat::Json => Self::Json,
            OutputFormat::Markdown => Self::Markdown,
        }
    }
}
