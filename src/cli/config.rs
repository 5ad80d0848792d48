use clap::{Parser, Subcommand, ValueEnum};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-autofill",
    version,
    about = "Classify form fields in a page snapshot and fill them with plausible values"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill every eligible field of a page snapshot
    Fill {
        /// Page snapshot (JSON)
        #[arg(long)]
        snapshot: String,

        /// Settings file, YAML or JSON (default: form-autofill.yaml in current dir)
        #[arg(long)]
        config: Option<String>,

        /// Write the filled snapshot here
        #[arg(short, long)]
        output: Option<String>,

        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
        format: ReportFormat,

        /// Seed for reproducible values
        #[arg(long)]
        seed: Option<u64>,

        /// Append one JSON line per field decision to this file
        #[arg(long)]
        trace: Option<String>,
    },

    /// Print how each field would be classified, without filling
    Classify {
        #[arg(long)]
        snapshot: String,

        #[arg(long)]
        config: Option<String>,
    },

    /// Validate a settings file
    CheckConfig {
        #[arg(long)]
        config: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Console,
    Json,
}

/// Log filter for a `-v` count, used when `RUST_LOG` is unset.
pub fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
