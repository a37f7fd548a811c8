//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::config::HistoryFormat;

/// Calculate command arguments.
///
/// The numeric fields are taken as text and validated by the BMI engine,
/// so that malformed input is reported the same way as in the form.
#[derive(Debug, Args)]
pub struct CalcCommand {
    /// Name of the person being measured
    #[arg(allow_hyphen_values = true)]
    pub name: String,

    /// Height in centimeters
    #[arg(allow_hyphen_values = true, value_name = "HEIGHT_CM")]
    pub height_cm: String,

    /// Weight in kilograms
    #[arg(allow_hyphen_values = true, value_name = "WEIGHT_KG")]
    pub weight_kg: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Interactive form arguments.
#[derive(Debug, Args)]
pub struct FormCommand {
    /// Output the result as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// History command arguments.
#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// Output format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub format: Option<HistoryFormatArg>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// History output format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HistoryFormatArg {
    /// Bar chart of BMI per record
    Chart,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

impl From<HistoryFormatArg> for HistoryFormat {
    fn from(arg: HistoryFormatArg) -> Self {
        match arg {
            HistoryFormatArg::Chart => Self::Chart,
            HistoryFormatArg::Table => Self::Table,
            HistoryFormatArg::Json => Self::Json,
        }
    }
}
