//! Command-line interface for bmirec.
//!
//! This module provides the CLI structure for the `bmirec` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CalcCommand, ConfigCommand, FormCommand, HistoryCommand, HistoryFormatArg, StatusCommand,
};

use crate::logging::Verbosity;

/// bmirec - Record BMI calculations and chart their history
///
/// Computes a Body Mass Index from height and weight, classifies it, and
/// keeps every result in a local database.
#[derive(Debug, Parser)]
#[command(name = "bmirec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calculate a BMI and record it
    Calc(CalcCommand),

    /// Enter name, height and weight interactively, then record the BMI
    Form(FormCommand),

    /// Show all recorded results
    History(HistoryCommand),

    /// Show database status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                2 => Verbosity::Debug,
                _ => Verbosity::Trace,
            }
        }
    }
}
