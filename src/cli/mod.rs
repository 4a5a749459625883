//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{BuildCommand, ValidateCommand, VersionsCommand};
use std::ffi::OsString;

/// Run configuration tool for data pipelines
#[derive(Debug, Parser, Clone)]
#[command(name = "runconf")]
#[command(version = "0.1.0")]
#[command(about = "Build and validate pipeline run configurations", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Validate a pipeline definition
    Validate(ValidateCommand),

    /// List a pipeline's versions
    Versions(VersionsCommand),

    /// Build the run configuration of a version
    Build(BuildCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
