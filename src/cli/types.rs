//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::analyze::AnalyzeArgs;
use super::commands::init::InitArgs;
use super::commands::peaks::PeaksArgs;
use super::commands::session::SessionArgs;
use super::commands::simulate::SimulateArgs;

#[derive(Parser, Debug)]
#[command(name = "glyph-operator")]
#[command(about = "Temporal glyph operator - multi-scale motif sampling and divergence peaks", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (replaces the .glyph/ lookup)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default .glyph/config.yaml
    Init(InitArgs),

    /// Sample one frame and print its report
    Analyze(AnalyzeArgs),

    /// Run the sampling operator over synthetic frames
    Simulate(SimulateArgs),

    /// Detect divergence peaks in a series file
    Peaks(PeaksArgs),

    /// Replay a recorded session and detect divergence peaks
    Session(SessionArgs),
}
