use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `aios` - closed-loop automation controller.
#[derive(Parser, Debug)]
#[command(name = "aios")]
#[command(version = "0.1.0")]
#[command(
    about = "Track observed changes, vet proposed actions and dispatch them.",
    long_about = None
)]
pub struct Cli {
    /// Config file to use instead of ~/.aios/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Feed one observation (JSON file) to the change detector
    Observe {
        /// Path to an ObservationEvent JSON document
        file: PathBuf,
    },

    /// Show recorded changes, most recent first
    History {
        /// Only show changes whose summary contains this text
        #[arg(long, default_value = "")]
        filter: String,

        /// Maximum number of changes to show (default: memory.history_limit)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Run an action plan (JSON file) through the safety gate
    Verify {
        /// Path to an ActionPlan JSON document
        plan: PathBuf,
    },

    /// Run one full observe/decide/verify/act cycle
    Cycle {
        /// Path to an ObservationEvent JSON document
        observation: PathBuf,

        /// Force every proposed plan into dry-run
        #[arg(long)]
        dry_run: bool,
    },
}
