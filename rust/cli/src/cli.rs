//! Command-line definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "duelyard",
    version,
    about = "Duelyard card battle CLI",
    long_about = None
)]
pub struct DuelyardCli {
    /// Emit engine and lobby logs to stderr in the given format
    #[arg(long, global = true, value_enum)]
    pub log: Option<LogArg>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one battle between the two players of a deck file
    Battle {
        /// TOML file describing exactly two players
        #[arg(long)]
        decks: PathBuf,
        /// Seed for card selection (overrides DUELYARD_SEED and the config file)
        #[arg(long)]
        seed: Option<u64>,
        /// Print the battle record as JSON instead of the transcript
        #[arg(long)]
        json: bool,
        /// Also write the battle record as a JSONL line to this file
        #[arg(long)]
        record: Option<PathBuf>,
    },
    /// Pair every player of a deck file through the matchmaking queue
    Lobby {
        /// TOML file describing an even number of players
        #[arg(long)]
        decks: PathBuf,
        /// Master seed for per-battle seeds
        #[arg(long)]
        seed: Option<u64>,
        /// Print battle records and the scoreboard as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show special interactions and the element chart
    Rules,
    /// Show resolved configuration and where each value came from
    Cfg,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogArg {
    Text,
    Json,
}
