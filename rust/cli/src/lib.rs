//! # Duelyard CLI Library
//!
//! Command-line front end for the duelyard card battle engine and lobby.
//!
//! The entry point is [`run`], which parses arguments, dispatches to a
//! subcommand and returns the process exit code.
//!
//! ```no_run
//! use std::io;
//! let args = vec!["duelyard", "battle", "--decks", "decks.toml", "--seed", "7"];
//! let code = duelyard_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Subcommands
//!
//! - `battle`: run one battle between two players from a TOML deck file
//! - `lobby`: pair every player of a deck file through the matchmaking queue
//! - `rules`: print special interactions and the element chart
//! - `cfg`: print resolved configuration with value sources

use clap::Parser;
use std::io::Write;

pub mod cli;
mod commands;
pub mod config;
pub mod decks;
mod error;
pub mod exit_code;
pub mod ui;

use cli::{Commands, DuelyardCli, LogArg};
use commands::{
    handle_battle_command, handle_cfg_command, handle_lobby_command, handle_rules_command,
};
use duelyard_lobby::{LogFormat, init_logging};

pub use error::CliError;

const COMMANDS: &[&str] = &["battle", "lobby", "rules", "cfg"];

/// Parse `args` and run the selected command.
///
/// Returns [`exit_code::SUCCESS`] or [`exit_code::ERROR`].
///
/// ```
/// use std::io;
/// let mut out = Vec::new();
/// let code = duelyard_cli::run(["duelyard", "rules"], &mut out, &mut io::stderr());
/// assert_eq!(code, 0);
/// assert!(String::from_utf8(out).unwrap().contains("Goblin vs Dragon"));
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match DuelyardCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return usage_error(e, out, err),
    };

    if let Some(format) = cli.log {
        let format = match format {
            LogArg::Text => LogFormat::Text,
            LogArg::Json => LogFormat::Json,
        };
        if init_logging(format).is_err() {
            let _ = ui::display_warning(err, "logging already initialised");
        }
    }

    let result = match cli.cmd {
        Commands::Battle {
            decks,
            seed,
            json,
            record,
        } => handle_battle_command(&decks, seed, json, record, out, err),
        Commands::Lobby { decks, seed, json } => {
            handle_lobby_command(&decks, seed, json, out, err)
        }
        Commands::Rules => handle_rules_command(out),
        Commands::Cfg => handle_cfg_command(out, err),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        // configuration problems are already reported by the handler
        Err(CliError::Config(_)) => exit_code::ERROR,
        Err(e) => {
            let _ = ui::write_error(err, &e.to_string());
            exit_code::ERROR
        }
    }
}

fn usage_error(e: clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // Help and version should print to stdout and exit 0
    if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        if write!(out, "{}", e).is_err() {
            return exit_code::ERROR;
        }
        return exit_code::SUCCESS;
    }

    if writeln!(err, "{}", e).is_err()
        || writeln!(err).is_err()
        || writeln!(err, "Duelyard card battle CLI").is_err()
        || writeln!(err, "Usage: duelyard <command> [options]\n").is_err()
        || writeln!(err, "Commands:").is_err()
    {
        return exit_code::ERROR;
    }
    for c in COMMANDS {
        if writeln!(err, "  {}", c).is_err() {
            return exit_code::ERROR;
        }
    }
    let _ = writeln!(err, "\nFor full help, run: duelyard --help");
    exit_code::ERROR
}
