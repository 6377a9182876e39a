//! Command handlers.
//!
//! Each handler has the shape
//! `pub fn handle_COMMAND_command(..., out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError>`
//! and never touches the process streams directly.

pub mod battle;
pub mod cfg;
pub mod lobby;
pub mod rules;

pub use battle::handle_battle_command;
pub use cfg::handle_cfg_command;
pub use lobby::handle_lobby_command;
pub use rules::handle_rules_command;

use crate::config::{self, Config};
use crate::error::CliError;
use crate::ui;
use std::io::Write;

/// Load configuration, reporting failures on `err`.
pub(crate) fn load_config(err: &mut dyn Write) -> Result<Config, CliError> {
    config::load().map_err(|e| {
        let msg = format!("Invalid configuration: {}", e);
        let _ = ui::write_error(err, &msg);
        CliError::Config(msg)
    })
}
