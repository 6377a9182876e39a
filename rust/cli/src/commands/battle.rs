//! `battle` command: one battle between the two players of a deck file.

use crate::commands::load_config;
use crate::decks;
use crate::error::CliError;
use crate::ui;
use duelyard_engine::effects::NoopEffects;
use duelyard_engine::engine::BattleEngine;
use duelyard_engine::logger::BattleRecordWriter;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn handle_battle_command(
    decks_path: &Path,
    seed: Option<u64>,
    json: bool,
    record: Option<PathBuf>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let config = load_config(err)?;
    let seed = seed.or(config.seed);

    let players = decks::load_players(decks_path)?;
    let [mut first, mut second]: [_; 2] = players.try_into().map_err(|p: Vec<_>| {
        CliError::InvalidInput(format!(
            "battle needs exactly 2 players, {} has {}",
            decks_path.display(),
            p.len()
        ))
    })?;

    for player in [&first, &second] {
        if player.is_exhausted() {
            ui::display_warning(
                err,
                &format!(
                    "{} has no playable cards; the battle ends before the first round",
                    player.username
                ),
            )?;
        }
    }

    let mut engine = BattleEngine::new(seed);
    let report = engine.start_battle(&mut first, &mut second, &NoopEffects)?;

    let mut writer = match &record {
        Some(path) => BattleRecordWriter::create(path)?,
        None => BattleRecordWriter::detached(),
    };
    let battle = report.to_record(writer.next_id());
    writer.write(&battle)?;

    if json {
        let text = serde_json::to_string_pretty(&battle).map_err(std::io::Error::other)?;
        writeln!(out, "{}", text)?;
    } else {
        writeln!(out, "{}", report.log_text())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const DECKS: &str = r#"
[[players]]
username = "alice"
[[players.cards]]
id = "a1"
name = "WaterSpell"
damage = 20.0

[[players]]
username = "bob"
[[players.cards]]
id = "b1"
name = "FireTroll"
damage = 30.0
"#;

    fn deck_file(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(text.as_bytes()).expect("write decks");
        file
    }

    #[test]
    #[serial]
    fn prints_transcript() {
        let file = deck_file(DECKS);
        let mut out = Vec::new();
        let mut err = Vec::new();

        handle_battle_command(file.path(), Some(3), false, None, &mut out, &mut err)
            .expect("battle runs");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("Battle: alice vs bob\n"));
        assert!(text.contains("WaterSpell damage changed from 20 to 40 (water vs fire)"));
        assert!(text.trim_end().ends_with("alice wins the battle!"));
        assert!(err.is_empty());
    }

    #[test]
    #[serial]
    fn rejects_three_players() {
        let file = deck_file(&format!(
            "{DECKS}\n[[players]]\nusername = \"carol\"\n"
        ));
        let mut out = Vec::new();
        let mut err = Vec::new();

        let result = handle_battle_command(file.path(), None, false, None, &mut out, &mut err);
        assert!(matches!(result, Err(CliError::InvalidInput(msg)) if msg.contains("exactly 2 players")));
        assert!(out.is_empty());
    }

    #[test]
    #[serial]
    fn warns_about_empty_decks() {
        let file = deck_file("[[players]]\nusername = \"a\"\n[[players]]\nusername = \"b\"\n");
        let mut out = Vec::new();
        let mut err = Vec::new();

        handle_battle_command(file.path(), None, false, None, &mut out, &mut err)
            .expect("battle runs");

        let warnings = String::from_utf8(err).expect("utf8");
        assert!(warnings.contains("WARNING: a has no playable cards"));
        assert!(String::from_utf8(out)
            .expect("utf8")
            .contains("The battle ends in a draw!"));
    }
}
