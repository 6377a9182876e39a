//! `lobby` command: run every player of a deck file through matchmaking.
//!
//! Players are registered in a fresh repository, their first unlocked cards
//! form their deck, and consecutive players in the file are queued as
//! opponents. Ratings, records and card ownership carry over between battles
//! of the same run.

use crate::commands::load_config;
use crate::decks;
use crate::error::CliError;
use duelyard_engine::cards::CardId;
use duelyard_engine::player::Player;
use duelyard_lobby::{
    LobbySettings, MatchResult, MatchmakingQueue, PlayerRepository, DECK_SIZE,
};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub fn handle_lobby_command(
    decks_path: &Path,
    seed: Option<u64>,
    json: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let config = load_config(err)?;
    let players = decks::load_players(decks_path)?;
    if players.is_empty() || players.len() % 2 != 0 {
        return Err(CliError::InvalidInput(format!(
            "lobby needs an even number of players, {} has {}",
            decks_path.display(),
            players.len()
        )));
    }

    let repo = Arc::new(PlayerRepository::new());
    let names = enroll(&repo, players)?;

    let settings = LobbySettings {
        seed: seed.or(config.seed),
        history_capacity: config.history_capacity,
        ..LobbySettings::default()
    };
    let queue = MatchmakingQueue::with_settings(repo.clone(), &settings)
        .map_err(|e| CliError::Lobby(e.to_string()))?;
    let queue = Arc::new(queue);

    let runtime = tokio::runtime::Runtime::new()?;
    let results = runtime.block_on(play_pairs(&queue, &repo, &names))?;

    if json {
        let history = queue
            .history()
            .ok_or_else(|| CliError::Lobby("battle history disabled".into()))?;
        let mut battles = history
            .recent(None)
            .map_err(|e| CliError::Lobby(e.to_string()))?;
        battles.reverse();
        let report = serde_json::json!({
            "battles": battles,
            "scoreboard": repo.scoreboard()?,
        });
        let text = serde_json::to_string_pretty(&report).map_err(std::io::Error::other)?;
        writeln!(out, "{}", text)?;
        return Ok(());
    }

    for result in &results {
        let outcome = match &result.winner {
            Some(name) => format!("{} wins", name),
            None => "draw".to_string(),
        };
        writeln!(
            out,
            "{}: {} vs {} -> {} after {} rounds",
            result.battle_id, result.player.username, result.opponent, outcome, result.rounds
        )?;
    }
    writeln!(out)?;
    writeln!(out, "Scoreboard:")?;
    for (rank, stats) in repo.scoreboard()?.iter().enumerate() {
        writeln!(
            out,
            "  {}. {} elo={} wins={} losses={}",
            rank + 1,
            stats.username,
            stats.elo,
            stats.wins,
            stats.losses
        )?;
    }
    Ok(())
}

fn enroll(repo: &PlayerRepository, players: Vec<Player>) -> Result<Vec<String>, CliError> {
    let mut names = Vec::with_capacity(players.len());
    for player in players {
        repo.register(&player.username)?;
        let deck: Vec<CardId> = player
            .deck
            .iter()
            .filter(|card| card.is_playable())
            .take(DECK_SIZE)
            .map(|card| card.id.clone())
            .collect();
        if deck.len() < DECK_SIZE {
            return Err(CliError::InvalidInput(format!(
                "{} needs at least {} unlocked cards, has {}",
                player.username,
                DECK_SIZE,
                deck.len()
            )));
        }
        for card in player.deck {
            repo.add_card(&player.username, card)?;
        }
        repo.configure_deck(&player.username, &deck)?;
        names.push(player.username);
    }
    Ok(names)
}

/// Queue players two at a time so pairings follow file order.
async fn play_pairs(
    queue: &Arc<MatchmakingQueue>,
    repo: &PlayerRepository,
    names: &[String],
) -> Result<Vec<MatchResult>, CliError> {
    let mut results = Vec::with_capacity(names.len() / 2);
    for pair in names.chunks(2) {
        let first = repo.snapshot(&pair[0])?;
        let second = repo.snapshot(&pair[1])?;

        let q = Arc::clone(queue);
        let waiting = tokio::spawn(async move { q.enter_queue(first).await });
        while queue.waiting() == 0 {
            tokio::task::yield_now().await;
        }
        let _ = queue.enter_queue(second).await?;
        let result = waiting
            .await
            .map_err(|e| CliError::Lobby(e.to_string()))??;
        results.push(result);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn deck_file(players: &[(&str, &str, f64)]) -> tempfile::NamedTempFile {
        let mut text = String::new();
        for (name, card, damage) in players {
            text.push_str(&format!("[[players]]\nusername = \"{name}\"\n"));
            for i in 1..=4 {
                text.push_str(&format!(
                    "[[players.cards]]\nid = \"{name}-{i}\"\nname = \"{card}\"\ndamage = {damage:?}\n"
                ));
            }
        }
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(text.as_bytes()).expect("write decks");
        file
    }

    #[test]
    #[serial]
    fn pairs_players_in_file_order() {
        let file = deck_file(&[
            ("alice", "Dragon", 50.0),
            ("bob", "Ork", 10.0),
            ("carol", "Knight", 5.0),
            ("dave", "Troll", 60.0),
        ]);
        let mut out = Vec::new();
        let mut err = Vec::new();

        handle_lobby_command(file.path(), Some(1), false, &mut out, &mut err)
            .expect("lobby runs");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains(": alice vs bob -> alice wins after 4 rounds"));
        assert!(text.contains(": carol vs dave -> dave wins after 4 rounds"));
        assert!(text.contains("1. alice elo=103 wins=1 losses=0"));
        assert!(text.contains("elo=95 wins=0 losses=1"));
    }

    #[test]
    #[serial]
    fn rejects_odd_player_count() {
        let file = deck_file(&[("alice", "Dragon", 50.0)]);
        let mut out = Vec::new();
        let mut err = Vec::new();

        let result = handle_lobby_command(file.path(), None, false, &mut out, &mut err);
        assert!(matches!(result, Err(CliError::InvalidInput(msg)) if msg.contains("even number")));
    }

    #[test]
    #[serial]
    fn json_lists_archived_battles() {
        let file = deck_file(&[("alice", "Dragon", 50.0), ("bob", "Ork", 10.0)]);
        let mut out = Vec::new();
        let mut err = Vec::new();

        handle_lobby_command(file.path(), Some(9), true, &mut out, &mut err)
            .expect("lobby runs");

        let json: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(json["battles"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["battles"][0]["winner"], "alice");
        assert_eq!(json["scoreboard"][0]["username"], "alice");
        assert_eq!(json["scoreboard"][1]["elo"], 95);
    }
}
