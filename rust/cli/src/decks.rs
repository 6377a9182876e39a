//! Deck files describe the players taking part in a battle.
//!
//! ```toml
//! [[players]]
//! username = "alice"
//! elo = 100
//!
//! [[players.cards]]
//! id = "a1"
//! name = "WaterSpell"
//! damage = 30.0
//! ```
//!
//! `kind` and `element` may be given explicitly; when omitted they are
//! derived from the card name.

use crate::error::CliError;
use duelyard_engine::cards::{Card, CardKind, Element};
use duelyard_engine::player::{Player, STARTING_ELO};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeckFile {
    players: Vec<PlayerEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlayerEntry {
    username: String,
    #[serde(default)]
    elo: Option<u32>,
    #[serde(default)]
    cards: Vec<CardEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CardEntry {
    id: String,
    name: String,
    damage: f64,
    #[serde(default)]
    kind: Option<CardKind>,
    #[serde(default)]
    element: Option<Element>,
    #[serde(default)]
    locked: bool,
}

impl CardEntry {
    fn into_card(self) -> Card {
        let mut card = Card::from_name(self.id, self.name, self.damage);
        if let Some(kind) = self.kind {
            card.kind = kind;
        }
        if let Some(element) = self.element {
            card.element = element;
        }
        card.locked = self.locked;
        card
    }
}

pub fn load_players(path: &Path) -> Result<Vec<Player>, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::InvalidInput(format!("cannot read {}: {}", path.display(), e)))?;
    parse_players(&text)
        .map_err(|msg| CliError::InvalidInput(format!("{}: {}", path.display(), msg)))
}

/// Parse a deck file. Usernames and card ids must be unique across the file.
pub fn parse_players(text: &str) -> Result<Vec<Player>, String> {
    let file: DeckFile = toml::from_str(text).map_err(|e| e.to_string())?;

    let mut names = HashSet::new();
    let mut ids = HashSet::new();
    let mut players = Vec::with_capacity(file.players.len());
    for entry in file.players {
        if entry.username.is_empty() {
            return Err("username must not be empty".into());
        }
        if !names.insert(entry.username.clone()) {
            return Err(format!("duplicate player {}", entry.username));
        }
        let mut cards = Vec::with_capacity(entry.cards.len());
        for card in entry.cards {
            if !ids.insert(card.id.clone()) {
                return Err(format!("duplicate card id {}", card.id));
            }
            let card = card.into_card();
            card.validate().map_err(|e| e.to_string())?;
            cards.push(card);
        }
        let player = Player::with_deck(entry.username, cards)
            .with_elo(entry.elo.unwrap_or(STARTING_ELO));
        players.push(player);
    }
    Ok(players)
}
