//! Shared fixtures for engine integration tests.

use duelyard_engine::cards::Card;
use duelyard_engine::effects::BattleEffects;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Rating(String, i32),
    Win(String),
    Loss(String),
    Transfer(String, String),
}

/// Effects sink that remembers every call in order.
#[derive(Debug, Default)]
pub struct RecordingEffects {
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl RecordingEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn transfers(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Transfer(owner, card) => Some((owner, card)),
                _ => None,
            })
            .collect()
    }

    pub fn outcome_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Transfer(..)))
            .collect()
    }
}

impl BattleEffects for RecordingEffects {
    fn update_rating(&self, username: &str, delta: i32) {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Rating(username.to_string(), delta));
    }

    fn record_win(&self, username: &str) {
        self.calls.lock().unwrap().push(Call::Win(username.to_string()));
    }

    fn record_loss(&self, username: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Loss(username.to_string()));
    }

    fn transfer_card_ownership(&self, new_owner: &str, card: &Card) {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Transfer(new_owner.to_string(), card.id.to_string()));
    }
}

#[allow(dead_code)]
pub fn mixed_deck(prefix: &str) -> Vec<Card> {
    [
        ("WaterSpell", 30.0),
        ("FireSpell", 25.0),
        ("Knight", 40.0),
        ("Dragon", 55.0),
        ("RegularGoblin", 15.0),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, dmg))| Card::from_name(format!("{}-{}", prefix, i), *name, *dmg))
    .collect()
}

#[allow(dead_code)]
pub fn terminal_lines(log: &str) -> usize {
    log.lines()
        .filter(|l| l.ends_with(" wins the battle!") || *l == "The battle ends in a draw!")
        .count()
}
