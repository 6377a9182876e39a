use crate::cards::{Card, CardId};
use serde::{Deserialize, Serialize};

/// Rating assigned to freshly registered players
pub const STARTING_ELO: u32 = 100;

/// Battle-facing snapshot of a user.
///
/// `deck` is the working set the engine drains during one battle; `stack` is
/// the full collection and always contains every deck card. Deck size rules
/// are enforced upstream when the deck is configured, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Display and log identity
    pub username: String,
    /// Rating, never below zero
    pub elo: u32,
    /// Battles won
    #[serde(default)]
    pub wins: u32,
    /// Battles lost
    #[serde(default)]
    pub losses: u32,
    /// Cards configured for battle
    pub deck: Vec<Card>,
    /// Full card collection (superset of `deck`)
    pub stack: Vec<Card>,
}

impl Player {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            elo: STARTING_ELO,
            wins: 0,
            losses: 0,
            deck: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// Build a player whose deck and stack both hold `cards`.
    pub fn with_deck(username: impl Into<String>, cards: Vec<Card>) -> Self {
        let mut player = Self::new(username);
        player.stack = cards.clone();
        player.deck = cards;
        player
    }

    pub fn with_elo(mut self, elo: u32) -> Self {
        self.elo = elo;
        self
    }

    pub fn playable_count(&self) -> usize {
        self.deck.iter().filter(|c| c.is_playable()).count()
    }

    /// A side is exhausted once no unlocked card is left in its deck.
    pub fn is_exhausted(&self) -> bool {
        self.playable_count() == 0
    }

    /// Deck positions of every unlocked card, in deck order.
    pub fn playable_indices(&self) -> Vec<usize> {
        self.deck
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_playable())
            .map(|(i, _)| i)
            .collect()
    }

    /// Remove the card with `id` from both deck and stack.
    /// Returns the deck's original instance, or `None` if it is not in the deck.
    pub fn take_card(&mut self, id: &CardId) -> Option<Card> {
        let pos = self.deck.iter().position(|c| &c.id == id)?;
        let card = self.deck.remove(pos);
        self.stack.retain(|c| &c.id != id);
        Some(card)
    }

    pub fn gain_card(&mut self, card: Card) {
        self.stack.push(card.clone());
        self.deck.push(card);
    }

    /// Apply a signed rating change, flooring the result at zero.
    pub fn apply_rating(&mut self, delta: i32) {
        self.elo = self.elo.saturating_add_signed(delta);
    }

    pub fn record_win(&mut self) {
        self.wins += 1;
    }

    pub fn record_loss(&mut self) {
        self.losses += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, name: &str) -> Card {
        Card::from_name(id, name, 10.0)
    }

    #[test]
    fn exhaustion_ignores_locked_cards() {
        let p = Player::with_deck("alice", vec![card("a", "Goblin").locked()]);
        assert_eq!(p.deck.len(), 1);
        assert!(p.is_exhausted());
        assert!(p.playable_indices().is_empty());
    }

    #[test]
    fn take_card_removes_from_deck_and_stack() {
        let mut p = Player::with_deck("alice", vec![card("a", "Goblin"), card("b", "Ork")]);
        p.stack.push(card("c", "Knight"));

        let taken = p.take_card(&CardId::from("a")).expect("card in deck");
        assert_eq!(taken.name, "Goblin");
        assert_eq!(p.deck.len(), 1);
        assert_eq!(p.stack.len(), 2);
        assert!(p.stack.iter().all(|c| c.id.as_str() != "a"));

        // stack-only cards are not part of the battle working set
        assert!(p.take_card(&CardId::from("c")).is_none());
    }

    #[test]
    fn rating_never_drops_below_zero() {
        let mut p = Player::new("bob").with_elo(3);
        p.apply_rating(-5);
        assert_eq!(p.elo, 0);
        p.apply_rating(3);
        assert_eq!(p.elo, 3);
    }
}
