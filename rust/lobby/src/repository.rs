use duelyard_engine::cards::{Card, CardId};
use duelyard_engine::effects::BattleEffects;
use duelyard_engine::player::{Player, STARTING_ELO};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;

/// Cards a configured deck must hold
pub const DECK_SIZE: usize = 4;

/// Persistent per-user state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub username: String,
    pub elo: u32,
    pub wins: u32,
    pub losses: u32,
}

#[derive(Debug)]
struct UserRecord {
    stats: UserStats,
    deck: Vec<CardId>,
}

#[derive(Debug, Clone)]
struct CardEntry {
    card: Card,
    owner: String,
}

/// In-memory user and card store.
///
/// Each user sits behind its own mutex so rating and win/loss updates from
/// concurrent battles serialize per user. Card ownership lives in a separate
/// index keyed by card id.
#[derive(Debug, Default)]
pub struct PlayerRepository {
    users: RwLock<HashMap<String, Arc<Mutex<UserRecord>>>>,
    cards: RwLock<HashMap<CardId, CardEntry>>,
}

impl PlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, username: &str) -> Result<(), RepositoryError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| RepositoryError::StoragePoisoned)?;
        if users.contains_key(username) {
            return Err(RepositoryError::UserExists(username.to_string()));
        }
        users.insert(
            username.to_string(),
            Arc::new(Mutex::new(UserRecord {
                stats: UserStats {
                    username: username.to_string(),
                    elo: STARTING_ELO,
                    wins: 0,
                    losses: 0,
                },
                deck: Vec::new(),
            })),
        );
        tracing::debug!(username = %username, "user registered");
        Ok(())
    }

    /// Give a new card to `owner`.
    pub fn add_card(&self, owner: &str, card: Card) -> Result<(), RepositoryError> {
        self.user(owner)?;
        let mut cards = self
            .cards
            .write()
            .map_err(|_| RepositoryError::StoragePoisoned)?;
        if cards.contains_key(&card.id) {
            return Err(RepositoryError::CardExists(card.id));
        }
        cards.insert(
            card.id.clone(),
            CardEntry {
                card,
                owner: owner.to_string(),
            },
        );
        Ok(())
    }

    /// Replace `username`'s battle deck. Every card must be distinct, owned and unlocked.
    pub fn configure_deck(&self, username: &str, ids: &[CardId]) -> Result<(), RepositoryError> {
        if ids.len() != DECK_SIZE {
            return Err(RepositoryError::InvalidDeckSize {
                expected: DECK_SIZE,
                actual: ids.len(),
            });
        }
        let mut seen = HashSet::with_capacity(ids.len());
        if let Some(dup) = ids.iter().find(|id| !seen.insert(*id)) {
            return Err(RepositoryError::DuplicateCard(dup.clone()));
        }
        let user = self.user(username)?;
        // held until the deck is stored so set_locked cannot slip in between
        let cards = self
            .cards
            .read()
            .map_err(|_| RepositoryError::StoragePoisoned)?;
        for id in ids {
            let entry = cards
                .get(id)
                .ok_or_else(|| RepositoryError::CardNotFound(id.clone()))?;
            if entry.owner != username {
                return Err(RepositoryError::NotOwner {
                    card: id.clone(),
                    username: username.to_string(),
                });
            }
            if entry.card.locked {
                return Err(RepositoryError::CardLocked(id.clone()));
            }
        }
        let mut record = user.lock().map_err(|_| RepositoryError::StoragePoisoned)?;
        record.deck = ids.to_vec();
        Ok(())
    }

    /// Reserve or release a card for trading. Deck cards cannot be locked.
    pub fn set_locked(&self, id: &CardId, locked: bool) -> Result<(), RepositoryError> {
        let mut cards = self
            .cards
            .write()
            .map_err(|_| RepositoryError::StoragePoisoned)?;
        let entry = cards
            .get_mut(id)
            .ok_or_else(|| RepositoryError::CardNotFound(id.clone()))?;
        if locked {
            let owner = self.user(&entry.owner)?;
            let record = owner.lock().map_err(|_| RepositoryError::StoragePoisoned)?;
            if record.deck.contains(id) {
                return Err(RepositoryError::CardInDeck(id.clone()));
            }
        }
        entry.card.locked = locked;
        Ok(())
    }

    pub fn owner_of(&self, id: &CardId) -> Result<String, RepositoryError> {
        let cards = self
            .cards
            .read()
            .map_err(|_| RepositoryError::StoragePoisoned)?;
        cards
            .get(id)
            .map(|entry| entry.owner.clone())
            .ok_or_else(|| RepositoryError::CardNotFound(id.clone()))
    }

    /// Battle snapshot: stack is every owned card, deck follows the configured order.
    pub fn snapshot(&self, username: &str) -> Result<Player, RepositoryError> {
        let user = self.user(username)?;
        let (stats, deck_ids) = {
            let record = user.lock().map_err(|_| RepositoryError::StoragePoisoned)?;
            (record.stats.clone(), record.deck.clone())
        };
        let cards = self
            .cards
            .read()
            .map_err(|_| RepositoryError::StoragePoisoned)?;

        let mut stack: Vec<Card> = cards
            .values()
            .filter(|entry| entry.owner == username)
            .map(|entry| entry.card.clone())
            .collect();
        stack.sort_by(|a, b| a.id.cmp(&b.id));
        let deck = deck_ids
            .iter()
            .filter_map(|id| cards.get(id).map(|entry| entry.card.clone()))
            .collect();

        Ok(Player {
            username: stats.username,
            elo: stats.elo,
            wins: stats.wins,
            losses: stats.losses,
            deck,
            stack,
        })
    }

    pub fn stats(&self, username: &str) -> Result<UserStats, RepositoryError> {
        let user = self.user(username)?;
        let record = user.lock().map_err(|_| RepositoryError::StoragePoisoned)?;
        Ok(record.stats.clone())
    }

    /// All users ordered by rating, best first.
    pub fn scoreboard(&self) -> Result<Vec<UserStats>, RepositoryError> {
        let users: Vec<Arc<Mutex<UserRecord>>> = {
            let guard = self
                .users
                .read()
                .map_err(|_| RepositoryError::StoragePoisoned)?;
            guard.values().cloned().collect()
        };
        let mut board = Vec::with_capacity(users.len());
        for user in users {
            let record = user.lock().map_err(|_| RepositoryError::StoragePoisoned)?;
            board.push(record.stats.clone());
        }
        board.sort_by(|a, b| b.elo.cmp(&a.elo).then_with(|| a.username.cmp(&b.username)));
        Ok(board)
    }

    fn user(&self, username: &str) -> Result<Arc<Mutex<UserRecord>>, RepositoryError> {
        let guard = self
            .users
            .read()
            .map_err(|_| RepositoryError::StoragePoisoned)?;
        guard
            .get(username)
            .cloned()
            .ok_or_else(|| RepositoryError::UserNotFound(username.to_string()))
    }

    fn with_user(&self, username: &str, op: &str, f: impl FnOnce(&mut UserRecord)) {
        match self.user(username) {
            Ok(user) => {
                let mut record = user.lock().unwrap_or_else(PoisonError::into_inner);
                f(&mut record);
            }
            Err(err) => {
                tracing::warn!(username = %username, op, error = %err, "battle effect dropped");
            }
        }
    }
}

impl BattleEffects for PlayerRepository {
    fn update_rating(&self, username: &str, delta: i32) {
        self.with_user(username, "update_rating", |record| {
            record.stats.elo = record.stats.elo.saturating_add_signed(delta);
        });
    }

    fn record_win(&self, username: &str) {
        self.with_user(username, "record_win", |record| record.stats.wins += 1);
    }

    fn record_loss(&self, username: &str) {
        self.with_user(username, "record_loss", |record| record.stats.losses += 1);
    }

    /// The card leaves the previous owner's configured deck; the new owner
    /// must add it to a deck explicitly.
    fn transfer_card_ownership(&self, new_owner: &str, card: &Card) {
        if let Err(err) = self.user(new_owner) {
            tracing::warn!(card = %card.id, error = %err, "card transfer dropped");
            return;
        }
        let previous = {
            let mut cards = self.cards.write().unwrap_or_else(PoisonError::into_inner);
            match cards.get_mut(&card.id) {
                Some(entry) => std::mem::replace(&mut entry.owner, new_owner.to_string()),
                None => {
                    tracing::warn!(card = %card.id, new_owner = %new_owner, "transfer of unknown card");
                    return;
                }
            }
        };
        self.with_user(&previous, "transfer_card_ownership", |record| {
            record.deck.retain(|id| id != &card.id);
        });
        tracing::debug!(
            card = %card.id,
            from = %previous,
            to = %new_owner,
            "card ownership transferred"
        );
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("User already exists: {0}")]
    UserExists(String),
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Card already exists: {0}")]
    CardExists(CardId),
    #[error("Card not found: {0}")]
    CardNotFound(CardId),
    #[error("Card {card} is not owned by {username}")]
    NotOwner { card: CardId, username: String },
    #[error("Card {0} is locked by a trade")]
    CardLocked(CardId),
    #[error("Card {0} appears more than once in the deck")]
    DuplicateCard(CardId),
    #[error("Card {0} is part of a configured deck")]
    CardInDeck(CardId),
    #[error("Deck must contain {expected} cards, got {actual}")]
    InvalidDeckSize { expected: usize, actual: usize },
    #[error("Repository storage poisoned")]
    StoragePoisoned,
}
