use thiserror::Error;

use crate::cards::CardId;

/// Input-shape violations detected before a battle starts.
/// A battle that returns one of these has produced no log at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BattleError {
    #[error("Player {0} cannot battle themselves")]
    SelfBattle(String),
    #[error("Invalid card {card}: {reason}")]
    InvalidCard { card: CardId, reason: String },
}
