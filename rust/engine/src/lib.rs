//! # duelyard-engine: Card Battle Resolution Core
//!
//! Resolves a battle between two players' decks: random card selection,
//! special-interaction overrides, elemental spell multipliers, card transfer
//! and the final rating/win-loss bookkeeping. The engine performs no I/O; it
//! mutates the two player snapshots it is given, reports persistence changes
//! through [`effects::BattleEffects`], and returns a plain-text transcript.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card, element and kind types
//! - [`player`] - Player snapshot (deck, stack, rating)
//! - [`rules`] - Special interaction table, element multipliers, rating constants
//! - [`effects`] - Persistence callbacks invoked by the engine
//! - [`engine`] - Round loop and outcome determination
//! - [`logger`] - Battle transcript and JSONL battle records
//! - [`errors`] - Input validation errors
//!
//! ## Quick Start
//!
//! ```rust
//! use duelyard_engine::cards::Card;
//! use duelyard_engine::effects::NoopEffects;
//! use duelyard_engine::engine::BattleEngine;
//! use duelyard_engine::player::Player;
//!
//! let mut a = Player::with_deck("alice", vec![Card::from_name("a1", "Dragon", 50.0)]);
//! let mut b = Player::with_deck("bob", vec![Card::from_name("b1", "FireElf", 20.0)]);
//!
//! let report = BattleEngine::new(Some(42))
//!     .start_battle(&mut a, &mut b, &NoopEffects)
//!     .expect("distinct players");
//!
//! // Fire Elves evade Dragons regardless of damage
//! assert_eq!(report.winner(), Some("bob"));
//! println!("{}", report.log);
//! ```

pub mod cards;
pub mod effects;
pub mod engine;
pub mod errors;
pub mod logger;
pub mod player;
pub mod rules;
