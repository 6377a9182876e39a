//! Matchmaking lobby for duelyard battles.
//!
//! Players enter a shared [`MatchmakingQueue`]; every two waiting players are
//! paired first-come first-served and fight one battle whose transcript is
//! delivered to both. Ratings, win/loss counts and card ownership are applied
//! through a [`PlayerRepository`].

pub mod events;
pub mod history;
pub mod logging;
pub mod queue;
pub mod repository;
pub mod settings;

pub use events::{EventBus, EventSubscription, LobbyEvent};
pub use history::{BattleHistory, BattleStatistics, HistoryError};
pub use logging::{init_logging, init_test_logging, LogEntry, LogFormat, TestLogSubscriber};
pub use queue::{MatchResult, MatchmakingQueue, QueueError, Ticket};
pub use repository::{PlayerRepository, RepositoryError, UserStats, DECK_SIZE};
pub use settings::{LobbySettings, SettingsError};
