use crate::events::{EventBus, LobbyEvent};
use crate::history::BattleHistory;
use crate::settings::{LobbySettings, SettingsError};
use duelyard_engine::effects::BattleEffects;
use duelyard_engine::engine::{BattleEngine, BattleReport};
use duelyard_engine::errors::BattleError;
use duelyard_engine::player::Player;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

pub type Ticket = Uuid;

type Reply = oneshot::Sender<Result<MatchResult, QueueError>>;

/// What each of the two matched callers receives.
///
/// `battle_id`, `winner`, `rounds` and `log` are identical for both sides;
/// `player` is the caller's own post-battle snapshot.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub battle_id: String,
    pub ticket: Ticket,
    pub opponent: String,
    pub winner: Option<String>,
    pub rounds: u32,
    pub log: String,
    pub player: Player,
}

struct Waiting {
    ticket: Ticket,
    player: Player,
    reply: Reply,
}

/// First-come first-served pairing of waiting players.
///
/// The waiting list is only touched under one mutex: entering, pruning
/// abandoned waiters and dequeuing a pair happen atomically. The battle itself
/// runs outside the lock on the task that completed the pair, and both
/// waiters are resolved from that single result.
pub struct MatchmakingQueue {
    waiting: Mutex<VecDeque<Waiting>>,
    effects: Arc<dyn BattleEffects>,
    seeds: Mutex<ChaCha20Rng>,
    history: Option<Arc<BattleHistory>>,
    events: Option<EventBus>,
}

impl std::fmt::Debug for MatchmakingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchmakingQueue")
            .field("waiting", &self.waiting())
            .field("history", &self.history.is_some())
            .field("events", &self.events.is_some())
            .finish()
    }
}

impl MatchmakingQueue {
    pub fn new(effects: Arc<dyn BattleEffects>) -> Self {
        Self::build(effects, None, None, None)
    }

    /// Queue with battle history and lobby events enabled.
    pub fn with_settings(
        effects: Arc<dyn BattleEffects>,
        settings: &LobbySettings,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self::build(
            effects,
            settings.seed,
            Some(Arc::new(BattleHistory::new(settings.history_capacity))),
            Some(EventBus::with_buffer(settings.event_buffer)),
        ))
    }

    fn build(
        effects: Arc<dyn BattleEffects>,
        seed: Option<u64>,
        history: Option<Arc<BattleHistory>>,
        events: Option<EventBus>,
    ) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            waiting: Mutex::new(VecDeque::new()),
            effects,
            seeds: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
            history,
            events,
        }
    }

    pub fn history(&self) -> Option<Arc<BattleHistory>> {
        self.history.clone()
    }

    pub fn events(&self) -> Option<EventBus> {
        self.events.clone()
    }

    /// Number of players currently waiting.
    pub fn waiting(&self) -> usize {
        self.waiting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn waiting_usernames(&self) -> Vec<String> {
        self.waiting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|w| w.player.username.clone())
            .collect()
    }

    /// Wait for an opponent and return the shared battle result.
    ///
    /// Never resolves while the caller is the only one waiting; wrap it in
    /// `tokio::time::timeout` to bound the wait. A dropped future leaves a
    /// closed ticket that is pruned before the next pairing.
    pub async fn enter_queue(&self, player: Player) -> Result<MatchResult, QueueError> {
        let (reply, rx) = oneshot::channel();
        let ticket = Uuid::new_v4();
        let username = player.username.clone();

        let pair = {
            let mut waiting = self
                .waiting
                .lock()
                .map_err(|_| QueueError::StoragePoisoned)?;
            waiting.retain(|w| !w.reply.is_closed());
            if waiting.iter().any(|w| w.player.username == username) {
                return Err(QueueError::AlreadyQueued(username));
            }
            waiting.push_back(Waiting {
                ticket,
                player,
                reply,
            });
            if waiting.len() >= 2 {
                waiting.pop_front().zip(waiting.pop_front())
            } else {
                None
            }
        };

        tracing::debug!(username = %username, ticket = %ticket, "player queued");
        self.publish(
            &username,
            LobbyEvent::Queued {
                username: username.clone(),
                ticket: ticket.to_string(),
            },
        );

        if let Some((first, second)) = pair {
            self.run_match(first, second);
        }

        rx.await.map_err(|_| QueueError::Abandoned)?
    }

    /// Withdraw a waiting player. Returns whether the player was waiting.
    pub fn leave_queue(&self, username: &str) -> Result<bool, QueueError> {
        let mut waiting = self
            .waiting
            .lock()
            .map_err(|_| QueueError::StoragePoisoned)?;
        let before = waiting.len();
        waiting.retain(|w| w.player.username != username);
        Ok(waiting.len() != before)
    }

    fn run_match(&self, first: Waiting, second: Waiting) {
        let battle_id = Uuid::new_v4().to_string();
        let seed = self.next_seed();
        let Waiting {
            ticket: first_ticket,
            player: mut first_player,
            reply: first_reply,
        } = first;
        let Waiting {
            ticket: second_ticket,
            player: mut second_player,
            reply: second_reply,
        } = second;

        tracing::info!(
            battle_id = %battle_id,
            first = %first_player.username,
            second = %second_player.username,
            "match found"
        );
        self.publish(
            &first_player.username,
            LobbyEvent::Matched {
                battle_id: battle_id.clone(),
                opponent: second_player.username.clone(),
            },
        );
        self.publish(
            &second_player.username,
            LobbyEvent::Matched {
                battle_id: battle_id.clone(),
                opponent: first_player.username.clone(),
            },
        );

        let mut engine = BattleEngine::new(Some(seed));
        let report =
            match engine.start_battle(&mut first_player, &mut second_player, self.effects.as_ref()) {
                Ok(report) => report,
                Err(err) => {
                    tracing::warn!(battle_id = %battle_id, error = %err, "battle rejected");
                    deliver(first_reply, Err(QueueError::Battle(err.clone())));
                    deliver(second_reply, Err(QueueError::Battle(err)));
                    return;
                }
            };

        self.archive(&battle_id, &report);

        let log = report.log_text();
        let winner = report.winner().map(str::to_string);
        for name in [&first_player.username, &second_player.username] {
            self.publish(
                name,
                LobbyEvent::BattleConcluded {
                    battle_id: battle_id.clone(),
                    winner: winner.clone(),
                    rounds: report.rounds_played,
                },
            );
        }

        let first_opponent = second_player.username.clone();
        let second_opponent = first_player.username.clone();
        deliver(
            first_reply,
            Ok(MatchResult {
                battle_id: battle_id.clone(),
                ticket: first_ticket,
                opponent: first_opponent,
                winner: winner.clone(),
                rounds: report.rounds_played,
                log: log.clone(),
                player: first_player,
            }),
        );
        deliver(
            second_reply,
            Ok(MatchResult {
                battle_id,
                ticket: second_ticket,
                opponent: second_opponent,
                winner,
                rounds: report.rounds_played,
                log,
                player: second_player,
            }),
        );
    }

    fn archive(&self, battle_id: &str, report: &BattleReport) {
        if let Some(history) = &self.history {
            if let Err(err) = history.add(report.to_record(battle_id)) {
                tracing::error!(battle_id = %battle_id, error = %err, "failed to archive battle");
            }
        }
    }

    fn next_seed(&self) -> u64 {
        self.seeds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .random()
    }

    fn publish(&self, username: &str, event: LobbyEvent) {
        if let Some(events) = &self.events {
            events.publish(username, event);
        }
    }
}

fn deliver(reply: Reply, result: Result<MatchResult, QueueError>) {
    if reply.send(result).is_err() {
        tracing::warn!("waiter left before its battle result was delivered");
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Player already queued: {0}")]
    AlreadyQueued(String),
    #[error("Battle rejected: {0}")]
    Battle(#[from] BattleError),
    #[error("Queue dropped before the battle resolved")]
    Abandoned,
    #[error("Queue storage poisoned")]
    StoragePoisoned,
}
