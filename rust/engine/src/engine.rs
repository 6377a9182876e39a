use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cards::Card;
use crate::effects::BattleEffects;
use crate::errors::BattleError;
use crate::logger::{now_rfc3339, win_line, BattleLog, BattleRecord, DRAW_LINE};
use crate::player::Player;
use crate::rules::{
    adjust_damage_based_on_element, find_special_interaction, DamageAdjustment, Side,
    LOSS_RATING_DELTA, MAX_ROUNDS, WIN_RATING_DELTA,
};

/// Phase of the most recent battle run by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleState {
    /// No battle has started yet
    NotStarted,
    /// Executing the given round (1-based)
    RoundInProgress { round: u32 },
    /// Terminal line written, effects applied
    Concluded,
}

/// Why a battle ended without a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    /// Both decks ran out of playable cards at the same check
    BothExhausted,
    /// The round cap was reached with cards left on both sides
    RoundLimit,
}

/// Final result of a battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleOutcome {
    Winner { side: Side, username: String },
    Draw(DrawReason),
}

/// Everything a finished battle hands back to its caller.
#[derive(Debug, Clone)]
pub struct BattleReport {
    /// Usernames in call order
    pub players: [String; 2],
    pub outcome: BattleOutcome,
    /// Rounds actually executed (0 when a deck started exhausted)
    pub rounds_played: u32,
    pub log: BattleLog,
    /// Seed of the card-selection RNG that ran this battle
    pub seed: u64,
}

impl BattleReport {
    pub fn winner(&self) -> Option<&str> {
        match &self.outcome {
            BattleOutcome::Winner { username, .. } => Some(username),
            BattleOutcome::Draw(_) => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self.outcome, BattleOutcome::Draw(_))
    }

    /// Newline-joined transcript.
    pub fn log_text(&self) -> String {
        self.log.to_text()
    }

    pub fn to_record(&self, battle_id: impl Into<String>) -> BattleRecord {
        BattleRecord {
            battle_id: battle_id.into(),
            players: self.players.clone(),
            winner: self.winner().map(str::to_string),
            rounds: self.rounds_played,
            seed: self.seed,
            log: self.log.lines().to_vec(),
            ts: Some(now_rfc3339()),
        }
    }
}

/// Round-by-round battle resolver for two player snapshots.
///
/// Each engine owns its RNG, so concurrent battles never share random state.
/// The same seed and the same decks always replay the same battle.
///
/// # Examples
///
/// ```
/// use duelyard_engine::cards::{Card, CardKind, Element};
/// use duelyard_engine::effects::NoopEffects;
/// use duelyard_engine::engine::BattleEngine;
/// use duelyard_engine::player::Player;
///
/// let mut alice = Player::with_deck(
///     "alice",
///     vec![Card::new("w1", "WaterSpell", 100.0, CardKind::Spell, Element::Water)],
/// );
/// let mut bob = Player::with_deck(
///     "bob",
///     vec![Card::new("f1", "FireTroll", 100.0, CardKind::Monster, Element::Fire)],
/// );
///
/// let mut engine = BattleEngine::new(Some(7));
/// let report = engine
///     .start_battle(&mut alice, &mut bob, &NoopEffects)
///     .expect("valid players");
///
/// assert_eq!(report.winner(), Some("alice"));
/// assert_eq!(alice.deck.len(), 2);
/// assert!(bob.deck.is_empty());
/// ```
#[derive(Debug)]
pub struct BattleEngine {
    rng: ChaCha20Rng,
    seed: u64,
    state: BattleState,
}

enum RoundResult {
    Decisive(Side),
    Draw,
}

impl BattleEngine {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            state: BattleState::NotStarted,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    /// Run a complete battle between `first` and `second`.
    ///
    /// Both snapshots are mutated in place: won cards move between decks and
    /// stacks, and on a decisive battle ratings and win/loss counters change.
    /// `effects` receives the matching persistence calls.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError`] for input-shape violations (same player on both
    /// sides, unusable card damage). Nothing is logged or mutated in that case.
    pub fn start_battle<E>(
        &mut self,
        first: &mut Player,
        second: &mut Player,
        effects: &E,
    ) -> Result<BattleReport, BattleError>
    where
        E: BattleEffects + ?Sized,
    {
        validate_players(first, second)?;

        self.state = BattleState::NotStarted;
        let mut log = BattleLog::new();
        log.push(format!("Battle: {} vs {}", first.username, second.username));

        tracing::debug!(
            first = %first.username,
            second = %second.username,
            seed = self.seed,
            "battle started"
        );

        let mut round = 1;
        while round <= MAX_ROUNDS {
            if first.is_exhausted() || second.is_exhausted() {
                break;
            }
            self.state = BattleState::RoundInProgress { round };
            self.play_round(round, first, second, effects, &mut log);
            round += 1;
            log.separator();
        }
        let rounds_played = round - 1;

        let outcome = conclude(first, second, effects, &mut log);
        self.state = BattleState::Concluded;

        tracing::info!(
            first = %first.username,
            second = %second.username,
            rounds = rounds_played,
            outcome = ?outcome,
            "battle concluded"
        );

        Ok(BattleReport {
            players: [first.username.clone(), second.username.clone()],
            outcome,
            rounds_played,
            log,
            seed: self.seed,
        })
    }

    fn play_round<E>(
        &mut self,
        round: u32,
        first: &mut Player,
        second: &mut Player,
        effects: &E,
        log: &mut BattleLog,
    ) where
        E: BattleEffects + ?Sized,
    {
        let ia = self.pick_playable(first);
        let ib = self.pick_playable(second);
        let mut a = first.deck[ia].clone();
        let mut b = second.deck[ib].clone();

        log.push(format!("Round {}:", round));
        log.push(format!(
            "{}'s {} vs {}'s {}",
            first.username,
            describe(&a),
            second.username,
            describe(&b)
        ));

        let result = match find_special_interaction(&a, &b) {
            Some(hit) => {
                log.push(hit.rule.message);
                RoundResult::Decisive(hit.winner)
            }
            None => {
                // b's element is unaffected by adjusting a, so the order is irrelevant
                let adjusted_a = adjust_damage_based_on_element(&mut a, &b);
                log_adjustment(log, &a, &b, adjusted_a);
                let adjusted_b = adjust_damage_based_on_element(&mut b, &a);
                log_adjustment(log, &b, &a, adjusted_b);

                if a.damage > b.damage {
                    RoundResult::Decisive(Side::First)
                } else if b.damage > a.damage {
                    RoundResult::Decisive(Side::Second)
                } else {
                    RoundResult::Draw
                }
            }
        };

        match result {
            RoundResult::Decisive(side) => {
                let (winner, loser, winning_card, losing_card) = match side {
                    Side::First => (first, second, &a, &b),
                    Side::Second => (second, first, &b, &a),
                };
                let Some(taken) = loser.take_card(&losing_card.id) else {
                    unreachable!(
                        "card {} was selected from {}'s deck this round",
                        losing_card.id, loser.username
                    );
                };
                log.push(format!(
                    "{}'s {} wins the round and takes {}'s {}!",
                    winner.username, winning_card.name, loser.username, taken.name
                ));
                tracing::debug!(
                    round,
                    winner = %winner.username,
                    card = %taken.id,
                    "card changes hands"
                );
                effects.transfer_card_ownership(&winner.username, &taken);
                winner.gain_card(taken);
            }
            RoundResult::Draw => {
                log.push(format!("Round {} is a draw.", round));
                tracing::debug!(round, "round drawn");
            }
        }
    }

    /// Uniformly choose one unlocked card from `player`'s deck.
    fn pick_playable(&mut self, player: &Player) -> usize {
        let playable = player.playable_indices();
        assert!(
            !playable.is_empty(),
            "{} has no playable card at selection time",
            player.username
        );
        playable[self.rng.random_range(0..playable.len())]
    }
}

/// Run a battle with a freshly seeded engine and return the transcript.
pub fn start_battle<E>(
    first: &mut Player,
    second: &mut Player,
    effects: &E,
) -> Result<String, BattleError>
where
    E: BattleEffects + ?Sized,
{
    BattleEngine::new(None)
        .start_battle(first, second, effects)
        .map(|report| report.log_text())
}

fn validate_players(first: &Player, second: &Player) -> Result<(), BattleError> {
    if first.username == second.username {
        return Err(BattleError::SelfBattle(first.username.clone()));
    }
    let mut seen = HashSet::new();
    first.deck.iter().chain(second.deck.iter()).try_for_each(|card| {
        card.validate()?;
        if !seen.insert(&card.id) {
            return Err(BattleError::InvalidCard {
                card: card.id.clone(),
                reason: "card appears more than once across the decks".to_string(),
            });
        }
        Ok(())
    })
}

fn conclude<E>(
    first: &mut Player,
    second: &mut Player,
    effects: &E,
    log: &mut BattleLog,
) -> BattleOutcome
where
    E: BattleEffects + ?Sized,
{
    let first_out = first.is_exhausted();
    let second_out = second.is_exhausted();
    for (player, out) in [(&*first, first_out), (&*second, second_out)] {
        if out {
            log.push(format!("{} has no playable cards left!", player.username));
        }
    }

    let side = match (first_out, second_out) {
        (true, true) => {
            log.push(DRAW_LINE);
            return BattleOutcome::Draw(DrawReason::BothExhausted);
        }
        (false, false) => {
            log.push(format!("Maximum of {} rounds reached.", MAX_ROUNDS));
            log.push(DRAW_LINE);
            return BattleOutcome::Draw(DrawReason::RoundLimit);
        }
        (true, false) => Side::Second,
        (false, true) => Side::First,
    };

    let (winner, loser) = match side {
        Side::First => (first, second),
        Side::Second => (second, first),
    };

    winner.record_win();
    loser.record_loss();
    effects.record_win(&winner.username);
    effects.record_loss(&loser.username);

    winner.apply_rating(WIN_RATING_DELTA);
    loser.apply_rating(LOSS_RATING_DELTA);
    effects.update_rating(&winner.username, WIN_RATING_DELTA);
    effects.update_rating(&loser.username, LOSS_RATING_DELTA);

    log.push(win_line(&winner.username));
    BattleOutcome::Winner {
        side,
        username: winner.username.clone(),
    }
}

fn describe(card: &Card) -> String {
    format!(
        "{} ({}, {}, {})",
        card.name, card.kind, card.element, card.damage
    )
}

fn log_adjustment(log: &mut BattleLog, card: &Card, opponent: &Card, adj: DamageAdjustment) {
    if let DamageAdjustment::Adjusted { from, to } = adj {
        log.push(format!(
            "{} damage changed from {} to {} ({} vs {})",
            card.name, from, to, card.element, opponent.element
        ));
    }
}
