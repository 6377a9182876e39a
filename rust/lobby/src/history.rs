use duelyard_engine::logger::BattleRecord;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::RwLock;
use thiserror::Error;

/// Bounded in-memory archive of finished battles, oldest evicted first.
#[derive(Debug)]
pub struct BattleHistory {
    battles: RwLock<VecDeque<BattleRecord>>,
    capacity: usize,
}

impl BattleHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            battles: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity: capacity.max(1),
        }
    }

    pub fn add(&self, record: BattleRecord) -> Result<(), HistoryError> {
        let mut battles = self
            .battles
            .write()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        if battles.len() == self.capacity {
            battles.pop_front();
        }
        battles.push_back(record);
        Ok(())
    }

    /// Most recent battles first.
    pub fn recent(&self, limit: Option<usize>) -> Result<Vec<BattleRecord>, HistoryError> {
        let battles = self
            .battles
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        let limit = limit.unwrap_or(100);
        Ok(battles.iter().rev().take(limit).cloned().collect())
    }

    pub fn get(&self, battle_id: &str) -> Result<BattleRecord, HistoryError> {
        let battles = self
            .battles
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        battles
            .iter()
            .find(|b| b.battle_id == battle_id)
            .cloned()
            .ok_or_else(|| HistoryError::NotFound(battle_id.to_string()))
    }

    /// Battles `username` took part in, oldest first.
    pub fn for_player(&self, username: &str) -> Result<Vec<BattleRecord>, HistoryError> {
        let battles = self
            .battles
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        Ok(battles
            .iter()
            .filter(|b| b.players.iter().any(|p| p == username))
            .cloned()
            .collect())
    }

    pub fn stats(&self) -> Result<BattleStatistics, HistoryError> {
        let battles = self
            .battles
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;

        if battles.is_empty() {
            return Ok(BattleStatistics::default());
        }

        let total_battles = battles.len();
        let draws = battles.iter().filter(|b| b.winner.is_none()).count();
        let total_rounds: u64 = battles.iter().map(|b| u64::from(b.rounds)).sum();

        Ok(BattleStatistics {
            total_battles,
            draws,
            draw_rate: (draws as f64 / total_battles as f64) * 100.0,
            avg_rounds: total_rounds as f64 / total_battles as f64,
        })
    }

    pub fn len(&self) -> Result<usize, HistoryError> {
        let battles = self
            .battles
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        Ok(battles.len())
    }

    pub fn is_empty(&self) -> Result<bool, HistoryError> {
        self.len().map(|n| n == 0)
    }
}

/// Aggregates over the stored battles
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BattleStatistics {
    pub total_battles: usize,
    pub draws: usize,
    pub draw_rate: f64,
    pub avg_rounds: f64,
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History storage poisoned")]
    StoragePoisoned,
    #[error("Battle not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, players: [&str; 2], winner: Option<&str>, rounds: u32) -> BattleRecord {
        BattleRecord {
            battle_id: id.to_string(),
            players: [players[0].to_string(), players[1].to_string()],
            winner: winner.map(str::to_string),
            rounds,
            seed: 0,
            log: vec![],
            ts: None,
        }
    }

    #[test]
    fn evicts_oldest_when_full() {
        let history = BattleHistory::new(2);
        history.add(record("b1", ["a", "b"], Some("a"), 3)).unwrap();
        history.add(record("b2", ["a", "c"], None, 100)).unwrap();
        history.add(record("b3", ["b", "c"], Some("c"), 5)).unwrap();

        assert_eq!(history.len().unwrap(), 2);
        assert!(matches!(history.get("b1"), Err(HistoryError::NotFound(_))));
        let recent = history.recent(None).unwrap();
        assert_eq!(recent[0].battle_id, "b3");
        assert_eq!(recent[1].battle_id, "b2");
    }

    #[test]
    fn filters_by_player() {
        let history = BattleHistory::new(10);
        history.add(record("b1", ["a", "b"], Some("a"), 3)).unwrap();
        history.add(record("b2", ["c", "d"], None, 100)).unwrap();
        history.add(record("b3", ["b", "a"], Some("b"), 7)).unwrap();

        let ids: Vec<String> = history
            .for_player("a")
            .unwrap()
            .into_iter()
            .map(|r| r.battle_id)
            .collect();
        assert_eq!(ids, vec!["b1", "b3"]);
    }

    #[test]
    fn stats_count_draws_and_rounds() {
        let history = BattleHistory::new(10);
        assert_eq!(history.stats().unwrap(), BattleStatistics::default());

        history.add(record("b1", ["a", "b"], Some("a"), 2)).unwrap();
        history.add(record("b2", ["a", "b"], None, 100)).unwrap();

        let stats = history.stats().unwrap();
        assert_eq!(stats.total_battles, 2);
        assert_eq!(stats.draws, 1);
        assert!((stats.draw_rate - 50.0).abs() < 1e-9);
        assert!((stats.avg_rounds - 51.0).abs() < 1e-9);
    }
}
