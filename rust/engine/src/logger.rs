use serde::{Deserialize, Serialize};
use std::fmt;

/// Line appended after every round
pub const ROUND_SEPARATOR: &str = "----------";
/// Terminal line for drawn battles
pub const DRAW_LINE: &str = "The battle ends in a draw!";
const WIN_SUFFIX: &str = " wins the battle!";

/// Human-readable battle transcript, one entry per displayed line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleLog {
    lines: Vec<String>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn separator(&mut self) {
        self.push(ROUND_SEPARATOR);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The concluding win/draw statement, if the battle has finished.
    pub fn terminal_line(&self) -> Option<&str> {
        self.lines
            .last()
            .map(String::as_str)
            .filter(|l| is_terminal_line(l))
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Newline-joined transcript.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for BattleLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

pub fn win_line(username: &str) -> String {
    format!("{}{}", username, WIN_SUFFIX)
}

pub fn is_terminal_line(line: &str) -> bool {
    line == DRAW_LINE || line.ends_with(WIN_SUFFIX)
}

/// Archived summary of one finished battle.
/// Serialized to JSONL for replay and statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRecord {
    /// Unique identifier (format: YYYYMMDD-NNNNNN for file archives)
    pub battle_id: String,
    /// Usernames in call order
    pub players: [String; 2],
    /// Winning username, `None` for a draw
    pub winner: Option<String>,
    /// Rounds actually executed
    pub rounds: u32,
    /// Seed of the card-selection RNG
    pub seed: u64,
    /// Full transcript
    pub log: Vec<String>,
    /// RFC3339 timestamp
    #[serde(default)]
    pub ts: Option<String>,
}

pub fn format_battle_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends battle records to a JSONL archive.
pub struct BattleRecordWriter {
    writer: Option<BufWriter<File>>,
    date: String,
    seq: u32,
}

impl BattleRecordWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        })
    }

    /// Writer that numbers battles but persists nothing.
    pub fn detached() -> Self {
        Self::detached_on(&Utc::now().format("%Y%m%d").to_string())
    }

    pub fn detached_on(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_battle_id(&self.date, self.seq)
    }

    pub fn write(&mut self, record: &BattleRecord) -> std::io::Result<()> {
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(now_rfc3339());
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
