use crate::error::{RegfishError, Result};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Fixed-width format of every timestamp in summaries and the index.
/// Lexicographic order of formatted values is chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| RegfishError::Timestamp(format!("'{}': {}", s.trim(), e)))
}

/// Numeric table id, taken from the parenthesised part of a file name
pub type TableId = u64;

/// The files that belong to one table, found by scanning the input folders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFileMeta {
    pub id: TableId,
    pub summary_file: PathBuf,
    pub hand_files: BTreeSet<PathBuf>,
}

/// Values read from a tournament summary file
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    /// UTC wall clock, `YYYY/MM/DD HH:MM:SS`
    pub timestamp: String,
    pub prize_pool: f64,
    pub buy_in: f64,
}

impl TableData {
    pub fn new(timestamp: impl Into<String>, prize_pool: f64, buy_in: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            prize_pool,
            buy_in,
        }
    }

    /// Start time as a naive UTC date-time
    pub fn started_utc(&self) -> Result<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    /// First multiplier `m` with `m * trunc(buy_in) == trunc(prize_pool)`
    pub fn prize_multiplier(&self, multipliers: &BTreeSet<u32>) -> Option<u32> {
        let buy_in = self.buy_in.trunc() as i64;
        let prize_pool = self.prize_pool.trunc() as i64;
        multipliers
            .iter()
            .copied()
            .find(|&m| i64::from(m) * buy_in == prize_pool)
    }

    pub fn is_double_prize_pool(&self) -> bool {
        2 * (self.buy_in.trunc() as i64) == self.prize_pool.trunc() as i64
    }
}

/// An opponent seen at the table with the number of hands they were dealt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub nickname: String,
    pub hands_played: u32,
}

impl Player {
    pub fn new(nickname: impl Into<String>, hands_played: u32) -> Self {
        Self {
            nickname: nickname.into(),
            hands_played,
        }
    }
}

/// First hand at which the tracked player went heads-up against a single opponent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elimination {
    pub nickname: String,
    /// 0-based hand index within the table
    pub after_hand: u32,
}

impl Elimination {
    pub fn new(nickname: impl Into<String>, after_hand: u32) -> Self {
        Self {
            nickname: nickname.into(),
            after_hand,
        }
    }
}

impl fmt::Display for Elimination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} after hand {}", self.nickname, self.after_hand)
    }
}

/// One indexed table. Written once to the index and never changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub id: TableId,
    pub data: TableData,
    pub players: Vec<Player>,
    pub elimination: Option<Elimination>,
}
