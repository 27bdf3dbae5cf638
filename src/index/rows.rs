//! Line formats of the index files.
//!
//! Index: `id|timestamp|prizePool|buyIn|nick:hands,nick:hands|nick:afterHand`
//! Players: `nickname|tables|hands|colorStatus`
//!
//! A table without an elimination is written as `:-1`.

use crate::error::{RegfishError, Result};
use crate::model::{Elimination, Player, Table, TableData, TableId};
use serde::{Deserialize, Serialize};
use std::io;

const NO_ELIMINATION: &str = ":-1";

/// One line of the table index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: TableId,
    pub timestamp: String,
    pub prize_pool: f64,
    pub buy_in: f64,
    pub players: String,
    pub elimination: String,
}

impl From<&Table> for TableRow {
    fn from(table: &Table) -> Self {
        let players = table
            .players
            .iter()
            .map(|p| format!("{}:{}", p.nickname, p.hands_played))
            .collect::<Vec<_>>()
            .join(",");
        let elimination = match &table.elimination {
            Some(e) => format!("{}:{}", e.nickname, e.after_hand),
            None => NO_ELIMINATION.to_string(),
        };

        TableRow {
            id: table.id,
            timestamp: table.data.timestamp.clone(),
            prize_pool: table.data.prize_pool,
            buy_in: table.data.buy_in,
            players,
            elimination,
        }
    }
}

impl TableRow {
    /// Convert back into a table; `line` is used for error messages
    pub fn into_table(self, line: u64) -> Result<Table> {
        let malformed = |reason: String| RegfishError::IndexLine { line, reason };

        let mut players = Vec::new();
        for entry in self.players.split(',').filter(|s| !s.trim().is_empty()) {
            let (nickname, hands) = entry
                .rsplit_once(':')
                .ok_or_else(|| malformed(format!("player entry '{}'", entry)))?;
            let hands = hands
                .trim()
                .parse()
                .map_err(|_| malformed(format!("hand count in '{}'", entry)))?;
            players.push(Player::new(nickname.trim(), hands));
        }

        let (nickname, after_hand) = self
            .elimination
            .rsplit_once(':')
            .ok_or_else(|| malformed(format!("elimination '{}'", self.elimination)))?;
        let after_hand: i64 = after_hand
            .trim()
            .parse()
            .map_err(|_| malformed(format!("elimination '{}'", self.elimination)))?;
        let nickname = nickname.trim();
        let elimination = if after_hand < 0 || nickname.is_empty() {
            None
        } else {
            let after_hand = u32::try_from(after_hand)
                .map_err(|_| malformed(format!("elimination '{}'", self.elimination)))?;
            Some(Elimination::new(nickname, after_hand))
        };

        Ok(Table {
            id: self.id,
            data: TableData::new(self.timestamp.trim(), self.prize_pool, self.buy_in),
            players,
            elimination,
        })
    }
}

/// Reader for `|`-delimited, unquoted, headerless lines
pub fn pipe_reader<R: io::Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .quoting(false)
        .from_reader(rdr)
}

/// Writer for `|`-delimited, unquoted, headerless lines ending in `\n`
pub fn pipe_writer<W: io::Write>(wtr: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(wtr)
}

/// Line number of a CSV error, 0 when unknown
pub fn error_line(e: &csv::Error) -> u64 {
    e.position().map(|p| p.line()).unwrap_or(0)
}
