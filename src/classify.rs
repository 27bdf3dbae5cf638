//! Reg/fish classification of nicknames

use crate::error::RegfishError;
use crate::model::{ColorStatus, IndexedPlayer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_REG_TABLES: u32 = 100;
pub const DEFAULT_REG_HANDS: u64 = 300;

/// Which cumulative count the reg threshold applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalcMode {
    #[default]
    Tables,
    Hands,
}

impl FromStr for CalcMode {
    type Err = RegfishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tables" => Ok(CalcMode::Tables),
            "hands" => Ok(CalcMode::Hands),
            other => Err(RegfishError::CalcMode(other.to_string())),
        }
    }
}

impl fmt::Display for CalcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcMode::Tables => write!(f, "tables"),
            CalcMode::Hands => write!(f, "hands"),
        }
    }
}

/// Decides reg/fish per nickname from the player store.
///
/// A `Fish` or `Reg` color status always wins. `Unknown` players are regs once
/// their table (or hand) count reaches the threshold. Nicknames missing from
/// the store are fish.
pub struct Classifier<'a> {
    players: &'a BTreeMap<String, IndexedPlayer>,
    mode: CalcMode,
    reg_tables: u32,
    reg_hands: u64,
}

impl<'a> Classifier<'a> {
    pub fn new(players: &'a BTreeMap<String, IndexedPlayer>, mode: CalcMode) -> Self {
        Self {
            players,
            mode,
            reg_tables: DEFAULT_REG_TABLES,
            reg_hands: DEFAULT_REG_HANDS,
        }
    }

    pub fn with_thresholds(mut self, reg_tables: u32, reg_hands: u64) -> Self {
        self.reg_tables = reg_tables;
        self.reg_hands = reg_hands;
        self
    }

    pub fn is_reg(&self, nickname: &str) -> bool {
        let player = match self.players.get(nickname) {
            Some(player) => player,
            None => return false,
        };
        match player.color {
            ColorStatus::Fish => false,
            ColorStatus::Reg => true,
            ColorStatus::Unknown => match self.mode {
                CalcMode::Tables => player.tables >= self.reg_tables,
                CalcMode::Hands => player.hands >= self.reg_hands,
            },
        }
    }
}
