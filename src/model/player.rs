use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification asserted by a color marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorStatus {
    Reg,
    Fish,
    #[default]
    Unknown,
}

impl ColorStatus {
    pub fn from_is_reg(is_reg: bool) -> Self {
        if is_reg {
            ColorStatus::Reg
        } else {
            ColorStatus::Fish
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorStatus::Reg => "Reg",
            ColorStatus::Fish => "Fish",
            ColorStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ColorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cumulative statistics for one nickname across every indexed table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedPlayer {
    pub nickname: String,
    pub tables: u32,
    pub hands: u64,
    pub color: ColorStatus,
}

impl IndexedPlayer {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            tables: 0,
            hands: 0,
            color: ColorStatus::Unknown,
        }
    }

    pub fn with_counts(mut self, tables: u32, hands: u64) -> Self {
        self.tables = tables;
        self.hands = hands;
        self
    }

    pub fn with_color(mut self, color: ColorStatus) -> Self {
        self.color = color;
        self
    }
}
