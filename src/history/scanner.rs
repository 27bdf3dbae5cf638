use super::blocks::{hand_blocks, HandBlock};
use super::order::sorted_hand_files;
use crate::error::Result;
use crate::model::{Elimination, Player};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

/// What a table's hand history says about its opponents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Opponents in order of first appearance
    pub players: Vec<Player>,
    pub elimination: Option<Elimination>,
    /// Hands with a seat listing
    pub hands: u32,
}

/// Scans the hands of one table for opponents and the heads-up point.
///
/// Hands played by any of the tracked self nicknames are not counted for
/// those nicknames.
pub struct HandScanner<'a> {
    self_nicknames: &'a HashSet<String>,
}

impl<'a> HandScanner<'a> {
    pub fn new(self_nicknames: &'a HashSet<String>) -> Self {
        Self { self_nicknames }
    }

    fn is_self(&self, nickname: &str) -> bool {
        self.self_nicknames.contains(nickname)
    }

    /// Scan hand blocks in the order they were played
    pub fn scan<'l, I>(&self, blocks: I) -> ScanResult
    where
        I: IntoIterator<Item = HandBlock<'l>>,
    {
        let mut players: Vec<Player> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut elimination = None;
        let mut hand_index = 0u32;

        for block in blocks {
            if !block.has_seats() {
                continue;
            }

            let mut in_hand = HashSet::new();
            for nickname in block.nicknames() {
                if !self.is_self(&nickname) {
                    match positions.get(&nickname) {
                        Some(&i) => players[i].hands_played += 1,
                        None => {
                            positions.insert(nickname.clone(), players.len());
                            players.push(Player::new(nickname.clone(), 1));
                        }
                    }
                }
                in_hand.insert(nickname);
            }

            if elimination.is_none() {
                elimination = self.heads_up_opponent(&in_hand).map(|opponent| {
                    Elimination::new(opponent, hand_index)
                });
            }

            hand_index += 1;
        }

        ScanResult {
            players,
            elimination,
            hands: hand_index,
        }
    }

    /// The only opponent when the hand is exactly one self nickname against one other
    fn heads_up_opponent(&self, in_hand: &HashSet<String>) -> Option<String> {
        if in_hand.len() != 2 {
            return None;
        }
        let selves = in_hand.iter().filter(|n| self.is_self(n)).count();
        if selves != 1 {
            return None;
        }
        in_hand.iter().find(|n| !self.is_self(n)).cloned()
    }

    /// Scan hand-history content
    pub fn scan_content(&self, content: &str) -> ScanResult {
        self.scan(hand_blocks(content))
    }

    /// Scan every part of a table's hand history.
    ///
    /// Parts are read in played order and a part boundary always ends a hand,
    /// so hand indices run on across parts.
    pub fn scan_files(&self, files: &BTreeSet<PathBuf>) -> Result<ScanResult> {
        let contents = sorted_hand_files(files)
            .iter()
            .map(std::fs::read_to_string)
            .collect::<std::io::Result<Vec<String>>>()?;
        Ok(self.scan(contents.iter().flat_map(|c| hand_blocks(c))))
    }
}
