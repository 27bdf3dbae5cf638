use super::store::IndexStore;
use crate::error::{RegfishError, Result};
use crate::files::collect_table_files;
use crate::history::HandScanner;
use crate::markers::read_markers;
use crate::model::{ColorStatus, IndexedPlayer, Table, TableFileMeta, TableId};
use crate::progress::Progress;
use crate::summary::read_summary_file;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

/// Inputs of an indexing run
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Root of the hand-history files
    pub hand_dir: PathBuf,
    /// Root of the tournament summary files
    pub summary_dir: PathBuf,
    /// Root of the color-marker files
    pub marker_dir: PathBuf,
    /// Nicknames of the tracked player
    pub self_nicknames: HashSet<String>,
}

/// What an indexing run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub candidates: usize,
    pub indexed: usize,
    pub skipped: usize,
    pub recovered: usize,
    pub players: usize,
    pub checkpoint: TableId,
}

/// Folds every table newer than the checkpoint into the store
pub struct IndexBuilder<'a, P: Progress> {
    store: &'a IndexStore,
    config: &'a IndexConfig,
    progress: &'a P,
}

impl<'a, P: Progress> IndexBuilder<'a, P> {
    pub fn new(store: &'a IndexStore, config: &'a IndexConfig, progress: &'a P) -> Self {
        Self {
            store,
            config,
            progress,
        }
    }

    pub fn run(&self) -> Result<IndexSummary> {
        log::info!("Run indexing");
        let checkpoint = self.store.checkpoint()?;
        log::info!("Checkpoint: {}", checkpoint);

        let candidates = collect_table_files(
            &self.config.hand_dir,
            &self.config.summary_dir,
            Some(checkpoint),
        )?;

        // Lines past the checkpoint were appended by a run that never finished.
        let interrupted: BTreeSet<TableId> = self
            .store
            .indexed_ids()?
            .into_iter()
            .filter(|&id| id > checkpoint)
            .collect();
        if !interrupted.is_empty() {
            log::warn!(
                "Index holds {} tables past checkpoint {}. Recovering from an interrupted run",
                interrupted.len(),
                checkpoint
            );
        }

        let (tables, skipped) = self.read_tables(&candidates, &interrupted)?;
        let markers = read_markers(&self.config.marker_dir)?;

        let base = if interrupted.is_empty() {
            self.store.load_players()?
        } else {
            rebuild_players(&self.store.load_tables()?, &self.store.load_players()?)
        };
        let players = merge_players(base, &tables, &markers);

        self.store.append_tables(&tables)?;
        self.store.write_players(&players)?;

        let next = candidates
            .iter()
            .map(|meta| meta.id)
            .chain(interrupted.iter().copied())
            .fold(checkpoint, TableId::max);
        if next != checkpoint {
            self.store.write_checkpoint(next)?;
            log::info!("Checkpoint advanced to {}", next);
        }

        log::info!("Finish indexing");
        Ok(IndexSummary {
            candidates: candidates.len(),
            indexed: tables.len(),
            skipped,
            recovered: interrupted.len(),
            players: players.len(),
            checkpoint: next,
        })
    }

    fn read_tables(
        &self,
        candidates: &[TableFileMeta],
        interrupted: &BTreeSet<TableId>,
    ) -> Result<(Vec<Table>, usize)> {
        log::info!("Start getting tables from {} files", candidates.len());
        let scanner = HandScanner::new(&self.config.self_nicknames);
        let mut tables = Vec::with_capacity(candidates.len());
        let mut skipped = 0;

        for (i, meta) in candidates.iter().enumerate() {
            self.progress
                .report("Getting table from files", i, candidates.len());
            if interrupted.contains(&meta.id) {
                continue;
            }

            let data = match read_summary_file(&meta.summary_file) {
                Ok(Some(data)) => data,
                Ok(None) => {
                    log::warn!(
                        "Table {}: summary lacks buy-in, prize pool or start time. Skipping {}",
                        meta.id,
                        meta.summary_file.display()
                    );
                    skipped += 1;
                    continue;
                }
                Err(RegfishError::Summary(reason)) => {
                    log::warn!(
                        "Table {}: {}. Skipping {}",
                        meta.id,
                        reason,
                        meta.summary_file.display()
                    );
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let scan = scanner.scan_files(&meta.hand_files)?;
            tables.push(Table {
                id: meta.id,
                data,
                players: scan.players,
                elimination: scan.elimination,
            });
        }

        log::info!("Got {} tables from files", tables.len());
        Ok((tables, skipped))
    }
}

/// Add one table's contribution to the cumulative player statistics
fn add_table(players: &mut BTreeMap<String, IndexedPlayer>, table: &Table) {
    for player in &table.players {
        let entry = players
            .entry(player.nickname.clone())
            .or_insert_with(|| IndexedPlayer::new(player.nickname.as_str()));
        entry.tables += 1;
        entry.hands += u64::from(player.hands_played);
    }
}

/// Add new tables to existing statistics, then apply the marker snapshot.
///
/// A marker overrides the stored status. Players without a marker keep
/// whatever status they had.
pub fn merge_players(
    mut players: BTreeMap<String, IndexedPlayer>,
    tables: &[Table],
    markers: &HashMap<String, ColorStatus>,
) -> BTreeMap<String, IndexedPlayer> {
    for table in tables {
        add_table(&mut players, table);
    }
    for (nickname, status) in markers {
        if let Some(player) = players.get_mut(nickname) {
            player.color = *status;
        }
    }
    players
}

/// Recount player statistics from the whole index, keeping known statuses
pub fn rebuild_players(
    tables: &BTreeMap<TableId, Table>,
    previous: &BTreeMap<String, IndexedPlayer>,
) -> BTreeMap<String, IndexedPlayer> {
    let mut players = BTreeMap::new();
    for table in tables.values() {
        add_table(&mut players, table);
    }
    for (nickname, player) in players.iter_mut() {
        player.color = previous
            .get(nickname)
            .map(|p| p.color)
            .unwrap_or_default();
    }
    players
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Player, TableData};
    use crate::progress::SilentProgress;
    use std::fs;
    use tempfile::TempDir;

    fn table(id: TableId, players: &[(&str, u32)]) -> Table {
        Table {
            id,
            data: TableData::new("2024/03/10 02:30:00", 10.0, 5.0),
            players: players
                .iter()
                .map(|(nick, hands)| Player::new(*nick, *hands))
                .collect(),
            elimination: None,
        }
    }

    #[test]
    fn test_merge_adds_tables_and_hands() {
        let mut base = BTreeMap::new();
        base.insert(
            "Bob".to_string(),
            IndexedPlayer::new("Bob").with_counts(10, 100),
        );
        let tables = vec![
            table(1, &[("Bob", 5), ("Carol", 7)]),
            table(2, &[("Carol", 3)]),
        ];

        let players = merge_players(base, &tables, &HashMap::new());
        assert_eq!(players["Bob"], IndexedPlayer::new("Bob").with_counts(11, 105));
        assert_eq!(players["Carol"], IndexedPlayer::new("Carol").with_counts(2, 10));
    }

    #[test]
    fn test_markers_override_and_persist() {
        let mut base = BTreeMap::new();
        base.insert(
            "Bob".to_string(),
            IndexedPlayer::new("Bob").with_color(ColorStatus::Reg),
        );
        base.insert(
            "Carol".to_string(),
            IndexedPlayer::new("Carol").with_color(ColorStatus::Fish),
        );
        let mut markers = HashMap::new();
        markers.insert("Bob".to_string(), ColorStatus::Fish);
        markers.insert("Nobody".to_string(), ColorStatus::Reg);

        let players = merge_players(base, &[], &markers);
        assert_eq!(players["Bob"].color, ColorStatus::Fish);
        assert_eq!(players["Carol"].color, ColorStatus::Fish);
        assert!(!players.contains_key("Nobody"));
    }

    #[test]
    fn test_rebuild_players() {
        let mut tables = BTreeMap::new();
        tables.insert(1, table(1, &[("Bob", 5)]));
        tables.insert(2, table(2, &[("Bob", 4), ("Carol", 1)]));
        let mut previous = BTreeMap::new();
        previous.insert(
            "Bob".to_string(),
            IndexedPlayer::new("Bob")
                .with_counts(99, 999)
                .with_color(ColorStatus::Reg),
        );

        let players = rebuild_players(&tables, &previous);
        assert_eq!(
            players["Bob"],
            IndexedPlayer::new("Bob")
                .with_counts(2, 9)
                .with_color(ColorStatus::Reg)
        );
        assert_eq!(players["Carol"].color, ColorStatus::Unknown);
    }

    const HAND: &str = "Winamax Poker - Tournament \"Expresso Nitro\" - HandId: #1
Table: 'Expresso Nitro' 3-max (real money) Seat #1 is the button
Seat 1: Hero (500)
Seat 2: Bob (500)
*** PRE-FLOP ***
Hero folds

";

    fn write_table(dir: &TempDir, id: TableId, summary: &str) {
        fs::write(
            dir.path()
                .join(format!("Expresso Nitro({})_real_holdem_no-limit.txt", id)),
            HAND,
        )
        .unwrap();
        fs::write(
            dir.path().join(format!(
                "Expresso Nitro({})_real_holdem_no-limit_limit_summary.txt",
                id
            )),
            summary,
        )
        .unwrap();
    }

    #[test]
    fn test_summary_without_prize_pool_is_skipped_once() {
        let input = TempDir::new().unwrap();
        let result = TempDir::new().unwrap();
        write_table(
            &input,
            3,
            "Buy-In : 5.00€ + 0.50€\nPrizepool : 10.00€\nTournament started 2024/03/10 02:30:00 UTC\n",
        );
        write_table(
            &input,
            5,
            "Buy-In : 5.00€ + 0.50€\nTournament started 2024/03/10 03:30:00 UTC\n",
        );
        let config = IndexConfig {
            hand_dir: input.path().to_path_buf(),
            summary_dir: input.path().to_path_buf(),
            marker_dir: input.path().to_path_buf(),
            self_nicknames: ["Hero".to_string()].into_iter().collect(),
        };
        let store = IndexStore::open(result.path()).unwrap();

        let summary = IndexBuilder::new(&store, &config, &SilentProgress)
            .run()
            .unwrap();
        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.indexed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.checkpoint, 5);
        assert_eq!(store.checkpoint().unwrap(), 5);
        assert_eq!(store.indexed_ids().unwrap(), vec![3]);

        let summary = IndexBuilder::new(&store, &config, &SilentProgress)
            .run()
            .unwrap();
        assert_eq!(summary.candidates, 0);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.checkpoint, 5);
        assert_eq!(store.indexed_ids().unwrap(), vec![3]);
    }
}
