use super::rows::{error_line, pipe_reader, pipe_writer, TableRow};
use crate::error::{RegfishError, Result};
use crate::model::{IndexedPlayer, Table, TableId};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const INDEX_FILE_NAME: &str = "index.txt";
pub const PLAYER_FILE_NAME: &str = "players.txt";
pub const CHECKPOINT_FILE_NAME: &str = "checkpoint.txt";

/// The on-disk index in a result folder.
///
/// - `index.txt`: append-only, one table per line
/// - `players.txt`: rewritten on every indexing run
/// - `checkpoint.txt`: highest table id folded into the index
///
/// Only one indexing run may use a folder at a time.
#[derive(Debug, Clone)]
pub struct IndexStore {
    root: PathBuf,
}

impl IndexStore {
    /// Open a result folder, creating it and empty store files when missing
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { root: root.into() };
        fs::create_dir_all(&store.root)?;
        for path in [
            store.index_path(),
            store.player_path(),
            store.checkpoint_path(),
        ] {
            if !path.exists() {
                File::create(&path)?;
                log::info!("Created {}", path.display());
            }
        }
        Ok(store)
    }

    /// Open a result folder written by an earlier indexing run. Nothing is created.
    pub fn existing(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { root: root.into() };
        for path in [
            store.index_path(),
            store.player_path(),
            store.checkpoint_path(),
        ] {
            if !path.is_file() {
                return Err(RegfishError::MissingStore(path.display().to_string()));
            }
        }
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE_NAME)
    }

    pub fn player_path(&self) -> PathBuf {
        self.root.join(PLAYER_FILE_NAME)
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.root.join(CHECKPOINT_FILE_NAME)
    }

    /// Highest indexed table id, 0 for a fresh store
    pub fn checkpoint(&self) -> Result<TableId> {
        let content = fs::read_to_string(self.checkpoint_path())?;
        let value = content.trim();
        if value.is_empty() {
            return Ok(0);
        }
        value
            .parse()
            .map_err(|_| RegfishError::Checkpoint(value.to_string()))
    }

    pub fn write_checkpoint(&self, id: TableId) -> Result<()> {
        write_atomically(&self.checkpoint_path(), |out| {
            writeln!(out, "{}", id)?;
            Ok(())
        })
    }

    /// Ids of every index line in file order, duplicates included
    pub fn indexed_ids(&self) -> Result<Vec<TableId>> {
        let mut rdr = pipe_reader(BufReader::new(File::open(self.index_path())?));
        let mut ids = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| RegfishError::IndexLine {
                line: error_line(&e),
                reason: e.to_string(),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let id = record
                .get(0)
                .and_then(|s| s.trim().parse().ok())
                .ok_or_else(|| RegfishError::IndexLine {
                    line,
                    reason: "table id".to_string(),
                })?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Load the whole index. Repeated ids keep their first line.
    pub fn load_tables(&self) -> Result<BTreeMap<TableId, Table>> {
        log::info!("Loading index...");
        let mut rdr = pipe_reader(BufReader::new(File::open(self.index_path())?));
        let mut tables = BTreeMap::new();
        let mut duplicates = 0;

        for record in rdr.records() {
            let record = record.map_err(|e| RegfishError::IndexLine {
                line: error_line(&e),
                reason: e.to_string(),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let row: TableRow = record
                .deserialize(None)
                .map_err(|e| RegfishError::IndexLine {
                    line,
                    reason: e.to_string(),
                })?;
            let table = row.into_table(line)?;
            if tables.contains_key(&table.id) {
                duplicates += 1;
                continue;
            }
            tables.insert(table.id, table);
        }

        if duplicates > 0 {
            log::warn!("Index holds {} duplicate table lines", duplicates);
        }
        log::info!("Loaded index with {} tables", tables.len());
        Ok(tables)
    }

    pub fn append_tables(&self, tables: &[Table]) -> Result<()> {
        if tables.is_empty() {
            return Ok(());
        }
        log::info!("Saving {} tables into index file...", tables.len());
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.index_path())?;
        let mut wtr = pipe_writer(BufWriter::new(file));
        for table in tables {
            wtr.serialize(TableRow::from(table))?;
        }
        wtr.flush()?;
        log::info!("Saved tables into index file");
        Ok(())
    }

    pub fn load_players(&self) -> Result<BTreeMap<String, IndexedPlayer>> {
        log::info!("Loading players...");
        let mut rdr = pipe_reader(BufReader::new(File::open(self.player_path())?));
        let mut players = BTreeMap::new();
        for result in rdr.deserialize::<IndexedPlayer>() {
            let player = result.map_err(|e| RegfishError::PlayerLine {
                line: error_line(&e),
                reason: e.to_string(),
            })?;
            players.insert(player.nickname.clone(), player);
        }
        log::info!("Loaded {} players", players.len());
        Ok(players)
    }

    /// Replace the player file, sorted by nickname
    pub fn write_players(&self, players: &BTreeMap<String, IndexedPlayer>) -> Result<()> {
        log::info!("Saving {} players into players file...", players.len());
        write_atomically(&self.player_path(), |out| {
            let mut wtr = pipe_writer(out);
            for player in players.values() {
                wtr.serialize(player)?;
            }
            wtr.flush()?;
            Ok(())
        })?;
        log::info!("Saved players into players file");
        Ok(())
    }
}

/// Write to a sibling temp file, then rename it over `path`
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let tmp = path.with_extension("tmp");
    let mut out = BufWriter::new(File::create(&tmp)?);
    write(&mut out)?;
    let file = out.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}
