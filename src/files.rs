//! Discovery of hand-history and summary files and their grouping per table

use crate::error::Result;
use crate::model::{TableFileMeta, TableId};
use crate::summary::parse_table_id;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const HISTORY_PREFIX: &str = "Expresso Nitro";
pub const SUMMARY_TAG: &str = "limit_summary";
pub const MARKER_SUFFIX: &str = "WNX.cm";

pub fn is_hand_file(name: &str) -> bool {
    name.starts_with(HISTORY_PREFIX) && !name.contains(SUMMARY_TAG)
}

pub fn is_summary_file(name: &str) -> bool {
    name.contains(HISTORY_PREFIX) && name.contains(SUMMARY_TAG)
}

pub fn is_marker_file(name: &str) -> bool {
    name.ends_with(MARKER_SUFFIX)
}

/// Recursively collect files accepted by `accept`, keyed by table id.
///
/// Files without a table id in their name are skipped with a warning.
fn collect_by_id<F>(
    root: &Path,
    accept: F,
    after: Option<TableId>,
) -> Result<BTreeMap<TableId, BTreeSet<PathBuf>>>
where
    F: Fn(&str) -> bool,
{
    let mut by_id: BTreeMap<TableId, BTreeSet<PathBuf>> = BTreeMap::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = match entry.file_name().to_str() {
            Some(name) if accept(name) => name,
            _ => continue,
        };
        let id = match parse_table_id(name) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        if after.is_some_and(|checkpoint| id <= checkpoint) {
            continue;
        }
        by_id.entry(id).or_default().insert(entry.into_path());
    }

    Ok(by_id)
}

/// Group hand and summary files into one entry per table, ordered by id.
///
/// With `after` set only tables with a greater id are returned. Summaries
/// without hand files, and hand files without a summary, are dropped.
pub fn collect_table_files(
    hand_root: &Path,
    summary_root: &Path,
    after: Option<TableId>,
) -> Result<Vec<TableFileMeta>> {
    let mut hands = collect_by_id(hand_root, is_hand_file, after)?;
    log::info!(
        "Hand files found: {}",
        hands.values().map(BTreeSet::len).sum::<usize>()
    );

    let summaries = collect_by_id(summary_root, is_summary_file, after)?;
    log::info!("Summary files found: {}", summaries.len());

    let mut tables = Vec::with_capacity(summaries.len());
    for (id, summary_files) in summaries {
        let mut summary_files = summary_files.into_iter();
        let summary_file = match summary_files.next() {
            Some(file) => file,
            None => continue,
        };
        for extra in summary_files {
            log::warn!(
                "Duplicate summary for table {}. Ignoring {}",
                id,
                extra.display()
            );
        }

        match hands.remove(&id) {
            Some(hand_files) => tables.push(TableFileMeta {
                id,
                summary_file,
                hand_files,
            }),
            None => log::warn!(
                "No hand files for table {}. Skipping {}",
                id,
                summary_file.display()
            ),
        }
    }

    for (id, files) in &hands {
        log::warn!(
            "No summary for table {}. Skipping {} hand files",
            id,
            files.len()
        );
    }

    log::info!("Tables with complete files: {}", tables.len());
    Ok(tables)
}
