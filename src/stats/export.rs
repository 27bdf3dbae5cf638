//! Output of a statistics run: `stats.txt` and copies of the bucketed tables

use super::aggregator::{Aggregation, TableStat};
use super::report::BucketKey;
use crate::error::Result;
use crate::history::{hand_blocks, sorted_hand_files, HandBlock};
use crate::progress::Progress;
use chrono::NaiveDateTime;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const STAT_FILE_NAME: &str = "stats.txt";
pub const HANDS_PER_FILE: usize = 10000;

const DATA_FOLDER: &str = "data";
const SUMMARY_FOLDER: &str = "tsdata";
const ELIMINATION_FOLDER: &str = "xa";
const FIRST_HANDS_FOLDER: &str = "firsthands";
const FIRST_HANDS_PREFIX: &str = "firsthand";
const BUTTON_FOLDS_FOLDER: &str = "bufolds";
const BUTTON_FOLDS_PREFIX: &str = "bufolds";

/// Which copies to make besides `stats.txt`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub sort: bool,
    pub elimination: bool,
    pub first_hands: bool,
    pub button_folds: bool,
}

pub fn bucket_folder((reg, fish): BucketKey) -> String {
    format!("reg-{}-fish-{}", reg, fish)
}

/// A `result-run-<timestamp>` folder, one per statistics run
#[derive(Debug, Clone)]
pub struct RunFolder {
    root: PathBuf,
}

impl RunFolder {
    pub fn create(result_root: &Path, started: &NaiveDateTime) -> Result<Self> {
        let name = format!("result-run-{}", started.format("%Y-%m-%d-%H%M%S%6f"));
        let root = result_root.join(name);
        fs::create_dir_all(&root)?;
        log::info!("Created result folder: {}", root.display());
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn write_stats(&self, header: &[String], lines: &[String]) -> Result<PathBuf> {
        let path = self.root.join(STAT_FILE_NAME);
        let mut out = BufWriter::new(File::create(&path)?);
        for line in header.iter().chain(lines) {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;
        log::info!("Created stat file {}", path.display());
        Ok(path)
    }

    /// Run every export selected in `options`
    pub fn export<P: Progress>(
        &self,
        aggregation: &Aggregation,
        options: ExportOptions,
        progress: &P,
    ) -> Result<()> {
        if options.sort {
            self.copy_sorted(aggregation, progress)?;
        }
        if options.elimination {
            self.copy_eliminations(aggregation, progress)?;
        }
        if options.first_hands {
            self.write_first_hands(aggregation, progress)?;
        }
        if options.button_folds {
            self.write_button_folds(aggregation, progress)?;
        }
        Ok(())
    }

    /// `reg-R-fish-F/<x2|rest>/data|tsdata`
    pub fn copy_sorted<P: Progress>(&self, aggregation: &Aggregation, progress: &P) -> Result<usize> {
        log::info!("Copying data files...");
        let mut copied = 0;
        for (key, stats) in &aggregation.buckets {
            let bucket = self.root.join(bucket_folder(*key));
            for (i, stat) in stats.iter().enumerate() {
                progress.report(&bucket_folder(*key), i, stats.len());
                copy_table(stat, &bucket.join(stat.multiplier_folder()))?;
                copied += 1;
            }
        }
        log::info!("Copied data files of {} tables", copied);
        Ok(copied)
    }

    /// `reg-R-fish-F/xa/<afterHand>/data|tsdata` for tables with a fish elimination
    pub fn copy_eliminations<P: Progress>(
        &self,
        aggregation: &Aggregation,
        progress: &P,
    ) -> Result<usize> {
        log::info!("Copying data files for XA...");
        let mut copied = 0;
        let mut skipped = 0;
        for (key, stats) in &aggregation.buckets {
            let xa = self.root.join(bucket_folder(*key)).join(ELIMINATION_FOLDER);
            for (i, stat) in stats.iter().enumerate() {
                progress.report("Copying data files for XA", i, stats.len());
                match stat.elimination_after_hand {
                    Some(after_hand) => {
                        copy_table(stat, &xa.join(after_hand.to_string()))?;
                        copied += 1;
                    }
                    None => skipped += 1,
                }
            }
        }
        log::info!("Tables without a fish elimination: {}", skipped);
        log::info!("Copied data files of {} tables for XA", copied);
        Ok(copied)
    }

    /// First hand of every table into `firsthands/firsthand-NN.txt`
    pub fn write_first_hands<P: Progress>(
        &self,
        aggregation: &Aggregation,
        progress: &P,
    ) -> Result<usize> {
        log::info!("Copying first hands into files...");
        let first_files: Vec<PathBuf> = all_stats(aggregation)
            .filter_map(|stat| sorted_hand_files(&stat.meta.hand_files).into_iter().next())
            .collect();

        let mut writer = ChunkWriter::new(
            self.root.join(FIRST_HANDS_FOLDER),
            FIRST_HANDS_PREFIX,
            chunk_width(first_files.len()),
        );
        for (i, file) in first_files.iter().enumerate() {
            progress.report("Copying first hands", i, first_files.len());
            let content = fs::read_to_string(file)?;
            if let Some(block) = hand_blocks(&content).first() {
                writer.write_hand(block)?;
            }
        }
        let written = writer.finish()?;
        log::info!("Copied {} first hands into files", written);
        Ok(written)
    }

    /// Button-fold hands of every table into `bufolds/bufolds-NN.txt`
    pub fn write_button_folds<P: Progress>(
        &self,
        aggregation: &Aggregation,
        progress: &P,
    ) -> Result<usize> {
        log::info!("Copying bu folds hands into files...");
        let files: Vec<PathBuf> = all_stats(aggregation)
            .flat_map(|stat| sorted_hand_files(&stat.meta.hand_files))
            .collect();

        // Upper bound of about 20 button folds per hand file
        let mut writer = ChunkWriter::new(
            self.root.join(BUTTON_FOLDS_FOLDER),
            BUTTON_FOLDS_PREFIX,
            chunk_width(files.len() * 20),
        );
        for (i, file) in files.iter().enumerate() {
            progress.report("Looking for bu folds hands in files", i, files.len());
            let content = fs::read_to_string(file)?;
            for block in hand_blocks(&content).iter().filter(|b| b.is_button_fold()) {
                writer.write_hand(block)?;
            }
        }
        let written = writer.finish()?;
        log::info!("Copied {} bu folds hands into files", written);
        Ok(written)
    }
}

fn all_stats(aggregation: &Aggregation) -> impl Iterator<Item = &TableStat> {
    aggregation.buckets.values().flatten()
}

/// Copy the summary into `<dest>/tsdata` and the hand files into `<dest>/data`
fn copy_table(stat: &TableStat, dest: &Path) -> Result<()> {
    let data = dest.join(DATA_FOLDER);
    let summaries = dest.join(SUMMARY_FOLDER);
    fs::create_dir_all(&data)?;
    fs::create_dir_all(&summaries)?;

    copy_into(&stat.meta.summary_file, &summaries)?;
    for file in &stat.meta.hand_files {
        copy_into(file, &data)?;
    }
    Ok(())
}

fn copy_into(file: &Path, dir: &Path) -> Result<()> {
    let name = file.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no file name in {}", file.display()),
        )
    })?;
    fs::copy(file, dir.join(name))?;
    Ok(())
}

/// Digits of the chunk numbers for `hands` hands, at least two
fn chunk_width(hands: usize) -> usize {
    (hands / HANDS_PER_FILE).to_string().len().max(2)
}

/// Writes hand blocks into numbered files of `HANDS_PER_FILE` hands each
struct ChunkWriter {
    dir: PathBuf,
    prefix: &'static str,
    width: usize,
    chunk: usize,
    in_chunk: usize,
    written: usize,
    out: Option<BufWriter<File>>,
}

impl ChunkWriter {
    fn new(dir: PathBuf, prefix: &'static str, width: usize) -> Self {
        Self {
            dir,
            prefix,
            width,
            chunk: 0,
            in_chunk: 0,
            written: 0,
            out: None,
        }
    }

    fn chunk_path(&self) -> PathBuf {
        self.dir.join(format!(
            "{}-{:0width$}.txt",
            self.prefix,
            self.chunk,
            width = self.width
        ))
    }

    fn write_hand(&mut self, block: &HandBlock) -> Result<()> {
        if self.out.is_some() && self.in_chunk == HANDS_PER_FILE {
            if let Some(mut out) = self.out.take() {
                out.flush()?;
            }
            self.chunk += 1;
            self.in_chunk = 0;
        }
        if self.out.is_none() {
            fs::create_dir_all(&self.dir)?;
            self.out = Some(BufWriter::new(File::create(self.chunk_path())?));
        }

        if let Some(out) = self.out.as_mut() {
            for line in &block.lines {
                writeln!(out, "{}", line)?;
            }
            writeln!(out)?;
        }
        self.in_chunk += 1;
        self.written += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<usize> {
        if let Some(mut out) = self.out.take() {
            out.flush()?;
        }
        Ok(self.written)
    }
}
