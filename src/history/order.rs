//! Ordering of hand-history file parts.
//!
//! A table's hands can be split across several folders (`2024/3/9/...`,
//! `2024/3/10/...`). Parts are concatenated in path order where every path
//! segment that is an integer compares numerically, so `9` sorts before `10`.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    Number(u64),
    Text(String),
}

fn sort_key(path: &Path) -> Vec<Segment> {
    path.components()
        .map(|c| {
            let s = c.as_os_str().to_string_lossy();
            match s.parse::<u64>() {
                Ok(n) => Segment::Number(n),
                Err(_) => Segment::Text(s.into_owned()),
            }
        })
        .collect()
}

pub fn compare_paths(a: &Path, b: &Path) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

/// Sort hand files into the order their hands were played
pub fn sorted_hand_files<'a, I>(files: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    let mut files: Vec<PathBuf> = files.into_iter().cloned().collect();
    files.sort_by(|a, b| compare_paths(a, b));
    files
}
