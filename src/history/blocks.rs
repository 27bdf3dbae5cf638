const SEAT_PREFIX: &str = "Seat";
const PRE_FLOP_MARKER: &str = "PRE-FLOP";
const FOLDS_SUFFIX: &str = " folds";

/// One hand: a run of non-blank lines in a hand-history file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandBlock<'a> {
    pub lines: Vec<&'a str>,
}

impl<'a> HandBlock<'a> {
    /// The first consecutive run of `Seat` lines
    pub fn seat_lines(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.lines
            .iter()
            .copied()
            .skip_while(|line| !line.starts_with(SEAT_PREFIX))
            .take_while(|line| line.starts_with(SEAT_PREFIX))
    }

    pub fn nicknames(&self) -> Vec<String> {
        self.seat_lines().filter_map(parse_seat_nickname).collect()
    }

    pub fn has_seats(&self) -> bool {
        self.seat_lines().next().is_some()
    }

    /// At least three seats, and the first pre-flop action is a fold
    pub fn is_button_fold(&self) -> bool {
        if self.seat_lines().count() < 3 {
            return false;
        }
        self.lines.windows(2).any(|pair| {
            pair[0].contains(PRE_FLOP_MARKER) && pair[1].trim_end().ends_with(FOLDS_SUFFIX)
        })
    }
}

/// `Seat 1: Some Player (1500)` -> `Some Player`
pub fn parse_seat_nickname(line: &str) -> Option<String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return None;
    }
    Some(tokens[2..tokens.len() - 1].join(" "))
}

/// Split hand-history content into blank-line delimited hand blocks
pub fn hand_blocks(content: &str) -> Vec<HandBlock<'_>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(HandBlock {
                    lines: std::mem::take(&mut current),
                });
            }
            continue;
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(HandBlock { lines: current });
    }

    blocks
}
