use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::TempDir;

use regfish::index::{IndexBuilder, IndexConfig, IndexStore};
use regfish::interval::parse_interval;
use regfish::progress::SilentProgress;
use regfish::stats::{self, ExportOptions, StatsConfig, StatsRequest};
use regfish::ColorStatus;

/// Input folders of one test world
struct Fixture {
    _dir: TempDir,
    data: PathBuf,
    tsdata: PathBuf,
    markers: PathBuf,
    result: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let fixture = Fixture {
            data: root.join("data"),
            tsdata: root.join("tsdata"),
            markers: root.join("markers"),
            result: root.join("result"),
            _dir: dir,
        };
        for folder in [&fixture.data, &fixture.tsdata, &fixture.markers] {
            fs::create_dir_all(folder).unwrap();
        }
        fixture
    }

    fn config(&self) -> IndexConfig {
        IndexConfig {
            hand_dir: self.data.clone(),
            summary_dir: self.tsdata.clone(),
            marker_dir: self.markers.clone(),
            self_nicknames: ["Hero".to_string()].into_iter().collect::<HashSet<_>>(),
        }
    }

    fn hand_file(&self, day: &str, id: u64, hands: &[&[&str]]) {
        let folder = self.data.join(day);
        fs::create_dir_all(&folder).unwrap();
        let content: String = hands.iter().map(|seats| hand(seats)).collect();
        fs::write(
            folder.join(format!("Expresso Nitro({})_real_holdem_no-limit.txt", id)),
            content,
        )
        .unwrap();
    }

    fn summary_file(&self, id: u64, started: &str, buy_in: &str, prize_pool: &str) {
        let content = format!(
            "Winamax Poker - Tournament summary : Expresso Nitro({id})\n\
             Player : Hero\n\
             Buy-In : {buy_in}\n\
             Prizepool : {prize_pool}\n\
             Tournament started {started} UTC\n\
             You won 0€\n"
        );
        fs::write(
            self.tsdata
                .join(format!("Expresso Nitro({})_real_holdem_no-limit_limit_summary.txt", id)),
            content,
        )
        .unwrap();
    }

    fn marker(&self, nickname: &str, is_reg: bool) {
        let content = format!(
            r#"{{"Player": {{"Nickname": "{}"}}, "ColorMarker": {{"IsReg": {}}}}}"#,
            nickname, is_reg
        );
        fs::write(self.markers.join(format!("{}.WNX.cm", nickname)), content).unwrap();
    }

    fn index(&self) -> regfish::index::IndexSummary {
        let store = IndexStore::open(&self.result).unwrap();
        IndexBuilder::new(&store, &self.config(), &SilentProgress)
            .run()
            .unwrap()
    }

    fn snapshot(&self) -> Vec<String> {
        ["checkpoint.txt", "index.txt", "players.txt"]
            .iter()
            .map(|name| read(&self.result.join(name)))
            .collect()
    }
}

fn hand(seats: &[&str]) -> String {
    let mut s = String::from("Winamax Poker - Tournament \"Expresso Nitro\" - HandId: #1\n");
    s.push_str("Table: 'Expresso Nitro' 3-max (real money) Seat #1 is the button\n");
    for (i, nick) in seats.iter().enumerate() {
        s.push_str(&format!("Seat {}: {} (500)\n", i + 1, nick));
    }
    s.push_str("*** PRE-FLOP ***\n");
    s.push_str(&format!("{} folds\n", seats[0]));
    s.push_str("*** SUMMARY ***\n\n");
    s
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

fn world() -> Fixture {
    let fixture = Fixture::new();
    fixture.hand_file(
        "2024/3/10",
        100,
        &[&["Hero", "Bob", "Carol"], &["Hero", "Bob", "Carol"], &["Hero", "Bob"]],
    );
    fixture.summary_file(100, "2024/03/10 02:30:00", "5.00€ + 0.50€", "10.00€");

    fixture.hand_file("2024/3/10", 101, &[&["Hero", "Dave", "Carol"], &["Hero", "Dave"]]);
    fixture.summary_file(101, "2024/03/10 04:00:00", "5.00€ + 0.50€", "20.00€");

    // Table 102 continues from one day's folder into the next
    fixture.hand_file("2024/3/9", 102, &[&["Hero", "Bob", "Dave"]]);
    fixture.hand_file("2024/3/10", 102, &[&["Hero", "Bob", "Dave"], &["Hero", "Dave"]]);
    fixture.summary_file(102, "2024/03/11 12:00:00", "10.00€", "20.00€");

    fixture.marker("Carol", true);
    fixture
}

#[test]
fn test_index_then_rerun_is_noop() {
    let fixture = world();

    let summary = fixture.index();
    assert_eq!(summary.candidates, 3);
    assert_eq!(summary.indexed, 3);
    assert_eq!(summary.checkpoint, 102);

    let store = IndexStore::open(&fixture.result).unwrap();
    let tables = store.load_tables().unwrap();
    let elimination = tables[&102].elimination.as_ref().unwrap();
    assert_eq!(elimination.nickname, "Dave");
    assert_eq!(elimination.after_hand, 2);

    let players = store.load_players().unwrap();
    assert_eq!(players["Bob"].tables, 2);
    assert_eq!(players["Bob"].hands, 5);
    assert_eq!(players["Carol"].color, ColorStatus::Reg);
    assert_eq!(players["Dave"].color, ColorStatus::Unknown);
    assert!(!players.contains_key("Hero"));

    let before = fixture.snapshot();
    let summary = fixture.index();
    assert_eq!(summary.indexed, 0);
    assert_eq!(fixture.snapshot(), before);
}

#[test]
fn test_incremental_index() {
    let fixture = world();
    fixture.index();

    fixture.hand_file("2024/3/12", 103, &[&["Hero", "Bob", "Erin"], &["Hero", "Erin"]]);
    fixture.summary_file(103, "2024/03/12 08:00:00", "5.00€ + 0.50€", "10.00€");
    fixture.marker("Bob", false);

    let summary = fixture.index();
    assert_eq!(summary.candidates, 1);
    assert_eq!(summary.indexed, 1);
    assert_eq!(summary.checkpoint, 103);

    let store = IndexStore::open(&fixture.result).unwrap();
    assert_eq!(store.indexed_ids().unwrap(), vec![100, 101, 102, 103]);
    let players = store.load_players().unwrap();
    assert_eq!(players["Bob"].tables, 3);
    assert_eq!(players["Bob"].color, ColorStatus::Fish);
    assert_eq!(players["Erin"].hands, 2);
}

#[test]
fn test_recovers_from_interrupted_run() {
    let fixture = world();
    fixture.index();
    let before = fixture.snapshot();

    // Tables were appended but the checkpoint never advanced
    fs::write(fixture.result.join("checkpoint.txt"), "").unwrap();
    fs::write(fixture.result.join("players.txt"), "Carol|0|0|Reg\n").unwrap();

    let summary = fixture.index();
    assert_eq!(summary.recovered, 3);
    assert_eq!(summary.indexed, 0);
    assert_eq!(fixture.snapshot(), before);
}

#[test]
fn test_stats_report_and_exports() {
    let fixture = world();
    fixture.index();

    let now = Utc::now();
    let request = StatsRequest {
        hand_dir: fixture.data.clone(),
        summary_dir: fixture.tsdata.clone(),
        config: StatsConfig {
            mode: Default::default(),
            reg_tables: 100,
            reg_hands: 300,
            interval: parse_interval("all", &now).unwrap(),
            buy_in: None,
            multipliers: [2].into_iter().collect(),
            last: Some(2),
            time_report: true,
        },
        export: ExportOptions {
            sort: true,
            elimination: true,
            first_hands: true,
            button_folds: true,
        },
    };

    let store = IndexStore::existing(&fixture.result).unwrap();
    let outcome =
        stats::run_stats(&store, &request, &Utc, &now.naive_utc(), &SilentProgress).unwrap();

    let counts = outcome.aggregation.counts();
    assert_eq!(counts.values().sum::<usize>(), 3);
    assert_eq!(counts[&(1, 1)], 2);
    assert_eq!(counts[&(0, 2)], 1);

    let stats_txt = read(&outcome.run_folder.join("stats.txt"));
    assert!(stats_txt.contains("Total tables: 3\n"));
    assert!(stats_txt.contains("Reg: 1, Fish: 1, count:       2, rate: 66.667%"));
    assert!(stats_txt.contains("Total last tables: 2\n"));
    assert!(stats_txt.contains("Reg: 0, Fish: 2, count:       1, rate: 50.000%"));
    assert!(stats_txt.contains("Total Sunday: 2\n"));
    assert!(stats_txt.contains("In original interval: all"));

    let bucket = outcome.run_folder.join("reg-0-fish-2");
    assert!(bucket
        .join("x2/data/Expresso Nitro(102)_real_holdem_no-limit.txt")
        .is_file());
    assert!(bucket.join("xa/2/tsdata").is_dir());
    let reg_bucket = outcome.run_folder.join("reg-1-fish-1");
    assert!(reg_bucket.join("x2/tsdata").is_dir());
    assert!(reg_bucket.join("rest/tsdata").is_dir());

    let first_hands = read(&outcome.run_folder.join("firsthands/firsthand-00.txt"));
    assert_eq!(first_hands.matches("HandId").count(), 3);
    let button_folds = read(&outcome.run_folder.join("bufolds/bufolds-00.txt"));
    assert_eq!(button_folds.matches("HandId").count(), 5);
}
