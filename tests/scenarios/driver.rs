//! Driver scenario tests
//!
//! Whole fights run through the paced driver with seeded dice

use std::io::Write;

use funnel::combat::{LuckDecision, Outcome, RandomRoller, TradeGood};
use funnel::tracking::InMemoryTracker;
use funnel::{Driver, Encounter, EngineConfig, LuckPolicy};

use crate::common::{goblin, peasant, quick_config};

async fn run_seeded(seed: u64, config: EngineConfig) -> (Option<Outcome>, Vec<String>, usize) {
    let tracker = InMemoryTracker::new();
    let character = peasant(11, 8).with_trade_good(TradeGood::new("Sack of flour"));
    let encounter = Encounter::new(character, goblin(12, 8), config, RandomRoller::seeded(seed))
        .with_tracker(tracker.clone());
    let mut driver = Driver::new(encounter);

    let mut lines = Vec::new();
    let outcome = driver
        .run(
            |_| async { LuckDecision::Decline },
            |entry| lines.push(entry.to_string()),
        )
        .await;
    (outcome, lines, tracker.records().len())
}

#[tokio::test]
async fn test_seeded_fights_finish_with_one_record() {
    for policy in [LuckPolicy::Never, LuckPolicy::Minimum, LuckPolicy::All] {
        for seed in 0..20 {
            let config = EngineConfig {
                luck_policy: policy,
                ..quick_config()
            };
            let (outcome, lines, records) = run_seeded(seed, config).await;
            assert!(outcome.is_some(), "{policy:?} seed {seed}");
            assert_eq!(records, 1);
            assert!(lines.len() > 2);
        }
    }
}

#[tokio::test]
async fn test_same_seed_same_fight() {
    let (first_outcome, first, _) = run_seeded(42, quick_config()).await;
    let (second_outcome, second, _) = run_seeded(42, quick_config()).await;
    assert_eq!(first_outcome, second_outcome);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_deed_preference_uses_trade_good() {
    let mut attempted = false;
    for seed in 0..10 {
        let config = EngineConfig {
            prefer_mighty_deeds: true,
            ..quick_config()
        };
        let (_, lines, _) = run_seeded(seed, config).await;
        attempted |= lines.iter().any(|line| line.contains("attempts a mighty deed"));
    }
    assert!(attempted);
}

#[tokio::test]
async fn test_pacing_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "pacing_ms = 1\nluck_policy = \"all\"\nmax_rounds = 50").unwrap();
    let config = EngineConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.pacing_ms, 1);

    let (outcome, _, records) = run_seeded(9, config).await;
    assert!(outcome.is_some());
    assert_eq!(records, 1);
}
