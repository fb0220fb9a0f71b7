//! Outcome and achievement tracking
//!
//! The engine reports to two collaborators:
//! - [`VictoryRecorder`]: exactly one call per concluded encounter
//! - [`AchievementTracker`]: notified as notable things happen mid-fight
//!
//! Persistence is the collaborator's business. [`InMemoryTracker`] keeps
//! everything in memory for the CLI and tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::combatants::{Character, Monster};

/// Coarse classification of how a fight ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleType {
    Normal,
    MightyDeed,
    MightyCritical,
    FumbleSelfKill,
}

/// Snapshot of a concluded encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterRecord {
    pub encounter_id: Uuid,
    pub character: Character,
    pub monster: Monster,
    pub battle_type: BattleType,
    /// Character actions taken
    pub rounds: u32,
    pub recorded_at: DateTime<Utc>,
}

/// Win/loss bookkeeping
pub trait VictoryRecorder: Send + Sync {
    fn record_victory(&self, record: &EncounterRecord);
    fn record_defeat(&self, record: &EncounterRecord);
    fn record_flight(&self, record: &EncounterRecord);
}

/// Things worth an achievement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AchievementEvent {
    CriticalHit,
    /// A non-critical hit, which resets any critical streak
    Hit,
    FumbleSurvived,
    MightyDeed { critical: bool },
    Victory {
        monster: String,
        tier: u8,
        boss: bool,
    },
}

pub trait AchievementTracker: Send + Sync {
    fn notify(&self, event: &AchievementEvent);
}

/// Tracker that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTracker;

impl VictoryRecorder for NullTracker {
    fn record_victory(&self, _record: &EncounterRecord) {}
    fn record_defeat(&self, _record: &EncounterRecord) {}
    fn record_flight(&self, _record: &EncounterRecord) {}
}

impl AchievementTracker for NullTracker {
    fn notify(&self, _event: &AchievementEvent) {}
}

/// Which recorder call an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Victory,
    Defeat,
    Flight,
}

#[derive(Debug, Default)]
struct TrackerInner {
    records: Vec<(RecordKind, EncounterRecord)>,
    events: Vec<AchievementEvent>,
    critical_streak: u32,
    best_critical_streak: u32,
}

/// Thread-safe in-memory tracker
#[derive(Debug, Default)]
pub struct InMemoryTracker {
    inner: Mutex<TrackerInner>,
}

impl InMemoryTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(&self, kind: RecordKind, record: &EncounterRecord) {
        self.inner.lock().records.push((kind, record.clone()));
    }

    /// Every recorded encounter, oldest first
    pub fn records(&self) -> Vec<(RecordKind, EncounterRecord)> {
        self.inner.lock().records.clone()
    }

    pub fn count(&self, kind: RecordKind) -> usize {
        self.inner
            .lock()
            .records
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub fn events(&self) -> Vec<AchievementEvent> {
        self.inner.lock().events.clone()
    }

    /// Longest run of consecutive critical hits seen
    pub fn best_critical_streak(&self) -> u32 {
        self.inner.lock().best_critical_streak
    }
}

impl VictoryRecorder for InMemoryTracker {
    fn record_victory(&self, record: &EncounterRecord) {
        self.record(RecordKind::Victory, record);
    }

    fn record_defeat(&self, record: &EncounterRecord) {
        self.record(RecordKind::Defeat, record);
    }

    fn record_flight(&self, record: &EncounterRecord) {
        self.record(RecordKind::Flight, record);
    }
}

impl AchievementTracker for InMemoryTracker {
    fn notify(&self, event: &AchievementEvent) {
        let mut inner = self.inner.lock();
        match event {
            AchievementEvent::CriticalHit => {
                inner.critical_streak += 1;
                inner.best_critical_streak = inner.best_critical_streak.max(inner.critical_streak);
            }
            AchievementEvent::Hit => inner.critical_streak = 0,
            _ => {}
        }
        inner.events.push(event.clone());
    }
}
