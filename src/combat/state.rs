//! Combat state tracking
//!
//! Holds everything about one encounter that is not a combatant:
//! - Status (not started, in progress, awaiting a luck decision, finished)
//! - The append-only combat log
//! - The near-miss held during a luck negotiation
//! - Continuations scheduled to run on the next `advance()`

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::luck::PendingAttack;

/// Encounter lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatStatus {
    #[default]
    NotStarted,
    InProgress,
    AwaitingLuckDecision,
    Finished,
}

/// How a finished encounter ended, from the character's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Victory,
    Defeat,
    Fled,
}

/// A tagged log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaggedEntry {
    Summary {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

/// One combat log entry: a narrative line or a tagged record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogEntry {
    Line(String),
    Tagged(TaggedEntry),
}

impl LogEntry {
    pub fn summary(message: &str) -> Self {
        LogEntry::Tagged(TaggedEntry::Summary {
            message: message.to_string(),
            timestamp: Utc::now(),
        })
    }

    /// The entry's text
    pub fn message(&self) -> &str {
        match self {
            LogEntry::Line(line) => line,
            LogEntry::Tagged(TaggedEntry::Summary { message, .. }) => message,
        }
    }

    pub fn is_summary(&self) -> bool {
        matches!(self, LogEntry::Tagged(TaggedEntry::Summary { .. }))
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Work deferred to the next `advance()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledAction {
    MonsterTurn,
}

/// State of a single encounter
#[derive(Debug, Clone, Default)]
pub struct CombatState {
    status: CombatStatus,
    log: Vec<LogEntry>,
    summary: Option<String>,
    outcome: Option<Outcome>,
    pending: Option<PendingAttack>,
    scheduled: VecDeque<ScheduledAction>,
    /// Character actions taken so far
    round: u32,
}

impl CombatState {
    /// Create a fresh, not-started state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> CombatStatus {
        self.status
    }

    /// Move to `next` if the lifecycle allows it. Returns whether it moved.
    pub fn transition(&mut self, next: CombatStatus) -> bool {
        use CombatStatus::*;
        let allowed = matches!(
            (self.status, next),
            (NotStarted, InProgress)
                | (InProgress, AwaitingLuckDecision)
                | (AwaitingLuckDecision, InProgress)
                | (InProgress, Finished)
                | (AwaitingLuckDecision, Finished)
        );
        if allowed {
            self.status = next;
        }
        allowed
    }

    pub fn is_finished(&self) -> bool {
        self.status == CombatStatus::Finished
    }

    /// Append a narrative line
    pub fn push(&mut self, line: impl Into<String>) {
        self.log.push(LogEntry::Line(line.into()));
    }

    /// Record the terminal summary, once
    pub fn conclude(&mut self, outcome: Outcome, summary: &str) -> bool {
        if self.outcome.is_some() || !self.transition(CombatStatus::Finished) {
            return false;
        }
        self.outcome = Some(outcome);
        self.summary = Some(summary.to_string());
        self.pending = None;
        self.log.push(LogEntry::summary(summary));
        true
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn pending(&self) -> Option<&PendingAttack> {
        self.pending.as_ref()
    }

    /// Hold a near-miss and suspend for a luck decision
    pub fn suspend(&mut self, pending: PendingAttack) -> bool {
        if !self.transition(CombatStatus::AwaitingLuckDecision) {
            return false;
        }
        self.pending = Some(pending);
        true
    }

    /// Release the held near-miss and resume
    pub fn resume(&mut self) -> Option<PendingAttack> {
        if self.status != CombatStatus::AwaitingLuckDecision {
            return None;
        }
        self.status = CombatStatus::InProgress;
        self.pending.take()
    }

    pub fn schedule(&mut self, action: ScheduledAction) {
        self.scheduled.push_back(action);
    }

    pub fn next_scheduled(&mut self) -> Option<ScheduledAction> {
        self.scheduled.pop_front()
    }

    pub fn has_scheduled(&self) -> bool {
        !self.scheduled.is_empty()
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn next_round(&mut self) -> u32 {
        self.round += 1;
        self.round
    }
}
