//! Paced encounter driver
//!
//! Runs an [`Encounter`] to the end for a human watching the log. Character
//! actions fire immediately; scheduled monster turns wait `pacing_ms` first.
//! The delay is cosmetic; the encounter itself never sleeps.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::combat::{
    ActionOutcome, CombatStatus, DieRoller, Encounter, LogEntry, LuckDecision, LuckOffer, Outcome,
};
use crate::config::LuckPolicy;

pub struct Driver<R: DieRoller> {
    encounter: Encounter<R>,
    pacing: Duration,
    luck_policy: LuckPolicy,
    prefer_deeds: bool,
    max_rounds: u32,
    /// Log entries already handed to the sink
    seen: usize,
}

impl<R: DieRoller> Driver<R> {
    /// Take pacing, luck policy and deed preference from the encounter's config
    pub fn new(encounter: Encounter<R>) -> Self {
        let config = encounter.config().clone();
        Self {
            encounter,
            pacing: Duration::from_millis(config.pacing_ms),
            luck_policy: config.luck_policy,
            prefer_deeds: config.prefer_mighty_deeds,
            max_rounds: config.max_rounds,
            seen: 0,
        }
    }

    pub fn with_luck_policy(mut self, policy: LuckPolicy) -> Self {
        self.luck_policy = policy;
        self
    }

    pub fn with_mighty_deeds(mut self, prefer: bool) -> Self {
        self.prefer_deeds = prefer;
        self
    }

    pub fn encounter(&self) -> &Encounter<R> {
        &self.encounter
    }

    pub fn into_encounter(self) -> Encounter<R> {
        self.encounter
    }

    /// Fight until the encounter finishes.
    ///
    /// `prompt` is awaited whenever the luck policy is `Ask`; `sink` receives
    /// every new log entry in order.
    pub async fn run<P, Fut, S>(&mut self, mut prompt: P, mut sink: S) -> Option<Outcome>
    where
        P: FnMut(LuckOffer) -> Fut,
        Fut: Future<Output = LuckDecision>,
        S: FnMut(&LogEntry),
    {
        loop {
            self.flush(&mut sink);
            match self.encounter.status() {
                CombatStatus::Finished => break,
                CombatStatus::NotStarted => {
                    self.seen = 0;
                    self.encounter.start();
                }
                CombatStatus::AwaitingLuckDecision => {
                    let Some(offer) = self.encounter.pending_luck() else {
                        break;
                    };
                    let decision = match self.luck_policy.decide(&offer) {
                        Some(decision) => decision,
                        None => prompt(offer).await,
                    };
                    if let Err(e) = self.encounter.decide_luck(decision) {
                        warn!(error = %e, "luck decision rejected, declining instead");
                        if let Err(e) = self.encounter.decide_luck(LuckDecision::Decline) {
                            warn!(error = %e, "decline rejected, abandoning the run");
                            break;
                        }
                    }
                }
                CombatStatus::InProgress if self.encounter.has_scheduled_action() => {
                    if !self.pacing.is_zero() {
                        tokio::time::sleep(self.pacing).await;
                    }
                    let advance = self.encounter.advance();
                    debug!(?advance, "scheduled turn");
                }
                CombatStatus::InProgress => self.character_turn(),
            }
        }
        self.flush(&mut sink);
        self.encounter.outcome()
    }

    fn character_turn(&mut self) {
        if self.encounter.round() >= self.max_rounds {
            warn!(rounds = self.max_rounds, "round limit reached, fleeing");
            self.encounter.flee();
            return;
        }
        if self.prefer_deeds && self.encounter.mighty_deed() != ActionOutcome::Ignored {
            return;
        }
        self.encounter.attack();
    }

    fn flush<S: FnMut(&LogEntry)>(&mut self, sink: &mut S) {
        let log = self.encounter.log();
        for entry in log.iter().skip(self.seen) {
            sink(entry);
        }
        self.seen = log.len();
    }
}
