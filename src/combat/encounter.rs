//! Encounter orchestration
//!
//! [`Encounter`] owns both combatants, the dice and the [`CombatState`], and
//! moves one fight through its lifecycle:
//!
//! ```text
//! not-started -> in-progress <-> awaiting-luck-decision
//!                     |                   |
//!                     +----> finished <---+
//! ```
//!
//! Character actions (`attack`, `mighty_deed`, `decide_luck`, `flee`) resolve
//! immediately. The monster's reply is queued as a continuation and only runs
//! when the caller invokes `advance()`, so pacing belongs to whoever drives
//! the encounter. A continuation re-checks status and hit points before it
//! acts; one that has gone stale is cancelled without touching the log.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::attack::{hit_damage, roll_swing, SwingOutcome, SwingSetup};
use super::damage::{roll_damage, DamageRoll};
use super::deed::{roll_deed, DeedOutcome};
use super::dice::{roll_d20, DieRoller, RandomRoller};
use super::effects::{EffectSpec, Facing};
use super::fumble::{select_fumble_resolver, FumbleContext};
use super::luck::{evaluate_burn, BurnResult, CombatError, LuckDecision, LuckOffer, PendingAttack};
use super::state::{CombatState, CombatStatus, LogEntry, Outcome, ScheduledAction};
use crate::combatants::{Character, Monster};
use crate::config::EngineConfig;
use crate::tracking::{
    AchievementEvent, AchievementTracker, BattleType, EncounterRecord, NullTracker, VictoryRecorder,
};

/// What a character action did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Not allowed right now; nothing changed
    Ignored,
    /// Resolved; the fight goes on
    Continued,
    /// Suspended on a luck decision
    AwaitingLuck,
    /// The fight is over
    Finished,
}

/// Result of running a scheduled continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Nothing was scheduled
    Idle,
    Resolved,
    /// The continuation was stale and did nothing
    Cancelled,
}

/// Which side a fumble or hit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Character,
    Monster,
}

/// One character against one monster
pub struct Encounter<R: DieRoller = RandomRoller> {
    id: Uuid,
    config: EngineConfig,
    roller: R,
    character: Character,
    monster: Monster,
    state: CombatState,
    recorder: Arc<dyn VictoryRecorder>,
    achievements: Arc<dyn AchievementTracker>,
}

impl<R: DieRoller> Encounter<R> {
    /// Set up an encounter. Nothing happens until `start()`.
    pub fn new(mut character: Character, mut monster: Monster, config: EngineConfig, roller: R) -> Self {
        character.normalize();
        monster.normalize();
        Self {
            id: Uuid::new_v4(),
            config,
            roller,
            character,
            monster,
            state: CombatState::new(),
            recorder: Arc::new(NullTracker),
            achievements: Arc::new(NullTracker),
        }
    }

    /// Report outcomes and achievements to one tracker
    pub fn with_tracker<T>(mut self, tracker: Arc<T>) -> Self
    where
        T: VictoryRecorder + AchievementTracker + 'static,
    {
        self.recorder = tracker.clone();
        self.achievements = tracker;
        self
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn VictoryRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn with_achievements(mut self, achievements: Arc<dyn AchievementTracker>) -> Self {
        self.achievements = achievements;
        self
    }

    /// Begin a fresh fight: full hit points, empty log, AC hidden again,
    /// then initiative.
    pub fn start(&mut self) -> ActionOutcome {
        self.id = Uuid::new_v4();
        self.state = CombatState::new();
        self.character.hp = self.character.max_hp;
        self.character.effects.clear();
        self.monster.hp = self.monster.max_hp;
        self.monster.effects.clear();
        self.monster.ac_revealed = false;
        self.state.transition(CombatStatus::InProgress);

        self.state.push(format!(
            "{} faces {} ({} hp).",
            self.character.name, self.monster.name, self.monster.hp
        ));

        let character_first = self.roll_initiative();
        info!(
            encounter = %self.id,
            character = %self.character.name,
            monster = %self.monster.name,
            character_first,
            "encounter started"
        );
        if character_first {
            self.state
                .push(format!("{} acts first.", self.character.name));
        } else {
            self.state.push(format!("{} acts first.", self.monster.name));
            self.state.schedule(ScheduledAction::MonsterTurn);
        }
        ActionOutcome::Continued
    }

    /// Rest (restoring Luck) and start over
    pub fn restart(&mut self) -> ActionOutcome {
        self.character.rest();
        self.start()
    }

    /// Returns true when the character acts first
    fn roll_initiative(&mut self) -> bool {
        let agility = self.character.abilities.agility_modifier();
        for _ in 0..=self.config.initiative_reroll_budget {
            let hero = roll_d20(&mut self.roller) as i32 + agility;
            let foe = roll_d20(&mut self.roller) as i32;
            if hero != foe {
                self.state.push(format!(
                    "Initiative: {} {}, {} {}.",
                    self.character.name, hero, self.monster.name, foe
                ));
                return hero > foe;
            }
            debug!(total = hero, "initiative tie");
            self.state
                .push(format!("Initiative tied at {hero}; rolling again."));
        }
        warn!(
            budget = self.config.initiative_reroll_budget,
            "initiative tie budget exhausted"
        );
        self.state.push(format!(
            "The standoff drags on; {} seizes the moment.",
            self.character.name
        ));
        true
    }

    /// Whether the character may take an action now
    pub fn awaiting_character(&self) -> bool {
        self.state.status() == CombatStatus::InProgress && !self.state.has_scheduled()
    }

    /// Attack with the equipped weapon
    pub fn attack(&mut self) -> ActionOutcome {
        if !self.awaiting_character() {
            return ActionOutcome::Ignored;
        }
        self.state.next_round();

        let Some(weapon) = self.character.weapon.clone() else {
            return self.pass_unarmed("attack");
        };

        let setup = self.character_setup(Some(self.character.luck));
        let swing = roll_swing(&setup, &mut self.roller);
        self.state.push(format!(
            "{} attacks {} with the {}: {} vs AC {}.",
            self.character.name,
            self.monster.name,
            weapon.name,
            swing.describe_roll(),
            self.monster.visible_ac()
        ));

        match swing.outcome {
            SwingOutcome::Fumble => {
                self.resolve_fumble(Side::Character, Some(weapon.damage));
            }
            SwingOutcome::NearMiss { shortfall } => {
                self.state.push(format!(
                    "{} misses by {}. Burn Luck to turn it into a hit? ({} available)",
                    self.character.name, shortfall, self.character.luck
                ));
                self.state.suspend(PendingAttack {
                    swing,
                    weapon_damage: Some(weapon.damage),
                });
                return ActionOutcome::AwaitingLuck;
            }
            SwingOutcome::Miss => {
                self.state.push(format!("{} misses.", self.character.name));
            }
            SwingOutcome::Hit { critical } => {
                let halve = self.character.effects.take_half_damage();
                let damage = hit_damage(Some(&weapon.damage), critical, halve, &mut self.roller);
                self.strike_monster(&damage, BattleType::Normal);
            }
        }
        self.end_character_turn()
    }

    /// Attempt a mighty deed with the character's trade good
    pub fn mighty_deed(&mut self) -> ActionOutcome {
        if !self.awaiting_character() {
            return ActionOutcome::Ignored;
        }
        let Some(good) = self.character.trade_good.clone() else {
            return ActionOutcome::Ignored;
        };
        self.state.next_round();

        let Some(weapon_damage) = self.character.weapon.as_ref().map(|w| w.damage.clone()) else {
            return self.pass_unarmed("attempt a mighty deed");
        };
        let setup = self.character_setup(None);
        let deed = roll_deed(&setup, &mut self.roller);
        self.state.push(format!(
            "{} attempts a mighty deed with the {}: {} vs AC {}, deed die {}.",
            self.character.name,
            good.name,
            deed.swing.describe_roll(),
            self.monster.visible_ac(),
            deed.deed_die
        ));

        match deed.outcome {
            DeedOutcome::MightyFumble => {
                let backlash = good.mighty_fumble();
                self.character.trade_good = None;
                self.state.push(format!(
                    "Mighty fumble! {} {}.",
                    self.character.name, backlash.narrative
                ));
                self.apply_specs(Side::Character, backlash.on_character, &good.name);
                if let Some(expr) = backlash.self_damage {
                    let damage = roll_damage(Some(expr), &mut self.roller);
                    self.wound_self(Side::Character, &damage);
                }
                if !self.state.is_finished() {
                    self.achievements.notify(&AchievementEvent::FumbleSurvived);
                }
            }
            DeedOutcome::MightyCritical => {
                let bonus = good.mighty_critical();
                self.character.trade_good = None;
                let halve = self.character.effects.take_half_damage();
                let mut damage =
                    hit_damage(Some(&weapon_damage), true, halve, &mut self.roller);
                if let Some(extra) = bonus.extra_damage {
                    damage.absorb(&roll_damage(Some(extra), &mut self.roller));
                }
                self.state.push(format!(
                    "Mighty critical! {} {}.",
                    self.character.name, bonus.narrative
                ));
                self.achievements
                    .notify(&AchievementEvent::MightyDeed { critical: true });
                self.apply_specs(Side::Monster, bonus.on_monster, &good.name);
                self.apply_specs(Side::Character, bonus.on_character, &good.name);
                self.strike_monster(&damage, BattleType::MightyCritical);
            }
            DeedOutcome::Hit { deed_die_six } => {
                if deed_die_six {
                    self.state.push(
                        "The deed die shows a 6, but without a natural 20 the deed falls flat. The blow still lands.",
                    );
                } else {
                    self.state
                        .push("The deed does not come off, but the blow lands.");
                }
                let halve = self.character.effects.take_half_damage();
                let damage = hit_damage(Some(&weapon_damage), false, halve, &mut self.roller);
                self.strike_monster(&damage, BattleType::MightyDeed);
            }
            DeedOutcome::Failed => {
                self.state.push(format!(
                    "The mighty deed fails; {} misses.",
                    self.character.name
                ));
            }
        }
        self.end_character_turn()
    }

    fn pass_unarmed(&mut self, action: &str) -> ActionOutcome {
        warn!(character = %self.character.name, action, "action without a weapon skipped");
        let line = format!("{} has no weapon and cannot {}.", self.character.name, action);
        self.state.push(line);
        self.end_character_turn()
    }

    /// Answer a pending luck negotiation.
    ///
    /// An invalid burn is rejected before anything changes.
    pub fn decide_luck(&mut self, decision: LuckDecision) -> Result<ActionOutcome, CombatError> {
        let pending = self
            .state
            .pending()
            .cloned()
            .ok_or(CombatError::NoDecisionPending)?;
        let result = evaluate_burn(&pending, decision, self.character.luck).inspect_err(|e| {
            warn!(error = %e, "luck burn rejected");
        })?;
        self.state.resume();

        match result {
            BurnResult::Declined => {
                self.state.push(format!(
                    "{} keeps their Luck. The attack misses.",
                    self.character.name
                ));
            }
            BurnResult::Burned {
                spent,
                new_total,
                hit,
                critical,
            } => {
                self.character.burn_luck(spent);
                debug!(spent, luck = self.character.luck, "luck burned");
                let verdict = if hit {
                    "the gamble pays off"
                } else {
                    "the gamble fails"
                };
                self.state.push(format!(
                    "{} burns {} Luck ({} left): {} vs AC {}, {}.",
                    self.character.name,
                    spent,
                    self.character.luck,
                    new_total,
                    self.monster.visible_ac(),
                    verdict
                ));
                if hit {
                    let halve = self.character.effects.take_half_damage();
                    let damage = hit_damage(
                        pending.weapon_damage.as_deref(),
                        critical,
                        halve,
                        &mut self.roller,
                    );
                    self.strike_monster(&damage, BattleType::Normal);
                }
            }
        }
        Ok(self.end_character_turn())
    }

    /// Run the next scheduled continuation, if any
    pub fn advance(&mut self) -> Advance {
        let Some(action) = self.state.next_scheduled() else {
            return Advance::Idle;
        };
        match action {
            ScheduledAction::MonsterTurn => self.monster_turn(),
        }
    }

    /// Run away. Always available while the fight is on.
    pub fn flee(&mut self) -> ActionOutcome {
        if !matches!(
            self.state.status(),
            CombatStatus::InProgress | CombatStatus::AwaitingLuckDecision
        ) {
            return ActionOutcome::Ignored;
        }
        self.state.push(format!(
            "{} turns and flees from {}!",
            self.character.name, self.monster.name
        ));
        self.finish(Outcome::Fled, BattleType::Normal);
        ActionOutcome::Finished
    }

    fn monster_turn(&mut self) -> Advance {
        if self.state.status() != CombatStatus::InProgress
            || self.monster.is_dead()
            || self.character.is_dead()
        {
            debug!(encounter = %self.id, "stale monster turn cancelled");
            return Advance::Cancelled;
        }

        if self.monster.effects.take_skip_action() {
            self.state
                .push(format!("{} loses its action.", self.monster.name));
        } else {
            self.monster_attack();
        }

        // The character's turn comes up next
        if !self.state.is_finished() && self.character.effects.take_skip_action() {
            self.state
                .push(format!("{} loses their turn.", self.character.name));
            self.state.schedule(ScheduledAction::MonsterTurn);
        }
        Advance::Resolved
    }

    fn monster_attack(&mut self) {
        let (Some(bonus), Some(expr)) = (
            self.monster.attack_modifier(),
            self.monster.damage_expression().map(str::to_string),
        ) else {
            warn!(monster = %self.monster.name, "monster has no usable attack data, turn skipped");
            self.state.push(format!(
                "{} hesitates and does nothing.",
                self.monster.name
            ));
            return;
        };

        let inbound = self.character.effects.take_attack_modifier(Facing::Inbound);
        let setup = SwingSetup {
            ability_modifier: bonus,
            effect_modifier: self.monster.effects.take_attack_modifier(Facing::Own),
            target_ac: self.character.armor_class() - inbound,
            luck_available: None,
        };
        let swing = roll_swing(&setup, &mut self.roller);
        self.state.push(format!(
            "{} attacks {}: {} vs AC {}.",
            self.monster.name,
            self.character.name,
            swing.describe_roll(),
            swing.target_ac
        ));

        match swing.outcome {
            SwingOutcome::Fumble => self.resolve_fumble(Side::Monster, Some(expr)),
            SwingOutcome::Hit { critical } => {
                let halve = self.monster.effects.take_half_damage();
                let damage = hit_damage(Some(&expr), critical, halve, &mut self.roller);
                let taken = self.character.take_damage(damage.total);
                self.state.push(format!(
                    "{}{} hits {} for {}{}. {} has {}/{} hp.",
                    if critical { "Critical hit! " } else { "" },
                    self.monster.name,
                    self.character.name,
                    damage,
                    if damage.halved { ", halved" } else { "" },
                    self.character.name,
                    self.character.hp,
                    self.character.max_hp
                ));
                debug!(taken, hp = self.character.hp, "character damaged");
                if self.character.is_dead() {
                    self.finish(Outcome::Defeat, BattleType::Normal);
                }
            }
            SwingOutcome::Miss | SwingOutcome::NearMiss { .. } => {
                self.state.push(format!("{} misses.", self.monster.name));
            }
        }
    }

    /// Swing setup for the character, consuming attack effects on both sides
    fn character_setup(&mut self, luck_available: Option<i32>) -> SwingSetup {
        let inbound = self.monster.effects.take_attack_modifier(Facing::Inbound);
        SwingSetup {
            ability_modifier: self.character.attack_modifier(),
            effect_modifier: self.character.effects.take_attack_modifier(Facing::Own),
            target_ac: self.monster.armor_class - inbound,
            luck_available,
        }
    }

    /// Apply the character's damage to the monster and check for a kill
    fn strike_monster(&mut self, damage: &DamageRoll, battle: BattleType) {
        let taken = self.monster.take_damage(damage.total);
        if self.monster.reveal_ac() {
            self.state.push(format!(
                "{}'s armor class is {}.",
                self.monster.name, self.monster.armor_class
            ));
        }
        self.state.push(format!(
            "{}{} hits {} for {}{}. {} has {}/{} hp.",
            if damage.critical { "Critical hit! " } else { "" },
            self.character.name,
            self.monster.name,
            damage,
            if damage.halved { ", halved" } else { "" },
            self.monster.name,
            self.monster.hp,
            self.monster.max_hp
        ));
        debug!(taken, hp = self.monster.hp, "monster damaged");

        let event = if damage.critical {
            AchievementEvent::CriticalHit
        } else {
            AchievementEvent::Hit
        };
        self.achievements.notify(&event);

        if self.monster.is_dead() {
            self.finish(Outcome::Victory, battle);
        }
    }

    /// Roll on the configured fumble table for one side
    fn resolve_fumble(&mut self, side: Side, weapon_damage: Option<String>) {
        let context = match side {
            Side::Character => FumbleContext {
                armor: self.character.armor,
                luck_modifier: self.character.luck_modifier(),
                weapon_damage,
            },
            Side::Monster => FumbleContext {
                armor: None,
                luck_modifier: 0,
                weapon_damage,
            },
        };
        let resolver = select_fumble_resolver(self.config.fumble_table, &context);
        let outcome = resolver.resolve(&context, &mut self.roller);
        debug!(table = resolver.name(), roll = outcome.roll, result = outcome.result, "fumble");

        let name = self.name_of(side).to_string();
        self.state.push(format!(
            "Fumble! {} {} (d{}: {}).",
            name, outcome.description, outcome.die, outcome.roll
        ));
        for effect in outcome.effects {
            self.state.push(format!("{name} {effect}."));
            match side {
                Side::Character => self.character.effects.add(effect),
                Side::Monster => self.monster.effects.add(effect),
            }
        }
        if let Some(damage) = outcome.self_damage {
            self.wound_self(side, &damage);
        }
        if side == Side::Character && !self.state.is_finished() {
            self.achievements.notify(&AchievementEvent::FumbleSurvived);
        }
    }

    /// Self-inflicted damage from a fumble
    fn wound_self(&mut self, side: Side, damage: &DamageRoll) {
        let (taken, dead) = match side {
            Side::Character => (
                self.character.take_damage(damage.total),
                self.character.is_dead(),
            ),
            Side::Monster => (self.monster.take_damage(damage.total), self.monster.is_dead()),
        };
        let line = format!("{} takes {} damage from the mishap.", self.name_of(side), damage);
        self.state.push(line);
        debug!(taken, ?side, "self-inflicted damage");
        if dead {
            let outcome = match side {
                Side::Character => Outcome::Defeat,
                Side::Monster => Outcome::Victory,
            };
            self.finish(outcome, BattleType::FumbleSelfKill);
        }
    }

    fn apply_specs(&mut self, side: Side, specs: &[EffectSpec], source: &str) {
        for spec in specs {
            let effect = spec.instantiate(source);
            let line = format!("{} {}.", self.name_of(side), effect);
            self.state.push(line);
            match side {
                Side::Character => self.character.effects.add(effect),
                Side::Monster => self.monster.effects.add(effect),
            }
        }
    }

    fn name_of(&self, side: Side) -> &str {
        match side {
            Side::Character => &self.character.name,
            Side::Monster => &self.monster.name,
        }
    }

    /// Hand the turn to the monster unless the fight is over
    fn end_character_turn(&mut self) -> ActionOutcome {
        if self.state.is_finished() {
            return ActionOutcome::Finished;
        }
        self.state.schedule(ScheduledAction::MonsterTurn);
        ActionOutcome::Continued
    }

    /// Conclude the fight and report it, once
    fn finish(&mut self, outcome: Outcome, battle: BattleType) {
        let summary = match outcome {
            Outcome::Victory => format!(
                "Victory! {} defeated {}.",
                self.character.name, self.monster.name
            ),
            Outcome::Defeat => format!(
                "Defeat! {} was slain by {}.",
                self.character.name, self.monster.name
            ),
            Outcome::Fled => format!(
                "{} ran away from {}.",
                self.character.name, self.monster.name
            ),
        };
        if !self.state.conclude(outcome, &summary) {
            return;
        }

        let record = EncounterRecord {
            encounter_id: self.id,
            character: self.character.clone(),
            monster: self.monster.clone(),
            battle_type: battle,
            rounds: self.state.round(),
            recorded_at: Utc::now(),
        };
        match outcome {
            Outcome::Victory => {
                self.recorder.record_victory(&record);
                self.achievements.notify(&AchievementEvent::Victory {
                    monster: self.monster.name.clone(),
                    tier: self.monster.tier,
                    boss: self.monster.boss,
                });
            }
            Outcome::Defeat => self.recorder.record_defeat(&record),
            Outcome::Fled => self.recorder.record_flight(&record),
        }
        info!(
            encounter = %self.id,
            ?outcome,
            ?battle,
            rounds = record.rounds,
            "encounter finished"
        );
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn status(&self) -> CombatStatus {
        self.state.status()
    }

    pub fn log(&self) -> &[LogEntry] {
        self.state.log()
    }

    pub fn summary(&self) -> Option<&str> {
        self.state.summary()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.state.outcome()
    }

    pub fn round(&self) -> u32 {
        self.state.round()
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn monster(&self) -> &Monster {
        &self.monster
    }

    /// The open luck offer, if the fight is suspended on one
    pub fn pending_luck(&self) -> Option<LuckOffer> {
        self.state
            .pending()
            .map(|pending| pending.offer(self.character.luck))
    }

    pub fn has_scheduled_action(&self) -> bool {
        self.state.has_scheduled()
    }
}
