//! Damage rolls
//!
//! Turns a weapon or monster damage string into a damage amount:
//! - Minimum 1 damage on any successful roll
//! - Critical hits roll the expression twice and add both results
//! - Half damage (rounded down, never below 1)
//! - Malformed expressions degrade to a flat 1

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::dice::{parse_dice, DiceRoll, DieRoller};

/// Result of a damage roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRoll {
    /// Damage dealt
    pub total: i32,
    /// Individual die faces in roll order
    pub faces: Vec<u32>,
    /// Flat modifier applied on top of the faces
    pub modifier: i32,
    /// Whether the expression was rolled twice
    pub critical: bool,
    /// Whether the amount was halved
    pub halved: bool,
}

impl DamageRoll {
    /// The safe default used when a damage string cannot be parsed
    pub fn fallback() -> Self {
        Self {
            total: 1,
            faces: Vec::new(),
            modifier: 1,
            critical: false,
            halved: false,
        }
    }

    /// Human-readable derivation, e.g. "3 + 4 + 2".
    ///
    /// `None` when there is only one component and no modifier.
    pub fn breakdown(&self) -> Option<String> {
        let components = self.faces.len() + usize::from(self.modifier != 0);
        if components <= 1 {
            return None;
        }

        let mut parts: Vec<String> = self.faces.iter().map(|f| f.to_string()).collect();
        let mut text = parts.remove(0);
        for part in parts {
            text.push_str(" + ");
            text.push_str(&part);
        }
        if self.modifier > 0 {
            text.push_str(&format!(" + {}", self.modifier));
        } else if self.modifier < 0 {
            text.push_str(&format!(" - {}", -self.modifier));
        }
        Some(text)
    }

    /// Halve the damage (floor), keeping the 1-point minimum
    pub fn halve(&mut self) {
        self.total = (self.total / 2).max(1);
        self.halved = true;
    }

    /// Add damage from another roll (e.g. a trade good's bonus dice)
    pub fn absorb(&mut self, extra: &DamageRoll) {
        self.faces.extend_from_slice(&extra.faces);
        self.modifier = self.modifier.saturating_add(extra.modifier);
        self.total = self.total.saturating_add(extra.total);
    }
}

impl std::fmt::Display for DamageRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.breakdown() {
            Some(breakdown) => write!(f, "{} ({})", self.total, breakdown),
            None => write!(f, "{}", self.total),
        }
    }
}

fn parse_or_warn(expression: Option<&str>) -> Option<DiceRoll> {
    let expression = expression?;
    match parse_dice(expression) {
        Ok(dice) => Some(dice),
        Err(e) => {
            warn!(expression, error = %e, "malformed damage expression, using 1");
            None
        }
    }
}

fn roll_times<D: DieRoller + ?Sized>(dice: &DiceRoll, times: u32, roller: &mut D) -> DamageRoll {
    let mut faces = Vec::new();
    let mut raw: i32 = 0;
    for _ in 0..times {
        let (rolled, total) = dice.roll_detailed(roller);
        faces.extend(rolled);
        raw = raw.saturating_add(total);
    }
    DamageRoll {
        total: raw.max(1),
        faces,
        modifier: dice.modifier.saturating_mul(times as i32),
        critical: times > 1,
        halved: false,
    }
}

/// Roll a damage expression once
pub fn roll_damage<D: DieRoller + ?Sized>(expression: Option<&str>, roller: &mut D) -> DamageRoll {
    match parse_or_warn(expression) {
        Some(dice) => roll_times(&dice, 1, roller),
        None => DamageRoll::fallback(),
    }
}

/// Roll a damage expression twice and sum both rolls
pub fn roll_critical_damage<D: DieRoller + ?Sized>(
    expression: Option<&str>,
    roller: &mut D,
) -> DamageRoll {
    match parse_or_warn(expression) {
        Some(dice) => roll_times(&dice, 2, roller),
        None => {
            let mut fallback = DamageRoll::fallback();
            fallback.critical = true;
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::dice::{RandomRoller, ScriptedRoller};

    #[test]
    fn test_single_die_has_no_breakdown() {
        let mut roller = ScriptedRoller::new([4]);
        let roll = roll_damage(Some("1d6"), &mut roller);
        assert_eq!(roll.total, 4);
        assert_eq!(roll.breakdown(), None);
        assert_eq!(roll.to_string(), "4");
    }

    #[test]
    fn test_breakdown_lists_faces_and_modifier() {
        let mut roller = ScriptedRoller::new([3, 4]);
        let roll = roll_damage(Some("2d6+2"), &mut roller);
        assert_eq!(roll.total, 9);
        assert_eq!(roll.breakdown().as_deref(), Some("3 + 4 + 2"));
        assert_eq!(roll.to_string(), "9 (3 + 4 + 2)");
    }

    #[test]
    fn test_negative_modifier_floors_at_one() {
        let mut roller = ScriptedRoller::new([1]);
        let roll = roll_damage(Some("1d4-3"), &mut roller);
        assert_eq!(roll.total, 1);
        assert_eq!(roll.breakdown().as_deref(), Some("1 - 3"));
    }

    #[test]
    fn test_flat_damage() {
        let mut roller = ScriptedRoller::default();
        let roll = roll_damage(Some("2"), &mut roller);
        assert_eq!(roll.total, 2);
        assert!(roll.faces.is_empty());
        assert_eq!(roll.breakdown(), None);
    }

    #[test]
    fn test_malformed_defaults_to_one() {
        let mut roller = ScriptedRoller::default();
        assert_eq!(roll_damage(Some("banana"), &mut roller).total, 1);
        assert_eq!(roll_damage(Some(""), &mut roller).total, 1);
        assert_eq!(roll_damage(None, &mut roller).total, 1);
    }

    #[test]
    fn test_oversized_expressions_fall_back() {
        let mut roller = ScriptedRoller::new([6, 6]);
        for expression in ["1d6+2147483647", "2d4294967295", "1000000000d6"] {
            let roll = roll_critical_damage(Some(expression), &mut roller);
            assert_eq!(roll.total, 1, "{expression}");
            assert!(roll.faces.is_empty());
        }
        assert_eq!(roller.remaining(), 2);
    }

    #[test]
    fn test_critical_rolls_twice() {
        let mut roller = ScriptedRoller::new([2, 5]);
        let roll = roll_critical_damage(Some("1d8+1"), &mut roller);
        assert!(roll.critical);
        assert_eq!(roll.faces, vec![2, 5]);
        assert_eq!(roll.total, 9); // (2 + 1) + (5 + 1)
        assert_eq!(roll.breakdown().as_deref(), Some("2 + 5 + 2"));
    }

    #[test]
    fn test_halve_floors() {
        let mut roller = ScriptedRoller::new([5]);
        let mut roll = roll_damage(Some("1d6"), &mut roller);
        roll.halve();
        assert_eq!(roll.total, 2);
        assert!(roll.halved);

        let mut tiny = DamageRoll::fallback();
        tiny.halve();
        assert_eq!(tiny.total, 1);
    }

    #[test]
    fn test_damage_bounds_and_face_count() {
        let mut roller = RandomRoller::seeded(99);
        for (count, sides, modifier) in [(1, 6, 0), (2, 4, 1), (3, 8, -2), (1, 2, 0)] {
            let expression = DiceRoll::new(count, sides, modifier).to_string();
            for _ in 0..50 {
                let roll = roll_damage(Some(&expression), &mut roller);
                assert!(roll.total >= 1);
                assert_eq!(roll.faces.len(), count as usize);
            }
        }
    }

    #[test]
    fn test_absorb_bonus_dice() {
        let mut roller = ScriptedRoller::new([6, 3]);
        let mut base = roll_damage(Some("1d6"), &mut roller);
        let bonus = roll_damage(Some("1d4"), &mut roller);
        base.absorb(&bonus);
        assert_eq!(base.total, 9);
        assert_eq!(base.breakdown().as_deref(), Some("6 + 3"));
    }
}
