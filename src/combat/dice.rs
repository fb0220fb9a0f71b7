//! Dice rolling system
//!
//! Parses and rolls dice notation like "2d6+3", "1d20", "d6" or a flat "2".
//! Every roll goes through a [`DieRoller`] so encounters can be replayed
//! from a seed or a scripted sequence of faces.

use std::collections::VecDeque;
use std::str::FromStr;

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

/// Largest number of dice one expression may roll
pub const MAX_DICE: u32 = 100;
/// Largest die an expression may name
pub const MAX_SIDES: u32 = 1000;
/// Largest flat modifier or flat value, in either direction
pub const MAX_MODIFIER: i32 = 10_000;

/// Errors produced while parsing dice notation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("empty dice expression")]
    Empty,

    #[error("invalid dice count: {0}")]
    InvalidCount(String),

    #[error("invalid die sides: {0}")]
    InvalidSides(String),

    #[error("invalid modifier: {0}")]
    InvalidModifier(String),
}

/// Source of die faces
pub trait DieRoller {
    /// Roll one die, returning a face in `1..=sides`
    fn roll_die(&mut self, sides: u32) -> u32;
}

impl<T: DieRoller + ?Sized> DieRoller for &mut T {
    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }
}

impl<T: DieRoller + ?Sized> DieRoller for Box<T> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }
}

/// Uniform roller backed by a `rand` generator
#[derive(Debug, Clone)]
pub struct RandomRoller<R = ThreadRng> {
    rng: R,
}

impl RandomRoller<ThreadRng> {
    /// Roller using the thread-local generator
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for RandomRoller<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomRoller<StdRng> {
    /// Reproducible roller; the same seed replays the same encounter
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomRoller<R> {
    /// Wrap an arbitrary generator
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DieRoller for RandomRoller<R> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides <= 1 {
            return 1;
        }
        self.rng.random_range(1..=sides)
    }
}

/// Replays a fixed sequence of faces.
///
/// Faces are clamped into `1..=sides` of the die being rolled. Once the
/// script runs out, every die lands on its midpoint.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    faces: VecDeque<u32>,
}

impl ScriptedRoller {
    /// Create a roller that yields `faces` in order
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
        }
    }

    /// Append more faces to the script
    pub fn push(&mut self, face: u32) {
        self.faces.push_back(face);
    }

    /// Faces not yet consumed
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DieRoller for ScriptedRoller {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let sides = sides.max(1);
        match self.faces.pop_front() {
            Some(face) => face.clamp(1, sides),
            None => sides.div_ceil(2),
        }
    }
}

/// A parsed dice roll specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceRoll {
    /// Number of dice to roll (0 for a flat value)
    pub count: u32,
    /// Number of sides per die
    pub sides: u32,
    /// Modifier to add/subtract
    pub modifier: i32,
}

impl DiceRoll {
    /// Create a new dice roll
    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// A flat value with no dice, e.g. "2"
    pub fn flat(value: i32) -> Self {
        Self {
            count: 0,
            sides: 0,
            modifier: value,
        }
    }

    /// Whether this expression rolls no dice
    pub fn is_flat(&self) -> bool {
        self.count == 0
    }

    /// Roll the dice and return the total
    pub fn roll<D: DieRoller + ?Sized>(&self, roller: &mut D) -> i32 {
        self.roll_detailed(roller).1
    }

    /// Roll and return individual die results plus total
    pub fn roll_detailed<D: DieRoller + ?Sized>(&self, roller: &mut D) -> (Vec<u32>, i32) {
        let results: Vec<u32> = (0..self.count).map(|_| roller.roll_die(self.sides)).collect();
        let sum = results
            .iter()
            .fold(0i32, |acc, &face| acc.saturating_add(face.min(i32::MAX as u32) as i32));
        let total = sum.saturating_add(self.modifier);
        debug!(dice = %self, ?results, total, "rolled dice");
        (results, total)
    }

    /// Get the minimum possible result
    pub fn min(&self) -> i32 {
        (self.count as i32).saturating_add(self.modifier)
    }

    /// Get the maximum possible result
    pub fn max(&self) -> i32 {
        let faces = self.count.saturating_mul(self.sides).min(i32::MAX as u32) as i32;
        faces.saturating_add(self.modifier)
    }

    /// Get the expected average (rounded down)
    pub fn average(&self) -> i32 {
        let avg_per_die = (1.0 + self.sides as f64) / 2.0;
        (self.count as f64 * avg_per_die + self.modifier as f64) as i32
    }
}

impl FromStr for DiceRoll {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice(s)
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_flat() {
            return write!(f, "{}", self.modifier);
        }
        if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}d{}{}", self.count, self.sides, self.modifier)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}

/// Parse a dice notation string like "2d6+3", "d8" or "2"
pub fn parse_dice(notation: &str) -> Result<DiceRoll, DiceError> {
    let notation: String = notation
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    if notation.is_empty() {
        return Err(DiceError::Empty);
    }

    // Bare integer: a flat amount
    let Some(d_pos) = notation.find('d') else {
        let value: i32 = notation
            .parse()
            .ok()
            .filter(|v: &i32| v.unsigned_abs() <= MAX_MODIFIER as u32)
            .ok_or_else(|| DiceError::InvalidModifier(notation.clone()))?;
        return Ok(DiceRoll::flat(value));
    };

    let count_str = &notation[..d_pos];
    let count: u32 = if count_str.is_empty() {
        1 // "d6" means "1d6"
    } else {
        count_str
            .parse()
            .map_err(|_| DiceError::InvalidCount(count_str.to_string()))?
    };

    if count == 0 || count > MAX_DICE {
        return Err(DiceError::InvalidCount(count_str.to_string()));
    }

    let rest = &notation[d_pos + 1..];

    let (sides_str, modifier) = if let Some(plus_pos) = rest.find('+') {
        let mod_str = &rest[plus_pos + 1..];
        let modifier: i32 = mod_str
            .parse()
            .map_err(|_| DiceError::InvalidModifier(mod_str.to_string()))?;
        (&rest[..plus_pos], modifier)
    } else if let Some(minus_pos) = rest.rfind('-').filter(|&p| p > 0) {
        let mod_str = &rest[minus_pos..]; // includes the minus sign
        let modifier: i32 = mod_str
            .parse()
            .map_err(|_| DiceError::InvalidModifier(mod_str.to_string()))?;
        (&rest[..minus_pos], modifier)
    } else {
        (rest, 0)
    };

    let sides: u32 = sides_str
        .parse()
        .map_err(|_| DiceError::InvalidSides(sides_str.to_string()))?;

    if modifier.unsigned_abs() > MAX_MODIFIER as u32 {
        return Err(DiceError::InvalidModifier(modifier.to_string()));
    }

    if sides == 0 || sides > MAX_SIDES {
        return Err(DiceError::InvalidSides(sides_str.to_string()));
    }

    Ok(DiceRoll {
        count,
        sides,
        modifier,
    })
}

/// Parse a signed bonus such as "+3", "-1" or "2"
pub fn parse_modifier(bonus: &str) -> Option<i32> {
    let bonus = bonus.trim();
    if bonus.is_empty() {
        return None;
    }
    bonus.parse().ok()
}

/// Roll a single d20 (attack rolls, initiative)
pub fn roll_d20<D: DieRoller + ?Sized>(roller: &mut D) -> u32 {
    roller.roll_die(20)
}

/// Roll a single d6 (the deed die)
pub fn roll_d6<D: DieRoller + ?Sized>(roller: &mut D) -> u32 {
    roller.roll_die(6)
}

/// Roll a single d4 (the weapon fumble die)
pub fn roll_d4<D: DieRoller + ?Sized>(roller: &mut D) -> u32 {
    roller.roll_die(4)
}

/// Roll 3d6 (ability generation)
pub fn roll_3d6<D: DieRoller + ?Sized>(roller: &mut D) -> i32 {
    DiceRoll::new(3, 6, 0).roll(roller)
}

/// Check if a d20 roll is a natural 20 (critical hit)
pub fn is_critical(roll: u32) -> bool {
    roll == 20
}

/// Check if a d20 roll is a natural 1 (fumble)
pub fn is_fumble(roll: u32) -> bool {
    roll == 1
}
