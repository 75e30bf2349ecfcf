//! Dice rolling system
//!
//! Parses dice notation like "2d6+3" and rolls it through an injectable
//! `Roller`, so every resolution can be replayed under a seeded or
//! scripted source.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::CombatError;

/// Source of uniformly distributed die outcomes.
///
/// Each returned value lies in `[1, sides]`, independently drawn. Swap in
/// a `SequenceRoller` to make a whole resolution deterministic.
pub trait Roller {
    /// Roll `count` dice with `sides` sides each.
    ///
    /// Fails with `InvalidParameter` unless `count >= 1` and `sides >= 2`.
    fn roll(&mut self, count: u32, sides: u32) -> Result<Vec<u32>, CombatError>;

    /// Roll a single d20.
    fn d20(&mut self) -> Result<u32, CombatError> {
        Ok(self.roll(1, 20)?[0])
    }

    /// Roll 3d6 and sum (classic ability-score generation).
    fn roll_3d6(&mut self) -> Result<u32, CombatError> {
        Ok(self.roll(3, 6)?.iter().sum())
    }

    /// Roll 4d6 and sum the highest three.
    ///
    /// Exactly one instance of the lowest value is dropped, even when
    /// several dice tie for lowest.
    fn roll_4d6_drop_lowest(&mut self) -> Result<u32, CombatError> {
        let mut dice = self.roll(4, 6)?;
        dice.sort_unstable();
        Ok(dice[1..].iter().sum())
    }
}

fn check_request(count: u32, sides: u32) -> Result<(), CombatError> {
    if count < 1 {
        return Err(CombatError::InvalidParameter(format!(
            "dice count must be at least 1, got {}",
            count
        )));
    }
    if sides < 2 {
        return Err(CombatError::InvalidParameter(format!(
            "die sides must be at least 2, got {}",
            sides
        )));
    }
    Ok(())
}

/// `rand`-backed roller.
#[derive(Debug)]
pub struct RandomRoller {
    rng: StdRng,
}

impl RandomRoller {
    /// Create a roller seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a roller with a fixed seed for reproducible encounters.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomRoller {
    fn default() -> Self {
        Self::new()
    }
}

impl Roller for RandomRoller {
    fn roll(&mut self, count: u32, sides: u32) -> Result<Vec<u32>, CombatError> {
        check_request(count, sides)?;
        Ok((0..count)
            .map(|_| self.rng.random_range(1..=sides))
            .collect())
    }
}

/// Fixed-sequence roller for tests.
///
/// Yields its script in order, cycling when exhausted. Values are clamped
/// into `[1, sides]` for the die being rolled.
#[derive(Debug, Clone)]
pub struct SequenceRoller {
    values: Vec<u32>,
    cursor: usize,
}

impl SequenceRoller {
    pub fn new(values: Vec<u32>) -> Self {
        // an empty script degenerates to all-ones
        let values = if values.is_empty() { vec![1] } else { values };
        Self { values, cursor: 0 }
    }

    fn next(&mut self, sides: u32) -> u32 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(1, sides)
    }
}

impl Roller for SequenceRoller {
    fn roll(&mut self, count: u32, sides: u32) -> Result<Vec<u32>, CombatError> {
        check_request(count, sides)?;
        Ok((0..count).map(|_| self.next(sides)).collect())
    }
}

/// A parsed dice roll specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    /// Number of dice to roll
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

    /// Roll the dice and return the total
    pub fn roll(&self, roller: &mut dyn Roller) -> Result<i32, CombatError> {
        let (_, total) = self.roll_detailed(roller)?;
        Ok(total)
    }

    /// Roll and return individual die results plus total
    pub fn roll_detailed(&self, roller: &mut dyn Roller) -> Result<(Vec<u32>, i32), CombatError> {
        let results = roller.roll(self.count, self.sides)?;
        let sum: u32 = results.iter().sum();
        let total = sum as i32 + self.modifier;
        Ok((results, total))
    }

    /// Get the minimum possible result
    pub fn min(&self) -> i32 {
        self.count as i32 + self.modifier
    }

    /// Get the maximum possible result
    pub fn max(&self) -> i32 {
        (self.count * self.sides) as i32 + self.modifier
    }

    /// Get the expected average (rounded down)
    pub fn average(&self) -> i32 {
        let avg_per_die = (1.0 + self.sides as f64) / 2.0;
        (self.count as f64 * avg_per_die + self.modifier as f64) as i32
    }
}

impl FromStr for DiceRoll {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice(s)
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}d{}{}", self.count, self.sides, self.modifier)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}

/// Parse a dice notation string like "2d6+3"
pub fn parse_dice(notation: &str) -> Result<DiceRoll, CombatError> {
    let notation = notation.trim().to_lowercase();

    let d_pos = notation
        .find('d')
        .ok_or_else(|| CombatError::InvalidParameter("missing 'd' in dice notation".to_string()))?;

    // Parse count (before 'd')
    let count_str = &notation[..d_pos];
    let count: u32 = if count_str.is_empty() {
        1 // "d6" means "1d6"
    } else {
        count_str.parse().map_err(|_| {
            CombatError::InvalidParameter(format!("invalid dice count: {}", count_str))
        })?
    };

    // Parse sides and modifier (after 'd')
    let rest = &notation[d_pos + 1..];

    let (sides_str, modifier) = if let Some(plus_pos) = rest.find('+') {
        let sides = &rest[..plus_pos];
        let mod_str = &rest[plus_pos + 1..];
        let modifier: i32 = mod_str.parse().map_err(|_| {
            CombatError::InvalidParameter(format!("invalid modifier: {}", mod_str))
        })?;
        (sides, modifier)
    } else if let Some(minus_pos) = rest.rfind('-') {
        // rfind so a leading minus is not mistaken for a modifier
        if minus_pos == 0 {
            (rest, 0)
        } else {
            let sides = &rest[..minus_pos];
            let mod_str = &rest[minus_pos..]; // includes the minus sign
            let modifier: i32 = mod_str.parse().map_err(|_| {
                CombatError::InvalidParameter(format!("invalid modifier: {}", mod_str))
            })?;
            (sides, modifier)
        }
    } else {
        (rest, 0)
    };

    let sides: u32 = sides_str.parse().map_err(|_| {
        CombatError::InvalidParameter(format!("invalid die sides: {}", sides_str))
    })?;

    check_request(count, sides)?;

    Ok(DiceRoll {
        count,
        sides,
        modifier,
    })
}

/// Check if a d20 roll is a natural 20 (critical hit)
pub fn is_critical(roll: u32) -> bool {
    roll == 20
}

/// Check if a d20 roll is a natural 1 (automatic miss)
pub fn is_fumble(roll: u32) -> bool {
    roll == 1
}
