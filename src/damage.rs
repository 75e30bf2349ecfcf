//! Damage types and modifiers
//!
//! Handles damage delivery with:
//! - Typed damage (slashing, fire, poison, etc.)
//! - Immunity (0% damage)
//! - Resistance (50% damage)
//! - Vulnerability (200% damage)
//!
//! Critical-hit multiplication happens in the action resolver before the
//! amount reaches a profile; a profile only filters by type.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Types of damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    /// Untyped physical damage (unarmed strikes, falling)
    Physical,
    /// Slashing damage (swords, claws)
    Slashing,
    /// Piercing damage (arrows, spears)
    Piercing,
    /// Bludgeoning damage (maces, hammers)
    Bludgeoning,
    /// Fire damage
    Fire,
    /// Cold damage
    Cold,
    /// Lightning damage
    Lightning,
    /// Poison damage
    Poison,
    /// Magical force damage
    Magic,
}

impl DamageType {
    /// Get all damage types
    pub fn all() -> &'static [DamageType] {
        &[
            DamageType::Physical,
            DamageType::Slashing,
            DamageType::Piercing,
            DamageType::Bludgeoning,
            DamageType::Fire,
            DamageType::Cold,
            DamageType::Lightning,
            DamageType::Poison,
            DamageType::Magic,
        ]
    }
}

impl FromStr for DamageType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "physical" => Ok(DamageType::Physical),
            "slashing" => Ok(DamageType::Slashing),
            "piercing" => Ok(DamageType::Piercing),
            "bludgeoning" => Ok(DamageType::Bludgeoning),
            "fire" => Ok(DamageType::Fire),
            "cold" | "ice" => Ok(DamageType::Cold),
            "lightning" | "electric" => Ok(DamageType::Lightning),
            "poison" => Ok(DamageType::Poison),
            "magic" | "force" => Ok(DamageType::Magic),
            _ => Err(()),
        }
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DamageType::Physical => "physical",
            DamageType::Slashing => "slashing",
            DamageType::Piercing => "piercing",
            DamageType::Bludgeoning => "bludgeoning",
            DamageType::Fire => "fire",
            DamageType::Cold => "cold",
            DamageType::Lightning => "lightning",
            DamageType::Poison => "poison",
            DamageType::Magic => "magic",
        };
        write!(f, "{}", s)
    }
}

/// Modifier for damage resistance/immunity/vulnerability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageModifier {
    /// Immune - takes 0% damage
    Immune,
    /// Resistant - takes 50% damage (rounded down)
    Resistant,
    /// Normal - takes 100% damage
    Normal,
    /// Vulnerable - takes 200% damage
    Vulnerable,
}

impl DamageModifier {
    /// Apply this modifier to a damage amount
    pub fn apply(&self, damage: i32) -> i32 {
        match self {
            DamageModifier::Immune => 0,
            DamageModifier::Resistant => damage / 2,
            DamageModifier::Normal => damage,
            DamageModifier::Vulnerable => damage * 2,
        }
    }

    /// Get the multiplier as a percentage
    pub fn percentage(&self) -> u32 {
        match self {
            DamageModifier::Immune => 0,
            DamageModifier::Resistant => 50,
            DamageModifier::Normal => 100,
            DamageModifier::Vulnerable => 200,
        }
    }
}

/// Result of delivering damage to a combatant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageResult {
    /// Damage before the target's profile (critical doubling included)
    pub base_damage: i32,
    /// Damage actually subtracted from hit points
    pub final_damage: i32,
    /// Type of damage dealt
    pub damage_type: DamageType,
    /// Profile modifier that was applied
    pub modifier: DamageModifier,
    /// Whether the delivering blow was a critical hit
    pub critical: bool,
}

/// Damage profile for a combatant (their resistances/immunities)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageProfile {
    modifiers: HashMap<DamageType, DamageModifier>,
}

impl DamageProfile {
    /// Create a new empty damage profile (all normal)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a damage modifier for a type
    pub fn set(&mut self, dtype: DamageType, modifier: DamageModifier) {
        if modifier == DamageModifier::Normal {
            self.modifiers.remove(&dtype);
        } else {
            self.modifiers.insert(dtype, modifier);
        }
    }

    /// Get the modifier for a damage type
    pub fn get(&self, dtype: DamageType) -> DamageModifier {
        self.modifiers
            .get(&dtype)
            .copied()
            .unwrap_or(DamageModifier::Normal)
    }

    /// Add an immunity
    pub fn add_immunity(&mut self, dtype: DamageType) {
        self.set(dtype, DamageModifier::Immune);
    }

    /// Add a resistance
    pub fn add_resistance(&mut self, dtype: DamageType) {
        self.set(dtype, DamageModifier::Resistant);
    }

    /// Add a vulnerability
    pub fn add_vulnerability(&mut self, dtype: DamageType) {
        self.set(dtype, DamageModifier::Vulnerable);
    }

    /// Filter an incoming amount through the profile
    pub fn resolve(&self, amount: i32, dtype: DamageType, critical: bool) -> DamageResult {
        let modifier = self.get(dtype);
        DamageResult {
            base_damage: amount,
            final_damage: modifier.apply(amount),
            damage_type: dtype,
            modifier,
            critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_modifier_apply() {
        assert_eq!(DamageModifier::Immune.apply(10), 0);
        assert_eq!(DamageModifier::Resistant.apply(10), 5);
        assert_eq!(DamageModifier::Normal.apply(10), 10);
        assert_eq!(DamageModifier::Vulnerable.apply(10), 20);
    }

    #[test]
    fn test_damage_profile() {
        let mut profile = DamageProfile::new();

        assert_eq!(profile.get(DamageType::Fire), DamageModifier::Normal);

        profile.add_immunity(DamageType::Fire);
        assert_eq!(profile.get(DamageType::Fire), DamageModifier::Immune);

        profile.add_resistance(DamageType::Cold);
        assert_eq!(profile.get(DamageType::Cold), DamageModifier::Resistant);

        profile.add_vulnerability(DamageType::Poison);
        assert_eq!(profile.get(DamageType::Poison), DamageModifier::Vulnerable);

        // back to normal drops the entry
        profile.set(DamageType::Fire, DamageModifier::Normal);
        assert_eq!(profile.get(DamageType::Fire), DamageModifier::Normal);
    }

    #[test]
    fn test_resolve() {
        let mut profile = DamageProfile::new();
        profile.add_immunity(DamageType::Fire);
        profile.add_resistance(DamageType::Cold);
        profile.add_vulnerability(DamageType::Lightning);

        assert_eq!(profile.resolve(10, DamageType::Fire, false).final_damage, 0);
        assert_eq!(profile.resolve(10, DamageType::Cold, false).final_damage, 5);
        assert_eq!(
            profile.resolve(10, DamageType::Slashing, false).final_damage,
            10
        );
        assert_eq!(
            profile
                .resolve(10, DamageType::Lightning, false)
                .final_damage,
            20
        );
    }

    #[test]
    fn test_damage_type_parsing() {
        assert_eq!("fire".parse::<DamageType>(), Ok(DamageType::Fire));
        assert_eq!("FIRE".parse::<DamageType>(), Ok(DamageType::Fire));
        assert_eq!("ice".parse::<DamageType>(), Ok(DamageType::Cold));
        assert!("invalid".parse::<DamageType>().is_err());
    }
}
