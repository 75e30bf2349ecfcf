//! Combatant state
//!
//! Per-participant record: ability scores, class profile, hit points,
//! armor class, resource pools, and the active effect set. Hit points,
//! status, and resources are private; mutation funnels through the effect
//! engine and the action resolver so the encounter has a single writer.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::damage::{DamageProfile, DamageResult, DamageType};
use crate::dice::Roller;
use crate::effects::{
    ActiveEffects, AppliedModifier, Attribute, Condition, ConditionKind, Modifier, ModifierId,
    Periodic,
};
use crate::error::CombatError;
use crate::events::CombatEvent;

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Intelligence,
    Wisdom,
    Dexterity,
    Constitution,
    Charisma,
}

impl Ability {
    /// Get all abilities
    pub fn all() -> &'static [Ability] {
        &[
            Ability::Strength,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Ability::Strength => "strength",
            Ability::Intelligence => "intelligence",
            Ability::Wisdom => "wisdom",
            Ability::Dexterity => "dexterity",
            Ability::Constitution => "constitution",
            Ability::Charisma => "charisma",
        };
        write!(f, "{}", s)
    }
}

/// Ability modifier: (score - 10) / 2, floored.
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// A full set of base ability scores (canonically 3-18 each).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub charisma: i32,
}

impl AbilityScores {
    pub fn new(
        strength: i32,
        intelligence: i32,
        wisdom: i32,
        dexterity: i32,
        constitution: i32,
        charisma: i32,
    ) -> Self {
        Self {
            strength,
            intelligence,
            wisdom,
            dexterity,
            constitution,
            charisma,
        }
    }

    /// All six scores set to the same value (handy for tests and mooks)
    pub fn uniform(score: i32) -> Self {
        Self::new(score, score, score, score, score, score)
    }

    /// Roll a full set with 3d6 per score
    pub fn roll_3d6(roller: &mut dyn Roller) -> Result<Self, CombatError> {
        let mut scores = [0i32; 6];
        for score in &mut scores {
            *score = roller.roll_3d6()? as i32;
        }
        Ok(Self::new(
            scores[0], scores[1], scores[2], scores[3], scores[4], scores[5],
        ))
    }

    /// Roll a full set with 4d6-drop-lowest per score
    pub fn roll_4d6_drop_lowest(roller: &mut dyn Roller) -> Result<Self, CombatError> {
        let mut scores = [0i32; 6];
        for score in &mut scores {
            *score = roller.roll_4d6_drop_lowest()? as i32;
        }
        Ok(Self::new(
            scores[0], scores[1], scores[2], scores[3], scores[4], scores[5],
        ))
    }

    /// Get a score by ability
    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Charisma => self.charisma,
        }
    }
}

/// Character alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    Lawful,
    #[default]
    Neutral,
    Chaotic,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Alignment::Lawful => "lawful",
            Alignment::Neutral => "neutral",
            Alignment::Chaotic => "chaotic",
        };
        write!(f, "{}", s)
    }
}

/// Broad weapon groupings used for proficiency checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponCategory {
    /// Daggers, staves, clubs, slings
    Simple,
    /// Swords, axes, bows, polearms
    Martial,
}

/// Character class kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKind {
    Fighter,
    Cleric,
    MagicUser,
    Thief,
    Monster,
}

impl ClassKind {
    /// Whether this class casts spells
    pub fn is_caster(&self) -> bool {
        matches!(self, ClassKind::Cleric | ClassKind::MagicUser)
    }

    /// Whether this class is proficient with a weapon category
    pub fn proficient_with(&self, category: WeaponCategory) -> bool {
        match self {
            ClassKind::Fighter | ClassKind::Thief | ClassKind::Monster => true,
            ClassKind::Cleric | ClassKind::MagicUser => category == WeaponCategory::Simple,
        }
    }
}

/// Class-derived combat attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassProfile {
    pub kind: ClassKind,
    /// Hit die sides (d6, d8, ...)
    pub hit_die: u32,
    pub base_attack_bonus: i32,
    /// Target number a d20 saving throw must meet or beat
    pub saving_throw: i32,
    /// Attacks resolved per Attack action
    pub attacks_per_round: u32,
}

impl ClassProfile {
    pub fn new(kind: ClassKind, hit_die: u32, base_attack_bonus: i32, saving_throw: i32) -> Self {
        Self {
            kind,
            hit_die,
            base_attack_bonus,
            saving_throw,
            attacks_per_round: 1,
        }
    }

    /// Declare multiple attacks per round
    pub fn with_attacks_per_round(mut self, attacks: u32) -> Self {
        self.attacks_per_round = attacks;
        self
    }
}

/// Spell slots remaining, indexed by spell level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellSlots {
    slots: Vec<u32>,
}

impl SpellSlots {
    /// Slots per spell level, starting at level 1
    pub fn new(per_level: &[u32]) -> Self {
        Self {
            slots: per_level.to_vec(),
        }
    }

    /// Remaining slots at a level
    pub fn remaining(&self, level: u32) -> u32 {
        if level == 0 {
            return 0;
        }
        self.slots.get(level as usize - 1).copied().unwrap_or(0)
    }

    /// Consume one slot at a level
    pub fn consume(&mut self, level: u32) -> Result<(), CombatError> {
        if level == 0 {
            return Err(CombatError::InsufficientResource(
                "spell level must be at least 1".to_string(),
            ));
        }
        match self.slots.get_mut(level as usize - 1) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Ok(())
            }
            _ => Err(CombatError::InsufficientResource(format!(
                "no level {} spell slot remaining",
                level
            ))),
        }
    }

    /// Restore one slot at a level
    pub fn restore(&mut self, level: u32) {
        if level == 0 {
            return;
        }
        let index = level as usize - 1;
        if self.slots.len() <= index {
            self.slots.resize(index + 1, 0);
        }
        self.slots[index] += 1;
    }
}

/// Stable identity for a combatant across an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantId(Uuid);

impl CombatantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CombatantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal participation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatantStatus {
    /// Still fighting
    Active,
    /// Hit points reached zero; excluded from future turns
    Defeated,
    /// Left the encounter
    Fled,
}

/// A participant in a combat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    /// Faction label; an encounter needs at least two distinct sides
    pub side: String,
    pub alignment: Alignment,
    pub abilities: AbilityScores,
    pub class: ClassProfile,
    pub damage_profile: DamageProfile,
    hit_points: i32,
    max_hit_points: i32,
    base_armor_class: i32,
    spell_slots: SpellSlots,
    effects: ActiveEffects,
    status: CombatantStatus,
    surprised: bool,
}

impl Combatant {
    /// Create a combatant with starting hit points of one hit die plus the
    /// Constitution modifier (minimum 1) and armor class 10.
    pub fn new(name: &str, side: &str, class: ClassProfile, abilities: AbilityScores) -> Self {
        let max_hit_points =
            (class.hit_die as i32 + ability_modifier(abilities.constitution)).max(1);
        Self {
            id: CombatantId::new(),
            name: name.to_string(),
            side: side.to_string(),
            alignment: Alignment::Neutral,
            abilities,
            class,
            damage_profile: DamageProfile::new(),
            hit_points: max_hit_points,
            max_hit_points,
            base_armor_class: 10,
            spell_slots: SpellSlots::default(),
            effects: ActiveEffects::new(),
            status: CombatantStatus::Active,
            surprised: false,
        }
    }

    /// Override maximum (and current) hit points
    pub fn with_hit_points(mut self, max_hit_points: i32) -> Self {
        self.max_hit_points = max_hit_points.max(1);
        self.hit_points = self.max_hit_points;
        self
    }

    /// Override base armor class (armor and shield included)
    pub fn with_armor_class(mut self, armor_class: i32) -> Self {
        self.base_armor_class = armor_class;
        self
    }

    /// Set the alignment
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Grant spell slots per level, starting at level 1
    pub fn with_spell_slots(mut self, per_level: &[u32]) -> Self {
        self.spell_slots = SpellSlots::new(per_level);
        self
    }

    /// Set the typed-damage profile
    pub fn with_damage_profile(mut self, profile: DamageProfile) -> Self {
        self.damage_profile = profile;
        self
    }

    // ---- read-only state ----

    pub fn hit_points(&self) -> i32 {
        self.hit_points
    }

    pub fn max_hit_points(&self) -> i32 {
        self.max_hit_points
    }

    pub fn base_armor_class(&self) -> i32 {
        self.base_armor_class
    }

    pub fn status(&self) -> CombatantStatus {
        self.status
    }

    /// Still a combat-capable participant
    pub fn is_active(&self) -> bool {
        self.status == CombatantStatus::Active
    }

    pub fn surprised(&self) -> bool {
        self.surprised
    }

    pub fn spell_slots(&self) -> &SpellSlots {
        &self.spell_slots
    }

    /// Applied modifiers, in application order
    pub fn modifiers(&self) -> &[AppliedModifier] {
        self.effects.modifiers()
    }

    /// Active conditions
    pub fn conditions(&self) -> &[Condition] {
        self.effects.conditions()
    }

    pub fn has_condition(&self, kind: ConditionKind) -> bool {
        self.effects.has_condition(kind)
    }

    /// Whether the combatant may take an action this turn
    pub fn can_act(&self) -> bool {
        self.effects.can_act()
    }

    /// Whether the combatant may cast spells
    pub fn can_cast(&self) -> bool {
        self.effects.can_cast()
    }

    /// The condition preventing action, if any
    pub fn incapacity(&self) -> Option<ConditionKind> {
        self.effects.incapacity()
    }

    // ---- effective (derived) values ----
    //
    // All pure and recomputed on every call: base value plus the sum of
    // active modifiers whose predicate holds against current state.

    pub fn effective_ability(&self, ability: Ability) -> i32 {
        self.abilities.get(ability)
            + self
                .effects
                .sum_for(Attribute::Ability(ability), self.hit_points)
    }

    pub fn effective_ability_modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.effective_ability(ability))
    }

    pub fn effective_armor_class(&self) -> i32 {
        self.base_armor_class + self.effects.sum_for(Attribute::ArmorClass, self.hit_points)
    }

    pub fn effective_attack_bonus(&self) -> i32 {
        self.class.base_attack_bonus + self.effects.sum_for(Attribute::AttackBonus, self.hit_points)
    }

    /// Dexterity modifier plus initiative modifiers
    pub fn effective_initiative_bonus(&self) -> i32 {
        self.effective_ability_modifier(Ability::Dexterity)
            + self.effects.sum_for(Attribute::Initiative, self.hit_points)
    }

    /// Saving-throw target number; positive modifiers make the save easier
    pub fn effective_saving_throw(&self) -> i32 {
        self.class.saving_throw - self.effects.sum_for(Attribute::SavingThrow, self.hit_points)
    }

    pub fn effective_max_hit_points(&self) -> i32 {
        (self.max_hit_points + self.effects.sum_for(Attribute::MaxHitPoints, self.hit_points))
            .max(1)
    }

    /// Generic effective-value lookup over any attribute or derived stat.
    pub fn effective_value(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Ability(ability) => self.effective_ability(ability),
            Attribute::ArmorClass => self.effective_armor_class(),
            Attribute::AttackBonus => self.effective_attack_bonus(),
            Attribute::Initiative => self.effective_initiative_bonus(),
            Attribute::SavingThrow => self.effective_saving_throw(),
            Attribute::MaxHitPoints => self.effective_max_hit_points(),
        }
    }

    // ---- effect engine operations ----

    /// Apply a modifier; fails with `InvalidModifier` on zero duration.
    pub fn apply_modifier(&mut self, modifier: Modifier) -> Result<ModifierId, CombatError> {
        self.effects.apply_modifier(modifier)
    }

    /// Remove a modifier by identity; no-op if not present.
    pub fn remove_modifier(&mut self, id: ModifierId) -> Option<Modifier> {
        self.effects.remove_modifier(id)
    }

    /// Apply a condition (idempotent by kind, refreshing duration).
    pub fn apply_condition(&mut self, condition: Condition) {
        self.effects.apply_condition(condition);
    }

    /// Remove a condition by kind with its linked modifiers.
    pub fn remove_condition(&mut self, kind: ConditionKind) -> bool {
        self.effects.remove_condition(kind)
    }

    /// Advance this combatant's effects by one round.
    ///
    /// Fixed order: periodic condition effects deliver first (an expiring
    /// condition still gets its final tick), then condition durations
    /// decrement and expire, then timed modifiers decrement and expire,
    /// then hit points are clamped to the effective maximum.
    pub fn tick_round(&mut self) -> Vec<CombatEvent> {
        let mut events = Vec::new();

        for (kind, periodic) in self.effects.periodic_effects() {
            match periodic {
                Periodic::Damage(amount, damage_type) => {
                    let was_active = self.is_active();
                    let damage = self.take_damage(amount, damage_type, false);
                    events.push(CombatEvent::ConditionDamage {
                        combatant: self.id,
                        kind,
                        damage,
                    });
                    if was_active && !self.is_active() {
                        events.push(CombatEvent::Defeated { combatant: self.id });
                    }
                }
                Periodic::Healing(amount) => {
                    let healed = self.heal(amount);
                    if healed > 0 {
                        events.push(CombatEvent::Healed {
                            target: self.id,
                            amount: healed,
                        });
                    }
                }
            }
        }

        for kind in self.effects.decrement_conditions() {
            events.push(CombatEvent::ConditionExpired {
                combatant: self.id,
                kind,
            });
        }

        for modifier in self.effects.decrement_modifiers() {
            events.push(CombatEvent::ModifierExpired {
                combatant: self.id,
                name: modifier.name,
            });
        }

        // a lapsed max-hp modifier must not leave hp above the cap
        let cap = self.effective_max_hit_points();
        if self.hit_points > cap {
            self.hit_points = cap;
        }

        events
    }

    // ---- resolver-only mutation ----

    /// Deliver typed damage through the damage profile. Hit points at or
    /// below zero set the Defeated status.
    pub(crate) fn take_damage(
        &mut self,
        amount: i32,
        damage_type: DamageType,
        critical: bool,
    ) -> DamageResult {
        let result = self.damage_profile.resolve(amount, damage_type, critical);
        self.hit_points -= result.final_damage;
        if self.hit_points <= 0 && self.status == CombatantStatus::Active {
            self.status = CombatantStatus::Defeated;
            debug!(name = %self.name, "combatant defeated");
        }
        result
    }

    /// Heal up to the effective maximum; returns the amount restored.
    pub(crate) fn heal(&mut self, amount: i32) -> i32 {
        let headroom = (self.effective_max_hit_points() - self.hit_points).max(0);
        let actual = amount.max(0).min(headroom);
        self.hit_points += actual;
        actual
    }

    pub(crate) fn consume_spell_slot(&mut self, level: u32) -> Result<(), CombatError> {
        self.spell_slots.consume(level)
    }

    pub(crate) fn flee(&mut self) {
        self.status = CombatantStatus::Fled;
    }

    pub(crate) fn set_surprised(&mut self) {
        self.surprised = true;
    }

    pub(crate) fn clear_surprise(&mut self) {
        self.surprised = false;
    }

    /// Read-only snapshot of current and derived stats.
    pub fn snapshot(&self) -> CombatantSnapshot {
        CombatantSnapshot {
            id: self.id,
            name: self.name.clone(),
            side: self.side.clone(),
            status: self.status,
            hit_points: self.hit_points,
            max_hit_points: self.effective_max_hit_points(),
            armor_class: self.effective_armor_class(),
            attack_bonus: self.effective_attack_bonus(),
            saving_throw: self.effective_saving_throw(),
            initiative_bonus: self.effective_initiative_bonus(),
            modifiers: self
                .effects
                .modifiers()
                .iter()
                .map(|am| am.modifier.name.clone())
                .collect(),
            conditions: self.effects.conditions().iter().map(|c| c.kind).collect(),
        }
    }
}

/// Point-in-time view of a combatant's derived stats, for UI/journal use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub id: CombatantId,
    pub name: String,
    pub side: String,
    pub status: CombatantStatus,
    pub hit_points: i32,
    pub max_hit_points: i32,
    pub armor_class: i32,
    pub attack_bonus: i32,
    pub saving_throw: i32,
    pub initiative_bonus: i32,
    pub modifiers: Vec<String>,
    pub conditions: Vec<ConditionKind>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::ModifierScope;

    fn fighter() -> Combatant {
        Combatant::new(
            "Brynn",
            "heroes",
            ClassProfile::new(ClassKind::Fighter, 8, 2, 14),
            AbilityScores::new(13, 9, 10, 12, 14, 8),
        )
    }

    #[test]
    fn test_ability_modifier_table() {
        assert_eq!(ability_modifier(3), -4);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(12), 1);
        assert_eq!(ability_modifier(18), 4);
    }

    #[test]
    fn test_starting_hit_points() {
        let c = fighter();
        // d8 hit die + con modifier (+2)
        assert_eq!(c.max_hit_points(), 10);
        assert_eq!(c.hit_points(), 10);
    }

    #[test]
    fn test_effective_values_recompute() {
        let mut c = fighter();
        assert_eq!(c.effective_ability(Ability::Strength), 13);

        let id = c
            .apply_modifier(Modifier::new(
                "giant strength",
                4,
                ModifierScope::Single(Attribute::Ability(Ability::Strength)),
            ))
            .unwrap();
        assert_eq!(c.effective_ability(Ability::Strength), 17);
        assert_eq!(c.effective_ability_modifier(Ability::Strength), 3);
        assert_eq!(
            c.effective_value(Attribute::Ability(Ability::Strength)),
            c.effective_ability(Ability::Strength)
        );

        // repeated reads without mutation are identical
        assert_eq!(
            c.effective_ability(Ability::Strength),
            c.effective_ability(Ability::Strength)
        );

        c.remove_modifier(id);
        assert_eq!(c.effective_ability(Ability::Strength), 13);
    }

    #[test]
    fn test_take_damage_and_defeat() {
        let mut c = fighter();
        c.take_damage(4, DamageType::Slashing, false);
        assert_eq!(c.hit_points(), 6);
        assert!(c.is_active());

        c.take_damage(10, DamageType::Slashing, false);
        assert!(c.hit_points() <= 0);
        assert_eq!(c.status(), CombatantStatus::Defeated);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut c = fighter();
        c.take_damage(5, DamageType::Slashing, false);
        assert_eq!(c.heal(3), 3);
        assert_eq!(c.heal(50), 2);
        assert_eq!(c.hit_points(), c.max_hit_points());
    }

    #[test]
    fn test_damage_profile_filters() {
        let mut c = fighter();
        c.damage_profile.add_resistance(DamageType::Fire);
        let result = c.take_damage(10, DamageType::Fire, false);
        assert_eq!(result.final_damage, 5);
        assert_eq!(c.hit_points(), 5);
    }

    #[test]
    fn test_poison_tick_final_round() {
        let mut c = fighter();
        c.apply_condition(Condition::new(ConditionKind::Poisoned, 1, 3));

        // the expiring round still delivers its damage
        let events = c.tick_round();
        assert_eq!(c.hit_points(), 7);
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::ConditionDamage { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::ConditionExpired { .. })));
        assert!(!c.has_condition(ConditionKind::Poisoned));

        // nothing left to tick
        assert!(c.tick_round().is_empty());
        assert_eq!(c.hit_points(), 7);
    }

    #[test]
    fn test_poison_can_defeat() {
        let mut c = fighter().with_hit_points(2);
        c.apply_condition(Condition::new(ConditionKind::Poisoned, 3, 5));
        let events = c.tick_round();
        assert_eq!(c.status(), CombatantStatus::Defeated);
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::Defeated { .. })));
    }

    #[test]
    fn test_regeneration_heals_on_tick() {
        let mut c = fighter();
        c.take_damage(6, DamageType::Slashing, false);
        c.apply_condition(Condition::new(ConditionKind::Regenerating, 2, 2));

        let events = c.tick_round();
        assert_eq!(c.hit_points(), 6);
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::Healed { amount: 2, .. })));
    }

    #[test]
    fn test_modifier_duration_through_ticks() {
        let mut c = fighter();
        c.apply_modifier(
            Modifier::new("shield", 2, ModifierScope::Single(Attribute::ArmorClass))
                .with_duration(2),
        )
        .unwrap();
        assert_eq!(c.effective_armor_class(), 12);

        c.tick_round();
        assert_eq!(c.effective_armor_class(), 12);

        let events = c.tick_round();
        assert_eq!(c.effective_armor_class(), 10);
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::ModifierExpired { .. })));
    }

    #[test]
    fn test_max_hp_modifier_lapse_clamps_current() {
        let mut c = fighter();
        c.apply_modifier(
            Modifier::new(
                "heroism",
                5,
                ModifierScope::Single(Attribute::MaxHitPoints),
            )
            .with_duration(1),
        )
        .unwrap();
        assert_eq!(c.effective_max_hit_points(), 15);
        c.heal(5);
        assert_eq!(c.hit_points(), 15);

        c.tick_round();
        assert_eq!(c.effective_max_hit_points(), 10);
        assert_eq!(c.hit_points(), 10);
    }

    #[test]
    fn test_spell_slots() {
        let mut c = fighter().with_spell_slots(&[2, 1]);
        assert_eq!(c.spell_slots().remaining(1), 2);
        assert!(c.consume_spell_slot(1).is_ok());
        assert!(c.consume_spell_slot(1).is_ok());
        assert!(matches!(
            c.consume_spell_slot(1),
            Err(CombatError::InsufficientResource(_))
        ));
        assert!(matches!(
            c.consume_spell_slot(3),
            Err(CombatError::InsufficientResource(_))
        ));
        c.spell_slots.restore(1);
        assert_eq!(c.spell_slots().remaining(1), 1);
    }

    #[test]
    fn test_snapshot_reports_derived_stats() {
        let mut c = fighter().with_armor_class(14);
        c.apply_condition(Condition::new(ConditionKind::Blessed, 3, 1));

        let snapshot = c.snapshot();
        assert_eq!(snapshot.armor_class, 14);
        assert_eq!(snapshot.attack_bonus, 3);
        assert_eq!(snapshot.conditions, vec![ConditionKind::Blessed]);
        assert!(snapshot.modifiers.iter().any(|m| m == "blessed"));
    }

    #[test]
    fn test_ability_scores_rolled_in_range() {
        let mut roller = crate::dice::RandomRoller::seeded(11);
        let scores = AbilityScores::roll_4d6_drop_lowest(&mut roller).unwrap();
        for ability in Ability::all() {
            let score = scores.get(*ability);
            assert!((3..=18).contains(&score));
        }
    }
}
