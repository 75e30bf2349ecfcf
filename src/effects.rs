//! Modifiers and conditions
//!
//! Manages layered temporary effects on combatants:
//! - Modifiers: numeric adjustments to one attribute or a category,
//!   additively stacked, optionally timed and predicate-gated
//! - Conditions: named statuses with fixed semantics (paralysis prevents
//!   acting, poison ticks damage), idempotent by kind
//! - Per-round decay and expiry

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combatant::{Ability, CombatantId};
use crate::damage::DamageType;
use crate::error::CombatError;

/// Attributes and derived stats a modifier can adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attribute {
    Ability(Ability),
    ArmorClass,
    AttackBonus,
    Initiative,
    SavingThrow,
    MaxHitPoints,
}

/// What a modifier applies to: one attribute, or a whole category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierScope {
    /// A single attribute or derived stat
    Single(Attribute),
    /// All six ability scores at once
    AllAbilities,
}

impl ModifierScope {
    /// Whether this scope covers the given attribute.
    pub fn covers(&self, attribute: Attribute) -> bool {
        match self {
            ModifierScope::Single(a) => *a == attribute,
            ModifierScope::AllAbilities => matches!(attribute, Attribute::Ability(_)),
        }
    }
}

/// Gate deciding whether a modifier currently counts.
///
/// Evaluated against the owning combatant's state on every read; stacking
/// is always additive, and the predicate alone governs whether an
/// individual modifier participates in the sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// Active while hit points are strictly below the threshold
    HitPointsBelow(i32),
    /// Active while hit points are at or above the threshold
    HitPointsAtLeast(i32),
    /// Active while the named condition is present
    HasCondition(ConditionKind),
    /// Active while the named condition is absent
    LacksCondition(ConditionKind),
}

impl Predicate {
    fn holds(&self, hit_points: i32, effects: &ActiveEffects) -> bool {
        match self {
            Predicate::HitPointsBelow(threshold) => hit_points < *threshold,
            Predicate::HitPointsAtLeast(threshold) => hit_points >= *threshold,
            Predicate::HasCondition(kind) => effects.has_condition(*kind),
            Predicate::LacksCondition(kind) => !effects.has_condition(*kind),
        }
    }
}

/// Who or what put an effect on a combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectSource {
    Combatant(CombatantId),
    Spell(String),
    Item(String),
    Condition(ConditionKind),
    Action,
    Innate,
}

/// Identity handle for an applied modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModifierId(u64);

/// A numeric adjustment to one attribute or category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    /// Display name ("blessed", "defending", ...)
    pub name: String,
    /// Signed adjustment; multiple modifiers on one attribute sum
    pub value: i32,
    pub scope: ModifierScope,
    /// Remaining duration in rounds; None = until explicitly removed
    pub duration: Option<u32>,
    /// Optional activation gate evaluated against the owning combatant
    pub predicate: Option<Predicate>,
    pub source: EffectSource,
}

impl Modifier {
    /// Create a permanent, unconditional modifier
    pub fn new(name: &str, value: i32, scope: ModifierScope) -> Self {
        Self {
            name: name.to_string(),
            value,
            scope,
            duration: None,
            predicate: None,
            source: EffectSource::Innate,
        }
    }

    /// Limit the modifier to a number of rounds
    pub fn with_duration(mut self, rounds: u32) -> Self {
        self.duration = Some(rounds);
        self
    }

    /// Gate the modifier behind a predicate
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Set the source of this modifier
    pub fn with_source(mut self, source: EffectSource) -> Self {
        self.source = source;
        self
    }
}

/// Condition kinds and their fixed semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    /// Takes poison damage each round
    Poisoned,
    /// Takes fire damage each round
    Burning,
    /// Cannot act at all
    Paralyzed,
    /// Cannot act at all
    Stunned,
    /// Cannot cast spells
    Silenced,
    /// Favored: bonus to attack and saving throws
    Blessed,
    /// Disfavored: penalty to attack and saving throws
    Cursed,
    /// Acts earlier: initiative bonus
    Hasted,
    /// Acts later: initiative penalty
    Slowed,
    /// Strength penalty
    Weakened,
    /// Heals each round
    Regenerating,
}

impl ConditionKind {
    /// Whether this condition prevents taking any action
    pub fn prevents_action(&self) -> bool {
        matches!(self, ConditionKind::Paralyzed | ConditionKind::Stunned)
    }

    /// Whether this condition prevents spellcasting
    pub fn prevents_casting(&self) -> bool {
        matches!(
            self,
            ConditionKind::Paralyzed | ConditionKind::Stunned | ConditionKind::Silenced
        )
    }

    /// Whether this condition is negative (a debuff)
    pub fn is_debuff(&self) -> bool {
        matches!(
            self,
            ConditionKind::Poisoned
                | ConditionKind::Burning
                | ConditionKind::Paralyzed
                | ConditionKind::Stunned
                | ConditionKind::Silenced
                | ConditionKind::Cursed
                | ConditionKind::Slowed
                | ConditionKind::Weakened
        )
    }

    /// Per-round effect delivered on each tick, if any.
    pub(crate) fn periodic(&self, magnitude: i32) -> Option<Periodic> {
        match self {
            ConditionKind::Poisoned => Some(Periodic::Damage(magnitude, DamageType::Poison)),
            ConditionKind::Burning => Some(Periodic::Damage(magnitude, DamageType::Fire)),
            ConditionKind::Regenerating => Some(Periodic::Healing(magnitude)),
            _ => None,
        }
    }

    /// Stat modifiers the condition carries while active.
    ///
    /// `magnitude` is always positive; the kind supplies the sign.
    fn linked_modifiers(&self, magnitude: i32) -> Vec<Modifier> {
        let source = EffectSource::Condition(*self);
        match self {
            ConditionKind::Blessed => vec![
                Modifier::new("blessed", magnitude, ModifierScope::Single(Attribute::AttackBonus))
                    .with_source(source.clone()),
                Modifier::new("blessed", magnitude, ModifierScope::Single(Attribute::SavingThrow))
                    .with_source(source),
            ],
            ConditionKind::Cursed => vec![
                Modifier::new("cursed", -magnitude, ModifierScope::Single(Attribute::AttackBonus))
                    .with_source(source.clone()),
                Modifier::new("cursed", -magnitude, ModifierScope::Single(Attribute::SavingThrow))
                    .with_source(source),
            ],
            ConditionKind::Hasted => vec![Modifier::new(
                "hasted",
                magnitude,
                ModifierScope::Single(Attribute::Initiative),
            )
            .with_source(source)],
            ConditionKind::Slowed => vec![Modifier::new(
                "slowed",
                -magnitude,
                ModifierScope::Single(Attribute::Initiative),
            )
            .with_source(source)],
            ConditionKind::Weakened => vec![Modifier::new(
                "weakened",
                -magnitude,
                ModifierScope::Single(Attribute::Ability(Ability::Strength)),
            )
            .with_source(source)],
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConditionKind::Poisoned => "poisoned",
            ConditionKind::Burning => "burning",
            ConditionKind::Paralyzed => "paralyzed",
            ConditionKind::Stunned => "stunned",
            ConditionKind::Silenced => "silenced",
            ConditionKind::Blessed => "blessed",
            ConditionKind::Cursed => "cursed",
            ConditionKind::Hasted => "hasted",
            ConditionKind::Slowed => "slowed",
            ConditionKind::Weakened => "weakened",
            ConditionKind::Regenerating => "regenerating",
        };
        write!(f, "{}", s)
    }
}

/// How long a condition lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionDuration {
    /// Remaining rounds; decrements each tick, removed at zero
    Rounds(u32),
    /// Never decrements
    Permanent,
}

impl ConditionDuration {
    /// The longer of two durations (Permanent beats any round count)
    pub fn longer_of(self, other: ConditionDuration) -> ConditionDuration {
        match (self, other) {
            (ConditionDuration::Permanent, _) | (_, ConditionDuration::Permanent) => {
                ConditionDuration::Permanent
            }
            (ConditionDuration::Rounds(a), ConditionDuration::Rounds(b)) => {
                ConditionDuration::Rounds(a.max(b))
            }
        }
    }
}

/// A condition instance on a combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: ConditionKind,
    pub duration: ConditionDuration,
    /// Per-round amount for periodic kinds, stat delta for linked kinds;
    /// always positive, the kind supplies the sign
    pub magnitude: i32,
    pub source: EffectSource,
}

impl Condition {
    /// Create a condition lasting a number of rounds
    pub fn new(kind: ConditionKind, rounds: u32, magnitude: i32) -> Self {
        Self {
            kind,
            duration: ConditionDuration::Rounds(rounds),
            magnitude,
            source: EffectSource::Innate,
        }
    }

    /// Create a condition that lasts until removed
    pub fn permanent(kind: ConditionKind, magnitude: i32) -> Self {
        Self {
            kind,
            duration: ConditionDuration::Permanent,
            magnitude,
            source: EffectSource::Innate,
        }
    }

    /// Set the source of this condition
    pub fn with_source(mut self, source: EffectSource) -> Self {
        self.source = source;
        self
    }
}

/// A per-round effect produced by a condition tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Periodic {
    Damage(i32, DamageType),
    Healing(i32),
}

/// A modifier as applied to a combatant, with its identity handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedModifier {
    pub id: ModifierId,
    pub modifier: Modifier,
}

/// All effects currently on one combatant.
///
/// Modifiers keep application order; conditions are a set keyed by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffects {
    modifiers: Vec<AppliedModifier>,
    conditions: Vec<Condition>,
    next_modifier_id: u64,
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a modifier, returning its identity handle.
    ///
    /// Fails with `InvalidModifier` for a timed modifier of duration 0.
    pub fn apply_modifier(&mut self, modifier: Modifier) -> Result<ModifierId, CombatError> {
        if modifier.duration == Some(0) {
            return Err(CombatError::InvalidModifier(format!(
                "timed modifier '{}' must have a positive duration",
                modifier.name
            )));
        }
        debug!(name = %modifier.name, value = modifier.value, "modifier applied");
        Ok(self.push_modifier(modifier))
    }

    fn push_modifier(&mut self, modifier: Modifier) -> ModifierId {
        let id = ModifierId(self.next_modifier_id);
        self.next_modifier_id += 1;
        self.modifiers.push(AppliedModifier { id, modifier });
        id
    }

    /// Remove a modifier by identity; no-op if not present.
    pub fn remove_modifier(&mut self, id: ModifierId) -> Option<Modifier> {
        let pos = self.modifiers.iter().position(|am| am.id == id)?;
        Some(self.modifiers.remove(pos).modifier)
    }

    fn remove_modifiers_from(&mut self, source: &EffectSource) {
        self.modifiers.retain(|am| am.modifier.source != *source);
    }

    /// Apply a condition; idempotent by kind.
    ///
    /// Re-applying an active kind refreshes to the greater remaining
    /// duration and magnitude instead of stacking a duplicate.
    pub fn apply_condition(&mut self, condition: Condition) {
        if condition.duration == ConditionDuration::Rounds(0) {
            debug!(kind = %condition.kind, "ignoring condition with zero duration");
            return;
        }
        if let Some(pos) = self
            .conditions
            .iter()
            .position(|c| c.kind == condition.kind)
        {
            let kind = condition.kind;
            let magnitude = self.conditions[pos].magnitude.max(condition.magnitude);
            let grew = magnitude > self.conditions[pos].magnitude;
            self.conditions[pos].duration =
                self.conditions[pos].duration.longer_of(condition.duration);
            self.conditions[pos].magnitude = magnitude;
            if grew {
                // re-derive linked modifiers at the new magnitude
                self.remove_modifiers_from(&EffectSource::Condition(kind));
                self.attach_linked(kind, magnitude);
            }
            debug!(kind = %kind, "condition refreshed");
            return;
        }
        debug!(kind = %condition.kind, "condition applied");
        self.attach_linked(condition.kind, condition.magnitude);
        self.conditions.push(condition);
    }

    fn attach_linked(&mut self, kind: ConditionKind, magnitude: i32) {
        for modifier in kind.linked_modifiers(magnitude) {
            self.push_modifier(modifier);
        }
    }

    /// Remove a condition by kind, along with its linked modifiers.
    pub fn remove_condition(&mut self, kind: ConditionKind) -> bool {
        let before = self.conditions.len();
        self.conditions.retain(|c| c.kind != kind);
        let removed = self.conditions.len() != before;
        if removed {
            self.remove_modifiers_from(&EffectSource::Condition(kind));
        }
        removed
    }

    /// Check for an active condition
    pub fn has_condition(&self, kind: ConditionKind) -> bool {
        self.conditions.iter().any(|c| c.kind == kind)
    }

    /// Get a condition if present
    pub fn condition(&self, kind: ConditionKind) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.kind == kind)
    }

    /// Active conditions, in application order
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Applied modifiers, in application order
    pub fn modifiers(&self) -> &[AppliedModifier] {
        &self.modifiers
    }

    /// Whether the owner can take actions (not paralyzed/stunned)
    pub fn can_act(&self) -> bool {
        !self.conditions.iter().any(|c| c.kind.prevents_action())
    }

    /// Whether the owner can cast spells
    pub fn can_cast(&self) -> bool {
        !self.conditions.iter().any(|c| c.kind.prevents_casting())
    }

    /// The condition preventing the owner from acting, if any
    pub fn incapacity(&self) -> Option<ConditionKind> {
        self.conditions
            .iter()
            .find(|c| c.kind.prevents_action())
            .map(|c| c.kind)
    }

    /// Sum of active modifier values covering `attribute`.
    ///
    /// Pure: re-evaluates every predicate against the owner's current hit
    /// points and condition set on each call.
    pub fn sum_for(&self, attribute: Attribute, hit_points: i32) -> i32 {
        self.modifiers
            .iter()
            .filter(|am| am.modifier.scope.covers(attribute))
            .filter(|am| {
                am.modifier
                    .predicate
                    .map_or(true, |p| p.holds(hit_points, self))
            })
            .map(|am| am.modifier.value)
            .sum()
    }

    /// Periodic effects due this tick, in application order.
    pub(crate) fn periodic_effects(&self) -> Vec<(ConditionKind, Periodic)> {
        self.conditions
            .iter()
            .filter_map(|c| c.kind.periodic(c.magnitude).map(|p| (c.kind, p)))
            .collect()
    }

    /// Decrement timed conditions; remove and report those reaching zero.
    pub(crate) fn decrement_conditions(&mut self) -> Vec<ConditionKind> {
        let mut expired = Vec::new();
        for condition in &mut self.conditions {
            if let ConditionDuration::Rounds(ref mut remaining) = condition.duration {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    expired.push(condition.kind);
                }
            }
        }
        self.conditions
            .retain(|c| c.duration != ConditionDuration::Rounds(0));
        for kind in &expired {
            self.remove_modifiers_from(&EffectSource::Condition(*kind));
        }
        expired
    }

    /// Decrement timed modifiers; remove and report those reaching zero.
    pub(crate) fn decrement_modifiers(&mut self) -> Vec<Modifier> {
        for am in &mut self.modifiers {
            if let Some(ref mut remaining) = am.modifier.duration {
                *remaining = remaining.saturating_sub(1);
            }
        }
        let mut expired = Vec::new();
        for am in std::mem::take(&mut self.modifiers) {
            if am.modifier.duration == Some(0) {
                expired.push(am.modifier);
            } else {
                self.modifiers.push(am);
            }
        }
        expired
    }
}
