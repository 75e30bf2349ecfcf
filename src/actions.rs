//! Action resolution
//!
//! A combatant's turn runs a fixed course: an action is chosen, resolves
//! to completion (all modifier/condition side effects included), and emits
//! outcome events. Actions are a closed set of tagged variants, so adding a
//! kind is a compile-time-checked, localized change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::combatant::{Ability, Combatant, CombatantId, WeaponCategory};
use crate::config::RulesConfig;
use crate::damage::DamageType;
use crate::dice::{is_critical, is_fumble, DiceRoll, Roller};
use crate::effects::{
    Attribute, Condition, ConditionKind, EffectSource, Modifier, ModifierScope,
};
use crate::error::CombatError;
use crate::events::CombatEvent;

/// A weapon as swung: damage dice, proficiency grouping, damage type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub damage: DiceRoll,
    pub category: WeaponCategory,
    pub damage_type: DamageType,
}

impl Weapon {
    pub fn new(
        name: &str,
        damage: DiceRoll,
        category: WeaponCategory,
        damage_type: DamageType,
    ) -> Self {
        Self {
            name: name.to_string(),
            damage,
            category,
            damage_type,
        }
    }

    /// Bare-handed strike
    pub fn unarmed() -> Self {
        Self::new(
            "unarmed",
            DiceRoll::new(1, 2, 0),
            WeaponCategory::Simple,
            DamageType::Bludgeoning,
        )
    }
}

/// One-shot effect payload shared by spells and items.
///
/// Both funnel through the same application path on the target, so magical
/// and mundane effects cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectSpec {
    /// Typed damage rolled on delivery
    Damage {
        dice: DiceRoll,
        damage_type: DamageType,
    },
    /// Hit points restored, rolled on delivery
    Healing { dice: DiceRoll },
    /// A modifier applied to the target
    Buff(Modifier),
    /// A condition applied to the target
    Afflict(Condition),
    /// A condition removed from the target
    Cleanse(ConditionKind),
}

/// A castable spell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub name: String,
    /// Spell level; casting consumes one slot of this level
    pub level: u32,
    pub effect: EffectSpec,
}

impl Spell {
    pub fn new(name: &str, level: u32, effect: EffectSpec) -> Self {
        Self {
            name: name.to_string(),
            level,
            effect,
        }
    }
}

/// A usable item. The inventory collaborator tracks it under `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub key: String,
    pub name: String,
    pub effect: EffectSpec,
}

impl Item {
    pub fn new(key: &str, name: &str, effect: EffectSpec) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            effect,
        }
    }
}

/// External inventory collaborator consumed by UseItem.
pub trait Inventory {
    /// Whether the combatant holds the item
    fn has_item(&self, combatant: CombatantId, key: &str) -> bool;
    /// Remove one instance; returns false if absent
    fn consume_item(&mut self, combatant: CombatantId, key: &str) -> bool;
}

/// In-memory inventory for tests and simple hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryInventory {
    items: HashMap<CombatantId, Vec<String>>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give a combatant one instance of an item
    pub fn grant(&mut self, combatant: CombatantId, key: &str) {
        self.items.entry(combatant).or_default().push(key.to_string());
    }
}

impl Inventory for MemoryInventory {
    fn has_item(&self, combatant: CombatantId, key: &str) -> bool {
        self.items
            .get(&combatant)
            .is_some_and(|held| held.iter().any(|k| k == key))
    }

    fn consume_item(&mut self, combatant: CombatantId, key: &str) -> bool {
        let Some(held) = self.items.get_mut(&combatant) else {
            return false;
        };
        match held.iter().position(|k| k == key) {
            Some(pos) => {
                held.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// A combatant's chosen action for the turn.
///
/// The actor is named by the `choose_action` call; variants carry targets
/// and action-specific payload only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Strike a target; None weapon = unarmed
    Attack {
        target: CombatantId,
        weapon: Option<Weapon>,
    },
    /// Raise guard: temporary armor-class bonus until the next turn ends
    Defend,
    /// Cast a spell at one target or a whole target set
    CastSpell {
        spell: Spell,
        targets: Vec<CombatantId>,
    },
    /// Use a one-shot item; None target = self
    UseItem {
        item: Item,
        target: Option<CombatantId>,
    },
    /// Leave the encounter
    Flee,
}

fn find(combatants: &[Combatant], id: CombatantId) -> Option<usize> {
    combatants.iter().position(|c| c.id == id)
}

fn active_target_index(
    combatants: &[Combatant],
    id: CombatantId,
) -> Result<usize, CombatError> {
    let index = find(combatants, id)
        .ok_or_else(|| CombatError::IllegalAction(format!("unknown target {}", id)))?;
    if !combatants[index].is_active() {
        return Err(CombatError::IllegalAction(format!(
            "{} is out of the fight",
            combatants[index].name
        )));
    }
    Ok(index)
}

/// Resolve one combatant's chosen action against the roster.
///
/// Validation happens before any mutation: a returned error leaves every
/// combatant, slot, and inventory untouched.
pub(crate) fn resolve(
    combatants: &mut [Combatant],
    actor: usize,
    action: Action,
    config: &RulesConfig,
    roller: &mut dyn Roller,
    inventory: &mut dyn Inventory,
) -> Result<Vec<CombatEvent>, CombatError> {
    // paralysis or stun costs the turn outright; this is a resolved
    // outcome, not a rejected action
    if let Some(kind) = combatants[actor].incapacity() {
        debug!(name = %combatants[actor].name, condition = %kind, "turn lost");
        return Ok(vec![CombatEvent::TurnLost {
            combatant: combatants[actor].id,
            kind,
        }]);
    }

    match action {
        Action::Attack { target, weapon } => {
            resolve_attack(combatants, actor, target, weapon, config, roller)
        }
        Action::Defend => resolve_defend(combatants, actor, config),
        Action::CastSpell { spell, targets } => {
            resolve_cast(combatants, actor, spell, targets, roller)
        }
        Action::UseItem { item, target } => {
            resolve_use_item(combatants, actor, item, target, roller, inventory)
        }
        Action::Flee => {
            let fugitive = &mut combatants[actor];
            fugitive.flee();
            info!(name = %fugitive.name, "fled the encounter");
            Ok(vec![CombatEvent::Fled {
                combatant: fugitive.id,
            }])
        }
    }
}

fn resolve_attack(
    combatants: &mut [Combatant],
    actor: usize,
    target: CombatantId,
    weapon: Option<Weapon>,
    config: &RulesConfig,
    roller: &mut dyn Roller,
) -> Result<Vec<CombatEvent>, CombatError> {
    if combatants[actor].id == target {
        return Err(CombatError::IllegalAction(
            "a combatant cannot attack itself".to_string(),
        ));
    }
    let target_index = active_target_index(combatants, target)?;
    let weapon = weapon.unwrap_or_else(Weapon::unarmed);
    let attacks = combatants[actor].class.attacks_per_round.max(1);

    let mut events = Vec::new();
    for _ in 0..attacks {
        if !combatants[target_index].is_active() {
            break;
        }

        // attacker-derived numbers first; the target borrow comes after
        let (attacker_id, attack_bonus, strength_bonus) = {
            let attacker = &combatants[actor];
            let strength = attacker.effective_ability_modifier(Ability::Strength);
            // unproficient casters never add Strength, only lose nothing
            let strength_bonus = if attacker.class.kind.proficient_with(weapon.category) {
                strength
            } else {
                strength.max(0)
            };
            (attacker.id, attacker.effective_attack_bonus(), strength_bonus)
        };
        let armor_class = combatants[target_index].effective_armor_class();

        let roll = roller.d20()?;
        let critical = is_critical(roll);
        let fumble = is_fumble(roll);
        let total = roll as i32 + attack_bonus;
        // natural 20 always hits, natural 1 always misses
        let hit = critical || (!fumble && total >= armor_class);

        debug!(roll, total, armor_class, hit, critical, "attack roll");
        events.push(CombatEvent::AttackRolled {
            attacker: attacker_id,
            target,
            roll,
            total,
            armor_class,
            hit,
            critical,
            fumble,
        });
        if !hit {
            continue;
        }

        let mut amount = (weapon.damage.roll(roller)? + strength_bonus).max(0);
        if critical {
            // criticals double the damage total, not the dice
            amount *= config.critical_multiplier;
        }

        let defender = &mut combatants[target_index];
        let was_active = defender.is_active();
        let damage = defender.take_damage(amount, weapon.damage_type, critical);
        events.push(CombatEvent::DamageDealt { target, damage });
        if was_active && !defender.is_active() {
            info!(name = %defender.name, "defeated");
            events.push(CombatEvent::Defeated { combatant: target });
            break;
        }
    }
    Ok(events)
}

fn resolve_defend(
    combatants: &mut [Combatant],
    actor: usize,
    config: &RulesConfig,
) -> Result<Vec<CombatEvent>, CombatError> {
    let defender = &mut combatants[actor];
    // duration 2: the owner's own end-of-turn tick consumes one round,
    // leaving the bonus up until the end of their next turn
    let modifier = Modifier::new(
        "defending",
        config.defend_armor_bonus,
        ModifierScope::Single(Attribute::ArmorClass),
    )
    .with_duration(2)
    .with_source(EffectSource::Action);
    let id = defender.apply_modifier(modifier)?;
    Ok(vec![CombatEvent::ModifierApplied {
        target: defender.id,
        id,
        name: "defending".to_string(),
    }])
}

fn resolve_cast(
    combatants: &mut [Combatant],
    actor: usize,
    spell: Spell,
    targets: Vec<CombatantId>,
    roller: &mut dyn Roller,
) -> Result<Vec<CombatEvent>, CombatError> {
    {
        let caster = &combatants[actor];
        if !caster.can_cast() {
            return Err(CombatError::IllegalAction(format!(
                "{} cannot cast right now",
                caster.name
            )));
        }
        if targets.is_empty() {
            return Err(CombatError::IllegalAction(format!(
                "spell '{}' needs at least one target",
                spell.name
            )));
        }
        if caster.spell_slots().remaining(spell.level) == 0 {
            return Err(CombatError::InsufficientResource(format!(
                "no level {} spell slot remaining",
                spell.level
            )));
        }
    }
    validate_effect_spec(&spell.effect)?;
    let mut target_indices = Vec::with_capacity(targets.len());
    for target in &targets {
        target_indices.push(active_target_index(combatants, *target)?);
    }

    // all checks passed; from here the cast runs to completion
    combatants[actor].consume_spell_slot(spell.level)?;
    let caster_id = combatants[actor].id;
    info!(caster = %combatants[actor].name, spell = %spell.name, "spell cast");

    let mut events = vec![CombatEvent::SpellCast {
        caster: caster_id,
        spell: spell.name.clone(),
        level: spell.level,
    }];
    let source = EffectSource::Spell(spell.name.clone());
    for index in target_indices {
        apply_effect_spec(combatants, index, &spell.effect, &source, roller, &mut events)?;
    }
    Ok(events)
}

fn resolve_use_item(
    combatants: &mut [Combatant],
    actor: usize,
    item: Item,
    target: Option<CombatantId>,
    roller: &mut dyn Roller,
    inventory: &mut dyn Inventory,
) -> Result<Vec<CombatEvent>, CombatError> {
    let actor_id = combatants[actor].id;
    if !inventory.has_item(actor_id, &item.key) {
        return Err(CombatError::ItemUnavailable(format!(
            "{} does not hold '{}'",
            combatants[actor].name, item.key
        )));
    }
    validate_effect_spec(&item.effect)?;
    let target_id = target.unwrap_or(actor_id);
    let target_index = active_target_index(combatants, target_id)?;

    let mut events = Vec::new();
    let source = EffectSource::Item(item.key.clone());
    apply_effect_spec(
        combatants,
        target_index,
        &item.effect,
        &source,
        roller,
        &mut events,
    )?;
    if !inventory.consume_item(actor_id, &item.key) {
        // has_item said yes just above; a collaborator this inconsistent
        // is logged, not fatal
        warn!(item = %item.key, "inventory failed to consume item");
    }
    events.push(CombatEvent::ItemUsed {
        actor: actor_id,
        item: item.name,
    });
    Ok(events)
}

/// Reject payloads that would fail after mutation already started.
fn validate_effect_spec(spec: &EffectSpec) -> Result<(), CombatError> {
    if let EffectSpec::Buff(modifier) = spec {
        if modifier.duration == Some(0) {
            return Err(CombatError::InvalidModifier(format!(
                "timed modifier '{}' must have a positive duration",
                modifier.name
            )));
        }
    }
    Ok(())
}

/// The one application path for spell and item effects.
fn apply_effect_spec(
    combatants: &mut [Combatant],
    target_index: usize,
    spec: &EffectSpec,
    source: &EffectSource,
    roller: &mut dyn Roller,
    events: &mut Vec<CombatEvent>,
) -> Result<(), CombatError> {
    let target_id = combatants[target_index].id;
    match spec {
        EffectSpec::Damage { dice, damage_type } => {
            let amount = dice.roll(roller)?.max(0);
            let target = &mut combatants[target_index];
            let was_active = target.is_active();
            let damage = target.take_damage(amount, *damage_type, false);
            events.push(CombatEvent::DamageDealt {
                target: target_id,
                damage,
            });
            if was_active && !target.is_active() {
                info!(name = %target.name, "defeated");
                events.push(CombatEvent::Defeated {
                    combatant: target_id,
                });
            }
        }
        EffectSpec::Healing { dice } => {
            let amount = dice.roll(roller)?.max(0);
            let healed = combatants[target_index].heal(amount);
            events.push(CombatEvent::Healed {
                target: target_id,
                amount: healed,
            });
        }
        EffectSpec::Buff(modifier) => {
            let modifier = modifier.clone().with_source(source.clone());
            let name = modifier.name.clone();
            let id = combatants[target_index].apply_modifier(modifier)?;
            events.push(CombatEvent::ModifierApplied {
                target: target_id,
                id,
                name,
            });
        }
        EffectSpec::Afflict(condition) => {
            let condition = condition.clone().with_source(source.clone());
            let kind = condition.kind;
            combatants[target_index].apply_condition(condition);
            events.push(CombatEvent::ConditionApplied {
                target: target_id,
                kind,
            });
        }
        EffectSpec::Cleanse(kind) => {
            if combatants[target_index].remove_condition(*kind) {
                events.push(CombatEvent::ConditionRemoved {
                    target: target_id,
                    kind: *kind,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{AbilityScores, ClassKind, ClassProfile, CombatantStatus};
    use crate::dice::SequenceRoller;

    fn longsword() -> Weapon {
        Weapon::new(
            "longsword",
            "1d8".parse().unwrap(),
            WeaponCategory::Martial,
            DamageType::Slashing,
        )
    }

    fn fighter(name: &str, side: &str) -> Combatant {
        let mut abilities = AbilityScores::uniform(10);
        abilities.strength = 13; // +1
        Combatant::new(
            name,
            side,
            ClassProfile::new(ClassKind::Fighter, 8, 2, 14),
            abilities,
        )
        .with_hit_points(20)
        .with_armor_class(16)
    }

    fn roster() -> Vec<Combatant> {
        vec![fighter("attacker", "blue"), fighter("defender", "red")]
    }

    fn config() -> RulesConfig {
        RulesConfig::default()
    }

    #[test]
    fn test_attack_hit_and_damage() {
        let mut combatants = roster();
        let target = combatants[1].id;
        // d20 = 15: 15 + 2 = 17 >= 16 hits; d8 = 5, +1 str = 6
        let mut roller = SequenceRoller::new(vec![15, 5]);

        let events = resolve(
            &mut combatants,
            0,
            Action::Attack {
                target,
                weapon: Some(longsword()),
            },
            &config(),
            &mut roller,
            &mut MemoryInventory::new(),
        )
        .unwrap();

        assert!(matches!(
            events[0],
            CombatEvent::AttackRolled {
                roll: 15,
                total: 17,
                hit: true,
                critical: false,
                ..
            }
        ));
        assert_eq!(combatants[1].hit_points(), 14);
    }

    #[test]
    fn test_attack_miss() {
        let mut combatants = roster();
        let target = combatants[1].id;
        // 10 + 2 = 12 < 16
        let mut roller = SequenceRoller::new(vec![10]);

        let events = resolve(
            &mut combatants,
            0,
            Action::Attack {
                target,
                weapon: Some(longsword()),
            },
            &config(),
            &mut roller,
            &mut MemoryInventory::new(),
        )
        .unwrap();

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            CombatEvent::AttackRolled { hit: false, .. }
        ));
        assert_eq!(combatants[1].hit_points(), 20);
    }

    #[test]
    fn test_natural_twenty_always_hits_and_doubles() {
        let mut combatants = roster();
        combatants[1] = fighter("defender", "red").with_armor_class(30);
        let target = combatants[1].id;
        // nat 20 vs AC 30: forced hit; (5 + 1) * 2 = 12
        let mut roller = SequenceRoller::new(vec![20, 5]);

        let events = resolve(
            &mut combatants,
            0,
            Action::Attack {
                target,
                weapon: Some(longsword()),
            },
            &config(),
            &mut roller,
            &mut MemoryInventory::new(),
        )
        .unwrap();

        assert!(matches!(
            events[0],
            CombatEvent::AttackRolled {
                hit: true,
                critical: true,
                ..
            }
        ));
        assert_eq!(combatants[1].hit_points(), 8);
    }

    #[test]
    fn test_natural_one_always_misses() {
        let mut combatants = roster();
        combatants[1] = fighter("defender", "red").with_armor_class(2);
        let target = combatants[1].id;
        let mut roller = SequenceRoller::new(vec![1]);

        let events = resolve(
            &mut combatants,
            0,
            Action::Attack {
                target,
                weapon: Some(longsword()),
            },
            &config(),
            &mut roller,
            &mut MemoryInventory::new(),
        )
        .unwrap();

        assert!(matches!(
            events[0],
            CombatEvent::AttackRolled {
                hit: false,
                fumble: true,
                ..
            }
        ));
        assert_eq!(combatants[1].hit_points(), 20);
    }

    #[test]
    fn test_unproficient_caster_loses_strength_bonus() {
        let mut combatants = roster();
        let mut abilities = AbilityScores::uniform(10);
        abilities.strength = 16; // +3, forfeited with a martial weapon
        combatants[0] = Combatant::new(
            "wizard",
            "blue",
            ClassProfile::new(ClassKind::MagicUser, 4, 0, 15),
            abilities,
        );
        let target = combatants[1].id;
        // 18 + 0 = 18 >= 16 hits; d8 = 4, no strength bonus
        let mut roller = SequenceRoller::new(vec![18, 4]);

        resolve(
            &mut combatants,
            0,
            Action::Attack {
                target,
                weapon: Some(longsword()),
            },
            &config(),
            &mut roller,
            &mut MemoryInventory::new(),
        )
        .unwrap();

        assert_eq!(combatants[1].hit_points(), 16);
    }

    #[test]
    fn test_negative_strength_never_goes_below_zero_when_unproficient() {
        let mut combatants = roster();
        let mut abilities = AbilityScores::uniform(10);
        abilities.strength = 6; // -2
        combatants[0] = Combatant::new(
            "apprentice",
            "blue",
            ClassProfile::new(ClassKind::MagicUser, 4, 0, 15),
            abilities,
        );
        let target = combatants[1].id;
        let mut roller = SequenceRoller::new(vec![18, 4]);

        resolve(
            &mut combatants,
            0,
            Action::Attack {
                target,
                weapon: Some(longsword()),
            },
            &config(),
            &mut roller,
            &mut MemoryInventory::new(),
        )
        .unwrap();

        // full 4 damage: the -2 penalty is clamped away, not applied
        assert_eq!(combatants[1].hit_points(), 16);
    }

    #[test]
    fn test_multiple_attacks_resolve_independently() {
        let mut combatants = roster();
        combatants[0] = Combatant::new(
            "veteran",
            "blue",
            ClassProfile::new(ClassKind::Fighter, 8, 2, 14).with_attacks_per_round(2),
            AbilityScores::uniform(10),
        );
        let target = combatants[1].id;
        // hit (16 + 2 >= 16, d8 -> 3), then miss (5 + 2 < 16)
        let mut roller = SequenceRoller::new(vec![16, 3, 5]);

        let events = resolve(
            &mut combatants,
            0,
            Action::Attack {
                target,
                weapon: Some(longsword()),
            },
            &config(),
            &mut roller,
            &mut MemoryInventory::new(),
        )
        .unwrap();

        let rolls = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::AttackRolled { .. }))
            .count();
        assert_eq!(rolls, 2);
        assert_eq!(combatants[1].hit_points(), 17);
    }

    #[test]
    fn test_attack_defeated_target_rejected() {
        let mut combatants = roster();
        let target = combatants[1].id;
        combatants[1].take_damage(50, DamageType::Slashing, false);

        let result = resolve(
            &mut combatants,
            0,
            Action::Attack {
                target,
                weapon: None,
            },
            &config(),
            &mut SequenceRoller::new(vec![15]),
            &mut MemoryInventory::new(),
        );
        assert!(matches!(result, Err(CombatError::IllegalAction(_))));
    }

    #[test]
    fn test_defend_applies_armor_modifier() {
        let mut combatants = roster();
        let events = resolve(
            &mut combatants,
            0,
            Action::Defend,
            &config(),
            &mut SequenceRoller::new(vec![1]),
            &mut MemoryInventory::new(),
        )
        .unwrap();

        assert!(matches!(events[0], CombatEvent::ModifierApplied { .. }));
        assert_eq!(combatants[0].effective_armor_class(), 18);

        // survives the owner's own tick, expires at the next one
        combatants[0].tick_round();
        assert_eq!(combatants[0].effective_armor_class(), 18);
        combatants[0].tick_round();
        assert_eq!(combatants[0].effective_armor_class(), 16);
    }

    #[test]
    fn test_cast_spell_consumes_slot() {
        let mut combatants = roster();
        combatants[0] = fighter("cleric", "blue").with_spell_slots(&[1]);
        let ally = combatants[0].id;
        let spell = Spell::new(
            "cure light wounds",
            1,
            EffectSpec::Healing {
                dice: "1d8".parse().unwrap(),
            },
        );
        combatants[0].take_damage(6, DamageType::Slashing, false);

        let events = resolve(
            &mut combatants,
            0,
            Action::CastSpell {
                spell,
                targets: vec![ally],
            },
            &config(),
            &mut SequenceRoller::new(vec![5]),
            &mut MemoryInventory::new(),
        )
        .unwrap();

        assert!(matches!(events[0], CombatEvent::SpellCast { level: 1, .. }));
        assert_eq!(combatants[0].hit_points(), 19);
        assert_eq!(combatants[0].spell_slots().remaining(1), 0);
    }

    #[test]
    fn test_cast_without_slot_changes_nothing() {
        let mut combatants = roster();
        combatants[0] = fighter("cleric", "blue").with_spell_slots(&[0]);
        let target = combatants[1].id;
        let before = combatants[1].clone();
        let spell = Spell::new(
            "magic missile",
            1,
            EffectSpec::Damage {
                dice: "1d6".parse().unwrap(),
                damage_type: DamageType::Magic,
            },
        );

        let result = resolve(
            &mut combatants,
            0,
            Action::CastSpell {
                spell,
                targets: vec![target],
            },
            &config(),
            &mut SequenceRoller::new(vec![5]),
            &mut MemoryInventory::new(),
        );

        assert!(matches!(result, Err(CombatError::InsufficientResource(_))));
        assert_eq!(combatants[1], before);
    }

    #[test]
    fn test_area_spell_hits_every_target() {
        let mut combatants = vec![
            fighter("wizard", "blue").with_spell_slots(&[0, 0, 1]),
            fighter("orc one", "red"),
            fighter("orc two", "red"),
        ];
        let targets = vec![combatants[1].id, combatants[2].id];
        let spell = Spell::new(
            "fireball",
            3,
            EffectSpec::Damage {
                dice: "3d6".parse().unwrap(),
                damage_type: DamageType::Fire,
            },
        );
        // 3d6 per target, every die a 4 -> 12 damage each
        let mut roller = SequenceRoller::new(vec![4]);

        resolve(
            &mut combatants,
            0,
            Action::CastSpell { spell, targets },
            &config(),
            &mut roller,
            &mut MemoryInventory::new(),
        )
        .unwrap();

        assert_eq!(combatants[1].hit_points(), 8);
        assert_eq!(combatants[2].hit_points(), 8);
    }

    #[test]
    fn test_silenced_caster_rejected() {
        let mut combatants = roster();
        combatants[0] = fighter("cleric", "blue").with_spell_slots(&[1]);
        combatants[0].apply_condition(Condition::new(ConditionKind::Silenced, 2, 0));
        let ally = combatants[0].id;
        let spell = Spell::new(
            "bless",
            1,
            EffectSpec::Afflict(Condition::new(ConditionKind::Blessed, 3, 1)),
        );

        let result = resolve(
            &mut combatants,
            0,
            Action::CastSpell {
                spell,
                targets: vec![ally],
            },
            &config(),
            &mut SequenceRoller::new(vec![1]),
            &mut MemoryInventory::new(),
        );
        assert!(matches!(result, Err(CombatError::IllegalAction(_))));
        assert_eq!(combatants[0].spell_slots().remaining(1), 1);
    }

    #[test]
    fn test_use_item_heals_and_consumes() {
        let mut combatants = roster();
        let actor = combatants[0].id;
        combatants[0].take_damage(8, DamageType::Slashing, false);

        let mut inventory = MemoryInventory::new();
        inventory.grant(actor, "potion-healing");
        let potion = Item::new(
            "potion-healing",
            "potion of healing",
            EffectSpec::Healing {
                dice: "1d8".parse().unwrap(),
            },
        );

        let events = resolve(
            &mut combatants,
            0,
            Action::UseItem {
                item: potion,
                target: None,
            },
            &config(),
            &mut SequenceRoller::new(vec![6]),
            &mut inventory,
        )
        .unwrap();

        assert!(matches!(events[0], CombatEvent::Healed { amount: 6, .. }));
        assert!(matches!(events[1], CombatEvent::ItemUsed { .. }));
        assert_eq!(combatants[0].hit_points(), 18);
        assert!(!inventory.has_item(actor, "potion-healing"));
    }

    #[test]
    fn test_use_item_unavailable() {
        let mut combatants = roster();
        let potion = Item::new(
            "potion-healing",
            "potion of healing",
            EffectSpec::Healing {
                dice: "1d8".parse().unwrap(),
            },
        );

        let result = resolve(
            &mut combatants,
            0,
            Action::UseItem {
                item: potion,
                target: None,
            },
            &config(),
            &mut SequenceRoller::new(vec![6]),
            &mut MemoryInventory::new(),
        );
        assert!(matches!(result, Err(CombatError::ItemUnavailable(_))));
    }

    #[test]
    fn test_cleanse_item_removes_condition() {
        let mut combatants = roster();
        let actor = combatants[0].id;
        combatants[0].apply_condition(Condition::new(ConditionKind::Poisoned, 5, 2));

        let mut inventory = MemoryInventory::new();
        inventory.grant(actor, "antidote");
        let antidote = Item::new(
            "antidote",
            "vial of antidote",
            EffectSpec::Cleanse(ConditionKind::Poisoned),
        );

        let events = resolve(
            &mut combatants,
            0,
            Action::UseItem {
                item: antidote,
                target: None,
            },
            &config(),
            &mut SequenceRoller::new(vec![1]),
            &mut inventory,
        )
        .unwrap();

        assert!(matches!(events[0], CombatEvent::ConditionRemoved { .. }));
        assert!(!combatants[0].has_condition(ConditionKind::Poisoned));
    }

    #[test]
    fn test_flee_removes_from_encounter() {
        let mut combatants = roster();
        let events = resolve(
            &mut combatants,
            0,
            Action::Flee,
            &config(),
            &mut SequenceRoller::new(vec![1]),
            &mut MemoryInventory::new(),
        )
        .unwrap();

        assert!(matches!(events[0], CombatEvent::Fled { .. }));
        assert_eq!(combatants[0].status(), CombatantStatus::Fled);
    }

    #[test]
    fn test_incapacitated_turn_is_lost_not_rejected() {
        let mut combatants = roster();
        combatants[0].apply_condition(Condition::new(ConditionKind::Paralyzed, 2, 0));
        let target = combatants[1].id;

        let events = resolve(
            &mut combatants,
            0,
            Action::Attack {
                target,
                weapon: None,
            },
            &config(),
            &mut SequenceRoller::new(vec![20]),
            &mut MemoryInventory::new(),
        )
        .unwrap();

        assert!(matches!(
            events[0],
            CombatEvent::TurnLost {
                kind: ConditionKind::Paralyzed,
                ..
            }
        ));
        assert_eq!(combatants[1].hit_points(), 20);
    }
}
