//! skirmish - turn-based combat rules engine
//!
//! Implements D&D-style encounter resolution with:
//! - Dice rolling (e.g., "2d6+3") behind an injectable roller
//! - Initiative and deterministic turn order with surprise
//! - Attack resolution with to-hit, criticals, and typed damage
//! - Stacking modifiers and timed conditions with per-round ticks
//! - Spell, item, defend, and flee actions
//! - Encounter state machine with decisive and stalemate conclusions
//!
//! The engine is single-threaded and turn-sequential: one action resolves
//! at a time, and all I/O (persistence, AI, inventory) lives behind the
//! collaborator traits in `actions` and `session`.

pub mod actions;
pub mod combatant;
pub mod config;
pub mod damage;
pub mod dice;
pub mod effects;
pub mod error;
pub mod events;
pub mod initiative;
pub mod session;

pub use actions::{Action, EffectSpec, Inventory, Item, MemoryInventory, Spell, Weapon};
pub use combatant::{
    ability_modifier, Ability, AbilityScores, Alignment, ClassKind, ClassProfile, Combatant,
    CombatantId, CombatantSnapshot, CombatantStatus, SpellSlots, WeaponCategory,
};
pub use config::RulesConfig;
pub use damage::{DamageModifier, DamageProfile, DamageResult, DamageType};
pub use dice::{parse_dice, DiceRoll, RandomRoller, Roller, SequenceRoller};
pub use effects::{
    ActiveEffects, AppliedModifier, Attribute, Condition, ConditionDuration, ConditionKind,
    EffectSource, Modifier, ModifierId, ModifierScope, Predicate,
};
pub use error::CombatError;
pub use events::{CombatEvent, ConclusionKind};
pub use initiative::{determine_turn_order, handle_surprise, roll_initiative};
pub use session::{
    CombatSession, CombatantAi, SessionId, SessionManager, SessionPhase, SimpleMeleeAi,
};
