//! Outcome events
//!
//! Everything an action resolution or round tick does to the encounter is
//! reported as an ordered list of events, so hosts can journal, narrate,
//! or replay a fight without poking at combatant internals.

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantId;
use crate::damage::DamageResult;
use crate::effects::{ConditionKind, ModifierId};

/// How an encounter ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConclusionKind {
    /// One side alone has combat-capable members left; `winner` is None
    /// when the last defeat took every remaining side down together
    Decisive { winner: Option<String> },
    /// The maximum-round limit was reached with multiple sides standing
    Stalemate,
}

/// A single observable outcome within a turn or tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// An attack roll was made (hit or miss)
    AttackRolled {
        attacker: CombatantId,
        target: CombatantId,
        roll: u32,
        total: i32,
        armor_class: i32,
        hit: bool,
        critical: bool,
        fumble: bool,
    },
    /// Damage was delivered to a combatant
    DamageDealt {
        target: CombatantId,
        damage: DamageResult,
    },
    /// Hit points were restored
    Healed { target: CombatantId, amount: i32 },
    /// A modifier was applied
    ModifierApplied {
        target: CombatantId,
        id: ModifierId,
        name: String,
    },
    /// A timed modifier ran out
    ModifierExpired { combatant: CombatantId, name: String },
    /// A condition was applied or refreshed
    ConditionApplied {
        target: CombatantId,
        kind: ConditionKind,
    },
    /// A condition was removed before expiry
    ConditionRemoved {
        target: CombatantId,
        kind: ConditionKind,
    },
    /// A periodic condition delivered its per-round damage
    ConditionDamage {
        combatant: CombatantId,
        kind: ConditionKind,
        damage: DamageResult,
    },
    /// A timed condition ran out
    ConditionExpired {
        combatant: CombatantId,
        kind: ConditionKind,
    },
    /// A spell was cast (slot already consumed)
    SpellCast {
        caster: CombatantId,
        spell: String,
        level: u32,
    },
    /// An item was used and consumed from the inventory
    ItemUsed { actor: CombatantId, item: String },
    /// The combatant was incapacitated and its turn passed without effect
    TurnLost {
        combatant: CombatantId,
        kind: ConditionKind,
    },
    /// Hit points reached zero
    Defeated { combatant: CombatantId },
    /// The combatant left the encounter
    Fled { combatant: CombatantId },
    /// The full initiative order was processed
    RoundEnded { round: u32 },
    /// The encounter is over; no further actions are accepted
    Concluded { conclusion: ConclusionKind },
}
