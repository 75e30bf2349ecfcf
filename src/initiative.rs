//! Initiative and turn order
//!
//! One initiative roll per combatant per round: 1d20 plus the effective
//! Dexterity modifier. The resulting order is a total order: ties break
//! by effective Dexterity score, then by registration order, never by
//! chance a second time.

use tracing::debug;

use crate::combatant::{Ability, Combatant, CombatantId};
use crate::dice::Roller;
use crate::error::CombatError;

/// Roll initiative for one combatant: 1d20 + effective Dexterity modifier
/// (initiative modifiers such as Hasted included).
pub fn roll_initiative(
    combatant: &Combatant,
    roller: &mut dyn Roller,
) -> Result<i32, CombatError> {
    let die = roller.d20()? as i32;
    Ok(die + combatant.effective_initiative_bonus())
}

/// Compute a round's turn order.
///
/// Defeated, fled, and surprised combatants are excluded (the surprise
/// flag only exists during round 1). Sort is descending by initiative,
/// ties by effective Dexterity score descending, then registration order.
pub fn determine_turn_order(
    combatants: &[Combatant],
    roller: &mut dyn Roller,
) -> Result<Vec<CombatantId>, CombatError> {
    let mut entries: Vec<(i32, i32, usize, CombatantId)> = Vec::new();
    for (index, combatant) in combatants.iter().enumerate() {
        if !combatant.is_active() || combatant.surprised() {
            continue;
        }
        let initiative = roll_initiative(combatant, roller)?;
        debug!(name = %combatant.name, initiative, "initiative rolled");
        entries.push((
            initiative,
            combatant.effective_ability(Ability::Dexterity),
            index,
            combatant.id,
        ));
    }
    entries.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));
    Ok(entries.into_iter().map(|entry| entry.3).collect())
}

/// Flag combatants as surprised; they are skipped for action resolution
/// during round 1 only.
pub fn handle_surprise(combatants: &mut [Combatant], surprised: &[CombatantId]) {
    for combatant in combatants.iter_mut() {
        if surprised.contains(&combatant.id) {
            debug!(name = %combatant.name, "surprised");
            combatant.set_surprised();
        }
    }
}
