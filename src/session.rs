//! Combat session state machine
//!
//! Drives an encounter round by round: the scheduler produces the order,
//! the resolver processes each combatant's chosen action, the effect
//! engine ticks that combatant, and the session evaluates termination
//! once the full order has been processed.
//!
//! Exactly one action resolves at a time; the roller and inventory
//! collaborators are borrowed per call, so nothing here needs locks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::actions::{self, Action, Inventory, Weapon};
use crate::combatant::{Combatant, CombatantId, CombatantSnapshot};
use crate::config::RulesConfig;
use crate::dice::Roller;
use crate::error::CombatError;
use crate::events::{CombatEvent, ConclusionKind};
use crate::initiative;

/// Stable identity for a combat session.
pub type SessionId = Uuid;

/// Encounter lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Roster assembled, no initiative rolled yet
    Forming,
    /// Rounds are being played
    InProgress,
    /// Over; no further actions are accepted
    Concluded(ConclusionKind),
}

/// A running encounter.
///
/// The session owns its roster, round counter, and turn order for the
/// encounter's duration; combatants are mutated only through the action
/// resolver and effect engine on behalf of the current turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSession {
    id: SessionId,
    config: RulesConfig,
    /// Registration order is the declared order and the final tiebreaker
    combatants: Vec<Combatant>,
    phase: SessionPhase,
    round: u32,
    turn_order: Vec<CombatantId>,
    turn_cursor: usize,
}

impl CombatSession {
    /// Assemble an encounter from fully-formed combatants.
    ///
    /// The roster must span at least two distinct sides.
    pub fn form(combatants: Vec<Combatant>, config: RulesConfig) -> Result<Self, CombatError> {
        let mut sides: Vec<&str> = Vec::new();
        for combatant in &combatants {
            if !sides.contains(&combatant.side.as_str()) {
                sides.push(combatant.side.as_str());
            }
        }
        if sides.len() < 2 {
            return Err(CombatError::InvalidParameter(
                "an encounter needs at least two sides".to_string(),
            ));
        }
        let id = Uuid::new_v4();
        info!(session = %id, combatants = combatants.len(), "combat session formed");
        Ok(Self {
            id,
            config,
            combatants,
            phase: SessionPhase::Forming,
            round: 1,
            turn_order: Vec::new(),
            turn_cursor: 0,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// How the encounter ended, if it has.
    pub fn conclusion(&self) -> Option<&ConclusionKind> {
        match &self.phase {
            SessionPhase::Concluded(conclusion) => Some(conclusion),
            _ => None,
        }
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    /// Read-only snapshot of one combatant's derived stats.
    pub fn snapshot(&self, id: CombatantId) -> Option<CombatantSnapshot> {
        self.combatant(id).map(Combatant::snapshot)
    }

    /// This round's remaining order.
    pub fn turn_order(&self) -> &[CombatantId] {
        &self.turn_order
    }

    /// The combatant whose action is awaited.
    pub fn current_turn(&self) -> Option<CombatantId> {
        match self.phase {
            SessionPhase::InProgress => self.turn_order.get(self.turn_cursor).copied(),
            _ => None,
        }
    }

    fn index_of(&self, id: CombatantId) -> Option<usize> {
        self.combatants.iter().position(|c| c.id == id)
    }

    /// Flag surprised combatants before battle is joined. They are skipped
    /// for action resolution during round 1 only.
    pub fn surprise(&mut self, ids: &[CombatantId]) -> Result<(), CombatError> {
        if self.phase != SessionPhase::Forming {
            return Err(CombatError::IllegalAction(
                "surprise can only be declared while forming".to_string(),
            ));
        }
        initiative::handle_surprise(&mut self.combatants, ids);
        Ok(())
    }

    /// Roll this round's initiative order. The first call moves the
    /// session from Forming to InProgress; later rounds reroll
    /// automatically as each round completes.
    pub fn determine_turn_order(
        &mut self,
        roller: &mut dyn Roller,
    ) -> Result<&[CombatantId], CombatError> {
        match self.phase {
            SessionPhase::Concluded(_) => return Err(CombatError::AlreadyConcluded),
            SessionPhase::Forming => {
                self.phase = SessionPhase::InProgress;
                info!(session = %self.id, "combat begins");
            }
            SessionPhase::InProgress => {}
        }
        self.turn_order = initiative::determine_turn_order(&self.combatants, roller)?;
        self.turn_cursor = 0;
        if self.turn_order.is_empty() {
            // every living combatant is surprised: the round passes with
            // no actors; effects still tick
            let mut events = Vec::new();
            self.advance(&mut events, roller)?;
            for event in &events {
                debug!(?event, "round passed without actors");
            }
        }
        Ok(&self.turn_order)
    }

    /// Resolve the current combatant's chosen action. This is the only
    /// way a turn advances.
    ///
    /// On success the actor's effects tick, the turn passes to the next
    /// actionable combatant, and completed rounds roll over (ending the
    /// session if one side is out of members or the round limit is hit).
    /// On error nothing changes and the turn stays open.
    pub fn choose_action(
        &mut self,
        combatant_id: CombatantId,
        action: Action,
        roller: &mut dyn Roller,
        inventory: &mut dyn Inventory,
    ) -> Result<Vec<CombatEvent>, CombatError> {
        if let SessionPhase::Concluded(_) = self.phase {
            return Err(CombatError::AlreadyConcluded);
        }
        if self.phase == SessionPhase::Forming {
            return Err(CombatError::IllegalAction(
                "turn order has not been determined".to_string(),
            ));
        }
        let actor = self.index_of(combatant_id).ok_or_else(|| {
            CombatError::IllegalAction(format!("unknown combatant {}", combatant_id))
        })?;
        if !self.combatants[actor].is_active() {
            return Err(CombatError::IllegalAction(format!(
                "{} is out of the fight",
                self.combatants[actor].name
            )));
        }
        if self.round == 1 && self.combatants[actor].surprised() {
            return Err(CombatError::IllegalAction(format!(
                "{} is surprised this round",
                self.combatants[actor].name
            )));
        }
        match self.current_turn() {
            Some(current) if current == combatant_id => {}
            _ => {
                return Err(CombatError::IllegalAction(format!(
                    "it is not {}'s turn",
                    self.combatants[actor].name
                )));
            }
        }

        let mut events = actions::resolve(
            &mut self.combatants,
            actor,
            action,
            &self.config,
            roller,
            inventory,
        )?;

        // effects persist through the combatant's turn, then fade
        if self.combatants[actor].is_active() {
            events.extend(self.combatants[actor].tick_round());
        }
        self.turn_cursor += 1;
        self.advance(&mut events, roller)?;
        Ok(events)
    }

    /// Move the cursor to the next actionable combatant, rolling over
    /// completed rounds until the turn settles or the session concludes.
    fn advance(
        &mut self,
        events: &mut Vec<CombatEvent>,
        roller: &mut dyn Roller,
    ) -> Result<(), CombatError> {
        loop {
            while let Some(&id) = self.turn_order.get(self.turn_cursor) {
                let standing = self
                    .index_of(id)
                    .map(|index| self.combatants[index].is_active())
                    .unwrap_or(false);
                if standing {
                    return Ok(());
                }
                // defeated or fled since the order was rolled
                self.turn_cursor += 1;
            }

            // full order processed; combatants without a turn this round
            // (surprised) still get their once-per-round tick
            for index in self.absent_active_indices() {
                events.extend(self.combatants[index].tick_round());
            }
            events.push(CombatEvent::RoundEnded { round: self.round });

            if let Some(conclusion) = self.evaluate_termination() {
                info!(session = %self.id, round = self.round, ?conclusion, "combat concluded");
                self.phase = SessionPhase::Concluded(conclusion.clone());
                events.push(CombatEvent::Concluded { conclusion });
                return Ok(());
            }

            self.round += 1;
            if self.round == 2 {
                // surprise never outlives round 1
                for combatant in &mut self.combatants {
                    combatant.clear_surprise();
                }
            }
            self.turn_order = initiative::determine_turn_order(&self.combatants, roller)?;
            self.turn_cursor = 0;
            debug!(session = %self.id, round = self.round, "round begins");
        }
    }

    fn absent_active_indices(&self) -> Vec<usize> {
        self.combatants
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_active() && !self.turn_order.contains(&c.id))
            .map(|(index, _)| index)
            .collect()
    }

    /// Concluded when at most one side still has combat-capable members,
    /// or the configured round limit has been played out.
    fn evaluate_termination(&self) -> Option<ConclusionKind> {
        let mut standing: Vec<&str> = Vec::new();
        for combatant in &self.combatants {
            if combatant.is_active() && !standing.contains(&combatant.side.as_str()) {
                standing.push(combatant.side.as_str());
            }
        }
        if standing.len() <= 1 {
            return Some(ConclusionKind::Decisive {
                winner: standing.first().map(|side| side.to_string()),
            });
        }
        if let Some(max_rounds) = self.config.max_rounds {
            if self.round >= max_rounds {
                return Some(ConclusionKind::Stalemate);
            }
        }
        None
    }
}

/// Decides an action for a non-player combatant.
///
/// The returned action goes through `choose_action` and is treated
/// identically to a player's choice, including the decision to flee.
pub trait CombatantAi {
    fn choose_action(&mut self, actor: &Combatant, session: &CombatSession) -> Action;
}

/// Baseline monster behavior: swing at the first standing enemy, flee
/// when badly hurt.
#[derive(Debug, Clone, Default)]
pub struct SimpleMeleeAi {
    pub weapon: Option<Weapon>,
}

impl SimpleMeleeAi {
    pub fn armed(weapon: Weapon) -> Self {
        Self {
            weapon: Some(weapon),
        }
    }
}

impl CombatantAi for SimpleMeleeAi {
    fn choose_action(&mut self, actor: &Combatant, session: &CombatSession) -> Action {
        if actor.hit_points() * 4 <= actor.effective_max_hit_points() {
            return Action::Flee;
        }
        let target = session
            .combatants()
            .iter()
            .find(|c| c.side != actor.side && c.is_active())
            .map(|c| c.id);
        match target {
            Some(target) => Action::Attack {
                target,
                weapon: self.weapon.clone(),
            },
            None => Action::Defend,
        }
    }
}

/// Owns live sessions, keyed by session id.
///
/// This is the surface collaborators drive: form a session, feed it
/// actions, poll for a conclusion, read snapshots.
#[derive(Debug, Default)]
pub struct SessionManager {
    config: RulesConfig,
    sessions: HashMap<SessionId, CombatSession>,
}

impl SessionManager {
    pub fn new(config: RulesConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    /// Form a session from a roster spanning two or more sides.
    pub fn form_session(&mut self, combatants: Vec<Combatant>) -> Result<SessionId, CombatError> {
        let session = CombatSession::form(combatants, self.config.clone())?;
        let id = session.id();
        self.sessions.insert(id, session);
        Ok(id)
    }

    pub fn session(&self, id: SessionId) -> Option<&CombatSession> {
        self.sessions.get(&id)
    }

    pub fn session_mut(&mut self, id: SessionId) -> Option<&mut CombatSession> {
        self.sessions.get_mut(&id)
    }

    /// Resolve an action within a session.
    pub fn choose_action(
        &mut self,
        session_id: SessionId,
        combatant_id: CombatantId,
        action: Action,
        roller: &mut dyn Roller,
        inventory: &mut dyn Inventory,
    ) -> Result<Vec<CombatEvent>, CombatError> {
        let session = self.sessions.get_mut(&session_id).ok_or_else(|| {
            CombatError::IllegalAction(format!("unknown session {}", session_id))
        })?;
        session.choose_action(combatant_id, action, roller, inventory)
    }

    /// How a session ended, or None while it is still running.
    pub fn conclusion(&self, session_id: SessionId) -> Option<ConclusionKind> {
        self.sessions
            .get(&session_id)
            .and_then(|s| s.conclusion().cloned())
    }

    /// Read-only snapshot of a combatant's derived stats.
    pub fn snapshot(
        &self,
        session_id: SessionId,
        combatant_id: CombatantId,
    ) -> Option<CombatantSnapshot> {
        self.sessions
            .get(&session_id)
            .and_then(|s| s.snapshot(combatant_id))
    }

    /// Remove a session from the manager (typically once concluded),
    /// handing it back for archival.
    pub fn archive(&mut self, session_id: SessionId) -> Option<CombatSession> {
        self.sessions.remove(&session_id)
    }
}
