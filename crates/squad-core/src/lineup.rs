// Slot table: formation slots, player assignment and captaincy.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::formation::Formation;
use crate::player::{Player, PlayerId, Position};

// ---------------------------------------------------------------------------
// Slot identifiers
// ---------------------------------------------------------------------------

/// A slot on the pitch: a position category plus an ordinal within it.
///
/// Rendered as `"<prefix>-<index>"`, e.g. `gk-0`, `def-3`, `att-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId {
    pub position: Position,
    pub index: u8,
}

impl SlotId {
    pub fn new(position: Position, index: u8) -> Self {
        SlotId { position, index }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.position.slot_prefix(), self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid slot identifier `{0}`")]
pub struct ParseSlotIdError(pub String);

impl FromStr for SlotId {
    type Err = ParseSlotIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSlotIdError(s.to_string());
        let (prefix, index) = s.trim().split_once('-').ok_or_else(err)?;
        let position = Position::ALL
            .into_iter()
            .find(|p| p.slot_prefix() == prefix.to_lowercase())
            .ok_or_else(err)?;
        let index = index.parse::<u8>().map_err(|_| err())?;
        Ok(SlotId { position, index })
    }
}

// ---------------------------------------------------------------------------
// Slots and assignment errors
// ---------------------------------------------------------------------------

/// A single slot in the current formation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    /// The player occupying this slot, if any.
    pub player: Option<Player>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    #[error("slot {slot} is not part of formation {formation}")]
    UnknownSlot { slot: SlotId, formation: Formation },
}

/// What an assignment changed besides the target slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignOutcome {
    /// The slot the player was moved out of, if they were already placed.
    pub evicted_from: Option<SlotId>,
    /// The player that previously occupied the target slot, if different.
    pub displaced: Option<Player>,
    /// Whether the captain reference was cleared by this assignment.
    pub captain_cleared: bool,
}

// ---------------------------------------------------------------------------
// Lineup
// ---------------------------------------------------------------------------

/// The assignment state for one formation: every slot mapped to an optional
/// player, plus the captain reference.
///
/// Invariant: a player id appears in at most one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    formation: Formation,
    slots: Vec<Slot>,
    captain: Option<PlayerId>,
}

impl Lineup {
    /// An empty slot table for `formation`, slots in catalog order.
    pub fn new(formation: Formation) -> Self {
        let counts = formation.counts();
        let slots = Position::ALL
            .into_iter()
            .flat_map(|pos| {
                (0..counts.get(pos)).map(move |i| Slot {
                    id: SlotId::new(pos, i as u8),
                    player: None,
                })
            })
            .collect();

        Lineup {
            formation,
            slots,
            captain: None,
        }
    }

    /// Rebuild the slot table from scratch.
    ///
    /// Selected players are grouped by category and poured into that
    /// category's slots in selection order. Players beyond a category's slot
    /// count stay unassigned; duplicate ids in `selected` are placed once.
    /// The result has no captain.
    pub fn recompute(formation: Formation, selected: &[Player]) -> Self {
        let mut lineup = Lineup::new(formation);
        let mut seen: HashSet<PlayerId> = HashSet::new();

        for pos in Position::ALL {
            let mut candidates = selected
                .iter()
                .filter(|p| p.position == pos)
                .filter(|p| seen.insert(p.id));

            for slot in lineup.slots.iter_mut().filter(|s| s.id.position == pos) {
                match candidates.next() {
                    Some(player) => slot.player = Some(player.clone()),
                    None => break,
                }
            }

            let overflow = candidates.count();
            if overflow > 0 {
                debug!(
                    position = pos.code(),
                    overflow, "more selected players than slots, leaving extras unassigned"
                );
            }
        }

        lineup
    }

    pub fn formation(&self) -> Formation {
        self.formation
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn captain(&self) -> Option<PlayerId> {
        self.captain
    }

    /// The captain's player record, if the captain is currently assigned.
    pub fn captain_player(&self) -> Option<&Player> {
        let id = self.captain?;
        self.assigned().find(|p| p.id == id)
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    /// The slot currently holding `player_id`, if any.
    pub fn slot_of(&self, player_id: PlayerId) -> Option<SlotId> {
        self.slots
            .iter()
            .find(|s| s.player.as_ref().is_some_and(|p| p.id == player_id))
            .map(|s| s.id)
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.slot_of(player_id).is_some()
    }

    /// Players currently placed, in slot order.
    pub fn assigned(&self) -> impl Iterator<Item = &Player> {
        self.slots.iter().filter_map(|s| s.player.as_ref())
    }

    /// Number of filled slots.
    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.player.is_some()).count()
    }

    /// Total number of slots in the formation.
    pub fn required_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_complete(&self) -> bool {
        self.filled_count() == self.required_count()
    }

    /// Place `player` into `slot`, or clear the slot when `player` is `None`.
    ///
    /// The slot's position is not checked; the picker only offers matching
    /// candidates. A player already sitting in another slot is moved out of
    /// it first. If the player pushed out of the target slot was the captain,
    /// the captain is cleared as part of the same call.
    pub fn assign(
        &mut self,
        slot: SlotId,
        player: Option<Player>,
    ) -> Result<AssignOutcome, AssignError> {
        let target = self
            .slots
            .iter()
            .position(|s| s.id == slot)
            .ok_or(AssignError::UnknownSlot {
                slot,
                formation: self.formation,
            })?;

        let mut outcome = AssignOutcome::default();

        match player {
            Some(player) => {
                let incoming = player.id;
                if let Some(prev) = self
                    .slots
                    .iter_mut()
                    .filter(|s| s.id != slot)
                    .find(|s| s.player.as_ref().is_some_and(|p| p.id == incoming))
                {
                    prev.player = None;
                    outcome.evicted_from = Some(prev.id);
                }

                outcome.displaced = self.slots[target]
                    .player
                    .replace(player)
                    .filter(|old| old.id != incoming);
            }
            None => {
                outcome.displaced = self.slots[target].player.take();
            }
        }

        if let Some(ref displaced) = outcome.displaced {
            if self.captain == Some(displaced.id) {
                self.captain = None;
                outcome.captain_cleared = true;
            }
        }

        debug!(
            %slot,
            evicted_from = ?outcome.evicted_from.map(|s| s.to_string()),
            captain_cleared = outcome.captain_cleared,
            "slot assignment"
        );

        Ok(outcome)
    }

    /// Take `player_id` off the pitch wherever they are, clearing the captain
    /// if it pointed at them. Returns the slot that was vacated.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Option<SlotId> {
        let slot = self.slot_of(player_id)?;
        if let Some(s) = self.slots.iter_mut().find(|s| s.id == slot) {
            s.player = None;
        }
        if self.captain == Some(player_id) {
            self.captain = None;
        }
        Some(slot)
    }

    /// Set or clear the captain. Not validated here: the captain may
    /// transiently point at an unassigned player until submission.
    pub fn set_captain(&mut self, player_id: Option<PlayerId>) {
        self.captain = player_id;
    }

    /// Whether the captain reference points at a player on the pitch.
    pub fn captain_is_assigned(&self) -> bool {
        self.captain.is_some_and(|id| self.contains(id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
