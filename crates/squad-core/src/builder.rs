// Team builder: the selected-player pool plus the slot table, mutated only
// through `LineupAction`s.

use tracing::debug;

use crate::formation::Formation;
use crate::lineup::{AssignError, Lineup, SlotId};
use crate::player::{Player, PlayerId};
use crate::team::Team;

/// Every edit the team page can make to a lineup.
///
/// Slot removal and captain invalidation happen inside a single action so the
/// two can never drift apart.
#[derive(Debug, Clone, PartialEq)]
pub enum LineupAction {
    /// Add the player to the selection, or drop them if already selected.
    /// The slot table is rebuilt from the selection afterwards.
    ToggleSelect(Player),
    /// Put a player into a specific slot. The player joins the selection if
    /// they were not already in it.
    Assign { slot: SlotId, player: Player },
    /// Empty a slot. The player stays selected.
    Unassign(SlotId),
    SetCaptain(Option<PlayerId>),
    ChangeFormation(Formation),
}

/// In-memory state for one team-editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamBuilder {
    selected: Vec<Player>,
    lineup: Lineup,
}

impl TeamBuilder {
    /// A blank team in the given formation.
    pub fn new(formation: Formation) -> Self {
        TeamBuilder {
            selected: Vec::new(),
            lineup: Lineup::new(formation),
        }
    }

    /// Seed the builder from a saved team: its players become the selection,
    /// slots are filled in selection order and the saved captain is restored
    /// when they land on the pitch.
    pub fn from_team(team: &Team) -> Self {
        let formation = team.formation.unwrap_or_default();
        let selected: Vec<Player> = team.members.iter().map(|m| m.player.clone()).collect();
        let mut lineup = Lineup::recompute(formation, &selected);

        if let Some(captain) = team.captain() {
            if lineup.contains(captain.id) {
                lineup.set_captain(Some(captain.id));
            }
        }

        TeamBuilder { selected, lineup }
    }

    pub fn lineup(&self) -> &Lineup {
        &self.lineup
    }

    pub fn formation(&self) -> Formation {
        self.lineup.formation()
    }

    /// Selected players in selection order, assigned or not.
    pub fn selected(&self) -> &[Player] {
        &self.selected
    }

    pub fn is_selected(&self, player_id: PlayerId) -> bool {
        self.selected.iter().any(|p| p.id == player_id)
    }

    /// Selected players that currently have no slot.
    pub fn bench(&self) -> impl Iterator<Item = &Player> {
        self.selected.iter().filter(|p| !self.lineup.contains(p.id))
    }

    /// Apply one edit. Assignment errors leave the builder unchanged.
    pub fn apply(&mut self, action: LineupAction) -> Result<(), AssignError> {
        debug!(?action, "lineup action");
        match action {
            LineupAction::ToggleSelect(player) => {
                if let Some(idx) = self.selected.iter().position(|p| p.id == player.id) {
                    self.selected.remove(idx);
                    self.lineup.remove_player(player.id);
                } else {
                    self.selected.push(player);
                }
                self.rebuild(self.lineup.formation());
            }
            LineupAction::Assign { slot, player } => {
                let incoming = player.clone();
                self.lineup.assign(slot, Some(player))?;
                if !self.is_selected(incoming.id) {
                    self.selected.push(incoming);
                }
            }
            LineupAction::Unassign(slot) => {
                self.lineup.assign(slot, None)?;
            }
            LineupAction::SetCaptain(captain) => {
                self.lineup.set_captain(captain);
            }
            LineupAction::ChangeFormation(formation) => {
                self.rebuild(formation);
            }
        }
        Ok(())
    }

    /// Recompute the slot table from the selection, keeping the captain only
    /// if they still have a slot afterwards.
    fn rebuild(&mut self, formation: Formation) {
        let captain = self.lineup.captain();
        self.lineup = Lineup::recompute(formation, &self.selected);
        if let Some(id) = captain {
            if self.lineup.contains(id) {
                self.lineup.set_captain(Some(id));
            } else {
                debug!(captain = id, "captain stranded by rebuild, clearing");
            }
        }
    }
}

impl Default for TeamBuilder {
    fn default() -> Self {
        TeamBuilder::new(Formation::default())
    }
}
