// Saved teams as returned by the backend.

use serde::{Deserialize, Serialize};

use crate::formation::Formation;
use crate::player::Player;

pub type TeamId = u32;
pub type UserId = u32;

/// A player on a saved team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub player: Player,
    pub is_captain: bool,
}

/// A persisted team. Points and rank are authoritative from the backend and
/// only ever displayed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: Option<String>,
    pub user_id: UserId,
    /// `None` when the backend stored no formation or an unknown one.
    pub formation: Option<Formation>,
    pub members: Vec<TeamMember>,
    pub total_points: i64,
    pub rank: Option<u32>,
}

impl Team {
    /// The first member flagged as captain.
    pub fn captain(&self) -> Option<&Player> {
        self.members
            .iter()
            .find(|m| m.is_captain)
            .map(|m| &m.player)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.members.iter().map(|m| &m.player)
    }

    /// Sum of member prices at the time of fetching.
    pub fn cost(&self) -> u32 {
        crate::budget::total_cost(self.players())
    }
}

/// Read-only team summary shown from the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDetails {
    pub id: TeamId,
    pub name: Option<String>,
    pub user_name: Option<String>,
    pub formation: Option<Formation>,
    pub total_points: i64,
    pub members: Vec<TeamMember>,
}

/// Per-player popularity and points, shown from the player leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player: Player,
    pub total_points: i64,
    pub teams_count: u32,
    pub captain_count: u32,
}
