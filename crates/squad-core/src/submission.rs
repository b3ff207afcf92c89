// Submission validation and payload construction.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::budget::total_cost;
use crate::lineup::Lineup;
use crate::player::PlayerId;

/// Reasons a lineup cannot be submitted. Checked in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineupError {
    #[error("incomplete lineup: {filled} of {required} slots filled")]
    Incomplete { filled: usize, required: usize },

    #[error("player {player_id} is assigned to more than one slot")]
    DuplicatePlayer { player_id: PlayerId },

    #[error("over budget: team costs {total} but the budget is {budget}")]
    OverBudget { total: u32, budget: u32 },

    #[error("no captain selected")]
    NoCaptain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionEntry {
    pub player_id: PlayerId,
    pub is_captain: bool,
}

/// Request body for creating or updating a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSubmission {
    pub formation: String,
    pub players: Vec<SubmissionEntry>,
}

/// Validate `lineup` against `budget` and build the request body.
///
/// Nothing is built unless every check passes, so a partial team can never
/// reach the backend.
pub fn build_submission(lineup: &Lineup, budget: u32) -> Result<TeamSubmission, LineupError> {
    let filled = lineup.filled_count();
    let required = lineup.required_count();
    if filled < required {
        return Err(LineupError::Incomplete { filled, required });
    }

    let mut seen = HashSet::new();
    if let Some(dup) = lineup.assigned().find(|p| !seen.insert(p.id)) {
        return Err(LineupError::DuplicatePlayer { player_id: dup.id });
    }

    let total = total_cost(lineup.assigned());
    if total > budget {
        return Err(LineupError::OverBudget { total, budget });
    }

    let captain = match lineup.captain() {
        Some(id) if lineup.contains(id) => id,
        _ => return Err(LineupError::NoCaptain),
    };

    let players = lineup
        .assigned()
        .map(|p| SubmissionEntry {
            player_id: p.id,
            is_captain: p.id == captain,
        })
        .collect();

    Ok(TeamSubmission {
        formation: lineup.formation().name().to_string(),
        players,
    })
}
