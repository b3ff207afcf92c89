// Leaderboard entries, ranking and search.

use serde::{Deserialize, Serialize};

use crate::picker::name_matches;
use crate::player::Player;
use crate::team::TeamId;

/// One row of the team leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team_id: TeamId,
    pub user_name: Option<String>,
    pub team_name: Option<String>,
    pub total_points: i64,
}

impl TeamStanding {
    /// Owner's name, falling back to the team name.
    pub fn display_name(&self) -> &str {
        self.user_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.team_name.as_deref())
            .unwrap_or("Unnamed team")
    }
}

/// Anything with points and a name can be ranked and searched.
pub trait Standing {
    fn points(&self) -> i64;
    fn name(&self) -> &str;
}

impl Standing for TeamStanding {
    fn points(&self) -> i64 {
        self.total_points
    }

    fn name(&self) -> &str {
        self.display_name()
    }
}

impl Standing for Player {
    fn points(&self) -> i64 {
        self.points.unwrap_or(0)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub rank: u32,
    pub entry: T,
}

/// Sort by points descending (stable) and assign competition ranks: equal
/// points share a rank and the next rank skips, e.g. 1, 2, 2, 4.
pub fn rank<T: Standing>(mut entries: Vec<T>) -> Vec<Ranked<T>> {
    entries.sort_by(|a, b| b.points().cmp(&a.points()));

    let mut out = Vec::with_capacity(entries.len());
    let mut prev: Option<(i64, u32)> = None;
    for (i, entry) in entries.into_iter().enumerate() {
        let position = i as u32 + 1;
        let rank = match prev {
            Some((points, rank)) if points == entry.points() => rank,
            _ => position,
        };
        prev = Some((entry.points(), rank));
        out.push(Ranked { rank, entry });
    }
    out
}

/// Client-side name search over ranked rows. Ranks are kept from the full
/// list.
pub fn search<'a, T: Standing>(rows: &'a [Ranked<T>], query: &str) -> Vec<&'a Ranked<T>> {
    rows.iter()
        .filter(|r| name_matches(r.entry.name(), query))
        .collect()
}
