// Formation catalog: the fixed set of line-ups a team can play.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::player::Position;

/// Number of starting slots every formation provides.
pub const LINEUP_SIZE: usize = 11;

/// One of the four supported formations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Formation {
    #[default]
    #[serde(rename = "4-4-2")]
    FourFourTwo,
    #[serde(rename = "4-3-3")]
    FourThreeThree,
    #[serde(rename = "3-5-2")]
    ThreeFiveTwo,
    #[serde(rename = "3-4-3")]
    ThreeFourThree,
}

/// Per-category slot counts for a formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormationCounts {
    pub goalkeepers: usize,
    pub defenders: usize,
    pub midfielders: usize,
    pub attackers: usize,
}

impl FormationCounts {
    pub fn get(&self, position: Position) -> usize {
        match position {
            Position::Goalkeeper => self.goalkeepers,
            Position::Defender => self.defenders,
            Position::Midfielder => self.midfielders,
            Position::Attacker => self.attackers,
        }
    }

    pub fn total(&self) -> usize {
        self.goalkeepers + self.defenders + self.midfielders + self.attackers
    }
}

impl Formation {
    /// Catalog order, used when cycling formations in the UI.
    pub const ALL: [Formation; 4] = [
        Formation::FourFourTwo,
        Formation::FourThreeThree,
        Formation::ThreeFiveTwo,
        Formation::ThreeFourThree,
    ];

    /// Canonical name, as sent to and received from the backend.
    pub fn name(&self) -> &'static str {
        match self {
            Formation::FourFourTwo => "4-4-2",
            Formation::FourThreeThree => "4-3-3",
            Formation::ThreeFiveTwo => "3-5-2",
            Formation::ThreeFourThree => "3-4-3",
        }
    }

    /// Strict lookup by name. Returns `None` for anything outside the catalog.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Formation::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Lenient lookup: unknown or missing names fall back to the default
    /// formation. Formation names come from a closed set, so a miss is
    /// normalised rather than reported.
    pub fn resolve(name: Option<&str>) -> Self {
        match name.and_then(Formation::from_name) {
            Some(f) => f,
            None => {
                debug!(?name, "unrecognised formation, using default");
                Formation::default()
            }
        }
    }

    pub fn counts(&self) -> FormationCounts {
        let (defenders, midfielders, attackers) = match self {
            Formation::FourFourTwo => (4, 4, 2),
            Formation::FourThreeThree => (4, 3, 3),
            Formation::ThreeFiveTwo => (3, 5, 2),
            Formation::ThreeFourThree => (3, 4, 3),
        };
        FormationCounts {
            goalkeepers: 1,
            defenders,
            midfielders,
            attackers,
        }
    }

    /// The formation after this one in catalog order (wraps around).
    pub fn next(&self) -> Self {
        let idx = Formation::ALL.iter().position(|f| f == self).unwrap_or(0);
        Formation::ALL[(idx + 1) % Formation::ALL.len()]
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_formation_has_eleven_slots() {
        for f in Formation::ALL {
            assert_eq!(f.counts().total(), LINEUP_SIZE, "{f} should total 11");
        }
    }

    #[test]
    fn every_formation_has_one_keeper() {
        for f in Formation::ALL {
            assert_eq!(f.counts().get(Position::Goalkeeper), 1);
        }
    }

    #[test]
    fn four_four_two_counts() {
        let c = Formation::FourFourTwo.counts();
        assert_eq!(
            (c.goalkeepers, c.defenders, c.midfielders, c.attackers),
            (1, 4, 4, 2)
        );
    }

    #[test]
    fn three_five_two_counts() {
        let c = Formation::ThreeFiveTwo.counts();
        assert_eq!(c.get(Position::Defender), 3);
        assert_eq!(c.get(Position::Midfielder), 5);
        assert_eq!(c.get(Position::Attacker), 2);
    }

    #[test]
    fn from_name_is_strict() {
        assert_eq!(Formation::from_name("4-3-3"), Some(Formation::FourThreeThree));
        assert_eq!(Formation::from_name(" 3-4-3 "), Some(Formation::ThreeFourThree));
        assert_eq!(Formation::from_name("5-4-1"), None);
    }

    #[test]
    fn resolve_falls_back_to_default() {
        assert_eq!(Formation::resolve(Some("5-4-1")), Formation::FourFourTwo);
        assert_eq!(Formation::resolve(None), Formation::FourFourTwo);
        assert_eq!(Formation::resolve(Some("3-5-2")), Formation::ThreeFiveTwo);
    }

    #[test]
    fn next_cycles_through_catalog() {
        let mut f = Formation::FourFourTwo;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(f);
            f = f.next();
        }
        assert_eq!(f, Formation::FourFourTwo);
        assert_eq!(seen, Formation::ALL.to_vec());
    }

    #[test]
    fn serde_uses_formation_names() {
        assert_eq!(
            serde_json::to_string(&Formation::ThreeFourThree).unwrap(),
            "\"3-4-3\""
        );
        let f: Formation = serde_json::from_str("\"4-3-3\"").unwrap();
        assert_eq!(f, Formation::FourThreeThree);
    }
}
