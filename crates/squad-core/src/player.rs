// Player records and position categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-assigned player identifier.
pub type PlayerId = u32;

/// The four position categories a formation is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "ATT")]
    Attacker,
}

impl Position {
    /// All categories in catalog (pitch) order: keeper first, attack last.
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Attacker,
    ];

    /// Parse a position code into a Position.
    ///
    /// Accepts the backend codes ("GK", "DEF", "MID", "ATT") case-insensitively,
    /// plus the long names and a few common aliases ("FWD", "ST").
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GK" | "GOALKEEPER" | "KEEPER" => Some(Position::Goalkeeper),
            "DEF" | "DEFENDER" => Some(Position::Defender),
            "MID" | "MIDFIELDER" => Some(Position::Midfielder),
            "ATT" | "ATTACKER" | "FWD" | "FORWARD" | "ST" => Some(Position::Attacker),
            _ => None,
        }
    }

    /// Backend wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Attacker => "ATT",
        }
    }

    /// Lower-case prefix used in slot identifiers (`def-2`).
    pub fn slot_prefix(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "gk",
            Position::Defender => "def",
            Position::Midfielder => "mid",
            Position::Attacker => "att",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "Goalkeeper",
            Position::Defender => "Defender",
            Position::Midfielder => "Midfielder",
            Position::Attacker => "Attacker",
        }
    }

    /// Deterministic ordering index for slot display.
    pub fn sort_order(&self) -> u8 {
        match self {
            Position::Goalkeeper => 0,
            Position::Defender => 1,
            Position::Midfielder => 2,
            Position::Attacker => 3,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A player in the league's pool. Owned by the backend; never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub price: u32,
    /// House (team affiliation) label, if the backend provides one.
    #[serde(default)]
    pub house: Option<String>,
    /// Accumulated fantasy points, when the endpoint includes them.
    #[serde(default)]
    pub points: Option<i64>,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, position: Position, price: u32) -> Self {
        Player {
            id,
            name: name.to_string(),
            position,
            price,
            house: None,
            points: None,
        }
    }

    /// Builder-style helper to attach a house label.
    pub fn with_house(mut self, house: &str) -> Self {
        self.house = Some(house.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_code_accepts_backend_codes() {
        assert_eq!(Position::from_code("GK"), Some(Position::Goalkeeper));
        assert_eq!(Position::from_code("def"), Some(Position::Defender));
        assert_eq!(Position::from_code(" Mid "), Some(Position::Midfielder));
        assert_eq!(Position::from_code("ATT"), Some(Position::Attacker));
    }

    #[test]
    fn from_code_accepts_aliases() {
        assert_eq!(Position::from_code("Goalkeeper"), Some(Position::Goalkeeper));
        assert_eq!(Position::from_code("FWD"), Some(Position::Attacker));
    }

    #[test]
    fn from_code_rejects_unknown() {
        assert_eq!(Position::from_code("SP"), None);
        assert_eq!(Position::from_code(""), None);
    }

    #[test]
    fn code_round_trips_through_from_code() {
        for pos in Position::ALL {
            assert_eq!(Position::from_code(pos.code()), Some(pos));
        }
    }

    #[test]
    fn serde_uses_wire_codes() {
        let json = serde_json::to_string(&Position::Defender).unwrap();
        assert_eq!(json, "\"DEF\"");
        let parsed: Position = serde_json::from_str("\"ATT\"").unwrap();
        assert_eq!(parsed, Position::Attacker);
    }

    #[test]
    fn all_is_in_sort_order() {
        let orders: Vec<u8> = Position::ALL.iter().map(|p| p.sort_order()).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }
}
