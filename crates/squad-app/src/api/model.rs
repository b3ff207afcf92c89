// Request and response types for endpoints outside the team-building core:
// signup, leaderboard filters and the admin screens.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use squad_core::formation::Formation;
use squad_core::player::{Player, PlayerId, Position};
use squad_core::team::{TeamId, UserId};

use crate::session::UserType;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Only students belong to a house.
    pub house: Option<String>,
    pub user_type: UserType,
}

impl SignupRequest {
    /// Form-level checks before anything is sent.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} is required"));
            }
        }
        if !self.email.contains('@') {
            return Err("email address looks invalid".into());
        }
        match (self.user_type, self.house.as_deref()) {
            (UserType::Student, None) | (UserType::Student, Some("")) => {
                Err("house is required for students".into())
            }
            _ => Ok(()),
        }
    }

    /// Teachers never send a house.
    pub fn normalised(mut self) -> Self {
        if self.user_type == UserType::Teacher {
            self.house = None;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Leaderboard filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderboardFilter {
    pub house: Option<String>,
    pub batch: Option<String>,
    pub user_type: Option<UserType>,
}

impl LeaderboardFilter {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(ref h) = self.house {
            q.push(("house", h.clone()));
        }
        if let Some(ref b) = self.batch {
            q.push(("batch", b.clone()));
        }
        if let Some(t) = self.user_type {
            q.push(("user_type", t.label().to_string()));
        }
        q
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerFilter {
    pub house: Option<String>,
    pub position: Option<Position>,
}

impl PlayerFilter {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(ref h) = self.house {
            q.push(("house", h.clone()));
        }
        if let Some(p) = self.position {
            q.push(("position", p.code().to_string()));
        }
        q
    }
}

// ---------------------------------------------------------------------------
// Games and match performances
// ---------------------------------------------------------------------------

pub type GameId = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub name: String,
    pub date: NaiveDate,
}

/// One player's line in a match report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub player_id: PlayerId,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default, deserialize_with = "flag")]
    pub clean_sheet: bool,
    #[serde(default)]
    pub goals_conceded: u32,
    #[serde(default)]
    pub yellow_cards: u32,
    #[serde(default)]
    pub red_cards: u32,
    #[serde(default)]
    pub minutes_played: u32,
    #[serde(default)]
    pub bonus_points: u32,
}

/// Accepts JSON booleans as well as the `1`/`0`/`yes`/`no` spellings common
/// in spreadsheets.
fn flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Flag::deserialize(de)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(n) => Ok(n != 0),
        Flag::Text(s) => match s.trim().to_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Ok(true),
            "false" | "f" | "no" | "n" | "0" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a yes/no value, got `{other}`"
            ))),
        },
    }
}

/// Which match a performance report belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRef {
    Existing(GameId),
    /// Created by the backend if no match with this name exists.
    New { name: String, date: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPerformance {
    pub match_ref: MatchRef,
    pub records: Vec<PerformanceRecord>,
}

/// A player's most recent match line, as shown in the admin player list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LatestPerformance {
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub clean_sheet: bool,
    #[serde(default)]
    pub goals_conceded: u32,
    #[serde(default)]
    pub yellow_cards: u32,
    #[serde(default)]
    pub red_cards: u32,
    #[serde(default)]
    pub minutes_played: u32,
    #[serde(default)]
    pub bonus_points: u32,
    pub match_name: Option<String>,
    pub match_date: Option<String>,
    pub match_id: Option<GameId>,
}

/// A player with accumulated points (in `player.points`) and latest match.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminPlayer {
    pub player: Player,
    pub latest: Option<LatestPerformance>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTeamSummary {
    pub id: TeamId,
    pub name: Option<String>,
    pub formation: Option<Formation>,
    pub total_points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub user_type: Option<UserType>,
    pub house: Option<String>,
    pub batch: Option<String>,
    pub is_admin: bool,
    pub team: Option<UserTeamSummary>,
}
