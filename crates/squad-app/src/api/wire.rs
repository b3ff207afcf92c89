// Raw backend payloads and their validation into typed values.
//
// Every response is deserialised into a permissive `Raw*` struct first, then
// checked here. Records that cannot be represented (unknown position,
// negative price) are rejected; formation names outside the catalog are
// normalised to "no formation".

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use squad_core::formation::Formation;
use squad_core::leaderboard::TeamStanding;
use squad_core::player::{Player, PlayerId, Position};
use squad_core::team::{PlayerStats, Team, TeamDetails, TeamId, TeamMember, UserId};

use super::model::{AdminPlayer, Game, GameId, LatestPerformance, UserAccount, UserTeamSummary};
use crate::session::UserType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("player {id}: unknown position `{position}`")]
    UnknownPosition { id: PlayerId, position: String },

    #[error("player {id}: negative price {price}")]
    NegativePrice { id: PlayerId, price: i64 },

    #[error("game {id}: unreadable date `{date}`")]
    BadDate { id: GameId, date: String },
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayer {
    pub id: PlayerId,
    pub name: String,
    pub position: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub house: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub total_points: Option<i64>,
}

impl TryFrom<RawPlayer> for Player {
    type Error = SchemaError;

    fn try_from(raw: RawPlayer) -> Result<Self, Self::Error> {
        let position =
            Position::from_code(&raw.position).ok_or_else(|| SchemaError::UnknownPosition {
                id: raw.id,
                position: raw.position.clone(),
            })?;
        let price = u32::try_from(raw.price).map_err(|_| SchemaError::NegativePrice {
            id: raw.id,
            price: raw.price,
        })?;
        let mut player = Player::new(raw.id, raw.name.trim(), position, price);
        if let Some(house) = raw.house.as_deref().filter(|h| !h.trim().is_empty()) {
            player = player.with_house(house);
        }
        player.points = raw.points.or(raw.total_points);
        Ok(player)
    }
}

/// Convert a list, dropping (and logging) records that fail validation.
pub fn players(raw: Vec<RawPlayer>) -> Vec<Player> {
    raw.into_iter()
        .filter_map(|r| match Player::try_from(r) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("dropping player record: {e}");
                None
            }
        })
        .collect()
}

fn formation(name: Option<&str>) -> Option<Formation> {
    let name = name?;
    let f = Formation::from_name(name);
    if f.is_none() {
        debug!(name, "ignoring unknown formation from backend");
    }
    f
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeamPlayer {
    #[serde(flatten)]
    pub player: RawPlayer,
    #[serde(default)]
    pub is_captain: bool,
}

fn members(raw: Vec<RawTeamPlayer>) -> Vec<TeamMember> {
    raw.into_iter()
        .filter_map(|r| match Player::try_from(r.player) {
            Ok(player) => Some(TeamMember {
                player,
                is_captain: r.is_captain,
            }),
            Err(e) => {
                warn!("dropping team member: {e}");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeam {
    pub id: TeamId,
    #[serde(default)]
    pub name: Option<String>,
    pub user_id: UserId,
    #[serde(default)]
    pub formation: Option<String>,
    #[serde(default)]
    pub players: Vec<RawTeamPlayer>,
    #[serde(default)]
    pub total_points: Option<i64>,
    #[serde(default)]
    pub rank: Option<u32>,
}

impl From<RawTeam> for Team {
    fn from(raw: RawTeam) -> Self {
        Team {
            id: raw.id,
            name: raw.name,
            user_id: raw.user_id,
            formation: formation(raw.formation.as_deref()),
            members: members(raw.players),
            total_points: raw.total_points.unwrap_or(0),
            rank: raw.rank,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeamDetails {
    pub id: TeamId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub formation: Option<String>,
    #[serde(default)]
    pub total_points: i64,
    #[serde(default)]
    pub players: Vec<RawTeamPlayer>,
}

impl From<RawTeamDetails> for TeamDetails {
    fn from(raw: RawTeamDetails) -> Self {
        TeamDetails {
            id: raw.id,
            name: raw.name,
            user_name: raw.user_name,
            formation: formation(raw.formation.as_deref()),
            total_points: raw.total_points,
            members: members(raw.players),
        }
    }
}

/// Response to creating a team.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCreated {
    #[serde(default)]
    pub team_id: Option<TeamId>,
}

// ---------------------------------------------------------------------------
// Leaderboards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RawStanding {
    pub team_id: TeamId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    /// Older responses use `name` for the team name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub total_points: Option<i64>,
}

impl From<RawStanding> for TeamStanding {
    fn from(raw: RawStanding) -> Self {
        TeamStanding {
            team_id: raw.team_id,
            user_name: raw.user_name,
            team_name: raw.team_name.or(raw.name),
            total_points: raw.total_points.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayerStats {
    #[serde(flatten)]
    pub player: RawPlayer,
    #[serde(default)]
    pub teams_count: u32,
    #[serde(default)]
    pub captain_count: u32,
}

impl TryFrom<RawPlayerStats> for PlayerStats {
    type Error = SchemaError;

    fn try_from(raw: RawPlayerStats) -> Result<Self, Self::Error> {
        let player = Player::try_from(raw.player)?;
        Ok(PlayerStats {
            total_points: player.points.unwrap_or(0),
            player,
            teams_count: raw.teams_count,
            captain_count: raw.captain_count,
        })
    }
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RawAdminPlayer {
    #[serde(flatten)]
    pub player: RawPlayer,
    #[serde(default)]
    pub latest_performance: Option<LatestPerformance>,
}

pub fn admin_players(raw: Vec<RawAdminPlayer>) -> Vec<AdminPlayer> {
    raw.into_iter()
        .filter_map(|r| match Player::try_from(r.player) {
            Ok(player) => Some(AdminPlayer {
                player,
                latest: r.latest_performance,
            }),
            Err(e) => {
                warn!("dropping admin player record: {e}");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGame {
    pub id: GameId,
    pub name: String,
    pub date: String,
}

impl TryFrom<RawGame> for Game {
    type Error = SchemaError;

    /// Dates arrive as ISO timestamps; only the calendar date is kept.
    fn try_from(raw: RawGame) -> Result<Self, Self::Error> {
        let date = raw
            .date
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .ok_or_else(|| SchemaError::BadDate {
                id: raw.id,
                date: raw.date.clone(),
            })?;
        Ok(Game {
            id: raw.id,
            name: raw.name,
            date,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCreatedGame {
    pub game: RawGame,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLockStatus {
    pub updates_locked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUserTeam {
    pub id: TeamId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formation: Option<String>,
    #[serde(default)]
    pub total_points: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub house: Option<String>,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub team: Option<RawUserTeam>,
}

impl From<RawUser> for UserAccount {
    fn from(raw: RawUser) -> Self {
        let user_type = match raw.user_type.as_deref().map(str::to_lowercase).as_deref() {
            Some("student") => Some(UserType::Student),
            Some("teacher") => Some(UserType::Teacher),
            _ => None,
        };
        UserAccount {
            id: raw.id,
            name: raw.name,
            email: raw.email,
            user_type,
            house: raw.house,
            batch: raw.batch,
            is_admin: raw.is_admin,
            team: raw.team.map(|t| UserTeamSummary {
                id: t.id,
                name: t.name,
                formation: formation(t.formation.as_deref()),
                total_points: t.total_points,
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUserList {
    #[serde(default)]
    pub users: Vec<RawUser>,
    #[serde(default)]
    pub total: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub message: Option<String>,
}

impl RawMessage {
    pub fn or_default_text(self, fallback: &str) -> String {
        self.message.unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLogin {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_player(v: serde_json::Value) -> RawPlayer {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn player_validates_position_and_price() {
        let ok = Player::try_from(raw_player(
            json!({"id": 1, "name": " Kabir ", "position": "MID", "price": 9, "house": "Tata"}),
        ))
        .unwrap();
        assert_eq!(ok.position, Position::Midfielder);
        assert_eq!(ok.name, "Kabir");
        assert_eq!(ok.house.as_deref(), Some("Tata"));

        let blank_house = Player::try_from(raw_player(
            json!({"id": 4, "name": "y", "position": "DEF", "price": 6, "house": "  "}),
        ))
        .unwrap();
        assert_eq!(blank_house.house, None);

        let bad_pos = Player::try_from(raw_player(
            json!({"id": 2, "name": "x", "position": "SWEEPER", "price": 9}),
        ));
        assert!(matches!(bad_pos, Err(SchemaError::UnknownPosition { id: 2, .. })));

        let bad_price =
            Player::try_from(raw_player(json!({"id": 3, "name": "x", "position": "GK", "price": -4})));
        assert!(matches!(bad_price, Err(SchemaError::NegativePrice { price: -4, .. })));
    }

    #[test]
    fn player_list_drops_invalid_records() {
        let list = players(vec![
            raw_player(json!({"id": 1, "name": "a", "position": "GK", "price": 5})),
            raw_player(json!({"id": 2, "name": "b", "position": "??", "price": 5})),
        ]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn team_normalises_formation_and_reads_captain() {
        let raw: RawTeam = serde_json::from_value(json!({
            "id": 5, "name": "Blues", "user_id": 9, "formation": "9-0-1",
            "players": [
                {"id": 1, "name": "a", "position": "GK", "price": 5, "is_captain": true},
                {"id": 2, "name": "b", "position": "DEF", "price": 6}
            ],
            "captain": {"id": 1}
        }))
        .unwrap();
        let team = Team::from(raw);
        assert_eq!(team.formation, None);
        assert_eq!(team.captain().map(|p| p.id), Some(1));
        assert_eq!(team.members.len(), 2);
        assert_eq!(team.total_points, 0);
    }

    #[test]
    fn standing_falls_back_to_name_field() {
        let raw: RawStanding =
            serde_json::from_value(json!({"team_id": 4, "name": "Reds", "total_points": 12}))
                .unwrap();
        let s = TeamStanding::from(raw);
        assert_eq!(s.display_name(), "Reds");
        assert_eq!(s.total_points, 12);
    }

    #[test]
    fn player_stats_take_total_points() {
        let raw: RawPlayerStats = serde_json::from_value(json!({
            "id": 8, "name": "p", "position": "ATT", "price": 11, "house": "Jaipur",
            "total_points": 40, "teams_count": 12, "captain_count": 3
        }))
        .unwrap();
        let stats = PlayerStats::try_from(raw).unwrap();
        assert_eq!(stats.total_points, 40);
        assert_eq!(stats.teams_count, 12);
    }

    #[test]
    fn game_date_keeps_calendar_day() {
        let game = Game::try_from(RawGame {
            id: 1,
            name: "House final".into(),
            date: "2025-06-14T00:00:00".into(),
        })
        .unwrap();
        assert_eq!(game.date, NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());

        assert!(Game::try_from(RawGame {
            id: 2,
            name: "x".into(),
            date: "soon".into(),
        })
        .is_err());
    }

    #[test]
    fn user_type_is_parsed_leniently() {
        let raw: RawUser = serde_json::from_value(json!({
            "id": 3, "name": "T", "email": "t@x", "user_type": "Teacher",
            "team": {"id": 2, "name": "Staff", "formation": "4-3-3", "total_points": 7}
        }))
        .unwrap();
        let user = UserAccount::from(raw);
        assert_eq!(user.user_type, Some(UserType::Teacher));
        assert_eq!(
            user.team.and_then(|t| t.formation),
            Some(Formation::FourThreeThree)
        );
    }
}
