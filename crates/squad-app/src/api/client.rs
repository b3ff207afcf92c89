// HTTP implementation of the backend traits using reqwest.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use squad_core::leaderboard::TeamStanding;
use squad_core::player::{Player, PlayerId};
use squad_core::submission::TeamSubmission;
use squad_core::team::{PlayerStats, Team, TeamDetails, TeamId, UserId};

use super::error::ApiError;
use super::model::{
    AdminPlayer, Game, GameId, LeaderboardFilter, MatchPerformance, MatchRef, NewGame,
    PerformanceRecord, PlayerFilter, SignupRequest, UserAccount,
};
use super::wire::{self, RawCreated, RawCreatedGame, RawGame, RawLockStatus, RawLogin, RawMessage};
use super::{AdminApi, LeagueApi};
use crate::session::Session;

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

const LOGIN: &str = "login";
const SIGNUP: &str = "signup";
const PLAYERS: &str = "api/team/players";
const MY_TEAM: &str = "api/team/my_team";
const LEADERBOARD: &str = "api/team/leaderboard";
const PLAYER_LEADERBOARD: &str = "api/team/players/leaderboard";
const TEAM_DETAILS: &str = "api/team/teams";
const ADMIN: &str = "api/admin";

// ---------------------------------------------------------------------------
// HttpApi
// ---------------------------------------------------------------------------

/// Talks JSON to the league backend. Cheap to clone; clones share the
/// connection pool.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Join a relative path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    fn authed(&self, method: Method, path: &str, session: &Session) -> RequestBuilder {
        self.request(method, path).bearer_auth(session.token())
    }

    /// Send a request and decode a successful body as `T`.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.bytes().await?;

        if !status.is_success() {
            let err = ApiError::from_status(status.as_u16(), &body);
            warn!(status = status.as_u16(), path = %url, "request failed: {err}");
            return Err(err);
        }

        debug!(status = status.as_u16(), path = %url, bytes = body.len(), "response");
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_message(&self, request: RequestBuilder, fallback: &str) -> Result<String, ApiError> {
        let msg: RawMessage = self.send(request).await?;
        Ok(msg.or_default_text(fallback))
    }
}

/// Turn a not-found into "nothing there".
fn optional<T>(result: Result<T, ApiError>) -> Result<Option<T>, ApiError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(ApiError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[derive(Serialize)]
struct PerformanceBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    match_id: Option<GameId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    match_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    match_date: Option<String>,
    players_performance: &'a [PerformanceRecord],
}

impl<'a> From<&'a MatchPerformance> for PerformanceBody<'a> {
    fn from(p: &'a MatchPerformance) -> Self {
        let (match_id, match_name, match_date) = match &p.match_ref {
            MatchRef::Existing(id) => (Some(*id), None, None),
            MatchRef::New { name, date } => (
                None,
                Some(name.as_str()),
                Some(format!("{}T00:00:00", date.format("%Y-%m-%d"))),
            ),
        };
        PerformanceBody {
            match_id,
            match_name,
            match_date,
            players_performance: &p.records,
        }
    }
}

// ---------------------------------------------------------------------------
// LeagueApi
// ---------------------------------------------------------------------------

#[async_trait]
impl LeagueApi for HttpApi {
    async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let req = self
            .request(Method::POST, LOGIN)
            .json(&json!({ "email": email, "password": password }));
        // A 401 here means bad credentials, not an expired session.
        let raw: RawLogin = self.send(req).await.map_err(|e| match e {
            ApiError::Unauthorized(message) => ApiError::Backend {
                status: 401,
                message,
            },
            other => other,
        })?;
        let session =
            Session::from_token(raw.token).map_err(|e| ApiError::Decode(e.to_string()))?;
        info!(user_id = session.user_id(), admin = session.is_admin(), "logged in");
        Ok(session)
    }

    async fn signup(&self, request: &SignupRequest) -> Result<String, ApiError> {
        let req = self.request(Method::POST, SIGNUP).json(request);
        self.send_message(req, "Signup successful").await
    }

    async fn players(&self, session: &Session) -> Result<Vec<Player>, ApiError> {
        let raw = self.send(self.authed(Method::GET, PLAYERS, session)).await?;
        let players = wire::players(raw);
        info!(count = players.len(), "fetched player pool");
        Ok(players)
    }

    async fn my_team(&self, session: &Session) -> Result<Option<Team>, ApiError> {
        let raw: Option<wire::RawTeam> =
            optional(self.send(self.authed(Method::GET, MY_TEAM, session)).await)?;
        if raw.is_none() {
            info!("no saved team yet");
        }
        Ok(raw.map(Team::from))
    }

    async fn create_team(
        &self,
        session: &Session,
        submission: &TeamSubmission,
    ) -> Result<Option<TeamId>, ApiError> {
        let req = self.authed(Method::POST, MY_TEAM, session).json(submission);
        let created: RawCreated = self.send(req).await?;
        info!(team_id = ?created.team_id, "team created");
        Ok(created.team_id)
    }

    async fn update_team(
        &self,
        session: &Session,
        team_id: TeamId,
        submission: &TeamSubmission,
    ) -> Result<(), ApiError> {
        let path = format!("{MY_TEAM}/{team_id}");
        let req = self.authed(Method::PUT, &path, session).json(submission);
        let _: RawMessage = self.send(req).await?;
        info!(team_id, "team updated");
        Ok(())
    }

    async fn leaderboard(
        &self,
        session: &Session,
        filter: &LeaderboardFilter,
    ) -> Result<Vec<TeamStanding>, ApiError> {
        let req = self
            .authed(Method::GET, LEADERBOARD, session)
            .query(&filter.query());
        let raw: Vec<wire::RawStanding> = self.send(req).await?;
        Ok(raw.into_iter().map(TeamStanding::from).collect())
    }

    async fn player_leaderboard(
        &self,
        session: &Session,
        filter: &PlayerFilter,
    ) -> Result<Vec<Player>, ApiError> {
        let req = self
            .authed(Method::GET, PLAYER_LEADERBOARD, session)
            .query(&filter.query());
        Ok(wire::players(self.send(req).await?))
    }

    async fn team_details(
        &self,
        session: &Session,
        team_id: TeamId,
    ) -> Result<TeamDetails, ApiError> {
        let path = format!("{TEAM_DETAILS}/{team_id}");
        let raw: wire::RawTeamDetails = self.send(self.authed(Method::GET, &path, session)).await?;
        Ok(TeamDetails::from(raw))
    }

    async fn player_stats(
        &self,
        session: &Session,
        player_id: PlayerId,
    ) -> Result<PlayerStats, ApiError> {
        let path = format!("{PLAYERS}/{player_id}/stats");
        let raw: wire::RawPlayerStats = self.send(self.authed(Method::GET, &path, session)).await?;
        Ok(PlayerStats::try_from(raw)?)
    }
}

// ---------------------------------------------------------------------------
// AdminApi
// ---------------------------------------------------------------------------

#[async_trait]
impl AdminApi for HttpApi {
    async fn admin_players(&self, session: &Session) -> Result<Vec<AdminPlayer>, ApiError> {
        let path = format!("{ADMIN}/players");
        let raw = self.send(self.authed(Method::GET, &path, session)).await?;
        Ok(wire::admin_players(raw))
    }

    async fn games(&self, session: &Session) -> Result<Vec<Game>, ApiError> {
        let path = format!("{ADMIN}/games");
        let raw: Vec<RawGame> = self.send(self.authed(Method::GET, &path, session)).await?;
        let mut games = Vec::with_capacity(raw.len());
        for g in raw {
            match Game::try_from(g) {
                Ok(game) => games.push(game),
                Err(e) => warn!("dropping game record: {e}"),
            }
        }
        Ok(games)
    }

    async fn create_game(&self, session: &Session, game: &NewGame) -> Result<Game, ApiError> {
        let path = format!("{ADMIN}/games");
        let body = json!({
            "name": game.name,
            "date": format!("{}T00:00:00", game.date.format("%Y-%m-%d")),
        });
        let req = self.authed(Method::POST, &path, session).json(&body);
        let created: RawCreatedGame = self.send(req).await?;
        let game = Game::try_from(created.game)?;
        info!(game_id = game.id, name = %game.name, "game created");
        Ok(game)
    }

    async fn delete_game(&self, session: &Session, game_id: GameId) -> Result<String, ApiError> {
        let path = format!("{ADMIN}/games/{game_id}");
        self.send_message(self.authed(Method::DELETE, &path, session), "Game deleted")
            .await
    }

    async fn add_match_performance(
        &self,
        session: &Session,
        performance: &MatchPerformance,
    ) -> Result<String, ApiError> {
        let path = format!("{ADMIN}/add_match_performance");
        let body = PerformanceBody::from(performance);
        let req = self.authed(Method::POST, &path, session).json(&body);
        let msg = self.send_message(req, "Match performance saved").await?;
        info!(records = performance.records.len(), "match performance submitted");
        Ok(msg)
    }

    async fn reset_player_points(
        &self,
        session: &Session,
        player_id: PlayerId,
    ) -> Result<String, ApiError> {
        let path = format!("{ADMIN}/player_performance/{player_id}");
        self.send_message(self.authed(Method::DELETE, &path, session), "Player points reset")
            .await
    }

    async fn team_updates_locked(&self, session: &Session) -> Result<bool, ApiError> {
        let path = format!("{ADMIN}/team_updates_status");
        let raw: RawLockStatus = self.send(self.authed(Method::GET, &path, session)).await?;
        Ok(raw.updates_locked)
    }

    async fn toggle_team_updates(&self, session: &Session) -> Result<bool, ApiError> {
        let path = format!("{ADMIN}/toggle_team_updates");
        let raw: RawLockStatus = self.send(self.authed(Method::POST, &path, session)).await?;
        info!(locked = raw.updates_locked, "team update lock toggled");
        Ok(raw.updates_locked)
    }

    async fn users(&self, session: &Session) -> Result<Vec<UserAccount>, ApiError> {
        let path = format!("{ADMIN}/users");
        let raw: wire::RawUserList = self.send(self.authed(Method::GET, &path, session)).await?;
        if let Some(total) = raw.total {
            if total != raw.users.len() {
                warn!(total, received = raw.users.len(), "user list total mismatch");
            }
        }
        Ok(raw.users.into_iter().map(UserAccount::from).collect())
    }

    async fn user_team(
        &self,
        session: &Session,
        user_id: UserId,
    ) -> Result<Option<Team>, ApiError> {
        let path = format!("{ADMIN}/user_team/{user_id}");
        let raw: Option<wire::RawTeam> =
            optional(self.send(self.authed(Method::GET, &path, session)).await)?;
        Ok(raw.map(Team::from))
    }

    async fn delete_user(&self, session: &Session, user_id: UserId) -> Result<String, ApiError> {
        let path = format!("{ADMIN}/users/{user_id}");
        self.send_message(self.authed(Method::DELETE, &path, session), "User deleted")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn url_joins_without_double_slashes() {
        let api = HttpApi::new("https://league.example.com/ ");
        assert_eq!(
            api.url("/api/team/players"),
            "https://league.example.com/api/team/players"
        );
        assert_eq!(api.url(LOGIN), "https://league.example.com/login");
    }

    #[test]
    fn performance_body_for_existing_match() {
        let perf = MatchPerformance {
            match_ref: MatchRef::Existing(12),
            records: vec![PerformanceRecord {
                player_id: 4,
                goals: 2,
                ..Default::default()
            }],
        };
        let json = serde_json::to_value(PerformanceBody::from(&perf)).unwrap();
        assert_eq!(json["match_id"], 12);
        assert!(json.get("match_name").is_none());
        assert_eq!(json["players_performance"][0]["goals"], 2);
    }

    #[test]
    fn performance_body_for_new_match() {
        let perf = MatchPerformance {
            match_ref: MatchRef::New {
                name: "Semi final".into(),
                date: NaiveDate::from_ymd_opt(2025, 8, 2).unwrap(),
            },
            records: vec![],
        };
        let json = serde_json::to_value(PerformanceBody::from(&perf)).unwrap();
        assert!(json.get("match_id").is_none());
        assert_eq!(json["match_name"], "Semi final");
        assert_eq!(json["match_date"], "2025-08-02T00:00:00");
    }

    #[test]
    fn optional_maps_not_found_to_none() {
        let r: Result<u8, ApiError> = Err(ApiError::NotFound("No team found".into()));
        assert!(matches!(optional(r), Ok(None)));
        let r: Result<u8, ApiError> = Err(ApiError::Unauthorized("expired".into()));
        assert!(optional(r).is_err());
        assert!(matches!(optional(Ok(3u8)), Ok(Some(3))));
    }
}
