// Backend access: the trait seams the pages talk to, and the HTTP client
// that implements them.

pub mod client;
pub mod error;
pub mod model;
pub mod wire;

use async_trait::async_trait;

use squad_core::leaderboard::TeamStanding;
use squad_core::player::{Player, PlayerId};
use squad_core::submission::TeamSubmission;
use squad_core::team::{PlayerStats, Team, TeamDetails, TeamId, UserId};

pub use client::HttpApi;
pub use error::ApiError;

use crate::session::Session;
use model::{
    AdminPlayer, Game, GameId, LeaderboardFilter, MatchPerformance, NewGame, PlayerFilter,
    SignupRequest, UserAccount,
};

/// Everything a regular user can do: authenticate, build a team, browse the
/// leaderboards.
#[async_trait]
pub trait LeagueApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError>;

    /// Returns the backend's confirmation message.
    async fn signup(&self, request: &SignupRequest) -> Result<String, ApiError>;

    async fn players(&self, session: &Session) -> Result<Vec<Player>, ApiError>;

    /// `Ok(None)` when the user has not saved a team yet.
    async fn my_team(&self, session: &Session) -> Result<Option<Team>, ApiError>;

    /// Returns the new team's id when the backend reports it.
    async fn create_team(
        &self,
        session: &Session,
        submission: &TeamSubmission,
    ) -> Result<Option<TeamId>, ApiError>;

    async fn update_team(
        &self,
        session: &Session,
        team_id: TeamId,
        submission: &TeamSubmission,
    ) -> Result<(), ApiError>;

    async fn leaderboard(
        &self,
        session: &Session,
        filter: &LeaderboardFilter,
    ) -> Result<Vec<TeamStanding>, ApiError>;

    async fn player_leaderboard(
        &self,
        session: &Session,
        filter: &PlayerFilter,
    ) -> Result<Vec<Player>, ApiError>;

    async fn team_details(&self, session: &Session, team_id: TeamId)
        -> Result<TeamDetails, ApiError>;

    async fn player_stats(
        &self,
        session: &Session,
        player_id: PlayerId,
    ) -> Result<PlayerStats, ApiError>;
}

/// Administrator endpoints. Calls with a non-admin session are refused by the
/// backend.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn admin_players(&self, session: &Session) -> Result<Vec<AdminPlayer>, ApiError>;

    async fn games(&self, session: &Session) -> Result<Vec<Game>, ApiError>;

    async fn create_game(&self, session: &Session, game: &NewGame) -> Result<Game, ApiError>;

    async fn delete_game(&self, session: &Session, game_id: GameId) -> Result<String, ApiError>;

    async fn add_match_performance(
        &self,
        session: &Session,
        performance: &MatchPerformance,
    ) -> Result<String, ApiError>;

    /// Delete every performance record for a player.
    async fn reset_player_points(
        &self,
        session: &Session,
        player_id: PlayerId,
    ) -> Result<String, ApiError>;

    async fn team_updates_locked(&self, session: &Session) -> Result<bool, ApiError>;

    /// Flip the lock and return the new state.
    async fn toggle_team_updates(&self, session: &Session) -> Result<bool, ApiError>;

    async fn users(&self, session: &Session) -> Result<Vec<UserAccount>, ApiError>;

    /// `Ok(None)` when the user has no team.
    async fn user_team(&self, session: &Session, user_id: UserId)
        -> Result<Option<Team>, ApiError>;

    async fn delete_user(&self, session: &Session, user_id: UserId) -> Result<String, ApiError>;
}

/// The full backend surface the orchestrator needs.
pub trait Backend: LeagueApi + AdminApi {}

impl<T: LeagueApi + AdminApi> Backend for T {}
