// Messages between the front end, the orchestrator and its network tasks.

use std::path::PathBuf;

use squad_core::builder::LineupAction;
use squad_core::leaderboard::TeamStanding;
use squad_core::player::{Player, PlayerId};
use squad_core::team::{Team, TeamId, UserId};

use crate::api::model::{
    AdminPlayer, Game, GameId, LeaderboardFilter, MatchRef, NewGame, PlayerFilter, SignupRequest,
    UserAccount,
};
use crate::api::ApiError;
use crate::pages::admin::{AdminPage, AdminTab};
use crate::pages::leaderboard::{Board, Detail, LeaderboardPage};
use crate::pages::team::TeamPage;
use crate::pages::Notice;
use crate::route::Route;
use crate::session::Session;

// ---------------------------------------------------------------------------
// Front end -> orchestrator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Navigate(Route),
    Login { email: String, password: String },
    Signup(SignupRequest),
    Logout,

    // --- team page ---
    ReloadTeam,
    Lineup(LineupAction),
    SaveTeam,

    // --- leaderboard ---
    RefreshLeaderboard,
    SetBoard(Board),
    SetSearch(String),
    SetTeamFilter(LeaderboardFilter),
    SetPlayerFilter(PlayerFilter),
    OpenTeamDetails(TeamId),
    OpenPlayerStats(PlayerId),
    CloseDetail,

    // --- admin ---
    RefreshAdmin,
    SetAdminTab(AdminTab),
    SetHouseFirst(Option<String>),
    CycleUserFilter,
    CreateGame(NewGame),
    DeleteGame(GameId),
    ImportPerformance { match_ref: MatchRef, path: PathBuf },
    ResetPlayerPoints(PlayerId),
    ToggleTeamUpdates,
    ViewUserTeam(UserId),
    DeleteUser(UserId),

    Quit,
}

// ---------------------------------------------------------------------------
// Orchestrator -> front end
// ---------------------------------------------------------------------------

/// Everything the front end needs to draw one frame.
#[derive(Debug, Clone)]
pub struct AppSnapshot {
    pub route: Route,
    pub tabs: Vec<Route>,
    pub user_name: Option<String>,
    pub is_admin: bool,
    pub league_name: String,
    pub houses: Vec<String>,
    pub team: TeamPage,
    pub leaderboard: LeaderboardPage,
    pub admin: AdminPage,
    /// App-wide message (login errors, session expiry).
    pub notice: Option<Notice>,
    /// Some request is in flight.
    pub busy: bool,
}

#[derive(Debug, Clone)]
pub enum UiUpdate {
    Snapshot(Box<AppSnapshot>),
}

// ---------------------------------------------------------------------------
// Network tasks -> orchestrator
// ---------------------------------------------------------------------------

/// Completed network work, sent back by spawned tasks.
#[derive(Debug)]
pub enum TaskResult {
    LoggedIn(Result<Session, ApiError>),
    SignedUp(Result<String, ApiError>),
    TeamLoaded {
        generation: u64,
        result: Result<(Vec<Player>, Option<Team>), ApiError>,
    },
    TeamSaved(Result<Option<TeamId>, ApiError>),
    Teams {
        generation: u64,
        result: Result<Vec<TeamStanding>, ApiError>,
    },
    Players {
        generation: u64,
        result: Result<Vec<Player>, ApiError>,
    },
    Detail(Result<Detail, ApiError>),
    AdminLoaded(Result<AdminData, ApiError>),
    UserTeam {
        user_id: UserId,
        result: Result<Option<Team>, ApiError>,
    },
    LockToggled(Result<bool, ApiError>),
    /// A mutating admin call finished; the admin data is reloaded after.
    AdminAction(Result<String, ApiError>),
}

/// Everything the admin page shows, fetched together.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminData {
    pub players: Vec<AdminPlayer>,
    pub games: Vec<Game>,
    pub users: Vec<UserAccount>,
    pub updates_locked: bool,
}

impl TaskResult {
    /// The error of a call made with a session. Login and signup failures
    /// are excluded: a 401 there means bad credentials, not an expired token.
    pub fn session_error(&self) -> Option<&ApiError> {
        match self {
            TaskResult::LoggedIn(_) | TaskResult::SignedUp(_) => None,
            TaskResult::TeamLoaded { result, .. } => result.as_ref().err(),
            TaskResult::TeamSaved(r) => r.as_ref().err(),
            TaskResult::Teams { result, .. } => result.as_ref().err(),
            TaskResult::Players { result, .. } => result.as_ref().err(),
            TaskResult::Detail(r) => r.as_ref().err(),
            TaskResult::AdminLoaded(r) => r.as_ref().err(),
            TaskResult::UserTeam { result, .. } => result.as_ref().err(),
            TaskResult::LockToggled(r) => r.as_ref().err(),
            TaskResult::AdminAction(r) => r.as_ref().err(),
        }
    }
}
