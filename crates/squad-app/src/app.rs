// Application state and orchestration logic.
//
// The central event loop that coordinates user commands from the front end
// with the results of spawned network tasks. Owns the session and every page
// controller, and pushes a fresh snapshot to the front end after each event.

use std::collections::HashSet;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use squad_core::builder::LineupAction;
use squad_core::player::PlayerId;
use squad_core::team::{TeamId, UserId};

use crate::api::model::{GameId, MatchRef, NewGame, SignupRequest};
use crate::api::{ApiError, Backend};
use crate::config::Config;
use crate::import::load_performance_csv;
use crate::pages::admin::{build_match_performance, check_delete_user, AdminError, AdminPage};
use crate::pages::leaderboard::{Board, Detail, LeaderboardPage};
use crate::pages::team::{load_team_page, save_team, TeamPage, TeamPageState};
use crate::pages::Notice;
use crate::protocol::{AdminData, AppSnapshot, TaskResult, UiUpdate, UserCommand};
use crate::route::{guard, home, Route};
use crate::session::{Session, SessionStore};

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Network operations that allow a single outstanding request each. Team
/// loading and the leaderboards are not listed: a newer request replaces the
/// older one instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    Signup,
    Detail,
    LoadAdmin,
    UserTeam,
    ToggleLock,
    AdminAction,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub config: Config,
    api: Arc<dyn Backend>,
    store: SessionStore,
    pub session: Option<Session>,
    pub route: Route,
    pub team: TeamPage,
    pub leaderboard: LeaderboardPage,
    pub admin: AdminPage,
    /// App-wide message, shown regardless of the page.
    pub notice: Option<Notice>,
    in_flight: HashSet<Operation>,
    /// Bumped on every team load; results from older loads are discarded.
    team_generation: u64,
    team_task: Option<JoinHandle<()>>,
    leaderboard_task: Option<JoinHandle<()>>,
    /// Spawned tasks report back through a clone of this sender.
    result_tx: mpsc::Sender<TaskResult>,
}

impl AppState {
    /// Create the state, restoring a saved session when there is one.
    pub fn new(
        config: Config,
        api: Arc<dyn Backend>,
        store: SessionStore,
        result_tx: mpsc::Sender<TaskResult>,
    ) -> Self {
        let session = match store.load() {
            Ok(session) => session,
            Err(e) => {
                warn!("Ignoring saved session: {}", e);
                None
            }
        };
        if let Some(s) = &session {
            info!(user_id = s.user_id(), "Restored saved session");
        }
        let route = session.as_ref().map(home).unwrap_or(Route::Login);

        AppState {
            team: TeamPage::new(config.league.budget, config.league.formation()),
            leaderboard: LeaderboardPage::default(),
            admin: AdminPage::default(),
            config,
            api,
            store,
            session,
            route,
            notice: None,
            in_flight: HashSet::new(),
            team_generation: 0,
            team_task: None,
            leaderboard_task: None,
            result_tx,
        }
    }

    /// First action after startup: log in from the credentials file when no
    /// session was restored, otherwise load the landing page.
    pub fn start(&mut self) {
        if self.session.is_none() {
            let pair = self
                .config
                .credentials
                .login_pair()
                .map(|(e, p)| (e.to_string(), p.to_string()));
            if let Some((email, password)) = pair {
                info!("Logging in with configured credentials");
                self.login(email, password);
                return;
            }
        }
        self.enter_route();
    }

    pub fn build_snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            route: self.route,
            tabs: Route::tabs(self.session.as_ref()),
            user_name: self.session.as_ref().map(|s| s.display_name().to_string()),
            is_admin: self.session.as_ref().is_some_and(Session::is_admin),
            league_name: self.config.league.name.clone(),
            houses: self.config.league.houses.clone(),
            team: self.team.clone(),
            leaderboard: self.leaderboard.clone(),
            admin: self.admin.clone(),
            notice: self.notice.clone(),
            busy: self.is_busy(),
        }
    }

    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty()
            || self.leaderboard.is_loading()
            || self.team.state() == TeamPageState::Submitting
            || self.team_task.is_some()
    }

    // --- task plumbing ---

    /// Run a network call in the background; its result comes back on the
    /// task channel.
    fn spawn<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = task.await;
            if tx.send(result).await.is_err() {
                debug!("Task channel closed, dropping result");
            }
        })
    }

    /// Claim an operation. Returns false if one is already running.
    fn begin(&mut self, op: Operation) -> bool {
        if !self.in_flight.insert(op) {
            debug!(?op, "Request already in flight, ignoring");
            return false;
        }
        true
    }

    fn finish(&mut self, op: Operation) {
        self.in_flight.remove(&op);
    }

    /// Cancel background work tied to the current session.
    pub fn cancel_tasks(&mut self) {
        if let Some(handle) = self.team_task.take() {
            handle.abort();
        }
        if let Some(handle) = self.leaderboard_task.take() {
            handle.abort();
        }
        self.in_flight.clear();
    }

    /// The current session, or a redirect to Login when there is none.
    fn require_session(&mut self) -> Option<Session> {
        if self.session.is_none() {
            self.route = Route::Login;
        }
        self.session.clone()
    }

    /// The current session if it belongs to an administrator.
    fn require_admin(&mut self) -> Option<Session> {
        let session = self.require_session()?;
        if !session.is_admin() {
            warn!("Admin command from a non-admin session, ignoring");
            return None;
        }
        Some(session)
    }

    // --- navigation and auth ---

    pub fn navigate(&mut self, requested: Route) {
        let target = guard(requested, self.session.as_ref());
        if target != requested {
            info!("Redirected from {:?} to {:?}", requested, target);
        }
        if self.route == Route::MyTeam && self.team.state() == TeamPageState::Editing {
            info!("Leaving the team page, unsaved edits dropped");
        }
        self.route = target;
        self.enter_route();
    }

    /// Fetch whatever the current route shows.
    fn enter_route(&mut self) {
        match self.route {
            Route::MyTeam => self.load_team(),
            Route::Leaderboard => self.refresh_leaderboard(),
            Route::Admin => self.load_admin(),
            Route::Login | Route::Signup | Route::Scoring => {}
        }
    }

    pub fn login(&mut self, email: String, password: String) {
        if email.trim().is_empty() || password.is_empty() {
            self.notice = Some(Notice::error("email and password are required"));
            return;
        }
        if !self.begin(Operation::Login) {
            return;
        }
        self.notice = Some(Notice::info("Logging in..."));
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            TaskResult::LoggedIn(api.login(email.trim(), &password).await)
        });
    }

    pub fn signup(&mut self, request: SignupRequest) {
        if let Err(msg) = request.validate() {
            self.notice = Some(Notice::error(msg));
            return;
        }
        if !self.begin(Operation::Signup) {
            return;
        }
        let request = request.normalised();
        let api = Arc::clone(&self.api);
        self.spawn(async move { TaskResult::SignedUp(api.signup(&request).await) });
    }

    /// Drop the session and everything loaded under it.
    fn end_session(&mut self) {
        self.cancel_tasks();
        self.session = None;
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear saved session: {}", e);
        }
        self.team = TeamPage::new(self.config.league.budget, self.config.league.formation());
        self.leaderboard = LeaderboardPage::default();
        self.admin = AdminPage::default();
        self.route = Route::Login;
    }

    pub fn logout(&mut self) {
        info!("Logging out");
        self.end_session();
        self.notice = Some(Notice::info("Logged out"));
    }

    fn expire_session(&mut self, err: &ApiError) {
        warn!("Session rejected by backend: {}", err);
        self.end_session();
        self.notice = Some(Notice::error("Session expired, please log in again"));
    }

    // --- team page ---

    pub fn load_team(&mut self) {
        self.start_team_load(false);
    }

    /// Fetch the team again after a save so the stored record, including its
    /// id, replaces the local copy.
    fn refresh_saved_team(&mut self) {
        self.start_team_load(true);
    }

    fn start_team_load(&mut self, keep_notice: bool) {
        let Some(session) = self.require_session() else {
            return;
        };
        let started = if keep_notice {
            self.team.begin_refresh()
        } else {
            self.team.begin_load()
        };
        if let Err(e) = started {
            debug!("Team load refused: {}", e);
            return;
        }
        if let Some(handle) = self.team_task.take() {
            handle.abort();
        }
        self.team_generation += 1;
        let generation = self.team_generation;

        let api = Arc::clone(&self.api);
        let handle = self.spawn(async move {
            TaskResult::TeamLoaded {
                generation,
                result: load_team_page(api.as_ref(), &session).await,
            }
        });
        self.team_task = Some(handle);
        debug!(generation, "Team load started");
    }

    pub fn edit_team(&mut self, action: LineupAction) {
        if let Err(e) = self.team.edit(action) {
            debug!("Lineup edit refused: {}", e);
            self.notice = Some(Notice::error(e.to_string()));
        }
    }

    pub fn save_team(&mut self) {
        let Some(session) = self.require_session() else {
            return;
        };
        let request = match self.team.begin_submit() {
            Ok(request) => request,
            Err(e) => {
                // The page already carries the reason.
                debug!("Save refused: {}", e);
                return;
            }
        };
        info!(
            team_id = ?request.team_id,
            formation = %request.body.formation,
            "Saving team"
        );
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            TaskResult::TeamSaved(save_team(api.as_ref(), &session, &request).await)
        });
    }

    // --- leaderboard ---

    pub fn refresh_leaderboard(&mut self) {
        let Some(session) = self.require_session() else {
            return;
        };
        if let Some(handle) = self.leaderboard_task.take() {
            handle.abort();
        }
        let generation = self.leaderboard.begin_fetch();
        let api = Arc::clone(&self.api);

        let handle = match self.leaderboard.board() {
            Board::Teams => {
                let filter = self.leaderboard.team_filter.clone();
                self.spawn(async move {
                    TaskResult::Teams {
                        generation,
                        result: api.leaderboard(&session, &filter).await,
                    }
                })
            }
            Board::Players => {
                let filter = self.leaderboard.player_filter.clone();
                self.spawn(async move {
                    TaskResult::Players {
                        generation,
                        result: api.player_leaderboard(&session, &filter).await,
                    }
                })
            }
        };
        self.leaderboard_task = Some(handle);
    }

    pub fn open_team_details(&mut self, team_id: TeamId) {
        let Some(session) = self.require_session() else {
            return;
        };
        if !self.begin(Operation::Detail) {
            return;
        }
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            TaskResult::Detail(api.team_details(&session, team_id).await.map(Detail::Team))
        });
    }

    pub fn open_player_stats(&mut self, player_id: PlayerId) {
        let Some(session) = self.require_session() else {
            return;
        };
        if !self.begin(Operation::Detail) {
            return;
        }
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            TaskResult::Detail(
                api.player_stats(&session, player_id)
                    .await
                    .map(Detail::Player),
            )
        });
    }

    // --- admin ---

    pub fn load_admin(&mut self) {
        let Some(session) = self.require_admin() else {
            return;
        };
        if !self.begin(Operation::LoadAdmin) {
            return;
        }
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            let result = async {
                let (players, games, users, updates_locked) = tokio::try_join!(
                    api.admin_players(&session),
                    api.games(&session),
                    api.users(&session),
                    api.team_updates_locked(&session),
                )?;
                Ok::<_, ApiError>(AdminData {
                    players,
                    games,
                    users,
                    updates_locked,
                })
            }
            .await;
            TaskResult::AdminLoaded(result)
        });
    }

    /// Start a mutating admin call. The admin data reloads when it finishes.
    fn admin_action<F, Fut>(&mut self, call: F)
    where
        F: FnOnce(Arc<dyn Backend>, Session) -> Fut,
        Fut: Future<Output = Result<String, ApiError>> + Send + 'static,
    {
        let Some(session) = self.require_admin() else {
            return;
        };
        if !self.begin(Operation::AdminAction) {
            self.admin
                .set_notice(Notice::error("another admin action is still running"));
            return;
        }
        let fut = call(Arc::clone(&self.api), session);
        self.spawn(async move { TaskResult::AdminAction(fut.await) });
    }

    pub fn create_game(&mut self, game: NewGame) {
        if game.name.trim().is_empty() {
            self.admin
                .set_notice(Notice::error(AdminError::MissingMatchName.to_string()));
            return;
        }
        self.admin_action(move |api, session| async move {
            let created = api.create_game(&session, &game).await?;
            Ok(format!("Game '{}' created", created.name))
        });
    }

    pub fn delete_game(&mut self, game_id: GameId) {
        self.admin_action(move |api, session| async move {
            api.delete_game(&session, game_id).await
        });
    }

    pub fn reset_player_points(&mut self, player_id: PlayerId) {
        self.admin_action(move |api, session| async move {
            api.reset_player_points(&session, player_id).await
        });
    }

    pub fn delete_user(&mut self, user_id: UserId) {
        let Some(session) = self.require_admin() else {
            return;
        };
        if let Err(e) = check_delete_user(&session, user_id) {
            self.admin.set_notice(Notice::error(e.to_string()));
            return;
        }
        self.admin_action(move |api, session| async move {
            api.delete_user(&session, user_id).await
        });
    }

    /// Read a CSV report from disk, validate it and send it.
    pub fn import_performance(&mut self, match_ref: MatchRef, path: &Path) {
        let records = match load_performance_csv(path) {
            Ok(records) => records,
            Err(e) => {
                warn!("Performance import failed: {}", e);
                self.admin.set_notice(Notice::error(e.to_string()));
                return;
            }
        };
        let performance = match build_match_performance(match_ref, records) {
            Ok(p) => p,
            Err(e) => {
                self.admin.set_notice(Notice::error(e.to_string()));
                return;
            }
        };
        info!(
            records = performance.records.len(),
            "Submitting match performance"
        );
        self.admin_action(move |api, session| async move {
            api.add_match_performance(&session, &performance).await
        });
    }

    pub fn toggle_team_updates(&mut self) {
        let Some(session) = self.require_admin() else {
            return;
        };
        if !self.begin(Operation::ToggleLock) {
            return;
        }
        let api = Arc::clone(&self.api);
        self.spawn(async move { TaskResult::LockToggled(api.toggle_team_updates(&session).await) });
    }

    pub fn view_user_team(&mut self, user_id: UserId) {
        let Some(session) = self.require_admin() else {
            return;
        };
        if !self.begin(Operation::UserTeam) {
            return;
        }
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            TaskResult::UserTeam {
                user_id,
                result: api.user_team(&session, user_id).await,
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two channels using `tokio::select!`:
/// 1. User commands from the front end
/// 2. Results from spawned network tasks
///
/// Pushes a snapshot through `ui_tx` after every handled event.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut task_rx: mpsc::Receiver<TaskResult>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    state.start();
    send_snapshot(&state, &ui_tx).await;

    loop {
        tokio::select! {
            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd);
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Network results ---
            result = task_rx.recv() => {
                match result {
                    Some(result) => handle_task_result(&mut state, result),
                    // AppState holds a sender, so this only happens if it was
                    // dropped elsewhere.
                    None => {
                        info!("Task channel closed, shutting down");
                        break;
                    }
                }
            }
        }

        send_snapshot(&state, &ui_tx).await;
    }

    // Cleanup
    state.cancel_tasks();
    info!("Application event loop exiting");
    Ok(())
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.build_snapshot();
    let _ = ui_tx.send(UiUpdate::Snapshot(Box::new(snapshot))).await;
}

fn handle_user_command(state: &mut AppState, cmd: UserCommand) {
    state.notice = None;
    match cmd {
        UserCommand::Navigate(route) => state.navigate(route),
        UserCommand::Login { email, password } => state.login(email, password),
        UserCommand::Signup(request) => state.signup(request),
        UserCommand::Logout => state.logout(),

        UserCommand::ReloadTeam => state.load_team(),
        UserCommand::Lineup(action) => state.edit_team(action),
        UserCommand::SaveTeam => state.save_team(),

        UserCommand::RefreshLeaderboard => state.refresh_leaderboard(),
        UserCommand::SetBoard(board) => {
            if state.leaderboard.board() != board {
                state.leaderboard.set_board(board);
                state.refresh_leaderboard();
            }
        }
        UserCommand::SetSearch(text) => state.leaderboard.set_search(text),
        UserCommand::SetTeamFilter(filter) => {
            state.leaderboard.team_filter = filter;
            state.refresh_leaderboard();
        }
        UserCommand::SetPlayerFilter(filter) => {
            state.leaderboard.player_filter = filter;
            state.refresh_leaderboard();
        }
        UserCommand::OpenTeamDetails(team_id) => state.open_team_details(team_id),
        UserCommand::OpenPlayerStats(player_id) => state.open_player_stats(player_id),
        UserCommand::CloseDetail => state.leaderboard.close_detail(),

        UserCommand::RefreshAdmin => state.load_admin(),
        UserCommand::SetAdminTab(tab) => {
            info!("Switched admin tab: {:?}", tab);
            state.admin.tab = tab;
        }
        UserCommand::SetHouseFirst(house) => state.admin.house_first = house,
        UserCommand::CycleUserFilter => state.admin.cycle_user_filter(),
        UserCommand::CreateGame(game) => state.create_game(game),
        UserCommand::DeleteGame(game_id) => state.delete_game(game_id),
        UserCommand::ImportPerformance { match_ref, path } => {
            state.import_performance(match_ref, &path)
        }
        UserCommand::ResetPlayerPoints(player_id) => state.reset_player_points(player_id),
        UserCommand::ToggleTeamUpdates => state.toggle_team_updates(),
        UserCommand::ViewUserTeam(user_id) => state.view_user_team(user_id),
        UserCommand::DeleteUser(user_id) => state.delete_user(user_id),

        // Handled by the event loop before dispatch.
        UserCommand::Quit => {}
    }
}

fn handle_task_result(state: &mut AppState, result: TaskResult) {
    if let Some(err) = result.session_error() {
        if err.is_unauthorized() {
            state.expire_session(err);
            return;
        }
    }

    match result {
        TaskResult::LoggedIn(result) => {
            state.finish(Operation::Login);
            match result {
                Ok(session) => {
                    info!(
                        user_id = session.user_id(),
                        admin = session.is_admin(),
                        "Logged in"
                    );
                    if let Err(e) = state.store.save(&session) {
                        warn!("Failed to save session: {}", e);
                    }
                    state.route = home(&session);
                    state.session = Some(session);
                    state.notice = None;
                    state.enter_route();
                }
                Err(e) => {
                    warn!("Login failed: {}", e);
                    state.notice = Some(Notice::error(e.to_string()));
                }
            }
        }
        TaskResult::SignedUp(result) => {
            state.finish(Operation::Signup);
            match result {
                Ok(message) => {
                    info!("Signup succeeded");
                    state.route = Route::Login;
                    state.notice = Some(Notice::info(format!("{message}. Log in to continue")));
                }
                Err(e) => {
                    warn!("Signup failed: {}", e);
                    state.notice = Some(Notice::error(e.to_string()));
                }
            }
        }
        TaskResult::TeamLoaded { generation, result } => {
            if generation != state.team_generation {
                debug!(
                    generation,
                    current = state.team_generation,
                    "Discarding stale team load"
                );
                return;
            }
            state.team_task = None;
            match result {
                Ok((pool, team)) => {
                    info!(players = pool.len(), has_team = team.is_some(), "Team page loaded");
                    state.team.loaded(pool, team);
                }
                Err(e) => state.team.load_failed(&e),
            }
        }
        TaskResult::TeamSaved(result) => {
            if state.team.finish_submit(result) {
                state.refresh_saved_team();
            }
        }
        TaskResult::Teams { generation, result } => {
            state.leaderboard.teams_loaded(generation, result);
        }
        TaskResult::Players { generation, result } => {
            state.leaderboard.players_loaded(generation, result);
        }
        TaskResult::Detail(result) => {
            state.finish(Operation::Detail);
            state.leaderboard.detail_loaded(result);
        }
        TaskResult::AdminLoaded(result) => {
            state.finish(Operation::LoadAdmin);
            match result {
                Ok(data) => {
                    info!(
                        players = data.players.len(),
                        games = data.games.len(),
                        users = data.users.len(),
                        "Admin data loaded"
                    );
                    state.admin.players = data.players;
                    state.admin.games = data.games;
                    state.admin.users = data.users;
                    state.admin.updates_locked = Some(data.updates_locked);
                }
                Err(e) => {
                    warn!("Admin load failed: {}", e);
                    state.admin.set_notice(Notice::error(e.to_string()));
                }
            }
        }
        TaskResult::UserTeam { user_id, result } => {
            state.finish(Operation::UserTeam);
            match result {
                Ok(team) => state.admin.inspected = Some((user_id, team)),
                Err(e) => state.admin.set_notice(Notice::error(e.to_string())),
            }
        }
        TaskResult::LockToggled(result) => {
            state.finish(Operation::ToggleLock);
            match result {
                Ok(locked) => {
                    info!(locked, "Team updates toggled");
                    state.admin.updates_locked = Some(locked);
                    let text = if locked {
                        "Team updates are now locked"
                    } else {
                        "Team updates are now open"
                    };
                    state.admin.set_notice(Notice::info(text));
                }
                Err(e) => state.admin.set_notice(Notice::error(e.to_string())),
            }
        }
        TaskResult::AdminAction(result) => {
            state.finish(Operation::AdminAction);
            match result {
                Ok(message) => {
                    info!("Admin action succeeded: {}", message);
                    state.admin.set_notice(Notice::info(message));
                    state.load_admin();
                }
                Err(e) => {
                    warn!("Admin action failed: {}", e);
                    state.admin.set_notice(Notice::error(e.to_string()));
                }
            }
        }
    }
}
