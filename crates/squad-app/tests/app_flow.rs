// End-to-end tests of the orchestrator against an in-memory backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::json;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use squad_app::api::model::{
    AdminPlayer, Game, GameId, LeaderboardFilter, MatchPerformance, NewGame, PlayerFilter,
    SignupRequest, UserAccount,
};
use squad_app::api::{AdminApi, ApiError, Backend, LeagueApi};
use squad_app::app::{run, AppState};
use squad_app::config::{ApiConfig, Config, CredentialsConfig, LeagueConfig, SessionConfig};
use squad_app::pages::team::TeamPageState;
use squad_app::protocol::{AppSnapshot, UiUpdate, UserCommand};
use squad_app::route::Route;
use squad_app::session::{Session, SessionStore};
use squad_core::builder::LineupAction;
use squad_core::formation::Formation;
use squad_core::leaderboard::TeamStanding;
use squad_core::player::{Player, PlayerId, Position};
use squad_core::submission::TeamSubmission;
use squad_core::team::{PlayerStats, Team, TeamDetails, TeamId, TeamMember, UserId};

// ===========================================================================
// Fake backend
// ===========================================================================

fn token(user_id: u32, name: &str, is_admin: bool) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = json!({"user_id": user_id, "name": name, "is_admin": is_admin});
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2ln")
}

/// Eleven players for a 4-4-2 totalling 95.
fn eleven() -> Vec<Player> {
    let p = |id: u32, pos, price| Player::new(id, &format!("P{id}"), pos, price);
    let mut v = vec![p(1, Position::Goalkeeper, 5)];
    v.extend((2..=5).map(|i| p(i, Position::Defender, 8)));
    v.extend((6..=9).map(|i| p(i, Position::Midfielder, 10)));
    v.push(p(10, Position::Attacker, 9));
    v.push(p(11, Position::Attacker, 9));
    v
}

#[derive(Default)]
struct FakeBackend {
    admin: bool,
    /// my_team answers 401.
    reject_session: AtomicBool,
    /// create_team succeeds without reporting the new id.
    create_without_id: bool,
    /// create_team waits for a permit before answering.
    hold_create: Option<Arc<Notify>>,
    calls: Mutex<Vec<&'static str>>,
    saved: Mutex<Vec<TeamSubmission>>,
}

/// Id the fake backend gives the first stored team.
const STORED_TEAM_ID: TeamId = 42;

impl FakeBackend {
    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    fn not_here<T>() -> Result<T, ApiError> {
        Err(ApiError::NotFound("not provided by the fake backend".into()))
    }
}

#[async_trait]
impl LeagueApi for FakeBackend {
    async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        self.record("login");
        if password != "secret" {
            return Err(ApiError::Backend {
                status: 401,
                message: "Invalid credentials".into(),
            });
        }
        let id = if self.admin { 1 } else { 7 };
        Ok(Session::from_token(token(id, email, self.admin)).unwrap())
    }

    async fn signup(&self, _request: &SignupRequest) -> Result<String, ApiError> {
        self.record("signup");
        Ok("User created".into())
    }

    async fn players(&self, _session: &Session) -> Result<Vec<Player>, ApiError> {
        self.record("players");
        Ok(eleven())
    }

    async fn my_team(&self, _session: &Session) -> Result<Option<Team>, ApiError> {
        self.record("my_team");
        if self.reject_session.load(Ordering::SeqCst) {
            return Err(ApiError::Unauthorized("Token expired".into()));
        }
        let saved = self.saved.lock().unwrap();
        let Some(last) = saved.last() else {
            return Ok(None);
        };
        let pool = eleven();
        let members = last
            .players
            .iter()
            .filter_map(|entry| {
                pool.iter()
                    .find(|p| p.id == entry.player_id)
                    .map(|player| TeamMember {
                        player: player.clone(),
                        is_captain: entry.is_captain,
                    })
            })
            .collect();
        Ok(Some(Team {
            id: STORED_TEAM_ID,
            name: None,
            user_id: 7,
            formation: Formation::from_name(&last.formation),
            members,
            total_points: 0,
            rank: None,
        }))
    }

    async fn create_team(
        &self,
        _session: &Session,
        submission: &TeamSubmission,
    ) -> Result<Option<TeamId>, ApiError> {
        self.record("create_team");
        if let Some(gate) = &self.hold_create {
            gate.notified().await;
        }
        self.saved.lock().unwrap().push(submission.clone());
        if self.create_without_id {
            Ok(None)
        } else {
            Ok(Some(STORED_TEAM_ID))
        }
    }

    async fn update_team(
        &self,
        _session: &Session,
        _team_id: TeamId,
        submission: &TeamSubmission,
    ) -> Result<(), ApiError> {
        self.record("update_team");
        self.saved.lock().unwrap().push(submission.clone());
        Ok(())
    }

    async fn leaderboard(
        &self,
        _session: &Session,
        _filter: &LeaderboardFilter,
    ) -> Result<Vec<TeamStanding>, ApiError> {
        self.record("leaderboard");
        Ok(vec![TeamStanding {
            team_id: 3,
            user_name: Some("Asha".into()),
            team_name: None,
            total_points: 12,
        }])
    }

    async fn player_leaderboard(
        &self,
        _session: &Session,
        _filter: &PlayerFilter,
    ) -> Result<Vec<Player>, ApiError> {
        self.record("player_leaderboard");
        Ok(eleven())
    }

    async fn team_details(
        &self,
        _session: &Session,
        _team_id: TeamId,
    ) -> Result<TeamDetails, ApiError> {
        Self::not_here()
    }

    async fn player_stats(
        &self,
        _session: &Session,
        _player_id: PlayerId,
    ) -> Result<PlayerStats, ApiError> {
        Self::not_here()
    }
}

#[async_trait]
impl AdminApi for FakeBackend {
    async fn admin_players(&self, _session: &Session) -> Result<Vec<AdminPlayer>, ApiError> {
        self.record("admin_players");
        Ok(Vec::new())
    }

    async fn games(&self, _session: &Session) -> Result<Vec<Game>, ApiError> {
        Ok(Vec::new())
    }

    async fn create_game(&self, _session: &Session, _game: &NewGame) -> Result<Game, ApiError> {
        Self::not_here()
    }

    async fn delete_game(&self, _session: &Session, _game_id: GameId) -> Result<String, ApiError> {
        Self::not_here()
    }

    async fn add_match_performance(
        &self,
        _session: &Session,
        _performance: &MatchPerformance,
    ) -> Result<String, ApiError> {
        Self::not_here()
    }

    async fn reset_player_points(
        &self,
        _session: &Session,
        _player_id: PlayerId,
    ) -> Result<String, ApiError> {
        Self::not_here()
    }

    async fn team_updates_locked(&self, _session: &Session) -> Result<bool, ApiError> {
        Ok(false)
    }

    async fn toggle_team_updates(&self, _session: &Session) -> Result<bool, ApiError> {
        self.record("toggle_team_updates");
        Ok(true)
    }

    async fn users(&self, _session: &Session) -> Result<Vec<UserAccount>, ApiError> {
        Ok(Vec::new())
    }

    async fn user_team(
        &self,
        _session: &Session,
        _user_id: UserId,
    ) -> Result<Option<Team>, ApiError> {
        Ok(None)
    }

    async fn delete_user(&self, _session: &Session, _user_id: UserId) -> Result<String, ApiError> {
        self.record("delete_user");
        Ok("User deleted".into())
    }
}

// ===========================================================================
// Harness
// ===========================================================================

fn test_config(credentials: CredentialsConfig) -> Config {
    Config {
        league: LeagueConfig {
            name: "Test League".into(),
            budget: 100,
            default_formation: "4-4-2".into(),
            houses: vec!["Tata".into(), "Oberoi".into()],
        },
        api: ApiConfig {
            base_url: "http://localhost:5000".into(),
        },
        session: SessionConfig { persist: false },
        credentials,
    }
}

struct Harness {
    cmd_tx: mpsc::Sender<UserCommand>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    backend: Arc<FakeBackend>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    fn start(backend: FakeBackend, credentials: CredentialsConfig) -> Self {
        let backend = Arc::new(backend);
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (task_tx, task_rx) = mpsc::channel(64);
        let (ui_tx, ui_rx) = mpsc::channel(256);

        let api: Arc<dyn Backend> = backend.clone();
        let state = AppState::new(
            test_config(credentials),
            api,
            SessionStore::disabled(),
            task_tx,
        );
        let handle = tokio::spawn(run(cmd_rx, task_rx, ui_tx, state));

        Harness {
            cmd_tx,
            ui_rx,
            backend,
            handle,
        }
    }

    async fn send(&self, cmd: UserCommand) {
        self.cmd_tx.send(cmd).await.unwrap();
    }

    /// Wait for the first snapshot satisfying `pred`.
    async fn wait_for(&mut self, pred: impl Fn(&AppSnapshot) -> bool) -> AppSnapshot {
        let rx = &mut self.ui_rx;
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match rx.recv().await {
                    Some(UiUpdate::Snapshot(s)) if pred(&s) => return *s,
                    Some(_) => continue,
                    None => panic!("UI channel closed"),
                }
            }
        })
        .await
        .expect("timed out waiting for snapshot")
    }

    async fn login(&mut self) -> AppSnapshot {
        self.send(UserCommand::Login {
            email: "kid@school.in".into(),
            password: "secret".into(),
        })
        .await;
        self.wait_for(|s| s.user_name.is_some()).await
    }

    async fn login_to_ready_team(&mut self) -> AppSnapshot {
        self.login().await;
        self.wait_for(|s| s.team.state() == TeamPageState::Ready).await
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn login_routes_to_team_page_and_loads_pool() {
    let mut h = Harness::start(FakeBackend::default(), CredentialsConfig::default());

    let first = h.wait_for(|_| true).await;
    assert_eq!(first.route, Route::Login);
    assert!(first.user_name.is_none());

    let snap = h.login_to_ready_team().await;
    assert_eq!(snap.route, Route::MyTeam);
    assert_eq!(snap.team.pool().len(), 11);
    assert_eq!(snap.team.team_id(), None);
    assert_eq!(snap.tabs, vec![Route::MyTeam, Route::Leaderboard, Route::Scoring]);
    assert_eq!(h.backend.count("players"), 1);
    assert_eq!(h.backend.count("my_team"), 1);
}

#[tokio::test]
async fn bad_password_shows_error_and_stays_on_login() {
    let mut h = Harness::start(FakeBackend::default(), CredentialsConfig::default());
    h.send(UserCommand::Login {
        email: "kid@school.in".into(),
        password: "wrong".into(),
    })
    .await;

    let snap = h
        .wait_for(|s| s.notice.as_ref().is_some_and(|n| n.is_error()))
        .await;
    assert_eq!(snap.route, Route::Login);
    assert!(snap.notice.unwrap().text.contains("Invalid credentials"));
}

#[tokio::test]
async fn configured_credentials_log_in_at_startup() {
    let credentials = CredentialsConfig {
        email: Some("kid@school.in".into()),
        password: Some("secret".into()),
    };
    let mut h = Harness::start(FakeBackend::default(), credentials);

    let snap = h.wait_for(|s| s.team.state() == TeamPageState::Ready).await;
    assert_eq!(snap.route, Route::MyTeam);
    assert_eq!(h.backend.count("login"), 1);
}

#[tokio::test]
async fn incomplete_lineup_never_reaches_backend() {
    let mut h = Harness::start(FakeBackend::default(), CredentialsConfig::default());
    h.login_to_ready_team().await;

    h.send(UserCommand::SaveTeam).await;
    let snap = h
        .wait_for(|s| s.team.notice().is_some_and(|n| n.is_error()))
        .await;

    assert_eq!(snap.team.state(), TeamPageState::Editing);
    assert!(snap.team.notice().unwrap().text.contains("incomplete"));
    assert_eq!(h.backend.count("create_team"), 0);
    assert_eq!(h.backend.count("update_team"), 0);
}

#[tokio::test]
async fn complete_lineup_creates_then_updates() {
    let mut h = Harness::start(FakeBackend::default(), CredentialsConfig::default());
    h.login_to_ready_team().await;

    for player in eleven() {
        h.send(UserCommand::Lineup(LineupAction::ToggleSelect(player)))
            .await;
    }
    h.send(UserCommand::Lineup(LineupAction::SetCaptain(Some(6))))
        .await;
    h.send(UserCommand::SaveTeam).await;

    let snap = h
        .wait_for(|s| s.team.state() == TeamPageState::Ready && s.team.team_id().is_some())
        .await;
    assert_eq!(snap.team.team_id(), Some(STORED_TEAM_ID));
    assert_eq!(h.backend.count("create_team"), 1);
    {
        let saved = h.backend.saved.lock().unwrap();
        assert_eq!(saved[0].formation, "4-4-2");
        assert_eq!(saved[0].players.len(), 11);
        assert_eq!(saved[0].players.iter().filter(|e| e.is_captain).count(), 1);
    }

    // With a team id known, the next save is an update.
    h.send(UserCommand::Lineup(LineupAction::SetCaptain(Some(10))))
        .await;
    h.send(UserCommand::SaveTeam).await;
    h.wait_for(|s| {
        s.team.state() == TeamPageState::Ready
            && s.team.notice().is_some_and(|n| n.text == "Team saved")
    })
    .await;
    assert_eq!(h.backend.count("update_team"), 1);
    assert_eq!(h.backend.count("create_team"), 1);
}

async fn pick_eleven(h: &Harness, players: Vec<Player>, captain: Option<PlayerId>) {
    for player in players {
        h.send(UserCommand::Lineup(LineupAction::ToggleSelect(player)))
            .await;
    }
    h.send(UserCommand::Lineup(LineupAction::SetCaptain(captain)))
        .await;
}

#[tokio::test]
async fn over_budget_lineup_never_reaches_backend() {
    let mut h = Harness::start(FakeBackend::default(), CredentialsConfig::default());
    h.login_to_ready_team().await;

    // A pricier keeper pushes the eleven from 95 to 101.
    let mut players = eleven();
    players[0].price = 11;
    pick_eleven(&h, players, Some(6)).await;
    h.send(UserCommand::SaveTeam).await;

    let snap = h
        .wait_for(|s| s.team.notice().is_some_and(|n| n.is_error()))
        .await;
    let text = &snap.team.notice().unwrap().text;
    assert!(text.contains("101"), "{text}");
    assert!(text.contains("100"), "{text}");
    assert_eq!(snap.team.state(), TeamPageState::Editing);
    assert_eq!(h.backend.count("create_team"), 0);
    assert_eq!(h.backend.count("update_team"), 0);
}

#[tokio::test]
async fn missing_or_benched_captain_never_reaches_backend() {
    let mut h = Harness::start(FakeBackend::default(), CredentialsConfig::default());
    h.login_to_ready_team().await;

    pick_eleven(&h, eleven(), None).await;
    h.send(UserCommand::SaveTeam).await;
    let snap = h
        .wait_for(|s| s.team.notice().is_some_and(|n| n.is_error()))
        .await;
    assert!(snap.team.notice().unwrap().text.contains("captain"));

    // A captain who is not on the pitch counts as no captain.
    h.send(UserCommand::Lineup(LineupAction::SetCaptain(Some(99))))
        .await;
    h.send(UserCommand::SaveTeam).await;
    let snap = h
        .wait_for(|s| s.team.notice().is_some_and(|n| n.is_error()))
        .await;
    assert!(snap.team.notice().unwrap().text.contains("captain"));
    assert_eq!(h.backend.count("create_team"), 0);
    assert_eq!(h.backend.count("update_team"), 0);
}

#[tokio::test]
async fn create_without_id_is_followed_by_a_refetch() {
    let backend = FakeBackend {
        create_without_id: true,
        ..Default::default()
    };
    let mut h = Harness::start(backend, CredentialsConfig::default());
    h.login_to_ready_team().await;

    pick_eleven(&h, eleven(), Some(6)).await;
    h.send(UserCommand::SaveTeam).await;
    let snap = h
        .wait_for(|s| s.team.state() == TeamPageState::Ready && s.team.team_id().is_some())
        .await;
    assert_eq!(snap.team.team_id(), Some(STORED_TEAM_ID));
    assert_eq!(snap.team.builder().lineup().captain(), Some(6));
    assert_eq!(snap.team.notice().unwrap().text, "Team saved");
    assert_eq!(h.backend.count("my_team"), 2);

    // The stored id makes the next save an update, not a second create.
    h.send(UserCommand::Lineup(LineupAction::SetCaptain(Some(10))))
        .await;
    h.send(UserCommand::SaveTeam).await;
    h.wait_for(|s| {
        s.team.state() == TeamPageState::Ready
            && s.team.notice().is_some_and(|n| n.text == "Team saved")
    })
    .await;
    assert_eq!(h.backend.count("create_team"), 1);
    assert_eq!(h.backend.count("update_team"), 1);
}

#[tokio::test]
async fn reload_during_save_does_not_allow_a_second_create() {
    let gate = Arc::new(Notify::new());
    let backend = FakeBackend {
        hold_create: Some(gate.clone()),
        ..Default::default()
    };
    let mut h = Harness::start(backend, CredentialsConfig::default());
    h.login_to_ready_team().await;

    pick_eleven(&h, eleven(), Some(6)).await;
    h.send(UserCommand::SaveTeam).await;
    h.wait_for(|s| s.team.state() == TeamPageState::Submitting)
        .await;

    h.send(UserCommand::ReloadTeam).await;
    h.send(UserCommand::Navigate(Route::MyTeam)).await;
    h.send(UserCommand::SaveTeam).await;
    let snap = h.wait_for(|_| true).await;
    assert_eq!(snap.team.state(), TeamPageState::Submitting);

    gate.notify_one();
    let snap = h
        .wait_for(|s| s.team.state() == TeamPageState::Ready && s.team.team_id().is_some())
        .await;
    assert_eq!(snap.team.team_id(), Some(STORED_TEAM_ID));
    assert_eq!(h.backend.count("create_team"), 1);
    assert_eq!(h.backend.count("my_team"), 2);
}

#[tokio::test]
async fn expired_token_logs_out() {
    let backend = FakeBackend::default();
    backend.reject_session.store(true, Ordering::SeqCst);
    let mut h = Harness::start(backend, CredentialsConfig::default());
    h.login().await;

    let snap = h
        .wait_for(|s| s.user_name.is_none() && s.notice.is_some())
        .await;
    assert_eq!(snap.route, Route::Login);
    assert!(snap.notice.unwrap().text.contains("Session expired"));
}

#[tokio::test]
async fn protected_route_redirects_to_login() {
    let mut h = Harness::start(FakeBackend::default(), CredentialsConfig::default());
    h.wait_for(|_| true).await;

    h.send(UserCommand::Navigate(Route::Leaderboard)).await;
    let snap = h.wait_for(|_| true).await;
    assert_eq!(snap.route, Route::Login);
    assert_eq!(h.backend.count("leaderboard"), 0);
}

#[tokio::test]
async fn leaderboard_loads_on_navigation() {
    let mut h = Harness::start(FakeBackend::default(), CredentialsConfig::default());
    h.login_to_ready_team().await;

    h.send(UserCommand::Navigate(Route::Leaderboard)).await;
    let snap = h
        .wait_for(|s| s.route == Route::Leaderboard && !s.leaderboard.is_loading())
        .await;
    let rows = snap.leaderboard.visible_teams();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].rank, 1);
}

#[tokio::test]
async fn admin_cannot_delete_themselves() {
    let backend = FakeBackend {
        admin: true,
        ..Default::default()
    };
    let mut h = Harness::start(backend, CredentialsConfig::default());
    let snap = h.login().await;
    assert_eq!(snap.route, Route::Admin);
    h.wait_for(|s| s.admin.updates_locked.is_some()).await;

    h.send(UserCommand::DeleteUser(1)).await;
    let snap = h
        .wait_for(|s| s.admin.notice.as_ref().is_some_and(|n| n.is_error()))
        .await;
    assert!(snap.admin.notice.unwrap().text.contains("your own account"));
    assert_eq!(h.backend.count("delete_user"), 0);

    h.send(UserCommand::ToggleTeamUpdates).await;
    h.wait_for(|s| s.admin.updates_locked == Some(true)).await;
}

#[tokio::test]
async fn quit_stops_the_loop() {
    let mut h = Harness::start(FakeBackend::default(), CredentialsConfig::default());
    h.wait_for(|_| true).await;
    h.send(UserCommand::Quit).await;
    h.handle.await.unwrap().unwrap();
}
