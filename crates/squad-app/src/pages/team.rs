// Team page controller: the Loading -> Ready <-> Editing -> Submitting state
// machine wrapped around a `TeamBuilder`.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use squad_core::budget::BudgetSummary;
use squad_core::builder::{LineupAction, TeamBuilder};
use squad_core::formation::Formation;
use squad_core::lineup::AssignError;
use squad_core::player::Player;
use squad_core::submission::{build_submission, LineupError, TeamSubmission};
use squad_core::team::{Team, TeamId};

use crate::api::{ApiError, LeagueApi};
use crate::session::Session;

use super::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamPageState {
    Loading,
    Ready,
    Editing,
    Submitting,
}

impl fmt::Display for TeamPageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TeamPageState::Loading => "loading",
            TeamPageState::Ready => "saved",
            TeamPageState::Editing => "unsaved changes",
            TeamPageState::Submitting => "saving",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeamPageError {
    #[error("the team cannot be edited while {0}")]
    NotEditable(TeamPageState),

    #[error("a save is already in progress")]
    AlreadySubmitting,

    #[error(transparent)]
    Assign(#[from] AssignError),

    #[error(transparent)]
    Lineup(#[from] LineupError),
}

/// A validated save, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    /// `None` creates a new team, `Some` updates the existing one.
    pub team_id: Option<TeamId>,
    pub body: TeamSubmission,
}

#[derive(Debug, Clone)]
pub struct TeamPage {
    state: TeamPageState,
    budget: u32,
    default_formation: Formation,
    pool: Vec<Player>,
    builder: TeamBuilder,
    team_id: Option<TeamId>,
    notice: Option<Notice>,
}

impl TeamPage {
    pub fn new(budget: u32, default_formation: Formation) -> Self {
        TeamPage {
            state: TeamPageState::Loading,
            budget,
            default_formation,
            pool: Vec::new(),
            builder: TeamBuilder::new(default_formation),
            team_id: None,
            notice: None,
        }
    }

    // --- accessors ---

    pub fn state(&self) -> TeamPageState {
        self.state
    }

    pub fn builder(&self) -> &TeamBuilder {
        &self.builder
    }

    /// Every player in the league.
    pub fn pool(&self) -> &[Player] {
        &self.pool
    }

    pub fn team_id(&self) -> Option<TeamId> {
        self.team_id
    }

    pub fn budget(&self) -> BudgetSummary {
        BudgetSummary::for_lineup(self.builder.lineup(), self.budget)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    // --- loading ---

    /// Start (or restart) loading. Unsaved edits are dropped. Refused while a
    /// save is in flight.
    pub fn begin_load(&mut self) -> Result<(), TeamPageError> {
        self.begin_refresh()?;
        self.notice = None;
        Ok(())
    }

    /// Like `begin_load`, but keeps the current notice on screen.
    pub fn begin_refresh(&mut self) -> Result<(), TeamPageError> {
        if self.state == TeamPageState::Submitting {
            return Err(TeamPageError::AlreadySubmitting);
        }
        self.state = TeamPageState::Loading;
        Ok(())
    }

    /// Both fetches came back. A missing team starts a blank one.
    pub fn loaded(&mut self, pool: Vec<Player>, team: Option<Team>) {
        self.pool = pool;
        match team {
            Some(team) => {
                debug!(team_id = team.id, "editing existing team");
                self.team_id = Some(team.id);
                self.builder = TeamBuilder::from_team(&team);
            }
            None => {
                self.team_id = None;
                self.builder = TeamBuilder::new(self.default_formation);
                self.notice = Some(Notice::info("No team yet: pick eleven players to create one"));
            }
        }
        self.state = TeamPageState::Ready;
    }

    /// Loading failed. The page stays in Loading so a reload can retry.
    pub fn load_failed(&mut self, err: &ApiError) {
        warn!("team page load failed: {err}");
        self.notice = Some(Notice::error(err.to_string()));
    }

    // --- editing ---

    /// Apply an edit. Allowed from Ready or Editing; moves to Editing.
    pub fn edit(&mut self, action: LineupAction) -> Result<(), TeamPageError> {
        match self.state {
            TeamPageState::Ready | TeamPageState::Editing => {}
            other => return Err(TeamPageError::NotEditable(other)),
        }
        self.builder.apply(action)?;
        self.state = TeamPageState::Editing;
        self.notice = None;
        Ok(())
    }

    // --- submitting ---

    /// Validate and move to Submitting. On a validation failure nothing is
    /// sent: the page stays editable and shows the reason.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, TeamPageError> {
        match self.state {
            TeamPageState::Submitting => return Err(TeamPageError::AlreadySubmitting),
            TeamPageState::Loading => {
                return Err(TeamPageError::NotEditable(TeamPageState::Loading))
            }
            TeamPageState::Ready | TeamPageState::Editing => {}
        }

        match build_submission(self.builder.lineup(), self.budget) {
            Ok(body) => {
                self.state = TeamPageState::Submitting;
                self.notice = Some(Notice::info("Saving team..."));
                Ok(SubmitRequest {
                    team_id: self.team_id,
                    body,
                })
            }
            Err(e) => {
                debug!("submission blocked: {e}");
                self.state = TeamPageState::Editing;
                self.notice = Some(Notice::error(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// The save came back. Returns whether it succeeded, in which case the
    /// stored team should be fetched again.
    pub fn finish_submit(&mut self, result: Result<Option<TeamId>, ApiError>) -> bool {
        if self.state != TeamPageState::Submitting {
            debug!(state = %self.state, "ignoring save result outside Submitting");
            return false;
        }
        match result {
            Ok(id) => {
                if let Some(id) = id {
                    self.team_id = Some(id);
                }
                info!(team_id = ?self.team_id, "team saved");
                self.state = TeamPageState::Ready;
                self.notice = Some(Notice::info("Team saved"));
                true
            }
            Err(e) => {
                warn!("team save failed: {e}");
                self.state = TeamPageState::Editing;
                self.notice = Some(Notice::error(e.to_string()));
                false
            }
        }
    }
}

/// Send a validated save: create when there is no team yet, update
/// otherwise. Returns the team id when known.
pub async fn save_team<A: LeagueApi + ?Sized>(
    api: &A,
    session: &Session,
    request: &SubmitRequest,
) -> Result<Option<TeamId>, ApiError> {
    match request.team_id {
        Some(id) => {
            api.update_team(session, id, &request.body).await?;
            Ok(Some(id))
        }
        None => api.create_team(session, &request.body).await,
    }
}

/// Fetch everything the page needs.
pub async fn load_team_page<A: LeagueApi + ?Sized>(
    api: &A,
    session: &Session,
) -> Result<(Vec<Player>, Option<Team>), ApiError> {
    let players = api.players(session).await?;
    let team = api.my_team(session).await?;
    Ok((players, team))
}
