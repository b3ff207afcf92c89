// Leaderboard page controller: team and player boards, filters, search and
// the detail popups.

use tracing::{debug, warn};

use squad_core::leaderboard::{rank, search, Ranked, TeamStanding};
use squad_core::player::Player;
use squad_core::team::{PlayerStats, TeamDetails};

use crate::api::model::{LeaderboardFilter, PlayerFilter};
use crate::api::ApiError;

use super::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Board {
    #[default]
    Teams,
    Players,
}

impl Board {
    pub fn toggle(self) -> Self {
        match self {
            Board::Teams => Board::Players,
            Board::Players => Board::Teams,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    Team(TeamDetails),
    Player(PlayerStats),
}

#[derive(Debug, Clone, Default)]
pub struct LeaderboardPage {
    board: Board,
    pub team_filter: LeaderboardFilter,
    pub player_filter: PlayerFilter,
    search: String,
    teams: Vec<Ranked<TeamStanding>>,
    players: Vec<Ranked<Player>>,
    loading: bool,
    /// Bumped on every fetch; results tagged with an older value are stale.
    generation: u64,
    detail: Option<Detail>,
    notice: Option<Notice>,
}

impl LeaderboardPage {
    pub fn board(&self) -> Board {
        self.board
    }

    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn detail(&self) -> Option<&Detail> {
        self.detail.as_ref()
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Rows matching the search, keeping their full-board ranks.
    pub fn visible_teams(&self) -> Vec<&Ranked<TeamStanding>> {
        search(&self.teams, &self.search)
    }

    pub fn visible_players(&self) -> Vec<&Ranked<Player>> {
        search(&self.players, &self.search)
    }

    /// Mark a fetch as started and return the tag its result must carry.
    pub fn begin_fetch(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.notice = None;
        self.generation
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale leaderboard result");
            return false;
        }
        true
    }

    pub fn teams_loaded(&mut self, generation: u64, result: Result<Vec<TeamStanding>, ApiError>) {
        if !self.is_current(generation) {
            return;
        }
        self.loading = false;
        match result {
            Ok(rows) => self.teams = rank(rows),
            Err(e) => {
                warn!("team leaderboard failed: {e}");
                self.notice = Some(Notice::error(e.to_string()));
            }
        }
    }

    pub fn players_loaded(&mut self, generation: u64, result: Result<Vec<Player>, ApiError>) {
        if !self.is_current(generation) {
            return;
        }
        self.loading = false;
        match result {
            Ok(rows) => self.players = rank(rows),
            Err(e) => {
                warn!("player leaderboard failed: {e}");
                self.notice = Some(Notice::error(e.to_string()));
            }
        }
    }

    pub fn detail_loaded(&mut self, result: Result<Detail, ApiError>) {
        match result {
            Ok(d) => self.detail = Some(d),
            Err(e) => self.notice = Some(Notice::error(e.to_string())),
        }
    }
}
