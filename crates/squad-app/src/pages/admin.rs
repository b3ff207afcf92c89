// Admin page controller: player points, games and match reports, the
// team-update lock and user accounts.

use std::collections::HashSet;

use thiserror::Error;

use squad_core::team::{Team, UserId};

use crate::api::model::{
    AdminPlayer, Game, MatchPerformance, MatchRef, PerformanceRecord, UserAccount,
};
use crate::session::{Session, UserType};

use super::Notice;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    #[error("no performance records to submit")]
    NoRecords,

    #[error("performance record {index} has no player id")]
    MissingPlayerId { index: usize },

    #[error("player {player_id} appears more than once in the report")]
    DuplicateRecord { player_id: u32 },

    #[error("match name is required")]
    MissingMatchName,

    #[error("you cannot delete your own account")]
    SelfDeletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Players,
    Games,
    Users,
}

impl AdminTab {
    pub const ALL: [AdminTab; 3] = [AdminTab::Players, AdminTab::Games, AdminTab::Users];

    pub fn title(&self) -> &'static str {
        match self {
            AdminTab::Players => "Players",
            AdminTab::Games => "Games",
            AdminTab::Users => "Users",
        }
    }

    pub fn next(self) -> Self {
        match self {
            AdminTab::Players => AdminTab::Games,
            AdminTab::Games => AdminTab::Users,
            AdminTab::Users => AdminTab::Players,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminPage {
    pub tab: AdminTab,
    pub players: Vec<AdminPlayer>,
    /// When set, players from this house are listed first.
    pub house_first: Option<String>,
    pub games: Vec<Game>,
    pub users: Vec<UserAccount>,
    pub user_type_filter: Option<UserType>,
    pub updates_locked: Option<bool>,
    /// The team of the user being inspected, with their id.
    pub inspected: Option<(UserId, Option<Team>)>,
    pub notice: Option<Notice>,
}

impl AdminPage {
    /// Players ordered for display: the chosen house first, then by name.
    pub fn players_sorted(&self) -> Vec<&AdminPlayer> {
        let mut out: Vec<&AdminPlayer> = self.players.iter().collect();
        let house = self.house_first.as_deref();
        out.sort_by(|a, b| {
            let in_house = |p: &AdminPlayer| {
                house.is_some_and(|h| {
                    p.player
                        .house
                        .as_deref()
                        .is_some_and(|ph| ph.eq_ignore_ascii_case(h))
                })
            };
            in_house(b)
                .cmp(&in_house(a))
                .then_with(|| a.player.name.cmp(&b.player.name))
        });
        out
    }

    pub fn users_filtered(&self) -> Vec<&UserAccount> {
        self.users
            .iter()
            .filter(|u| match self.user_type_filter {
                Some(t) => u.user_type == Some(t),
                None => true,
            })
            .collect()
    }

    /// Cycle the user-type filter: all, students, teachers.
    pub fn cycle_user_filter(&mut self) {
        self.user_type_filter = match self.user_type_filter {
            None => Some(UserType::Student),
            Some(UserType::Student) => Some(UserType::Teacher),
            Some(UserType::Teacher) => None,
        };
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }
}

/// Refuse to let an admin delete themselves.
pub fn check_delete_user(session: &Session, user_id: UserId) -> Result<(), AdminError> {
    if session.user_id() == user_id {
        return Err(AdminError::SelfDeletion);
    }
    Ok(())
}

/// Validate a match report before it is sent.
pub fn build_match_performance(
    match_ref: MatchRef,
    records: Vec<PerformanceRecord>,
) -> Result<MatchPerformance, AdminError> {
    if records.is_empty() {
        return Err(AdminError::NoRecords);
    }
    if let MatchRef::New { ref name, .. } = match_ref {
        if name.trim().is_empty() {
            return Err(AdminError::MissingMatchName);
        }
    }

    let mut seen = HashSet::new();
    for (index, r) in records.iter().enumerate() {
        if r.player_id == 0 {
            return Err(AdminError::MissingPlayerId { index });
        }
        if !seen.insert(r.player_id) {
            return Err(AdminError::DuplicateRecord {
                player_id: r.player_id,
            });
        }
    }

    Ok(MatchPerformance { match_ref, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_token;
    use chrono::NaiveDate;
    use serde_json::json;
    use squad_core::player::{Player, Position};

    fn admin_player(id: u32, name: &str, house: &str) -> AdminPlayer {
        AdminPlayer {
            player: Player::new(id, name, Position::Defender, 5).with_house(house),
            latest: None,
        }
    }

    fn record(player_id: u32) -> PerformanceRecord {
        PerformanceRecord {
            player_id,
            ..Default::default()
        }
    }

    #[test]
    fn house_first_ordering() {
        let page = AdminPage {
            players: vec![
                admin_player(1, "Zed", "Tata"),
                admin_player(2, "Amit", "Oberoi"),
                admin_player(3, "Bala", "Tata"),
            ],
            house_first: Some("tata".into()),
            ..Default::default()
        };
        let ids: Vec<u32> = page.players_sorted().iter().map(|p| p.player.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn user_filter_cycles() {
        let mut page = AdminPage::default();
        page.users = vec![
            UserAccount {
                id: 1,
                name: "S".into(),
                email: "s@x".into(),
                user_type: Some(UserType::Student),
                house: Some("Tata".into()),
                batch: None,
                is_admin: false,
                team: None,
            },
            UserAccount {
                id: 2,
                name: "T".into(),
                email: "t@x".into(),
                user_type: Some(UserType::Teacher),
                house: None,
                batch: None,
                is_admin: false,
                team: None,
            },
        ];
        assert_eq!(page.users_filtered().len(), 2);
        page.cycle_user_filter();
        assert_eq!(page.users_filtered()[0].id, 1);
        page.cycle_user_filter();
        assert_eq!(page.users_filtered()[0].id, 2);
        page.cycle_user_filter();
        assert_eq!(page.users_filtered().len(), 2);
    }

    #[test]
    fn self_deletion_is_refused() {
        let session = Session::from_token(test_token(
            &json!({"user_id": 4, "name": "Admin", "is_admin": true}),
        ))
        .unwrap();
        assert_eq!(check_delete_user(&session, 4), Err(AdminError::SelfDeletion));
        assert!(check_delete_user(&session, 5).is_ok());
    }

    #[test]
    fn match_report_validation() {
        assert_eq!(
            build_match_performance(MatchRef::Existing(1), vec![]),
            Err(AdminError::NoRecords)
        );
        assert_eq!(
            build_match_performance(MatchRef::Existing(1), vec![record(3), record(0)]),
            Err(AdminError::MissingPlayerId { index: 1 })
        );
        assert_eq!(
            build_match_performance(MatchRef::Existing(1), vec![record(3), record(3)]),
            Err(AdminError::DuplicateRecord { player_id: 3 })
        );
        let new_match = MatchRef::New {
            name: "  ".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        };
        assert_eq!(
            build_match_performance(new_match, vec![record(1)]),
            Err(AdminError::MissingMatchName)
        );
        assert!(build_match_performance(MatchRef::Existing(2), vec![record(1), record(2)]).is_ok());
    }
}
