// Candidate lists for the player picker.

use crate::lineup::{Lineup, Slot};
use crate::player::Player;

/// Free-text and house filters applied on top of the slot's category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickerQuery {
    pub search: String,
    pub house: Option<String>,
}

impl PickerQuery {
    pub fn matches(&self, player: &Player) -> bool {
        if let Some(ref house) = self.house {
            let same_house = player
                .house
                .as_deref()
                .is_some_and(|h| h.eq_ignore_ascii_case(house));
            if !same_house {
                return false;
            }
        }
        name_matches(&player.name, &self.search)
    }
}

/// Case-insensitive substring match. An empty query matches everything.
pub fn name_matches(name: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || name.to_lowercase().contains(&query.to_lowercase())
}

/// Price descending, then name.
fn sort_candidates(players: &mut [&Player]) {
    players.sort_by(|a, b| b.price.cmp(&a.price).then_with(|| a.name.cmp(&b.name)));
}

/// Players from `pool` that could go into `slot`: same category, not the
/// player already there, passing `query`.
pub fn slot_candidates<'a>(pool: &'a [Player], slot: &Slot, query: &PickerQuery) -> Vec<&'a Player> {
    let current = slot.player.as_ref().map(|p| p.id);
    let mut out: Vec<&Player> = pool
        .iter()
        .filter(|p| p.position == slot.id.position)
        .filter(|p| Some(p.id) != current)
        .filter(|p| query.matches(p))
        .collect();
    sort_candidates(&mut out);
    out
}

/// Captain choices: whoever is on the pitch, any category.
pub fn captain_candidates<'a>(lineup: &'a Lineup, query: &PickerQuery) -> Vec<&'a Player> {
    let mut out: Vec<&Player> = lineup.assigned().filter(|p| query.matches(p)).collect();
    sort_candidates(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::Formation;
    use crate::lineup::SlotId;
    use crate::player::Position;

    fn pool() -> Vec<Player> {
        vec![
            Player::new(1, "Arjun", Position::Defender, 8).with_house("Tata"),
            Player::new(2, "Bilal", Position::Defender, 11).with_house("Oberoi"),
            Player::new(3, "Chetan", Position::Defender, 11).with_house("Tata"),
            Player::new(4, "Dev", Position::Midfielder, 15).with_house("Tata"),
            Player::new(5, "Eshan", Position::Defender, 6).with_house("Jaipur"),
        ]
    }

    fn def_slot(player: Option<Player>) -> Slot {
        Slot {
            id: SlotId::new(Position::Defender, 0),
            player,
        }
    }

    #[test]
    fn slot_candidates_filter_category_and_sort_by_price() {
        let pool = pool();
        let got: Vec<u32> = slot_candidates(&pool, &def_slot(None), &PickerQuery::default())
            .iter()
            .map(|p| p.id)
            .collect();
        // Bilal and Chetan tie on price, name breaks the tie.
        assert_eq!(got, vec![2, 3, 1, 5]);
    }

    #[test]
    fn slot_candidates_exclude_current_occupant() {
        let pool = pool();
        let slot = def_slot(Some(pool[1].clone()));
        let got: Vec<u32> = slot_candidates(&pool, &slot, &PickerQuery::default())
            .iter()
            .map(|p| p.id)
            .collect();
        assert!(!got.contains(&2));
    }

    #[test]
    fn house_and_search_filters() {
        let pool = pool();
        let query = PickerQuery {
            search: "CHE".into(),
            house: Some("tata".into()),
        };
        let got: Vec<u32> = slot_candidates(&pool, &def_slot(None), &query)
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(got, vec![3]);
    }

    #[test]
    fn captain_candidates_are_assigned_players() {
        let lineup = Lineup::recompute(Formation::FourFourTwo, &pool());
        let got: Vec<u32> = captain_candidates(&lineup, &PickerQuery::default())
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(got.len(), 5);
        assert_eq!(got[0], 4);
    }
}
