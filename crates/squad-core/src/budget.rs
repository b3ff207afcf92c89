// Budget accounting for the current lineup.

use crate::lineup::Lineup;
use crate::player::Player;

/// League spending ceiling when configuration does not override it.
pub const DEFAULT_BUDGET: u32 = 100;

/// Sum of prices. Saturates instead of overflowing.
pub fn total_cost<'a>(players: impl IntoIterator<Item = &'a Player>) -> u32 {
    players
        .into_iter()
        .fold(0u32, |acc, p| acc.saturating_add(p.price))
}

/// Spend figures for the budget panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetSummary {
    pub spent: u32,
    pub budget: u32,
}

impl BudgetSummary {
    pub fn for_lineup(lineup: &Lineup, budget: u32) -> Self {
        BudgetSummary {
            spent: total_cost(lineup.assigned()),
            budget,
        }
    }

    /// Budget left; negative when over.
    pub fn remaining(&self) -> i64 {
        i64::from(self.budget) - i64::from(self.spent)
    }

    pub fn is_over(&self) -> bool {
        self.spent > self.budget
    }

    /// Fraction of the budget spent, clamped to `0.0..=1.0` for gauges.
    pub fn progress(&self) -> f64 {
        if self.budget == 0 {
            return if self.spent > 0 { 1.0 } else { 0.0 };
        }
        (f64::from(self.spent) / f64::from(self.budget)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::Formation;
    use crate::player::Position;

    fn priced(prices: &[u32]) -> Vec<Player> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| Player::new(i as u32 + 1, "x", Position::Midfielder, price))
            .collect()
    }

    #[test]
    fn total_is_order_independent() {
        let players = priced(&[5, 12, 7, 30]);
        let mut reversed = players.clone();
        reversed.reverse();
        assert_eq!(total_cost(&players), 54);
        assert_eq!(total_cost(&reversed), 54);
    }

    #[test]
    fn total_saturates() {
        let players = priced(&[u32::MAX, 10]);
        assert_eq!(total_cost(&players), u32::MAX);
    }

    #[test]
    fn summary_remaining_and_progress() {
        let s = BudgetSummary { spent: 75, budget: 100 };
        assert_eq!(s.remaining(), 25);
        assert!(!s.is_over());
        assert!((s.progress() - 0.75).abs() < f64::EPSILON);

        let over = BudgetSummary { spent: 101, budget: 100 };
        assert_eq!(over.remaining(), -1);
        assert!(over.is_over());
        assert_eq!(over.progress(), 1.0);
    }

    #[test]
    fn summary_for_lineup_counts_only_assigned() {
        let selected = vec![
            Player::new(1, "a", Position::Goalkeeper, 10),
            Player::new(2, "b", Position::Goalkeeper, 50),
        ];
        // Only one keeper slot: the second keeper is not counted.
        let lineup = Lineup::recompute(Formation::FourFourTwo, &selected);
        let s = BudgetSummary::for_lineup(&lineup, DEFAULT_BUDGET);
        assert_eq!(s.spent, 10);
    }
}
