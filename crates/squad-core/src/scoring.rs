// League scoring rules, for display only. Points are computed by the backend.

use crate::player::Position;

/// Points awarded regardless of position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverallRules {
    pub game_played: i32,
    pub yellow_card: i32,
    pub red_card: i32,
    /// Bonus tiers awarded by the match officials.
    pub bonus: [i32; 3],
}

/// Position-dependent points. `None` means the event does not score for that
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRules {
    pub position: Position,
    pub clean_sheet: Option<i32>,
    pub assist: i32,
    /// Applied once per two goals conceded.
    pub two_goals_conceded: Option<i32>,
    pub goal: i32,
}

pub const OVERALL: OverallRules = OverallRules {
    game_played: 2,
    yellow_card: -1,
    red_card: -3,
    bonus: [1, 2, 3],
};

pub const BY_POSITION: [PositionRules; 4] = [
    PositionRules {
        position: Position::Goalkeeper,
        clean_sheet: Some(4),
        assist: 3,
        two_goals_conceded: Some(-1),
        goal: 7,
    },
    PositionRules {
        position: Position::Defender,
        clean_sheet: Some(4),
        assist: 3,
        two_goals_conceded: Some(-1),
        goal: 6,
    },
    PositionRules {
        position: Position::Midfielder,
        clean_sheet: Some(1),
        assist: 3,
        two_goals_conceded: None,
        goal: 5,
    },
    PositionRules {
        position: Position::Attacker,
        clean_sheet: None,
        assist: 3,
        two_goals_conceded: None,
        goal: 4,
    },
];

pub fn rules_for(position: Position) -> &'static PositionRules {
    &BY_POSITION[position.sort_order() as usize]
}

/// Render a point value for a table cell: `+4`, `-1`, or `-` when absent.
pub fn format_points(value: Option<i32>) -> String {
    match value {
        Some(v) if v > 0 => format!("+{v}"),
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}
