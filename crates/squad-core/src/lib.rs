// Library root for the team-composition domain: players, formations, the
// slot table, captaincy, budget and submission validation, plus the pure
// filtering helpers used by the picker and leaderboard screens.

pub mod budget;
pub mod builder;
pub mod formation;
pub mod leaderboard;
pub mod lineup;
pub mod picker;
pub mod player;
pub mod scoring;
pub mod submission;
pub mod team;
