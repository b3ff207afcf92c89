// TUI widget modules for each screen and overlay.

pub mod admin;
pub mod bench;
pub mod budget;
pub mod leaderboard;
pub mod login;
pub mod message_bar;
pub mod picker;
pub mod pitch;
pub mod prompt;
pub mod quit_confirm;
pub mod scoring;
pub mod status_bar;
