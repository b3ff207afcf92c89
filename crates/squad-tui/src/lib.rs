// Library root: exposes the terminal front end so integration tests can
// drive it.

pub mod tui;
