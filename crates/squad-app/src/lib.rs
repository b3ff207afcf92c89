// Squad application layer: configuration, session handling, the backend
// client, page controllers and the orchestrator that ties them together.

pub mod api;
pub mod app;
pub mod config;
pub mod import;
pub mod pages;
pub mod protocol;
pub mod route;
pub mod session;
