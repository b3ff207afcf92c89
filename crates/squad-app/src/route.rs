// Screens and the access rules between them.

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    MyTeam,
    Leaderboard,
    Scoring,
    Admin,
}

impl Route {
    /// Tabs shown in the navigation bar for a given session, in order.
    pub fn tabs(session: Option<&Session>) -> Vec<Route> {
        match session {
            None => vec![Route::Login, Route::Signup, Route::Scoring],
            Some(s) if s.is_admin() => vec![Route::Admin, Route::Leaderboard, Route::Scoring],
            Some(_) => vec![Route::MyTeam, Route::Leaderboard, Route::Scoring],
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Signup => "Sign up",
            Route::MyTeam => "My Team",
            Route::Leaderboard => "Leaderboard",
            Route::Scoring => "Points",
            Route::Admin => "Admin",
        }
    }

    /// Whether the screen needs a logged-in user.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::MyTeam | Route::Leaderboard | Route::Admin)
    }
}

/// Where a user lands after logging in.
pub fn home(session: &Session) -> Route {
    if session.is_admin() {
        Route::Admin
    } else {
        Route::MyTeam
    }
}

/// Resolve a navigation request against the current session.
pub fn guard(requested: Route, session: Option<&Session>) -> Route {
    match (requested, session) {
        (r, None) if r.is_protected() => Route::Login,
        (Route::Login | Route::Signup, Some(s)) => home(s),
        (Route::Admin, Some(s)) if !s.is_admin() => Route::MyTeam,
        (Route::MyTeam, Some(s)) if s.is_admin() => Route::Admin,
        (r, _) => r,
    }
}
