// Message bar widget: the most relevant notice for the current screen.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use squad_app::pages::Notice;
use squad_app::route::Route;

use crate::tui::ViewState;

/// Pick the message to show: local input errors first, then the current
/// page's notice, then the app-wide one.
pub fn current_message(state: &ViewState) -> Option<Notice> {
    if let Some(err) = &state.local_error {
        return Some(Notice::error(err.clone()));
    }
    let snapshot = state.snapshot.as_ref()?;
    let page = match snapshot.route {
        Route::MyTeam => snapshot.team.notice(),
        Route::Leaderboard => snapshot.leaderboard.notice(),
        Route::Admin => snapshot.admin.notice.as_ref(),
        Route::Login | Route::Signup | Route::Scoring => None,
    };
    page.or(snapshot.notice.as_ref()).cloned()
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(notice) = current_message(state) else {
        return;
    };
    let color = if notice.is_error() {
        Color::Red
    } else {
        Color::Green
    };
    let paragraph = Paragraph::new(format!(" {}", notice.text)).style(Style::default().fg(color));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
