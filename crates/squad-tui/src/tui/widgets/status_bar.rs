// Status bar widget: league name, screen tabs, signed-in user.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use squad_app::route::Route;

use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [league] | [tab bar] | [user] [busy]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();

    let Some(snapshot) = &state.snapshot else {
        spans.push(Span::styled(" Squad", Style::default().fg(Color::White)));
        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black)),
            area,
        );
        return;
    };

    spans.push(Span::styled(
        format!(" {} ", snapshot.league_name),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("| ", Style::default().fg(Color::Gray)));
    spans.extend(tab_spans(&snapshot.tabs, snapshot.route));
    spans.push(Span::styled("| ", Style::default().fg(Color::Gray)));

    match &snapshot.user_name {
        Some(name) => {
            let label = if snapshot.is_admin {
                format!("{name} (admin)")
            } else {
                name.clone()
            };
            spans.push(Span::styled(label, Style::default().fg(Color::White)));
        }
        None => spans.push(Span::styled(
            "not signed in",
            Style::default().fg(Color::DarkGray),
        )),
    }

    if snapshot.busy {
        spans.push(Span::styled(" ...", Style::default().fg(Color::Yellow)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Build tab indicator spans with the active route highlighted.
/// E.g. "[1:My Team] [2:Leaderboard] [3:Points]"
pub fn tab_spans(tabs: &[Route], active: Route) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, tab) in tabs.iter().enumerate() {
        let style = if *tab == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}:{}]", i + 1, tab.title()), style));
        spans.push(Span::raw(" "));
    }
    spans
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::snapshot;

    #[test]
    fn tab_spans_highlight_active() {
        let tabs = [Route::MyTeam, Route::Leaderboard, Route::Scoring];
        let spans = tab_spans(&tabs, Route::Leaderboard);
        assert_eq!(spans[2].content, "[2:Leaderboard]");
        assert!(spans[2].style.add_modifier.contains(Modifier::BOLD));
        assert!(!spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }

    #[test]
    fn render_shows_league_and_user() {
        let backend = ratatui::backend::TestBackend::new(100, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot(Route::MyTeam));
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let row: String = (0..buffer.area.width)
            .map(|x| buffer[(x, 0)].symbol().to_string())
            .collect();
        assert!(row.contains("Test League"));
        assert!(row.contains("Asha"));
    }
}
