// Budget widget: spend against the league ceiling, lineup completeness and
// the captain.
//
// Remaining turns red once the lineup is over budget.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

use squad_app::pages::team::TeamPage;
use squad_core::budget::BudgetSummary;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title("Budget");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(snapshot) = &state.snapshot else {
        return;
    };
    let summary = snapshot.team.budget();

    let [gauge_area, lines_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(remaining_color(&summary)))
        .ratio(summary.progress())
        .label(format!("{}/{}", summary.spent, summary.budget));
    frame.render_widget(gauge, gauge_area);

    frame.render_widget(Paragraph::new(build_budget_lines(&snapshot.team)), lines_area);
}

pub fn remaining_color(summary: &BudgetSummary) -> Color {
    if summary.is_over() {
        Color::Red
    } else {
        Color::Green
    }
}

fn build_budget_lines(team: &TeamPage) -> Vec<Line<'static>> {
    let summary = team.budget();
    let lineup = team.builder().lineup();

    let captain = lineup
        .captain_player()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "none".to_string());

    vec![
        Line::from(vec![
            Span::styled(" Remaining: ", Style::default().fg(Color::Gray)),
            Span::styled(
                summary.remaining().to_string(),
                Style::default()
                    .fg(remaining_color(&summary))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Players:   ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}/{}", lineup.filled_count(), lineup.required_count()),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Captain:   ", Style::default().fg(Color::Gray)),
            Span::styled(captain, Style::default().fg(Color::Yellow)),
        ]),
    ]
}
