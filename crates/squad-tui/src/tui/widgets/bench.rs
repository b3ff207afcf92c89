// Bench widget: selected players who have no slot on the pitch.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use squad_core::builder::TeamBuilder;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let lines = state
        .snapshot
        .as_ref()
        .map(|s| build_bench_lines(s.team.builder()))
        .unwrap_or_default();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Selected, not placed"),
    );
    frame.render_widget(paragraph, area);
}

pub fn build_bench_lines(builder: &TeamBuilder) -> Vec<Line<'static>> {
    let lines: Vec<Line<'static>> = builder
        .bench()
        .map(|p| {
            Line::from(vec![
                Span::styled(format!(" {:<4}", p.position.code()), Style::default().fg(Color::Cyan)),
                Span::styled(p.name.clone(), Style::default().fg(Color::White)),
                Span::styled(format!("  {}", p.price), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();
    if lines.is_empty() {
        return vec![Line::styled(" (none)", Style::default().fg(Color::DarkGray))];
    }
    lines
}
