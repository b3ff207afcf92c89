// One-line text prompt overlay for admin actions.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::layout::centered_rect;
use crate::tui::Prompt;

pub fn render(frame: &mut Frame, area: Rect, prompt: &Prompt) {
    let width = area.width.saturating_sub(4).min(70);
    let dialog_area = centered_rect(width, 3, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!(" {} ", prompt.kind.title()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let line = Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Gray)),
        Span::styled(prompt.input.clone(), Style::default().fg(Color::White)),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);
    let paragraph = Paragraph::new(line)
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}
