// Login and signup form widget.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use squad_app::route::Route;

use crate::tui::form::{FieldKind, Form};
use crate::tui::layout::centered_rect;
use crate::tui::ViewState;

const FORM_WIDTH: u16 = 56;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (form, title) = match state.route() {
        Some(Route::Signup) => (&state.signup_form, " Sign up "),
        _ => (&state.login_form, " Log in "),
    };

    let lines = build_form_lines(form);
    let height = lines.len() as u16 + 2;
    let form_area = centered_rect(FORM_WIDTH, height, area);
    frame.render_widget(Clear, form_area);

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                title,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(paragraph, form_area);
}

/// One line per field, the focused one marked.
pub fn build_form_lines(form: &Form) -> Vec<Line<'static>> {
    let teacher = form.get("Role") == "Teacher";
    let mut lines = vec![Line::raw("")];

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let marker = if focused { "> " } else { "  " };
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let value = match &field.kind {
            FieldKind::Choice(options) if options.is_empty() => "(none available)".to_string(),
            FieldKind::Choice(_) if field.label == "House" && teacher => {
                "(students only)".to_string()
            }
            FieldKind::Choice(_) => format!("< {} >", field.current()),
            FieldKind::Text | FieldKind::Secret if focused => format!("{}_", field.display()),
            FieldKind::Text | FieldKind::Secret => field.display(),
        };

        lines.push(Line::from(vec![
            Span::styled(marker, label_style),
            Span::styled(format!("{:<10}", field.label), label_style),
            Span::styled(value, Style::default().fg(Color::White)),
        ]));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::snapshot;

    #[test]
    fn password_is_masked() {
        let mut form = Form::login();
        form.fields[1].value = "hunter2".into();
        let lines = build_form_lines(&form);
        let text: String = lines[2].spans.iter().map(|s| s.content.to_string()).collect();
        assert!(text.contains("*******"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn teacher_house_is_hidden() {
        let mut form = Form::signup(&["Tata".to_string()]);
        form.focus = 3;
        form.cycle(true);
        let lines = build_form_lines(&form);
        let text: String = lines[5].spans.iter().map(|s| s.content.to_string()).collect();
        assert!(text.contains("students only"));
    }

    #[test]
    fn render_does_not_panic() {
        for route in [Route::Login, Route::Signup] {
            let backend = ratatui::backend::TestBackend::new(80, 20);
            let mut terminal = ratatui::Terminal::new(backend).unwrap();
            let mut state = ViewState::default();
            state.apply_snapshot(snapshot(route));
            terminal
                .draw(|frame| render(frame, frame.area(), &state))
                .unwrap();
        }
    }
}
