// Points table: how the backend scores each match event.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use squad_core::scoring::{format_points, BY_POSITION, OVERALL};

pub fn render(frame: &mut Frame, area: Rect) {
    let [overall_area, position_area] =
        Layout::vertical([Constraint::Length(6), Constraint::Min(6)]).areas(area);

    let bonus = OVERALL
        .bonus
        .iter()
        .map(|b| format_points(Some(*b)))
        .collect::<Vec<_>>()
        .join(" / ");
    let overall = vec![
        Line::raw(format!(" Played a game      {}", format_points(Some(OVERALL.game_played)))),
        Line::raw(format!(" Yellow card        {}", format_points(Some(OVERALL.yellow_card)))),
        Line::raw(format!(" Red card           {}", format_points(Some(OVERALL.red_card)))),
        Line::raw(format!(" Bonus              {bonus}")),
    ];
    frame.render_widget(
        Paragraph::new(overall).block(Block::default().borders(Borders::ALL).title("Every player")),
        overall_area,
    );

    let header = Row::new(vec![
        Cell::from("Position"),
        Cell::from("Goal"),
        Cell::from("Assist"),
        Cell::from("Clean sheet"),
        Cell::from("Per 2 conceded"),
    ])
    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = BY_POSITION
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.position.label()),
                Cell::from(format_points(Some(r.goal))),
                Cell::from(format_points(Some(r.assist))),
                Cell::from(format_points(r.clean_sheet)),
                Cell::from(format_points(r.two_goals_conceded)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Length(15),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("By position"));
    frame.render_widget(table, position_area);
}
