// Pitch widget: the lineup's slots grouped by position.
//
// Table: Slot, Player, House, Price, captain mark.
// The slot under the cursor is highlighted; empty slots are dimmed.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

use squad_app::pages::team::{TeamPage, TeamPageState};
use squad_core::lineup::Slot;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = &state.snapshot else {
        return;
    };
    let team = &snapshot.team;
    let lineup = team.builder().lineup();

    let header = Row::new(vec![
        Cell::from("Slot"),
        Cell::from("Player"),
        Cell::from("House"),
        Cell::from("Price"),
        Cell::from(""),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = if team.state() == TeamPageState::Loading {
        Vec::new()
    } else {
        lineup
            .slots()
            .iter()
            .map(|slot| slot_row(slot, lineup.captain()))
            .collect()
    };

    let widths = [
        Constraint::Length(7),
        Constraint::Min(16),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(3),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(build_title(team)))
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    if team.state() != TeamPageState::Loading {
        table_state.select(Some(state.slot_cursor));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn slot_row(slot: &Slot, captain: Option<u32>) -> Row<'static> {
    match &slot.player {
        Some(p) => {
            let is_captain = captain == Some(p.id);
            let style = if is_captain {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(slot.id.to_string()),
                Cell::from(p.name.clone()),
                Cell::from(p.house.clone().unwrap_or_default()),
                Cell::from(p.price.to_string()),
                Cell::from(if is_captain { "(C)" } else { "" }),
            ])
            .style(style)
        }
        None => Row::new(vec![
            Cell::from(slot.id.to_string()),
            Cell::from("-- empty --"),
            Cell::from(""),
            Cell::from(""),
            Cell::from(""),
        ])
        .style(Style::default().fg(Color::DarkGray)),
    }
}

/// E.g. "My Team 4-4-2 (7/11, unsaved changes)".
pub fn build_title(team: &TeamPage) -> String {
    let lineup = team.builder().lineup();
    match team.state() {
        TeamPageState::Loading => "My Team (loading...)".to_string(),
        state => format!(
            "My Team {} ({}/{}, {})",
            team.builder().formation(),
            lineup.filled_count(),
            lineup.required_count(),
            state
        ),
    }
}
