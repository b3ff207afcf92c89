// Player picker overlay: candidates for a slot or for captain.
//
// Table: Name, Pos, House, Price. Players already selected are marked with
// `*`; the cursor row is highlighted.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Row, Table, TableState};
use ratatui::Frame;

use squad_app::protocol::AppSnapshot;
use squad_core::picker::{captain_candidates, slot_candidates, PickerQuery};
use squad_core::player::Player;

use crate::tui::layout::centered_rect;
use crate::tui::{PickerMode, PickerState, ViewState};

/// Players the picker currently offers, in display order.
pub fn candidates<'a>(snapshot: &'a AppSnapshot, picker: &PickerState) -> Vec<&'a Player> {
    let query = PickerQuery {
        search: picker.search.clone(),
        house: picker.house.clone(),
    };
    let builder = snapshot.team.builder();
    match picker.mode {
        PickerMode::Slot(id) => match builder.lineup().slot(id) {
            Some(slot) => slot_candidates(snapshot.team.pool(), slot, &query),
            None => Vec::new(),
        },
        PickerMode::Captain => captain_candidates(builder.lineup(), &query),
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (Some(snapshot), Some(picker)) = (&state.snapshot, &state.picker) else {
        return;
    };
    let builder = snapshot.team.builder();
    let list = candidates(snapshot, picker);

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("Name"),
        Cell::from("Pos"),
        Cell::from("House"),
        Cell::from("Price"),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = list
        .iter()
        .map(|p| {
            let mark = if builder.is_selected(p.id) { "*" } else { "" };
            Row::new(vec![
                Cell::from(mark),
                Cell::from(p.name.clone()),
                Cell::from(p.position.code()),
                Cell::from(p.house.clone().unwrap_or_default()),
                Cell::from(p.price.to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Min(16),
        Constraint::Length(4),
        Constraint::Length(10),
        Constraint::Length(6),
    ];

    let popup = centered_rect(area.width.saturating_sub(4).min(64), area.height.saturating_sub(2), area);
    frame.render_widget(Clear, popup);

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(build_title(picker, list.len())),
        )
        .style(Style::default().bg(Color::Black))
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    if !list.is_empty() {
        table_state.select(Some(picker.cursor.min(list.len() - 1)));
    }
    frame.render_stateful_widget(table, popup, &mut table_state);
}

/// E.g. "Pick for def-2 [Tata] /ro (3)".
pub fn build_title(picker: &PickerState, count: usize) -> String {
    let mut title = match picker.mode {
        PickerMode::Slot(id) => format!("Pick for {id}"),
        PickerMode::Captain => "Pick captain".to_string(),
    };
    if let Some(house) = &picker.house {
        title.push_str(&format!(" [{house}]"));
    }
    if !picker.search.is_empty() {
        title.push_str(&format!(" /{}", picker.search));
    }
    title.push_str(&format!(" ({count})"));
    title
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::{eleven, snapshot};
    use squad_app::route::Route;
    use squad_core::builder::LineupAction;
    use squad_core::lineup::SlotId;
    use squad_core::player::Position;

    fn gk_picker() -> PickerState {
        PickerState::new(PickerMode::Slot(SlotId::new(Position::Goalkeeper, 0)))
    }

    #[test]
    fn slot_candidates_follow_category_and_price() {
        let snap = snapshot(Route::MyTeam);
        let ids: Vec<u32> = candidates(&snap, &gk_picker()).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![12, 1]);
    }

    #[test]
    fn search_narrows_candidates() {
        let snap = snapshot(Route::MyTeam);
        let mut picker = gk_picker();
        picker.search = "p1".into();
        let ids: Vec<u32> = candidates(&snap, &picker).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![12, 1]);
        picker.search = "p12".into();
        assert_eq!(candidates(&snap, &picker).len(), 1);
    }

    #[test]
    fn captain_candidates_come_from_the_pitch() {
        let mut snap = snapshot(Route::MyTeam);
        assert!(candidates(&snap, &PickerState::new(PickerMode::Captain)).is_empty());
        let pool = eleven();
        snap.team
            .edit(LineupAction::ToggleSelect(pool[5].clone()))
            .unwrap();
        let ids: Vec<u32> = candidates(&snap, &PickerState::new(PickerMode::Captain))
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![6]);
    }

    #[test]
    fn title_reflects_filters() {
        let mut picker = gk_picker();
        picker.house = Some("Tata".into());
        picker.search = "ro".into();
        assert_eq!(build_title(&picker, 3), "Pick for gk-0 [Tata] /ro (3)");
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot(Route::MyTeam));
        state.picker = Some(gk_picker());
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
