// Admin widget: section tabs, the lock indicator and one table per section.
//
// Players: Name, Pos, House, Points, latest match line.
// Games: Date, Name.
// Users: Name, Email, Type, House, Team points.
// A user's team opens as a popup over the users table.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use squad_app::api::model::LatestPerformance;
use squad_app::pages::admin::{AdminPage, AdminTab};
use squad_core::team::Team;

use crate::tui::layout::centered_rect;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = &state.snapshot else {
        return;
    };
    let admin = &snapshot.admin;

    let [header_area, table_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(area);
    frame.render_widget(Paragraph::new(header_line(admin)), header_area);

    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let (header, rows, widths): (Row, Vec<Row>, Vec<Constraint>) = match admin.tab {
        AdminTab::Players => (
            Row::new(vec!["Name", "Pos", "House", "Points", "Latest match"]).style(header_style),
            admin
                .players_sorted()
                .iter()
                .map(|ap| {
                    let p = &ap.player;
                    Row::new(vec![
                        Cell::from(p.name.clone()),
                        Cell::from(p.position.code()),
                        Cell::from(p.house.clone().unwrap_or_default()),
                        Cell::from(p.points.unwrap_or(0).to_string()),
                        Cell::from(ap.latest.as_ref().map(format_latest).unwrap_or_default()),
                    ])
                })
                .collect(),
            vec![
                Constraint::Min(16),
                Constraint::Length(4),
                Constraint::Length(10),
                Constraint::Length(7),
                Constraint::Min(20),
            ],
        ),
        AdminTab::Games => (
            Row::new(vec!["Date", "Match"]).style(header_style),
            admin
                .games
                .iter()
                .map(|g| {
                    Row::new(vec![
                        Cell::from(g.date.format("%Y-%m-%d").to_string()),
                        Cell::from(g.name.clone()),
                    ])
                })
                .collect(),
            vec![Constraint::Length(11), Constraint::Min(20)],
        ),
        AdminTab::Users => (
            Row::new(vec!["Name", "Email", "Type", "House", "Team"]).style(header_style),
            admin
                .users_filtered()
                .iter()
                .map(|u| {
                    let kind = if u.is_admin {
                        "admin"
                    } else {
                        u.user_type.map_or("-", |t| t.label())
                    };
                    let team = u
                        .team
                        .as_ref()
                        .map(|t| format!("{} pts", t.total_points))
                        .unwrap_or_else(|| "none".to_string());
                    Row::new(vec![
                        Cell::from(u.name.clone()),
                        Cell::from(u.email.clone()),
                        Cell::from(kind),
                        Cell::from(u.house.clone().unwrap_or_default()),
                        Cell::from(team),
                    ])
                })
                .collect(),
            vec![
                Constraint::Min(14),
                Constraint::Min(20),
                Constraint::Length(8),
                Constraint::Length(10),
                Constraint::Length(9),
            ],
        ),
    };

    let row_count = rows.len();
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(build_title(admin)),
        )
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    if row_count > 0 {
        table_state.select(Some(state.list_cursor.min(row_count - 1)));
    }
    frame.render_stateful_widget(table, table_area, &mut table_state);

    if admin.tab == AdminTab::Users {
        if let Some((user_id, team)) = &admin.inspected {
            render_user_team(frame, table_area, *user_id, team.as_ref());
        }
    }
}

/// Section tabs followed by the team-update lock state.
fn header_line(admin: &AdminPage) -> Line<'static> {
    let mut spans = Vec::new();
    for tab in AdminTab::ALL {
        let style = if tab == admin.tab {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}]", tab.title()), style));
        spans.push(Span::raw(" "));
    }
    let (label, color) = lock_label(admin.updates_locked);
    spans.push(Span::styled(label, Style::default().fg(color)));
    Line::from(spans)
}

pub fn lock_label(locked: Option<bool>) -> (&'static str, Color) {
    match locked {
        Some(true) => ("Team updates: LOCKED", Color::Red),
        Some(false) => ("Team updates: open", Color::Green),
        None => ("Team updates: ?", Color::DarkGray),
    }
}

fn build_title(admin: &AdminPage) -> String {
    match admin.tab {
        AdminTab::Players => match &admin.house_first {
            Some(h) => format!("Players ({h} first)"),
            None => "Players".to_string(),
        },
        AdminTab::Games => format!("Games ({})", admin.games.len()),
        AdminTab::Users => match admin.user_type_filter {
            Some(t) => format!("Users [{}]", t.label()),
            None => "Users".to_string(),
        },
    }
}

/// E.g. "Final: 1G 1A CS YC".
pub fn format_latest(latest: &LatestPerformance) -> String {
    let mut parts = Vec::new();
    if latest.goals > 0 {
        parts.push(format!("{}G", latest.goals));
    }
    if latest.assists > 0 {
        parts.push(format!("{}A", latest.assists));
    }
    if latest.clean_sheet {
        parts.push("CS".to_string());
    }
    if latest.goals_conceded > 0 {
        parts.push(format!("{}GC", latest.goals_conceded));
    }
    if latest.yellow_cards > 0 {
        parts.push("YC".to_string());
    }
    if latest.red_cards > 0 {
        parts.push("RC".to_string());
    }
    if latest.bonus_points > 0 {
        parts.push(format!("+{}B", latest.bonus_points));
    }
    let line = if parts.is_empty() {
        "played".to_string()
    } else {
        parts.join(" ")
    };
    match &latest.match_name {
        Some(name) => format!("{name}: {line}"),
        None => line,
    }
}

fn render_user_team(frame: &mut Frame, area: Rect, user_id: u32, team: Option<&Team>) {
    let mut lines = Vec::new();
    match team {
        None => lines.push(Line::raw(" No team yet")),
        Some(team) => {
            let formation = team
                .formation
                .map(|f| f.to_string())
                .unwrap_or_else(|| "-".to_string());
            lines.push(Line::raw(format!(
                " {} points, {}, cost {}",
                team.total_points,
                formation,
                team.cost()
            )));
            let mut players: Vec<_> = team.members.iter().collect();
            players.sort_by_key(|m| m.player.position.sort_order());
            for m in players {
                let mut spans = vec![
                    Span::styled(
                        format!(" {:<4}", m.player.position.code()),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(m.player.name.clone()),
                ];
                if m.is_captain {
                    spans.push(Span::styled(" (C)", Style::default().fg(Color::Yellow)));
                }
                lines.push(Line::from(spans));
            }
        }
    }

    let popup = centered_rect(46, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" User {user_id} team ")),
        )
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, popup);
}
