// Leaderboard widget: ranked team or player table plus the detail popup.
//
// Teams: Rank, Name, Points. Players: Rank, Name, Pos, House, Points.
// Ranks are the full-board ranks even while a search narrows the rows.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use squad_app::pages::leaderboard::{Board, Detail, LeaderboardPage};
use squad_core::team::{PlayerStats, TeamDetails};

use crate::tui::layout::centered_rect;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = &state.snapshot else {
        return;
    };
    let page = &snapshot.leaderboard;

    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let (header, rows, widths): (Row, Vec<Row>, Vec<Constraint>) = match page.board() {
        Board::Teams => (
            Row::new(vec!["#", "Team", "Points"]).style(header_style),
            page.visible_teams()
                .iter()
                .map(|r| {
                    Row::new(vec![
                        Cell::from(r.rank.to_string()),
                        Cell::from(r.entry.display_name().to_string()),
                        Cell::from(r.entry.total_points.to_string()),
                    ])
                })
                .collect(),
            vec![
                Constraint::Length(5),
                Constraint::Min(20),
                Constraint::Length(8),
            ],
        ),
        Board::Players => (
            Row::new(vec!["#", "Player", "Pos", "House", "Points"]).style(header_style),
            page.visible_players()
                .iter()
                .map(|r| {
                    Row::new(vec![
                        Cell::from(r.rank.to_string()),
                        Cell::from(r.entry.name.clone()),
                        Cell::from(r.entry.position.code()),
                        Cell::from(r.entry.house.clone().unwrap_or_default()),
                        Cell::from(r.entry.points.unwrap_or(0).to_string()),
                    ])
                })
                .collect(),
            vec![
                Constraint::Length(5),
                Constraint::Min(20),
                Constraint::Length(5),
                Constraint::Length(10),
                Constraint::Length(8),
            ],
        ),
    };

    let row_count = rows.len();
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(build_title(page, state.search_mode, &state.search_text)),
        )
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    if row_count > 0 {
        table_state.select(Some(state.list_cursor.min(row_count - 1)));
    }
    frame.render_stateful_widget(table, area, &mut table_state);

    if let Some(detail) = page.detail() {
        render_detail(frame, area, detail);
    }
}

/// E.g. "Teams [house: Tata] [student] /ro".
pub fn build_title(page: &LeaderboardPage, search_mode: bool, search_text: &str) -> String {
    let mut title = match page.board() {
        Board::Teams => String::from("Teams"),
        Board::Players => String::from("Players"),
    };
    let (house, extra) = match page.board() {
        Board::Teams => (
            page.team_filter.house.as_deref(),
            page.team_filter.user_type.map(|t| t.label()),
        ),
        Board::Players => (
            page.player_filter.house.as_deref(),
            page.player_filter.position.map(|p| p.code()),
        ),
    };
    if let Some(h) = house {
        title.push_str(&format!(" [house: {h}]"));
    }
    if let Some(e) = extra {
        title.push_str(&format!(" [{e}]"));
    }
    if search_mode || !search_text.is_empty() {
        title.push_str(&format!(" /{search_text}"));
        if search_mode {
            title.push('_');
        }
    }
    if page.is_loading() {
        title.push_str(" (loading...)");
    }
    title
}

fn render_detail(frame: &mut Frame, area: Rect, detail: &Detail) {
    let (title, lines) = match detail {
        Detail::Team(team) => (" Team ", team_lines(team)),
        Detail::Player(stats) => (" Player ", player_lines(stats)),
    };
    let popup = centered_rect(50, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        )
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, popup);
}

fn team_lines(team: &TeamDetails) -> Vec<Line<'static>> {
    let heading = team
        .name
        .clone()
        .or_else(|| team.user_name.clone())
        .unwrap_or_else(|| format!("Team {}", team.id));
    let formation = team
        .formation
        .map(|f| f.to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        Line::styled(
            format!(" {heading}"),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::raw(format!(" {} points, {}", team.total_points, formation)),
    ];
    let mut members: Vec<_> = team.members.iter().collect();
    members.sort_by_key(|m| m.player.position.sort_order());
    for m in members {
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
    lines
}

fn player_lines(stats: &PlayerStats) -> Vec<Line<'static>> {
    let p = &stats.player;
    vec![
        Line::styled(
            format!(" {}", p.name),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::raw(format!(
            " {} {}",
            p.position.label(),
            p.house.as_deref().unwrap_or("")
        )),
        Line::raw(format!(" Price:    {}", p.price)),
        Line::raw(format!(" Points:   {}", stats.total_points)),
        Line::raw(format!(" Picked by {} teams", stats.teams_count)),
        Line::raw(format!(" Captain   {} times", stats.captain_count)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::snapshot;
    use squad_app::route::Route;
    use squad_app::session::UserType;
    use squad_core::player::{Player, Position};

    #[test]
    fn title_lists_active_filters() {
        let mut page = LeaderboardPage::default();
        assert_eq!(build_title(&page, false, ""), "Teams");
        page.team_filter.house = Some("Tata".into());
        page.team_filter.user_type = Some(UserType::Student);
        assert_eq!(
            build_title(&page, true, "ro"),
            "Teams [house: Tata] [student] /ro_"
        );
        page.set_board(Board::Players);
        page.player_filter.position = Some(Position::Defender);
        assert_eq!(build_title(&page, false, ""), "Players [DEF]");
    }

    #[test]
    fn render_does_not_panic_with_rows_and_detail() {
        let backend = ratatui::backend::TestBackend::new(100, 30);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();

        let mut snap = snapshot(Route::Leaderboard);
        snap.leaderboard.set_board(Board::Players);
        let gen = snap.leaderboard.begin_fetch();
        let mut p = Player::new(3, "Kiran", Position::Midfielder, 9);
        p.points = Some(14);
        snap.leaderboard.players_loaded(gen, Ok(vec![p.clone()]));
        snap.leaderboard.detail_loaded(Ok(Detail::Player(PlayerStats {
            player: p,
            total_points: 14,
            teams_count: 6,
            captain_count: 2,
        })));

        let mut state = ViewState::default();
        state.apply_snapshot(snap);
        state.list_cursor = 5;
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(80, 20);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
