// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +-------------------------+------------------------+
// | Main Panel (60%)         | Sidebar (40%)          |
// |                          | +- Budget (7 rows) ---+|
// |                          | +- Bench (rest) ------+|
// +-------------------------+------------------------+
// | Message Bar (1 row)                               |
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+
//
// Screens without a sidebar draw across the whole `body` instead.

use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: league name, tabs, user.
    pub status_bar: Rect,
    /// The full middle section; the union of the three panels below.
    pub body: Rect,
    /// Left side of the body: the pitch on the team screen.
    pub main_panel: Rect,
    /// Right sidebar top: budget summary.
    pub budget: Rect,
    /// Right sidebar bottom: selected but unassigned players.
    pub bench: Rect,
    /// Notices from the orchestrator or local input errors.
    pub message_bar: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    // Vertical: status(1) | body(fill) | message(1) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(8),    // body
            Constraint::Length(1), // message bar
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let status_bar = vertical[0];
    let body = vertical[1];
    let message_bar = vertical[2];
    let help_bar = vertical[3];

    // Horizontal: main panel (60%) | sidebar (40%)
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(body);

    let main_panel = horizontal[0];
    let sidebar = horizontal[1];

    let sidebar_sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(3)])
        .split(sidebar);

    AppLayout {
        status_bar,
        body,
        main_panel,
        budget: sidebar_sections[0],
        bench: sidebar_sections[1],
        message_bar,
        help_bar,
    }
}

/// Compute a centered rectangle of the given size within `area`, clamped to
/// the available space.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width);
    let clamped_height = height.min(area.height);

    let vertical = Layout::vertical([Constraint::Length(clamped_height)])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(clamped_width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 120, 40)
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        let rects = [
            ("status_bar", layout.status_bar),
            ("body", layout.body),
            ("main_panel", layout.main_panel),
            ("budget", layout.budget),
            ("bench", layout.bench),
            ("message_bar", layout.message_bar),
            ("help_bar", layout.help_bar),
        ];
        for (name, rect) in &rects {
            assert!(
                rect.width > 0 && rect.height > 0,
                "{} has zero area: {:?}",
                name,
                rect
            );
        }
    }

    #[test]
    fn bars_are_one_row() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.message_bar.height, 1);
        assert_eq!(layout.help_bar.height, 1);
    }

    #[test]
    fn panels_split_the_body() {
        let layout = build_layout(test_area());
        assert_eq!(
            layout.main_panel.width + layout.budget.width,
            layout.body.width
        );
        assert_eq!(layout.budget.width, layout.bench.width);
        assert!(layout.budget.y < layout.bench.y);
        assert_eq!(layout.budget.height, 7);
        assert!(layout.main_panel.width > layout.budget.width);
    }

    #[test]
    fn layout_fits_within_area() {
        let area = test_area();
        let layout = build_layout(area);
        for rect in [
            layout.status_bar,
            layout.body,
            layout.main_panel,
            layout.budget,
            layout.bench,
            layout.message_bar,
            layout.help_bar,
        ] {
            assert!(rect.x + rect.width <= area.width, "{rect:?} too wide");
            assert!(rect.y + rect.height <= area.height, "{rect:?} too tall");
        }
    }

    #[test]
    fn small_terminal_still_valid() {
        let layout = build_layout(Rect::new(0, 0, 40, 16));
        assert!(layout.body.height >= 8);
        assert!(layout.bench.height > 0);
    }

    #[test]
    fn centered_rect_is_centered() {
        let area = Rect::new(0, 0, 80, 24);
        let r = centered_rect(30, 6, area);
        assert_eq!((r.width, r.height), (30, 6));
        assert!((r.x + r.width / 2).abs_diff(40) <= 1);
        assert!((r.y + r.height / 2).abs_diff(12) <= 1);
    }

    #[test]
    fn centered_rect_clamps_to_small_area() {
        let area = Rect::new(0, 0, 10, 3);
        let r = centered_rect(30, 6, area);
        assert!(r.width <= area.width);
        assert!(r.height <= area.height);
    }
}
