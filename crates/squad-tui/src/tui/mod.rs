// Terminal front end: layout, input handling, and widget rendering.
//
// The TUI keeps the latest `AppSnapshot` from the orchestrator plus the
// purely local state (cursors, open picker, text being typed). Snapshots
// replace the mirrored state wholesale; the screen re-renders at ~30 fps.

pub mod form;
pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use squad_app::api::model::GameId;
use squad_app::pages::team::TeamPageState;
use squad_app::protocol::{AppSnapshot, UiUpdate, UserCommand};
use squad_app::route::Route;
use squad_core::lineup::SlotId;

use form::Form;
use layout::build_layout;

// ---------------------------------------------------------------------------
// Local UI state
// ---------------------------------------------------------------------------

/// What the open picker chooses for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerMode {
    Slot(SlotId),
    Captain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerState {
    pub mode: PickerMode,
    pub search: String,
    pub house: Option<String>,
    pub cursor: usize,
}

impl PickerState {
    pub fn new(mode: PickerMode) -> Self {
        PickerState {
            mode,
            search: String::new(),
            house: None,
            cursor: 0,
        }
    }
}

/// One-line text prompts on the admin screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// `name, YYYY-MM-DD`
    NewGame,
    /// CSV path for an existing game.
    ImportExisting(GameId),
    /// `name, YYYY-MM-DD, path`
    ImportNewMatch,
}

impl PromptKind {
    pub fn title(&self) -> &'static str {
        match self {
            PromptKind::NewGame => "New game (name, YYYY-MM-DD)",
            PromptKind::ImportExisting(_) => "Import CSV for selected game (path)",
            PromptKind::ImportNewMatch => "Import CSV for new match (name, YYYY-MM-DD, path)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

/// TUI-local state: the last snapshot plus cursors and input buffers.
pub struct ViewState {
    /// `None` until the orchestrator sends its first snapshot.
    pub snapshot: Option<AppSnapshot>,
    /// Index into the lineup's slots on the team screen.
    pub slot_cursor: usize,
    /// Row cursor for leaderboard and admin lists.
    pub list_cursor: usize,
    pub picker: Option<PickerState>,
    /// Leaderboard search input is active.
    pub search_mode: bool,
    pub search_text: String,
    pub login_form: Form,
    pub signup_form: Form,
    pub prompt: Option<Prompt>,
    /// Input errors caught before anything was sent.
    pub local_error: Option<String>,
    pub confirm_quit: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            snapshot: None,
            slot_cursor: 0,
            list_cursor: 0,
            picker: None,
            search_mode: false,
            search_text: String::new(),
            login_form: Form::login(),
            signup_form: Form::signup(&[]),
            prompt: None,
            local_error: None,
            confirm_quit: false,
        }
    }
}

impl ViewState {
    pub fn route(&self) -> Option<Route> {
        self.snapshot.as_ref().map(|s| s.route)
    }

    /// Replace the mirrored state, resetting local state that no longer
    /// applies.
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        let route_changed = self.route() != Some(snapshot.route);
        if route_changed {
            debug!(route = ?snapshot.route, "route changed");
            self.list_cursor = 0;
            self.picker = None;
            self.prompt = None;
            self.search_mode = false;
            self.local_error = None;
        }
        if snapshot.route == Route::Login && snapshot.user_name.is_none() && route_changed {
            // Never leave a password on screen after logout.
            self.login_form = Form::login();
        }

        let editable = matches!(
            snapshot.team.state(),
            TeamPageState::Ready | TeamPageState::Editing
        );
        if !editable {
            self.picker = None;
        }

        let slots = snapshot.team.builder().lineup().slots().len();
        self.slot_cursor = self.slot_cursor.min(slots.saturating_sub(1));
        if !self.search_mode {
            self.search_text = snapshot.leaderboard.search_text().to_string();
        }
        self.signup_form.set_choices("House", &snapshot.houses);

        self.snapshot = Some(snapshot);
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => state.apply_snapshot(*snapshot),
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);

    match state.route() {
        None => render_waiting(frame, layout.body),
        Some(Route::Login) | Some(Route::Signup) => {
            widgets::login::render(frame, layout.body, state)
        }
        Some(Route::MyTeam) => {
            widgets::pitch::render(frame, layout.main_panel, state);
            widgets::budget::render(frame, layout.budget, state);
            widgets::bench::render(frame, layout.bench, state);
        }
        Some(Route::Leaderboard) => widgets::leaderboard::render(frame, layout.body, state),
        Some(Route::Scoring) => widgets::scoring::render(frame, layout.body),
        Some(Route::Admin) => widgets::admin::render(frame, layout.body, state),
    }

    widgets::message_bar::render(frame, layout.message_bar, state);
    render_help_bar(frame, layout.help_bar, state);

    // Overlays, topmost last.
    if state.picker.is_some() {
        widgets::picker::render(frame, layout.body, state);
    }
    if let Some(prompt) = &state.prompt {
        widgets::prompt::render(frame, layout.body, prompt);
    }
    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

fn render_waiting(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new("Connecting...")
        .block(Block::default().borders(Borders::ALL).title("Squad"));
    frame.render_widget(paragraph, area);
}

/// Key hints for the current screen.
pub fn help_text(state: &ViewState) -> &'static str {
    if state.picker.is_some() {
        return " type:Search | Left/Right:House | Enter:Pick | Tab:Select | Esc:Close";
    }
    if state.prompt.is_some() {
        return " Enter:Submit | Esc:Cancel";
    }
    if state.search_mode {
        return " type:Search | Enter:Done | Esc:Clear";
    }
    match state.route() {
        None => " Ctrl+C:Quit",
        Some(Route::Login) | Some(Route::Signup) => {
            " Up/Down:Field | Left/Right:Choose | Enter:Submit | Tab:Screen | Esc:Quit"
        }
        Some(Route::MyTeam) => {
            " j/k:Slot | Enter:Pick | x:Clear | c/C:Captain | f:Formation | s:Save | r:Reload | L:Logout | q:Quit"
        }
        Some(Route::Leaderboard) => {
            " b:Board | /:Search | h/p/t:Filter | Enter:Details | r:Refresh | Tab:Screen | q:Quit"
        }
        Some(Route::Scoring) => " Tab:Screen | q:Quit",
        Some(Route::Admin) => {
            " a:Section | j/k:Move | r:Refresh | l:Lock | h:House | z:Reset | n/d/i/I:Games | u:Users | q:Quit"
        }
    }
}

fn render_help_bar(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        help_text(state),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop until the user quits or the orchestrator stops.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    // Restore the terminal before the default hook prints the panic.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Orchestrator has shut down.
                    None => break,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            if cmd_tx.send(cmd).await.is_err() {
                                warn!("command channel closed");
                                break;
                            }
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("terminal input error: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
