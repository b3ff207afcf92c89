// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the
// orchestrator, or into local ViewState mutations (cursors, the picker,
// text being typed).

use std::path::PathBuf;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use squad_app::api::model::{MatchRef, NewGame};
use squad_app::pages::admin::AdminTab;
use squad_app::pages::leaderboard::Board;
use squad_app::protocol::{AppSnapshot, UserCommand};
use squad_app::route::Route;
use squad_app::session::UserType;
use squad_core::builder::LineupAction;
use squad_core::player::Position;

use super::widgets::picker;
use super::{PickerMode, PickerState, Prompt, PromptKind, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// orchestrator, `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode.
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }
    if view_state.prompt.is_some() {
        return handle_prompt(key_event, view_state);
    }
    if view_state.picker.is_some() {
        return handle_picker(key_event, view_state);
    }
    if view_state.search_mode {
        return handle_search_mode(key_event, view_state);
    }

    view_state.local_error = None;
    let Some(route) = view_state.route() else {
        if key_event.code == KeyCode::Char('q') {
            view_state.confirm_quit = true;
        }
        return None;
    };

    match route {
        Route::Login | Route::Signup => handle_form(key_event, view_state, route),
        _ => handle_normal(key_event, view_state, route),
    }
}

/// `y`/`q` confirm, `n`/Esc cancel, everything else is blocked.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// The tab `delta` steps away from the current route, wrapping.
fn step_tab(snapshot: &AppSnapshot, delta: isize) -> Option<Route> {
    let tabs = &snapshot.tabs;
    if tabs.is_empty() {
        return None;
    }
    let n = tabs.len() as isize;
    let current = tabs.iter().position(|r| *r == snapshot.route).unwrap_or(0) as isize;
    Some(tabs[(current + delta).rem_euclid(n) as usize])
}

fn navigate_tab(view_state: &ViewState, delta: isize) -> Option<UserCommand> {
    let snapshot = view_state.snapshot.as_ref()?;
    step_tab(snapshot, delta).map(UserCommand::Navigate)
}

/// `None` -> first -> ... -> last -> `None`.
fn cycle_option<T: Clone + PartialEq>(options: &[T], current: Option<&T>) -> Option<T> {
    match current {
        None => options.first().cloned(),
        Some(cur) => match options.iter().position(|o| o == cur) {
            Some(i) if i + 1 < options.len() => Some(options[i + 1].clone()),
            _ => None,
        },
    }
}

fn move_cursor(cursor: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *cursor = 0;
    } else if down {
        *cursor = (*cursor + 1).min(len - 1);
    } else {
        *cursor = cursor.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Login and signup forms
// ---------------------------------------------------------------------------

fn handle_form(key_event: KeyEvent, view_state: &mut ViewState, route: Route) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Tab => return navigate_tab(view_state, 1),
        KeyCode::BackTab => return navigate_tab(view_state, -1),
        KeyCode::Esc => {
            view_state.confirm_quit = true;
            return None;
        }
        _ => {}
    }

    let form = if route == Route::Login {
        &mut view_state.login_form
    } else {
        &mut view_state.signup_form
    };

    match key_event.code {
        KeyCode::Up => form.prev_field(),
        KeyCode::Down => form.next_field(),
        KeyCode::Left => form.cycle(false),
        KeyCode::Right => form.cycle(true),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.push(c),
        KeyCode::Enter if !form.is_last_field() => form.next_field(),
        KeyCode::Enter => {
            return Some(if route == Route::Login {
                let (email, password) = form.login_pair();
                UserCommand::Login { email, password }
            } else {
                UserCommand::Signup(form.signup_request())
            });
        }
        _ => {}
    }
    None
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key_event: KeyEvent, view_state: &mut ViewState, route: Route) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            return None;
        }
        KeyCode::Tab => return navigate_tab(view_state, 1),
        KeyCode::BackTab => return navigate_tab(view_state, -1),
        KeyCode::Char(d @ '1'..='9') => {
            let index = d as usize - '1' as usize;
            let tabs = &view_state.snapshot.as_ref()?.tabs;
            return tabs.get(index).copied().map(UserCommand::Navigate);
        }
        KeyCode::Char('L') => return Some(UserCommand::Logout),
        _ => {}
    }

    match route {
        Route::MyTeam => handle_team(key_event, view_state),
        Route::Leaderboard => handle_leaderboard(key_event, view_state),
        Route::Admin => handle_admin(key_event, view_state),
        Route::Scoring | Route::Login | Route::Signup => None,
    }
}

// ---------------------------------------------------------------------------
// Team screen
// ---------------------------------------------------------------------------

fn handle_team(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let snapshot = view_state.snapshot.as_ref()?;
    let lineup = snapshot.team.builder().lineup();
    let slot_count = lineup.slots().len();
    let current_slot = lineup.slots().get(view_state.slot_cursor).map(|s| s.id);

    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            move_cursor(&mut view_state.slot_cursor, slot_count, false);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_cursor(&mut view_state.slot_cursor, slot_count, true);
            None
        }
        KeyCode::Enter => {
            let slot = current_slot?;
            view_state.picker = Some(PickerState::new(PickerMode::Slot(slot)));
            None
        }
        KeyCode::Char('c') => {
            view_state.picker = Some(PickerState::new(PickerMode::Captain));
            None
        }
        KeyCode::Char('C') => Some(UserCommand::Lineup(LineupAction::SetCaptain(None))),
        KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => {
            current_slot.map(|slot| UserCommand::Lineup(LineupAction::Unassign(slot)))
        }
        KeyCode::Char('f') => {
            let next = snapshot.team.builder().formation().next();
            Some(UserCommand::Lineup(LineupAction::ChangeFormation(next)))
        }
        KeyCode::Char('s') => Some(UserCommand::SaveTeam),
        KeyCode::Char('r') => Some(UserCommand::ReloadTeam),
        _ => None,
    }
}

fn handle_picker(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let snapshot = view_state.snapshot.as_ref()?;
    let houses = snapshot.houses.clone();
    let picker_state = view_state.picker.as_mut()?;
    let candidates = picker::candidates(snapshot, picker_state);
    let highlighted = candidates.get(picker_state.cursor).map(|p| (*p).clone());
    let count = candidates.len();

    match key_event.code {
        KeyCode::Esc => {
            view_state.picker = None;
            None
        }
        KeyCode::Up => {
            move_cursor(&mut picker_state.cursor, count, false);
            None
        }
        KeyCode::Down => {
            move_cursor(&mut picker_state.cursor, count, true);
            None
        }
        KeyCode::Left | KeyCode::Right => {
            picker_state.house = cycle_option(&houses, picker_state.house.as_ref());
            picker_state.cursor = 0;
            None
        }
        KeyCode::Backspace => {
            picker_state.search.pop();
            picker_state.cursor = 0;
            None
        }
        KeyCode::Char(c) => {
            picker_state.search.push(c);
            picker_state.cursor = 0;
            None
        }
        KeyCode::Tab => {
            let PickerMode::Slot(_) = picker_state.mode else {
                return None;
            };
            highlighted.map(|p| UserCommand::Lineup(LineupAction::ToggleSelect(p)))
        }
        KeyCode::Enter => {
            let player = highlighted?;
            let action = match picker_state.mode {
                PickerMode::Slot(slot) => LineupAction::Assign { slot, player },
                PickerMode::Captain => LineupAction::SetCaptain(Some(player.id)),
            };
            view_state.picker = None;
            Some(UserCommand::Lineup(action))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Leaderboard screen
// ---------------------------------------------------------------------------

fn handle_leaderboard(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let snapshot = view_state.snapshot.as_ref()?;
    let page = &snapshot.leaderboard;
    let board = page.board();
    let rows = match board {
        Board::Teams => page.visible_teams().len(),
        Board::Players => page.visible_players().len(),
    };

    match key_event.code {
        KeyCode::Esc if page.detail().is_some() => Some(UserCommand::CloseDetail),
        KeyCode::Up | KeyCode::Char('k') => {
            move_cursor(&mut view_state.list_cursor, rows, false);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_cursor(&mut view_state.list_cursor, rows, true);
            None
        }
        KeyCode::Enter => match board {
            Board::Teams => page
                .visible_teams()
                .get(view_state.list_cursor)
                .map(|r| UserCommand::OpenTeamDetails(r.entry.team_id)),
            Board::Players => page
                .visible_players()
                .get(view_state.list_cursor)
                .map(|r| UserCommand::OpenPlayerStats(r.entry.id)),
        },
        KeyCode::Char('b') => {
            view_state.list_cursor = 0;
            Some(UserCommand::SetBoard(board.toggle()))
        }
        KeyCode::Char('/') => {
            view_state.search_mode = true;
            None
        }
        KeyCode::Char('h') => {
            view_state.list_cursor = 0;
            Some(match board {
                Board::Teams => {
                    let mut filter = page.team_filter.clone();
                    filter.house = cycle_option(&snapshot.houses, filter.house.as_ref());
                    UserCommand::SetTeamFilter(filter)
                }
                Board::Players => {
                    let mut filter = page.player_filter.clone();
                    filter.house = cycle_option(&snapshot.houses, filter.house.as_ref());
                    UserCommand::SetPlayerFilter(filter)
                }
            })
        }
        KeyCode::Char('p') if board == Board::Players => {
            view_state.list_cursor = 0;
            let mut filter = page.player_filter.clone();
            filter.position = cycle_option(&Position::ALL, filter.position.as_ref());
            Some(UserCommand::SetPlayerFilter(filter))
        }
        KeyCode::Char('t') if board == Board::Teams => {
            view_state.list_cursor = 0;
            let mut filter = page.team_filter.clone();
            filter.user_type = cycle_option(
                &[UserType::Student, UserType::Teacher],
                filter.user_type.as_ref(),
            );
            Some(UserCommand::SetTeamFilter(filter))
        }
        KeyCode::Char('r') => Some(UserCommand::RefreshLeaderboard),
        _ => None,
    }
}

/// Typing narrows the board as each key lands.
fn handle_search_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.search_mode = false;
            view_state.search_text.clear();
        }
        KeyCode::Enter => {
            view_state.search_mode = false;
            return None;
        }
        KeyCode::Backspace => {
            view_state.search_text.pop();
        }
        KeyCode::Char(c) => view_state.search_text.push(c),
        _ => return None,
    }
    view_state.list_cursor = 0;
    Some(UserCommand::SetSearch(view_state.search_text.clone()))
}

// ---------------------------------------------------------------------------
// Admin screen
// ---------------------------------------------------------------------------

fn handle_admin(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let snapshot = view_state.snapshot.as_ref()?;
    let admin = &snapshot.admin;

    // Global admin keys.
    match key_event.code {
        KeyCode::Char('a') => {
            view_state.list_cursor = 0;
            return Some(UserCommand::SetAdminTab(admin.tab.next()));
        }
        KeyCode::Char('r') => return Some(UserCommand::RefreshAdmin),
        KeyCode::Char('l') => return Some(UserCommand::ToggleTeamUpdates),
        _ => {}
    }

    let rows = match admin.tab {
        AdminTab::Players => admin.players.len(),
        AdminTab::Games => admin.games.len(),
        AdminTab::Users => admin.users_filtered().len(),
    };
    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            move_cursor(&mut view_state.list_cursor, rows, false);
            return None;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_cursor(&mut view_state.list_cursor, rows, true);
            return None;
        }
        _ => {}
    }

    let cursor = view_state.list_cursor;
    match (admin.tab, key_event.code) {
        (AdminTab::Players, KeyCode::Char('h')) => {
            view_state.list_cursor = 0;
            Some(UserCommand::SetHouseFirst(cycle_option(
                &snapshot.houses,
                admin.house_first.as_ref(),
            )))
        }
        (AdminTab::Players, KeyCode::Char('z')) => admin
            .players_sorted()
            .get(cursor)
            .map(|p| UserCommand::ResetPlayerPoints(p.player.id)),

        (AdminTab::Games, KeyCode::Char('n')) => {
            open_prompt(view_state, PromptKind::NewGame);
            None
        }
        (AdminTab::Games, KeyCode::Char('d')) => {
            admin.games.get(cursor).map(|g| UserCommand::DeleteGame(g.id))
        }
        (AdminTab::Games, KeyCode::Char('i')) => {
            let id = admin.games.get(cursor)?.id;
            open_prompt(view_state, PromptKind::ImportExisting(id));
            None
        }
        (AdminTab::Games, KeyCode::Char('I')) => {
            open_prompt(view_state, PromptKind::ImportNewMatch);
            None
        }

        (AdminTab::Users, KeyCode::Char('u')) => {
            view_state.list_cursor = 0;
            Some(UserCommand::CycleUserFilter)
        }
        (AdminTab::Users, KeyCode::Enter) => admin
            .users_filtered()
            .get(cursor)
            .map(|u| UserCommand::ViewUserTeam(u.id)),
        (AdminTab::Users, KeyCode::Char('d')) => admin
            .users_filtered()
            .get(cursor)
            .map(|u| UserCommand::DeleteUser(u.id)),

        _ => None,
    }
}

fn open_prompt(view_state: &mut ViewState, kind: PromptKind) {
    view_state.prompt = Some(Prompt {
        kind,
        input: String::new(),
    });
}

fn handle_prompt(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let prompt = view_state.prompt.as_mut()?;
    match key_event.code {
        KeyCode::Esc => {
            view_state.prompt = None;
            None
        }
        KeyCode::Backspace => {
            prompt.input.pop();
            None
        }
        KeyCode::Char(c) => {
            prompt.input.push(c);
            None
        }
        KeyCode::Enter => {
            let result = parse_prompt(prompt);
            view_state.prompt = None;
            match result {
                Ok(cmd) => Some(cmd),
                Err(e) => {
                    view_state.local_error = Some(e);
                    None
                }
            }
        }
        _ => None,
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date (YYYY-MM-DD)", s.trim()))
}

/// Turn a finished prompt into a command.
pub fn parse_prompt(prompt: &Prompt) -> Result<UserCommand, String> {
    let parts: Vec<&str> = prompt.input.split(',').map(str::trim).collect();
    match prompt.kind {
        PromptKind::NewGame => {
            let [name, date] = parts[..] else {
                return Err("expected: name, YYYY-MM-DD".into());
            };
            Ok(UserCommand::CreateGame(NewGame {
                name: name.to_string(),
                date: parse_date(date)?,
            }))
        }
        PromptKind::ImportExisting(game_id) => {
            let path = prompt.input.trim();
            if path.is_empty() {
                return Err("a CSV path is required".into());
            }
            Ok(UserCommand::ImportPerformance {
                match_ref: MatchRef::Existing(game_id),
                path: PathBuf::from(path),
            })
        }
        PromptKind::ImportNewMatch => {
            let [name, date, path] = parts[..] else {
                return Err("expected: name, YYYY-MM-DD, path".into());
            };
            Ok(UserCommand::ImportPerformance {
                match_ref: MatchRef::New {
                    name: name.to_string(),
                    date: parse_date(date)?,
                },
                path: PathBuf::from(path),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
