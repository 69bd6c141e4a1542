use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::{Coordinator, PlaybackPhase, RodioBackend};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

type Player = Coordinator<RodioBackend>;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Last playback state as emitted to MPRIS.
    last_phase: PlaybackPhase,
    last_track_id: Option<String>,
    last_duration: Duration,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self {
            pending_gg: false,
            last_phase: PlaybackPhase::Idle,
            last_track_id: None,
            last_duration: Duration::ZERO,
        }
    }
}

/// Main terminal event loop: samples playback progress, draws the UI and
/// applies keyboard and MPRIS transport commands to the player. Returns
/// `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &mut Player,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Cooperative progress sampling; also drains backend events.
        player.tick();

        // Keep MPRIS in sync even when playback changes come from media keys
        // or natural end-of-track.
        let snapshot = player.snapshot();
        let track_id = snapshot.current_track.as_ref().map(|t| t.id.clone());
        if track_id != state.last_track_id
            || snapshot.phase != state.last_phase
            || snapshot.duration != state.last_duration
        {
            update_mpris(mpris, &snapshot);
            state.last_track_id = track_id;
            state.last_phase = snapshot.phase;
            state.last_duration = snapshot.duration;
        }

        let display = app.display_indices();
        terminal.draw(|f| {
            ui::draw(f, app, &display, &snapshot, &settings.ui, &settings.controls)
        })?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app, player) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(settings.controls.poll_ms))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, player, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Play/pause semantics shared by the space key and MPRIS PlayPause: toggle
/// the addressed track, or start the selected entry when idle.
fn play_pause(app: &App, player: &mut Player) {
    let snapshot = player.snapshot();
    match snapshot.current_track {
        Some(track) => player.toggle(track),
        None => {
            if let Some(entry) = app.selected_entry() {
                player.play(entry.track());
            }
        }
    }
}

/// Returns true when the app should shut down.
fn handle_control_cmd(cmd: ControlCmd, app: &App, player: &mut Player) -> bool {
    match cmd {
        ControlCmd::Quit => {
            player.stop();
            return true;
        }
        ControlCmd::Play => {
            if player.snapshot().current_track.is_some() {
                player.resume();
            } else if let Some(entry) = app.selected_entry() {
                player.play(entry.track());
            }
        }
        ControlCmd::Pause => player.pause(),
        ControlCmd::PlayPause => play_pause(app, player),
        ControlCmd::Stop => player.stop(),
        ControlCmd::SkipForward => player.skip_forward(),
        ControlCmd::SkipBackward => player.skip_backward(),
    }

    false
}

/// Returns true when the app should shut down.
fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    player: &mut Player,
    state: &mut EventLoopState,
) -> bool {
    if app.filter_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Down => app.next(),
            KeyCode::Up => app.prev(),
            KeyCode::Enter => {
                if app.display_indices().is_empty() {
                    return false;
                }
                app.exit_filter_mode();
                if let Some(entry) = app.selected_entry() {
                    player.toggle(entry.track());
                }
            }
            KeyCode::Char(c) => {
                // Keep it simple: filter on printable characters.
                if !c.is_control() {
                    app.push_filter_char(c);
                }
            }
            _ => {}
        }

        return false;
    }

    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            player.stop();
            return true;
        }
        KeyCode::Char('/') => {
            state.pending_gg = false;
            app.enter_filter_mode();
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                let display = app.display_indices();
                if let Some(&first) = display.first() {
                    app.set_selected(first);
                }
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            let display = app.display_indices();
            if let Some(&last) = display.last() {
                app.set_selected(last);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.prev();
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            if let Some(entry) = app.selected_entry() {
                player.toggle(entry.track());
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            state.pending_gg = false;
            play_pause(app, player);
        }
        KeyCode::Char('x') => {
            state.pending_gg = false;
            player.stop();
        }
        KeyCode::Char('r') => {
            state.pending_gg = false;
            player.toggle_loop();
        }
        KeyCode::Char('L') => {
            state.pending_gg = false;
            player.skip_forward();
        }
        KeyCode::Char('H') => {
            state.pending_gg = false;
            player.skip_backward();
        }
        KeyCode::Char(c @ '0'..='9') => {
            state.pending_gg = false;
            let digit = c.to_digit(10).unwrap_or(0);
            player.seek_to(f64::from(digit) / 10.0);
        }
        KeyCode::Char(_) => {
            // g pending should clear on any other printable char
            state.pending_gg = false;
        }
        _ => {}
    }

    false
}
