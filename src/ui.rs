//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`: the
//! header, the session list and the sticky now-playing bar that mirrors the
//! player snapshot. The bar only exists while a track is addressed, which is
//! also how a failed play stays visible and retryable.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::App;
use crate::config::{ControlsSettings, UiSettings};
use crate::player::{PlayerSnapshot, TrackDescriptor};

/// Render the controls help text, incorporating the skip step.
fn controls_text(skip_step_secs: u64) -> String {
    [
        "[j/k] up/down".to_string(),
        format!("[H/L] skip -/+{}s", skip_step_secs),
        "[enter] play/pause selected".to_string(),
        "[space/p] play/pause".to_string(),
        "[0-9] seek".to_string(),
        "[r] loop".to_string(),
        "[x] close player".to_string(),
        "[/] filter".to_string(),
        "[gg/G] top/bottom".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Parse a `#RRGGBB` accent into a terminal color.
fn parse_accent(accent: &str) -> Option<Color> {
    let hex = accent.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn accent_for(track: &TrackDescriptor, ui: &UiSettings) -> Color {
    track
        .accent_color
        .as_deref()
        .and_then(parse_accent)
        .or_else(|| parse_accent(&ui.accent_fallback))
        .unwrap_or(Color::Cyan)
}

/// Row marker for an entry: whether it is the addressed track, and in what
/// state. Every requester derives this from the shared snapshot only.
fn row_marker(entry_id: &str, snapshot: &PlayerSnapshot) -> &'static str {
    match &snapshot.current_track {
        Some(track) if track.id == entry_id => {
            if snapshot.is_playing() {
                "▶ "
            } else {
                "⏸ "
            }
        }
        _ => "  ",
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    display: &[usize],
    snapshot: &PlayerSnapshot,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let bar_height = if snapshot.current_track.is_some() { 4 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(bar_height),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" attune ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Session list
    {
        let q = app.filter_query.trim();

        // Center the selected item when possible by creating a visible
        // window; only build ListItems for that window.
        let total = display.len();
        let list_height = chunks[1].height.saturating_sub(2) as usize;
        let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = if sel_pos > half { sel_pos - half } else { 0 };
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = display[start..end]
            .iter()
            .map(|&i| {
                let entry = &app.entries[i];
                let text = if q.is_empty() {
                    entry.display.clone()
                } else if let Some(positions) = App::fuzzy_match_positions(&entry.display, q) {
                    let mut rendered = String::new();
                    let mut pos_iter = positions.into_iter();
                    let mut next_pos = pos_iter.next();

                    for (ci, ch) in entry.display.chars().enumerate() {
                        if next_pos == Some(ci) {
                            for up in ch.to_uppercase() {
                                rendered.push(up);
                            }
                            next_pos = pos_iter.next();
                        } else {
                            rendered.push(ch);
                        }
                    }
                    rendered
                } else {
                    entry.display.clone()
                };

                let badge = if entry.is_external() {
                    " [spotify]"
                } else if entry.local {
                    " [local]"
                } else {
                    ""
                };
                let hint = entry
                    .duration_hint
                    .map(|d| format!(" ({})", format_mmss(d)))
                    .unwrap_or_default();

                ListItem::new(format!(
                    "{}[{}] {}{}{}",
                    row_marker(&entry.id, snapshot),
                    entry.kind_label,
                    text,
                    hint,
                    badge,
                ))
            })
            .collect();

        let title = if q.is_empty() && !app.filter_mode {
            " sessions ".to_string()
        } else {
            format!(" sessions (filter: {}) ", app.filter_query)
        };
        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    // Sticky now-playing bar, mirroring the player snapshot.
    if let Some(track) = &snapshot.current_track {
        let accent = accent_for(track, ui_settings);

        let state_text = if snapshot.is_playing() {
            "playing"
        } else {
            "paused"
        };
        let loop_text = if snapshot.is_looping { " • loop" } else { "" };
        let mut line = format!("{}: {}", state_text, track.title);
        if let Some(subtitle) = &track.subtitle {
            line.push_str(" - ");
            line.push_str(subtitle);
        }
        line.push_str(loop_text);

        let ratio = if snapshot.duration.is_zero() {
            0.0
        } else {
            (snapshot.progress.as_secs_f64() / snapshot.duration.as_secs_f64()).clamp(0.0, 1.0)
        };
        let label = format!(
            "{} / {}",
            format_mmss(snapshot.progress),
            format_mmss(snapshot.duration),
        );

        let bar_block = Block::default()
            .borders(Borders::ALL)
            .title(" now playing ")
            .border_style(Style::default().fg(accent))
            .padding(Padding {
                left: 1,
                right: 1,
                top: 0,
                bottom: 0,
            });
        let inner = bar_block.inner(chunks[2]);
        frame.render_widget(bar_block, chunks[2]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let title_par = Paragraph::new(line).style(Style::default().fg(accent));
        frame.render_widget(title_par, rows[0]);

        let gauge = Gauge::default()
            .ratio(ratio)
            .label(label)
            .gauge_style(Style::default().fg(accent));
        frame.render_widget(gauge, rows[1]);
    }

    // Controls footer
    let footer = Paragraph::new(controls_text(controls_settings.skip_step_secs))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}
