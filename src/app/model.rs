use std::time::Duration;

use crate::catalog::{CatalogEntry, ResolvedMedia, resolve_media_link};
use crate::library::LocalSession;
use crate::player::{TrackDescriptor, TrackSource};

/// One row of the session list: a catalog entry after link resolution and
/// local-file overlay, or a stray local file.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    /// Shelf label shown as the row badge (`playlist`, `meditation`, etc).
    pub kind_label: &'static str,
    pub duration_hint: Option<Duration>,
    pub media: ResolvedMedia,
    pub accent_color: Option<String>,
    /// Whether the playable URL points at a file under the media dir.
    pub local: bool,
    /// Precomputed list text, also the filter target.
    pub display: String,
}

impl SessionEntry {
    /// The requester-side constructor: a fully resolved track descriptor
    /// ready to hand to the player.
    pub fn track(&self) -> TrackDescriptor {
        TrackDescriptor {
            id: self.id.clone(),
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            url: self.media.url.clone(),
            accent_color: self.accent_color.clone(),
            source: self.media.source,
        }
    }

    /// External entries (Spotify) get a badge instead of local decoding.
    pub fn is_external(&self) -> bool {
        self.media.source == TrackSource::Spotify
    }
}

fn make_display(title: &str, subtitle: Option<&str>) -> String {
    match subtitle {
        Some(s) if !s.trim().is_empty() => format!("{} - {}", title, s.trim()),
        _ => title.to_string(),
    }
}

/// Merge the curated catalog with the local media index.
///
/// A local file whose stem equals a catalog id takes over that entry's
/// playback URL; remaining files become plain local sessions appended after
/// the catalog.
pub fn build_entries(catalog: &[CatalogEntry], local: &[LocalSession]) -> Vec<SessionEntry> {
    let mut entries: Vec<SessionEntry> = Vec::new();

    for item in catalog {
        let overlay = local.iter().find(|s| s.stem == item.id);
        let (media, local_file, duration_hint) = match overlay {
            Some(session) => (
                ResolvedMedia {
                    url: session.path.to_string_lossy().into_owned(),
                    source: TrackSource::Inline,
                },
                true,
                session.duration.or(item.duration_hint),
            ),
            None => (resolve_media_link(item.link), false, item.duration_hint),
        };

        entries.push(SessionEntry {
            id: item.id.to_string(),
            title: item.title.to_string(),
            subtitle: Some(item.subtitle.to_string()),
            kind_label: item.kind.label(),
            duration_hint,
            media,
            accent_color: item.accent_color.map(str::to_string),
            local: local_file,
            display: make_display(item.title, Some(item.subtitle)),
        });
    }

    for session in local {
        if catalog.iter().any(|item| item.id == session.stem) {
            continue;
        }
        entries.push(SessionEntry {
            id: session.stem.clone(),
            title: session.title.clone(),
            subtitle: None,
            kind_label: "local",
            duration_hint: session.duration,
            media: ResolvedMedia {
                url: session.path.to_string_lossy().into_owned(),
                source: TrackSource::Inline,
            },
            accent_color: None,
            local: true,
            display: make_display(&session.title, None),
        });
    }

    entries
}

/// The main application model.
pub struct App {
    pub entries: Vec<SessionEntry>,
    pub selected: usize,
    pub filter_mode: bool,
    pub filter_query: String,
}

impl App {
    /// Create a new `App` with the provided session entries.
    pub fn new(entries: Vec<SessionEntry>) -> Self {
        Self {
            entries,
            selected: 0,
            filter_mode: false,
            filter_query: String::new(),
        }
    }

    /// Return true if any session is available.
    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn selected_entry(&self) -> Option<&SessionEntry> {
        self.entries.get(self.selected)
    }

    /// Return the entry indices visible under the active filter.
    pub fn display_indices(&self) -> Vec<usize> {
        let query = self.filter_query.trim();
        if query.is_empty() {
            return (0..self.entries.len()).collect();
        }

        (0..self.entries.len())
            .filter(|&i| Self::fuzzy_match_positions(&self.entries[i].display, query).is_some())
            .collect()
    }

    /// Fuzzy/subsequence match: return the character positions in `title`
    /// that match `query`, or `None` if not matched.
    pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
        if query.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title.chars().enumerate();

        for qc in query.chars() {
            let qc_low = qc.to_ascii_lowercase();
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc.to_ascii_lowercase() == qc_low => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    /// Set the selected entry index and keep it inside the visible view.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx;
        self.ensure_selected_visible();
    }

    /// Move selection to the next visible entry, wrapping around.
    pub fn next(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            return;
        }
        self.selected = match display.iter().position(|&i| i == self.selected) {
            Some(p) => display[(p + 1) % display.len()],
            None => display[0],
        };
    }

    /// Move selection to the previous visible entry, wrapping around.
    pub fn prev(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            return;
        }
        self.selected = match display.iter().position(|&i| i == self.selected) {
            Some(0) => display[display.len() - 1],
            Some(p) => display[p - 1],
            None => display[display.len() - 1],
        };
    }

    /// Enter filter mode.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.ensure_selected_visible();
    }

    /// Exit filter mode, keeping the query applied.
    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }

    /// Append a character to the filter query and refresh the view.
    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }

    /// Remove the last character from the filter query.
    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Ensure that `selected` is part of the current filtered view,
    /// otherwise move selection to the first visible entry.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }
}
