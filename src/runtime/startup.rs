use std::path::PathBuf;
use std::time::Duration;

use log::info;

use crate::app::{SessionEntry, build_entries};
use crate::catalog;
use crate::config::{self, Settings};
use crate::library;
use crate::player::{Coordinator, RodioBackend};

/// Build the session list: the curated catalog overlaid with whatever the
/// local media directory provides.
pub fn build_session_entries(
    settings: &Settings,
    dir_override: Option<String>,
) -> Vec<SessionEntry> {
    let media_dir: Option<PathBuf> = dir_override
        .map(PathBuf::from)
        .or_else(|| config::resolve_media_dir(settings));

    let local = match media_dir {
        Some(dir) if dir.is_dir() => library::scan(&dir, &settings.library),
        Some(dir) => {
            info!("media dir {} not present, catalog only", dir.display());
            Vec::new()
        }
        None => Vec::new(),
    };

    build_entries(catalog::BUILTIN, &local)
}

/// Construct the one coordinator instance and apply playback defaults.
pub fn build_player(settings: &Settings) -> Coordinator<RodioBackend> {
    let skip_step = Duration::from_secs(settings.controls.skip_step_secs);
    let mut player = Coordinator::with_skip_step(RodioBackend::new(), skip_step);
    if settings.playback.start_looping {
        player.toggle_loop();
    }
    player
}
