use std::time::Duration;

/// Which shelf of the catalog an entry belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionKind {
    /// Long-running focus/relax soundscapes.
    Playlist,
    /// Guided meditation sessions.
    Meditation,
    /// Short morning-routine activation cues.
    Routine,
}

impl SessionKind {
    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Playlist => "playlist",
            SessionKind::Meditation => "meditation",
            SessionKind::Routine => "routine",
        }
    }
}

/// One curated catalog entry. The `link` is the raw stored form (possibly a
/// Spotify link or a Drive share link) and goes through
/// [`crate::catalog::resolve_media_link`] before reaching the player.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub link: &'static str,
    pub duration_hint: Option<Duration>,
    /// `#RRGGBB` display hint for the now-playing bar.
    pub accent_color: Option<&'static str>,
    pub kind: SessionKind,
}

const fn mins(m: u64) -> Option<Duration> {
    Some(Duration::from_secs(m * 60))
}

/// The built-in catalog. Entry ids double as the file stems the local media
/// overlay matches against.
pub const BUILTIN: &[CatalogEntry] = &[
    CatalogEntry {
        id: "gamma",
        title: "Gamma Focus 40Hz",
        subtitle: "Binaural beats for deep concentration",
        link: "https://drive.google.com/file/d/1GammaFocusSession/view",
        duration_hint: mins(60),
        accent_color: Some("#00D4FF"),
        kind: SessionKind::Playlist,
    },
    CatalogEntry {
        id: "flow",
        title: "Flow State",
        subtitle: "A soundtrack for slipping into flow",
        link: "https://open.spotify.com/playlist/37i9dQZF1DX8Uebhn9wzrS",
        duration_hint: mins(45),
        accent_color: Some("#A78BFA"),
        kind: SessionKind::Playlist,
    },
    CatalogEntry {
        id: "dopamine",
        title: "Dopamine Boost",
        subtitle: "Music that lifts your drive",
        link: "https://open.spotify.com/playlist/37i9dQZF1DX3rxVfibe1L0",
        duration_hint: mins(50),
        accent_color: Some("#F59E0B"),
        kind: SessionKind::Playlist,
    },
    CatalogEntry {
        id: "alpha",
        title: "Alpha Relax",
        subtitle: "Alpha waves for deep unwinding",
        link: "https://open.spotify.com/playlist/37i9dQZF1DWZd79rJ6a7lp",
        duration_hint: mins(55),
        accent_color: Some("#34D399"),
        kind: SessionKind::Playlist,
    },
    CatalogEntry {
        id: "m1",
        title: "Laser Focus (10 min)",
        subtitle: "Guided meditation for deep concentration",
        link: "https://drive.google.com/file/d/1MedFocusSession/view",
        duration_hint: mins(10),
        accent_color: None,
        kind: SessionKind::Meditation,
    },
    CatalogEntry {
        id: "m2",
        title: "Restorative Sleep",
        subtitle: "A guided wind-down for falling asleep faster",
        link: "https://open.spotify.com/track/restorative-sleep",
        duration_hint: mins(20),
        accent_color: None,
        kind: SessionKind::Meditation,
    },
    CatalogEntry {
        id: "m3",
        title: "Deep Calm",
        subtitle: "Anxiety relief with guided breathing",
        link: "https://drive.google.com/file/d/1MedCalmSession/view",
        duration_hint: mins(15),
        accent_color: None,
        kind: SessionKind::Meditation,
    },
    CatalogEntry {
        id: "m4",
        title: "Morning Energy",
        subtitle: "An energizing start to the day",
        link: "https://open.spotify.com/track/morning-energy",
        duration_hint: mins(8),
        accent_color: None,
        kind: SessionKind::Meditation,
    },
    CatalogEntry {
        id: "m5",
        title: "Mental Clarity",
        subtitle: "A reset for clear-headed decisions",
        link: "https://drive.google.com/file/d/1MedClaritySession/view",
        duration_hint: mins(12),
        accent_color: None,
        kind: SessionKind::Meditation,
    },
    CatalogEntry {
        id: "sunrise",
        title: "Sunrise Activation",
        subtitle: "Morning-routine audio cue",
        link: "https://drive.google.com/file/d/1SunriseActivation/view",
        duration_hint: mins(5),
        accent_color: Some("#F59E0B"),
        kind: SessionKind::Routine,
    },
];
