//! Raw-link classification and normalization.
//!
//! Requesters resolve stored links here before constructing a track
//! descriptor; the player itself never sniffs URLs.

use crate::player::TrackSource;

pub fn is_spotify_url(url: &str) -> bool {
    url.contains("spotify.com") || url.contains("open.spotify")
}

pub fn is_drive_url(url: &str) -> bool {
    url.contains("drive.google.com")
}

/// Turn a Drive share link (`/file/d/<id>/view`) into the direct-download
/// form that is actually streamable.
pub fn drive_direct_audio_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/d/")?;
    let id = rest.split(['/', '?', '#']).next()?;
    if id.is_empty() {
        return None;
    }
    Some(format!(
        "https://drive.google.com/uc?export=download&id={id}"
    ))
}

/// A stored link after resolution: the playable URL plus its source tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub url: String,
    pub source: TrackSource,
}

/// Resolve a raw catalog link. Spotify links keep their URL and get the
/// external tag; Drive share links are rewritten to the direct form;
/// everything else is taken as already playable.
pub fn resolve_media_link(raw: &str) -> ResolvedMedia {
    if is_spotify_url(raw) {
        return ResolvedMedia {
            url: raw.to_string(),
            source: TrackSource::Spotify,
        };
    }
    if is_drive_url(raw) {
        if let Some(direct) = drive_direct_audio_url(raw) {
            return ResolvedMedia {
                url: direct,
                source: TrackSource::Inline,
            };
        }
    }
    ResolvedMedia {
        url: raw.to_string(),
        source: TrackSource::Inline,
    }
}
