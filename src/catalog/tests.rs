use std::collections::HashSet;

use super::*;
use crate::player::TrackSource;

#[test]
fn spotify_urls_are_detected() {
    assert!(is_spotify_url("https://open.spotify.com/playlist/xyz"));
    assert!(is_spotify_url("https://spotify.com/track/abc"));
    assert!(!is_spotify_url("https://drive.google.com/file/d/abc/view"));
}

#[test]
fn drive_share_links_rewrite_to_direct_download() {
    assert_eq!(
        drive_direct_audio_url("https://drive.google.com/file/d/1AbC_d/view").as_deref(),
        Some("https://drive.google.com/uc?export=download&id=1AbC_d")
    );
    assert_eq!(
        drive_direct_audio_url("https://drive.google.com/file/d/1AbC?usp=sharing").as_deref(),
        Some("https://drive.google.com/uc?export=download&id=1AbC")
    );
    assert_eq!(drive_direct_audio_url("https://drive.google.com/drive/home"), None);
    assert_eq!(drive_direct_audio_url("https://drive.google.com/file/d//view"), None);
}

#[test]
fn resolution_tags_sources() {
    let spotify = resolve_media_link("https://open.spotify.com/playlist/xyz");
    assert_eq!(spotify.source, TrackSource::Spotify);
    assert_eq!(spotify.url, "https://open.spotify.com/playlist/xyz");

    let drive = resolve_media_link("https://drive.google.com/file/d/1AbC/view");
    assert_eq!(drive.source, TrackSource::Inline);
    assert!(drive.url.contains("export=download&id=1AbC"));

    let plain = resolve_media_link("sessions/gamma.mp3");
    assert_eq!(plain.source, TrackSource::Inline);
    assert_eq!(plain.url, "sessions/gamma.mp3");
}

#[test]
fn builtin_catalog_ids_are_unique() {
    let mut seen = HashSet::new();
    for entry in BUILTIN {
        assert!(seen.insert(entry.id), "duplicate catalog id: {}", entry.id);
    }
}

#[test]
fn builtin_accents_are_hex_colors() {
    for entry in BUILTIN {
        if let Some(accent) = entry.accent_color {
            assert!(accent.starts_with('#') && accent.len() == 7, "{accent}");
            assert!(accent[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
