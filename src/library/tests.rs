use std::fs;

use tempfile::tempdir;

use super::scan;
use crate::config::LibrarySettings;

#[test]
fn scan_filters_non_audio_and_sorts_case_insensitively() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
    fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
    fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();

    let sessions = scan(dir.path(), &LibrarySettings::default());
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].stem, "A");
    assert_eq!(sessions[0].title, "A");
    assert_eq!(sessions[1].stem, "b");
}

#[test]
fn scan_honors_the_extension_list() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("gamma.mp3"), b"x").unwrap();
    fs::write(dir.path().join("sunrise.flac"), b"x").unwrap();

    let settings = LibrarySettings {
        extensions: vec!["flac".into()],
        ..LibrarySettings::default()
    };
    let sessions = scan(dir.path(), &settings);
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].stem, "sunrise");
}

#[test]
fn non_recursive_scan_stays_in_the_root() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("gamma.mp3"), b"x").unwrap();
    fs::create_dir(dir.path().join("deep")).unwrap();
    fs::write(dir.path().join("deep").join("alpha.mp3"), b"x").unwrap();

    let settings = LibrarySettings {
        recursive: false,
        ..LibrarySettings::default()
    };
    let sessions = scan(dir.path(), &settings);
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].stem, "gamma");
}

#[test]
fn hidden_files_are_skipped_unless_requested() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".hidden.mp3"), b"x").unwrap();
    fs::write(dir.path().join("gamma.mp3"), b"x").unwrap();

    let settings = LibrarySettings {
        include_hidden: false,
        ..LibrarySettings::default()
    };
    let sessions = scan(dir.path(), &settings);
    assert_eq!(sessions.len(), 1);

    let settings = LibrarySettings {
        include_hidden: true,
        ..LibrarySettings::default()
    };
    assert_eq!(scan(dir.path(), &settings).len(), 2);
}
