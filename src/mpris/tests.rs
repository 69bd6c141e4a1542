use super::*;
use crate::player::{TrackSource, PlaybackPhase};
use std::sync::mpsc;

fn make_track() -> TrackDescriptor {
    TrackDescriptor {
        id: "gamma".to_string(),
        title: "Gamma Focus 40Hz".to_string(),
        subtitle: Some("Binaural beats".to_string()),
        url: "/media/gamma.mp3".to_string(),
        accent_color: Some("#00D4FF".to_string()),
        source: TrackSource::Inline,
    }
}

#[test]
fn set_now_playing_sets_and_clears_shared_state() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let handle = MprisHandle {
        state: state.clone(),
    };

    let track = make_track();
    handle.set_now_playing(Some(&track), Duration::from_secs(60));

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Gamma Focus 40Hz"));
        assert_eq!(s.subtitle.as_deref(), Some("Binaural beats"));
        assert_eq!(s.length_micros, Some(60_000_000));
    }

    handle.set_now_playing(None, Duration::ZERO);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert_eq!(s.subtitle, None);
        assert_eq!(s.length_micros, None);
    }
}

#[test]
fn unknown_duration_reports_no_length() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let handle = MprisHandle {
        state: state.clone(),
    };

    handle.set_now_playing(Some(&make_track()), Duration::ZERO);
    assert_eq!(state.lock().unwrap().length_micros, None);
}

#[test]
fn playback_status_maps_phases_to_spec_strings() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    state.lock().unwrap().phase = PlaybackPhase::Idle;
    assert_eq!(iface.playback_status(), "Stopped");

    state.lock().unwrap().phase = PlaybackPhase::Playing;
    assert_eq!(iface.playback_status(), "Playing");

    state.lock().unwrap().phase = PlaybackPhase::Paused;
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    {
        let mut s = state.lock().unwrap();
        s.title = Some("Gamma Focus 40Hz".to_string());
        s.subtitle = Some("Binaural beats".to_string());
        s.length_micros = Some(42);
    }

    let map = iface.metadata();
    for k in ["xesam:title", "xesam:comment", "mpris:length"] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn transport_methods_forward_control_commands() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    iface.play_pause();
    iface.next();
    iface.previous();
    iface.stop();

    let received: Vec<ControlCmd> = rx.try_iter().collect();
    assert_eq!(
        received,
        vec![
            ControlCmd::PlayPause,
            ControlCmd::SkipForward,
            ControlCmd::SkipBackward,
            ControlCmd::Stop,
        ]
    );
}
