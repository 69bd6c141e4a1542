use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::backend::{AudioBackend, BackendError, EventSink, MediaEvent, MediaHandle};
use super::coordinator::Coordinator;
use super::types::{PlaybackPhase, TrackDescriptor, TrackSource};

/// Observable state of one fake resource, shared with the test body so it
/// can inject metadata, end-of-track and failure events.
struct FakeShared {
    position: Mutex<Duration>,
    duration: Mutex<Option<Duration>>,
    playing: AtomicBool,
    looping: AtomicBool,
    released: AtomicBool,
    seeks: Mutex<Vec<Duration>>,
    events: EventSink,
}

impl FakeShared {
    fn advance(&self, secs: u64) {
        let mut pos = self.position.lock().unwrap();
        *pos += Duration::from_secs(secs);
    }

    fn load_metadata(&self, secs: u64) {
        let total = Duration::from_secs(secs);
        *self.duration.lock().unwrap() = Some(total);
        self.events.emit(MediaEvent::MetadataLoaded { duration: total });
    }

    /// Natural end-of-track: looping resources restart themselves, others
    /// report `Ended`.
    fn finish(&self) {
        if self.looping.load(Ordering::SeqCst) {
            *self.position.lock().unwrap() = Duration::ZERO;
        } else {
            self.events.emit(MediaEvent::Ended);
        }
    }

    fn fail(&self) {
        self.events.emit(MediaEvent::Failed);
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

struct FakeHandle {
    shared: Arc<FakeShared>,
    live: Arc<AtomicUsize>,
}

impl MediaHandle for FakeHandle {
    fn play(&mut self) {
        self.shared.playing.store(true, Ordering::SeqCst);
    }

    fn pause(&mut self) {
        self.shared.playing.store(false, Ordering::SeqCst);
    }

    fn seek(&mut self, pos: Duration) {
        *self.shared.position.lock().unwrap() = pos;
        self.shared.seeks.lock().unwrap().push(pos);
    }

    fn position(&self) -> Duration {
        *self.shared.position.lock().unwrap()
    }

    fn duration(&self) -> Option<Duration> {
        *self.shared.duration.lock().unwrap()
    }

    fn set_looping(&mut self, looping: bool) {
        self.shared.looping.store(looping, Ordering::SeqCst);
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.shared.released.store(true, Ordering::SeqCst);
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct FakeBackend {
    live: Arc<AtomicUsize>,
    acquired: Arc<Mutex<Vec<String>>>,
    fail_next: Arc<AtomicBool>,
    last: Arc<Mutex<Option<Arc<FakeShared>>>>,
}

impl FakeBackend {
    fn probe(&self) -> Probe {
        Probe {
            live: self.live.clone(),
            acquired: self.acquired.clone(),
            fail_next: self.fail_next.clone(),
            last: self.last.clone(),
        }
    }
}

impl AudioBackend for FakeBackend {
    type Handle = FakeHandle;

    fn acquire(&mut self, url: &str, events: EventSink) -> Result<FakeHandle, BackendError> {
        self.acquired.lock().unwrap().push(url.to_string());
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(BackendError::OutputUnavailable("scripted failure".into()));
        }

        // Exclusivity: the coordinator must have released any previous
        // resource before asking for a new one.
        assert_eq!(
            self.live.load(Ordering::SeqCst),
            0,
            "second live resource acquired"
        );

        let shared = Arc::new(FakeShared {
            position: Mutex::new(Duration::ZERO),
            duration: Mutex::new(None),
            playing: AtomicBool::new(false),
            looping: AtomicBool::new(false),
            released: AtomicBool::new(false),
            seeks: Mutex::new(Vec::new()),
            events,
        });
        *self.last.lock().unwrap() = Some(shared.clone());
        self.live.fetch_add(1, Ordering::SeqCst);

        Ok(FakeHandle {
            shared,
            live: self.live.clone(),
        })
    }
}

/// Test-side view into the backend after it has been moved into the
/// coordinator.
struct Probe {
    live: Arc<AtomicUsize>,
    acquired: Arc<Mutex<Vec<String>>>,
    fail_next: Arc<AtomicBool>,
    last: Arc<Mutex<Option<Arc<FakeShared>>>>,
}

impl Probe {
    fn current(&self) -> Arc<FakeShared> {
        self.last.lock().unwrap().clone().expect("no acquisition yet")
    }

    fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn acquisitions(&self) -> Vec<String> {
        self.acquired.lock().unwrap().clone()
    }

    fn fail_next_acquire(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

fn fixture() -> (Coordinator<FakeBackend>, Probe) {
    let backend = FakeBackend::default();
    let probe = backend.probe();
    (Coordinator::new(backend), probe)
}

fn track(id: &str, url: &str) -> TrackDescriptor {
    TrackDescriptor {
        id: id.to_string(),
        title: id.to_string(),
        subtitle: None,
        url: url.to_string(),
        accent_color: None,
        source: TrackSource::Inline,
    }
}

#[test]
fn play_starts_addressed_track_and_picks_up_metadata() {
    let (mut player, probe) = fixture();

    player.play(track("gamma", "a.mp3"));
    let snap = player.snapshot();
    assert_eq!(snap.current_track.as_ref().unwrap().id, "gamma");
    assert!(snap.is_playing());
    assert_eq!(snap.progress, Duration::ZERO);
    assert_eq!(snap.duration, Duration::ZERO);

    probe.current().load_metadata(60);
    player.tick();
    assert_eq!(player.snapshot().duration, Duration::from_secs(60));
}

#[test]
fn seek_to_fraction_positions_the_resource() {
    let (mut player, probe) = fixture();
    player.play(track("gamma", "a.mp3"));
    probe.current().load_metadata(60);
    player.tick();

    player.seek_to(0.5);
    assert_eq!(probe.current().seeks.lock().unwrap().as_slice(), &[
        Duration::from_secs(30)
    ]);
    player.tick();
    assert_eq!(player.snapshot().progress, Duration::from_secs(30));
}

#[test]
fn switching_tracks_releases_the_previous_resource() {
    let (mut player, probe) = fixture();
    player.play(track("gamma", "a.mp3"));
    let gamma = probe.current();
    gamma.load_metadata(60);
    gamma.advance(20);
    player.tick();

    player.play(track("flow", "b.mp3"));
    assert!(gamma.is_released());
    assert_eq!(probe.live(), 1);
    assert_eq!(probe.acquisitions(), vec!["a.mp3", "b.mp3"]);

    let snap = player.snapshot();
    assert_eq!(snap.current_track.as_ref().unwrap().id, "flow");
    assert!(snap.is_playing());
    assert_eq!(snap.progress, Duration::ZERO);
}

#[test]
fn replaying_the_playing_track_is_a_noop() {
    let (mut player, probe) = fixture();
    player.play(track("gamma", "a.mp3"));
    let gamma = probe.current();
    gamma.load_metadata(60);
    gamma.advance(12);
    player.tick();

    player.play(track("gamma", "a.mp3"));
    assert_eq!(probe.acquisitions().len(), 1);
    assert!(!gamma.is_released());
    let snap = player.snapshot();
    assert!(snap.is_playing());
    assert_eq!(snap.progress, Duration::from_secs(12));
}

#[test]
fn toggle_cycles_play_pause_resume_without_restarting() {
    let (mut player, probe) = fixture();
    let t = track("gamma", "a.mp3");

    player.toggle(t.clone());
    assert!(player.snapshot().is_playing());

    let gamma = probe.current();
    gamma.load_metadata(60);
    gamma.advance(25);
    player.tick();

    player.toggle(t.clone());
    let paused = player.snapshot();
    assert_eq!(paused.phase, PlaybackPhase::Paused);
    assert_eq!(paused.progress, Duration::from_secs(25));

    player.toggle(t);
    let resumed = player.snapshot();
    assert!(resumed.is_playing());
    assert_eq!(resumed.progress, Duration::from_secs(25));
    assert_eq!(probe.acquisitions().len(), 1);
}

#[test]
fn stop_resets_the_whole_session() {
    let (mut player, probe) = fixture();
    player.play(track("gamma", "a.mp3"));
    let gamma = probe.current();
    gamma.load_metadata(60);
    gamma.advance(30);
    player.tick();

    player.stop();
    let snap = player.snapshot();
    assert!(snap.current_track.is_none());
    assert_eq!(snap.phase, PlaybackPhase::Idle);
    assert_eq!(snap.progress, Duration::ZERO);
    assert_eq!(snap.duration, Duration::ZERO);
    assert!(gamma.is_released());
    assert_eq!(probe.live(), 0);

    // Stopping again while idle stays safe.
    player.stop();
    assert!(player.snapshot().current_track.is_none());
}

#[test]
fn seek_clamps_out_of_range_fractions() {
    let (mut player, probe) = fixture();
    player.play(track("gamma", "a.mp3"));
    probe.current().load_metadata(60);
    player.tick();

    player.seek_to(1.7);
    player.seek_to(-0.5);
    assert_eq!(probe.current().seeks.lock().unwrap().as_slice(), &[
        Duration::from_secs(60),
        Duration::ZERO,
    ]);
}

#[test]
fn seek_is_a_noop_while_duration_is_unknown() {
    let (mut player, probe) = fixture();
    player.play(track("gamma", "a.mp3"));

    player.seek_to(0.5);
    assert!(probe.current().seeks.lock().unwrap().is_empty());
}

#[test]
fn loop_preference_survives_track_switches() {
    let (mut player, probe) = fixture();
    player.toggle_loop();
    assert!(player.is_looping());

    player.play(track("gamma", "a.mp3"));
    assert!(probe.current().looping.load(Ordering::SeqCst));

    player.play(track("flow", "b.mp3"));
    assert!(probe.current().looping.load(Ordering::SeqCst));
    assert!(player.snapshot().is_looping);
}

#[test]
fn toggle_loop_applies_to_the_loaded_resource() {
    let (mut player, probe) = fixture();
    player.play(track("gamma", "a.mp3"));
    assert!(!probe.current().looping.load(Ordering::SeqCst));

    player.toggle_loop();
    assert!(probe.current().looping.load(Ordering::SeqCst));
    player.toggle_loop();
    assert!(!probe.current().looping.load(Ordering::SeqCst));
}

#[test]
fn natural_end_without_loop_clears_the_session() {
    let (mut player, probe) = fixture();
    player.play(track("gamma", "a.mp3"));
    let gamma = probe.current();
    gamma.load_metadata(60);
    gamma.advance(60);
    player.tick();

    gamma.finish();
    player.tick();
    let snap = player.snapshot();
    assert!(snap.current_track.is_none());
    assert_eq!(snap.phase, PlaybackPhase::Idle);
    assert_eq!(snap.progress, Duration::ZERO);
    assert_eq!(snap.duration, Duration::ZERO);
    assert!(gamma.is_released());
}

#[test]
fn natural_end_with_loop_wraps_progress() {
    let (mut player, probe) = fixture();
    player.toggle_loop();
    player.play(track("gamma", "a.mp3"));
    let gamma = probe.current();
    gamma.load_metadata(60);
    gamma.advance(59);
    player.tick();

    gamma.finish();
    player.tick();
    let snap = player.snapshot();
    assert_eq!(snap.current_track.as_ref().unwrap().id, "gamma");
    assert!(snap.is_playing());
    assert_eq!(snap.progress, Duration::ZERO);
    assert!(!gamma.is_released());
}

#[test]
fn stale_events_from_a_released_resource_are_discarded() {
    let (mut player, probe) = fixture();
    player.play(track("gamma", "a.mp3"));
    let gamma = probe.current();

    player.play(track("flow", "b.mp3"));
    probe.current().load_metadata(45);
    player.tick();

    // The released resource talks past its teardown.
    gamma.events.emit(MediaEvent::Ended);
    gamma.events.emit(MediaEvent::MetadataLoaded {
        duration: Duration::from_secs(999),
    });
    player.tick();

    let snap = player.snapshot();
    assert_eq!(snap.current_track.as_ref().unwrap().id, "flow");
    assert!(snap.is_playing());
    assert_eq!(snap.duration, Duration::from_secs(45));
}

#[test]
fn failed_acquisition_keeps_the_track_addressed() {
    let (mut player, probe) = fixture();
    probe.fail_next_acquire();

    player.play(track("gamma", "a.mp3"));
    let snap = player.snapshot();
    assert_eq!(snap.current_track.as_ref().unwrap().id, "gamma");
    assert_eq!(snap.phase, PlaybackPhase::Paused);
    assert_eq!(probe.live(), 0);

    // Transport controls stay safe with no resource behind them.
    player.pause();
    player.seek_to(0.5);
    player.skip_forward();
    assert_eq!(player.snapshot().phase, PlaybackPhase::Paused);
}

#[test]
fn resume_retries_a_failed_acquisition_once() {
    let (mut player, probe) = fixture();
    probe.fail_next_acquire();
    player.play(track("gamma", "a.mp3"));
    assert_eq!(probe.acquisitions().len(), 1);

    player.resume();
    assert_eq!(probe.acquisitions().len(), 2);
    assert!(player.snapshot().is_playing());
    assert_eq!(probe.live(), 1);
}

#[test]
fn late_playback_failure_degrades_to_paused() {
    let (mut player, probe) = fixture();
    player.play(track("gamma", "a.mp3"));
    let gamma = probe.current();

    gamma.fail();
    player.tick();
    let snap = player.snapshot();
    assert_eq!(snap.current_track.as_ref().unwrap().id, "gamma");
    assert_eq!(snap.phase, PlaybackPhase::Paused);
    assert!(gamma.is_released());

    // Retry goes through a fresh acquisition.
    player.resume();
    assert_eq!(probe.acquisitions().len(), 2);
    assert!(player.snapshot().is_playing());
}

#[test]
fn skips_clamp_to_track_bounds() {
    let (mut player, probe) = fixture();
    player.play(track("gamma", "a.mp3"));
    let gamma = probe.current();
    gamma.load_metadata(20);
    gamma.advance(10);
    player.tick();

    player.skip_forward();
    assert_eq!(player.snapshot().progress, Duration::from_secs(20));

    player.skip_backward();
    assert_eq!(player.snapshot().progress, Duration::from_secs(5));

    player.skip_backward();
    assert_eq!(player.snapshot().progress, Duration::ZERO);
}

#[test]
fn sampling_halts_while_paused() {
    let (mut player, probe) = fixture();
    player.play(track("gamma", "a.mp3"));
    let gamma = probe.current();
    gamma.load_metadata(300);
    gamma.advance(30);
    player.tick();
    assert_eq!(player.snapshot().progress, Duration::from_secs(30));

    player.pause();
    gamma.advance(100);
    player.tick();
    assert_eq!(player.snapshot().progress, Duration::from_secs(30));
}

#[test]
fn transport_calls_are_noops_while_idle() {
    let (mut player, probe) = fixture();
    player.pause();
    player.resume();
    player.seek_to(0.3);
    player.skip_forward();
    player.skip_backward();

    assert!(probe.acquisitions().is_empty());
    assert!(player.snapshot().current_track.is_none());
}

#[test]
fn is_current_track_tracks_the_addressed_id() {
    let (mut player, _probe) = fixture();
    assert!(!player.is_current_track("gamma"));

    player.play(track("gamma", "a.mp3"));
    assert!(player.is_current_track("gamma"));
    assert!(!player.is_current_track("flow"));

    player.stop();
    assert!(!player.is_current_track("gamma"));
}

#[test]
fn spotify_tracks_are_attempted_not_refused() {
    let (mut player, probe) = fixture();
    let mut t = track("flow", "https://open.spotify.com/playlist/xyz");
    t.source = TrackSource::Spotify;

    player.play(t);
    assert_eq!(
        probe.acquisitions(),
        vec!["https://open.spotify.com/playlist/xyz"]
    );
    assert!(player.is_current_track("flow"));
}
