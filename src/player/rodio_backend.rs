//! `rodio`-backed media backend.
//!
//! A single long-lived audio thread owns the output stream and the current
//! sink. Handles talk to it over an mpsc channel; every command carries the
//! token of the acquisition it belongs to, so a command from an already
//! released handle falls on the floor. Elapsed time is tracked with an
//! accumulated-plus-started-at clock shared with the handle, which keeps
//! `position()` cheap and current between thread wakeups.
//!
//! Seeking recreates the sink with `Source::skip_duration`, which works for
//! the common formats without requiring a seekable decoder. Only local files
//! are acquirable; remote schemes fail acquisition and the coordinator
//! absorbs that.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use lofty::prelude::AudioFile;
use log::warn;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::backend::{AudioBackend, BackendError, EventSink, MediaEvent, MediaHandle};

/// How often the audio thread wakes to poll for end-of-track.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

enum SinkCmd {
    Load {
        token: u64,
        path: PathBuf,
        events: EventSink,
        shared: Arc<HandleShared>,
        known_duration: Option<Duration>,
    },
    Play { token: u64 },
    Pause { token: u64 },
    Seek { token: u64, pos: Duration },
    SetLooping { token: u64, looping: bool },
    Unload { token: u64 },
}

/// Elapsed-time clock: accumulated time plus an optional running segment.
#[derive(Default)]
struct PlaybackClock {
    accumulated: Duration,
    started_at: Option<Instant>,
}

impl PlaybackClock {
    fn position(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |t| t.elapsed())
    }

    fn run_from(&mut self, pos: Duration) {
        self.accumulated = pos;
        self.started_at = Some(Instant::now());
    }

    fn halt_at(&mut self, pos: Duration) {
        self.accumulated = pos;
        self.started_at = None;
    }

    fn suspend(&mut self) {
        let pos = self.position();
        self.halt_at(pos);
    }
}

struct HandleShared {
    clock: Mutex<PlaybackClock>,
}

pub struct RodioHandle {
    token: u64,
    tx: Sender<SinkCmd>,
    shared: Arc<HandleShared>,
    duration: Option<Duration>,
}

impl MediaHandle for RodioHandle {
    fn play(&mut self) {
        let _ = self.tx.send(SinkCmd::Play { token: self.token });
    }

    fn pause(&mut self) {
        let _ = self.tx.send(SinkCmd::Pause { token: self.token });
    }

    fn seek(&mut self, pos: Duration) {
        let _ = self.tx.send(SinkCmd::Seek {
            token: self.token,
            pos,
        });
    }

    fn position(&self) -> Duration {
        self.shared
            .clock
            .lock()
            .map(|c| c.position())
            .unwrap_or(Duration::ZERO)
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn set_looping(&mut self, looping: bool) {
        let _ = self.tx.send(SinkCmd::SetLooping {
            token: self.token,
            looping,
        });
    }
}

impl Drop for RodioHandle {
    fn drop(&mut self) {
        let _ = self.tx.send(SinkCmd::Unload { token: self.token });
    }
}

/// Factory owning the audio-thread channel. The thread (and with it the
/// output device) is started on the first acquisition, not at startup.
pub struct RodioBackend {
    tx: Option<Sender<SinkCmd>>,
    next_token: u64,
}

impl RodioBackend {
    pub fn new() -> Self {
        Self {
            tx: None,
            next_token: 1,
        }
    }

    fn ensure_thread(&mut self) -> Result<Sender<SinkCmd>, BackendError> {
        if let Some(tx) = &self.tx {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<SinkCmd>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
        thread::spawn(move || run_sink_thread(rx, ready_tx));

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.tx = Some(tx.clone());
                Ok(tx)
            }
            Ok(Err(msg)) => Err(BackendError::OutputUnavailable(msg)),
            Err(_) => Err(BackendError::OutputUnavailable(
                "audio thread exited during startup".to_string(),
            )),
        }
    }
}

impl Default for RodioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for RodioBackend {
    type Handle = RodioHandle;

    fn acquire(&mut self, url: &str, events: EventSink) -> Result<RodioHandle, BackendError> {
        let path = local_path(url)?;
        // Cheap synchronous validation; decode problems surface later as a
        // Failed event from the audio thread.
        File::open(&path)?;

        let duration = lofty::read_from_path(&path)
            .ok()
            .map(|tagged| tagged.properties().duration());

        let tx = self.ensure_thread()?;
        let token = self.next_token;
        self.next_token += 1;

        let shared = Arc::new(HandleShared {
            clock: Mutex::new(PlaybackClock::default()),
        });

        if let Some(total) = duration {
            events.emit(MediaEvent::MetadataLoaded { duration: total });
        }

        let _ = tx.send(SinkCmd::Load {
            token,
            path,
            events,
            shared: shared.clone(),
            known_duration: duration,
        });

        Ok(RodioHandle {
            token,
            tx,
            shared,
            duration,
        })
    }
}

/// Map a resolved track URL onto a local filesystem path.
fn local_path(url: &str) -> Result<PathBuf, BackendError> {
    if let Some(rest) = url.strip_prefix("file://") {
        return Ok(PathBuf::from(rest));
    }
    if url.contains("://") {
        return Err(BackendError::UnsupportedScheme(url.to_string()));
    }
    Ok(PathBuf::from(url))
}

struct ActiveSink {
    token: u64,
    path: PathBuf,
    sink: Sink,
    paused: bool,
    looping: bool,
    events: EventSink,
    shared: Arc<HandleShared>,
}

impl ActiveSink {
    fn with_clock(&self, f: impl FnOnce(&mut PlaybackClock)) {
        if let Ok(mut clock) = self.shared.clock.lock() {
            f(&mut clock);
        }
    }
}

fn run_sink_thread(rx: Receiver<SinkCmd>, ready: Sender<Result<(), String>>) {
    let stream = match OutputStreamBuilder::open_default_stream() {
        Ok(stream) => stream,
        Err(err) => {
            let _ = ready.send(Err(err.to_string()));
            return;
        }
    };
    // rodio logs to stderr when OutputStream is dropped; noisy under a TUI.
    let mut stream = stream;
    stream.log_on_drop(false);
    let _ = ready.send(Ok(()));

    let mut current: Option<ActiveSink> = None;

    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(cmd) => handle_cmd(cmd, &stream, &mut current),
            Err(RecvTimeoutError::Timeout) => poll_end_of_track(&stream, &mut current),
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if let Some(active) = current.take() {
        active.sink.stop();
    }
}

fn handle_cmd(cmd: SinkCmd, stream: &OutputStream, current: &mut Option<ActiveSink>) {
    match cmd {
        SinkCmd::Load {
            token,
            path,
            events,
            shared,
            known_duration,
        } => {
            if let Some(old) = current.take() {
                old.sink.stop();
            }
            match create_sink_at(stream, &path, Duration::ZERO) {
                Ok((sink, decoded_duration)) => {
                    if known_duration.is_none() {
                        if let Some(total) = decoded_duration {
                            events.emit(MediaEvent::MetadataLoaded { duration: total });
                        }
                    }
                    let active = ActiveSink {
                        token,
                        path,
                        sink,
                        paused: true,
                        looping: false,
                        events,
                        shared,
                    };
                    active.with_clock(|c| c.halt_at(Duration::ZERO));
                    *current = Some(active);
                }
                Err(err) => {
                    warn!("failed to open {}: {err}", path.display());
                    events.emit(MediaEvent::Failed);
                }
            }
        }

        SinkCmd::Play { token } => {
            if let Some(active) = current.as_mut().filter(|a| a.token == token) {
                if active.paused {
                    active.sink.play();
                    active.with_clock(|c| {
                        let pos = c.position();
                        c.run_from(pos);
                    });
                    active.paused = false;
                }
            }
        }

        SinkCmd::Pause { token } => {
            if let Some(active) = current.as_mut().filter(|a| a.token == token) {
                if !active.paused {
                    active.sink.pause();
                    active.with_clock(|c| c.suspend());
                    active.paused = true;
                }
            }
        }

        SinkCmd::Seek { token, pos } => {
            let Some(active) = current.as_mut().filter(|a| a.token == token) else {
                return;
            };
            // Scrubbing rebuilds the sink and skips into the file; this uses
            // `Source::skip_duration`, which works for the common formats.
            active.sink.stop();
            match create_sink_at(stream, &active.path, pos) {
                Ok((sink, _)) => {
                    if active.paused {
                        active.with_clock(|c| c.halt_at(pos));
                    } else {
                        sink.play();
                        active.with_clock(|c| c.run_from(pos));
                    }
                    active.sink = sink;
                }
                Err(err) => {
                    warn!("seek failed for {}: {err}", active.path.display());
                    active.events.emit(MediaEvent::Failed);
                    *current = None;
                }
            }
        }

        SinkCmd::SetLooping { token, looping } => {
            if let Some(active) = current.as_mut().filter(|a| a.token == token) {
                active.looping = looping;
            }
        }

        SinkCmd::Unload { token } => {
            if current.as_ref().is_some_and(|a| a.token == token) {
                if let Some(active) = current.take() {
                    active.sink.stop();
                }
            }
        }
    }
}

fn poll_end_of_track(stream: &OutputStream, current: &mut Option<ActiveSink>) {
    let Some(active) = current.as_mut() else {
        return;
    };
    if active.paused || !active.sink.empty() {
        return;
    }

    if active.looping {
        // Restart the same resource at zero; the coordinator only sees the
        // position wrap.
        match create_sink_at(stream, &active.path, Duration::ZERO) {
            Ok((sink, _)) => {
                sink.play();
                active.with_clock(|c| c.run_from(Duration::ZERO));
                active.sink = sink;
            }
            Err(err) => {
                warn!("loop restart failed for {}: {err}", active.path.display());
                active.events.emit(MediaEvent::Failed);
                *current = None;
            }
        }
    } else {
        active.events.emit(MediaEvent::Ended);
        *current = None;
    }
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`,
/// reporting the decoder's idea of the total duration when it has one.
fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let source = Decoder::new(BufReader::new(file)).map_err(|e| e.to_string())?;
    let total = source.total_duration();
    let source = source.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}
