//! The global playback coordinator.
//!
//! Exactly one coordinator exists per running app. It owns the single live
//! media handle, serializes every transport operation on the caller's
//! thread, and publishes a [`PlayerSnapshot`] that the session list, the
//! now-playing bar and MPRIS all render from. Requesters never touch the
//! audio resource directly.

use std::time::Duration;

use log::warn;

use super::backend::{AudioBackend, EventQueue, EventSink, MediaEvent, MediaHandle, new_event_queue};
use super::types::{PlaybackPhase, PlayerSnapshot, TrackDescriptor};

/// Transport skip step used by `skip_forward`/`skip_backward`.
pub const DEFAULT_SKIP_STEP: Duration = Duration::from_secs(15);

/// Live mutable playback state; exists only while a track is addressed.
struct Session<H> {
    track: TrackDescriptor,
    /// `None` after a failed acquisition; the track stays addressed so the
    /// user can retry from the transport controls.
    handle: Option<H>,
    playing: bool,
    progress: Duration,
    duration: Duration,
}

pub struct Coordinator<B: AudioBackend> {
    backend: B,
    skip_step: Duration,
    session: Option<Session<B::Handle>>,
    /// Sticky across track switches until explicitly toggled.
    looping: bool,
    /// Bumped on every acquisition and teardown; events tagged with an older
    /// generation belong to a resource we no longer own.
    generation: u64,
    events: EventQueue,
}

impl<B: AudioBackend> Coordinator<B> {
    pub fn new(backend: B) -> Self {
        Self::with_skip_step(backend, DEFAULT_SKIP_STEP)
    }

    pub fn with_skip_step(backend: B, skip_step: Duration) -> Self {
        Self {
            backend,
            skip_step,
            session: None,
            looping: false,
            generation: 0,
            events: new_event_queue(),
        }
    }

    /// Start playing `track`.
    ///
    /// Re-entry on the currently addressed track never restarts it: playing
    /// stays playing, paused (or failed) resumes. Switching tracks releases
    /// the old resource before the new one is acquired. Acquisition failures
    /// are absorbed: the track stays addressed with playback off.
    pub fn play(&mut self, track: TrackDescriptor) {
        if self.is_current_track(&track.id) {
            if !self.session.as_ref().is_some_and(|s| s.playing) {
                self.resume();
            }
            return;
        }

        // Release before acquire; two live resources must never overlap.
        self.session = None;

        let mut session = Session {
            track,
            handle: None,
            playing: false,
            progress: Duration::ZERO,
            duration: Duration::ZERO,
        };
        self.acquire_for(&mut session);
        self.session = Some(session);
    }

    /// No-op when nothing is addressed. Halts progress sampling but keeps
    /// `progress`/`duration` as they were.
    pub fn pause(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(handle) = session.handle.as_mut() {
            handle.pause();
        }
        session.playing = false;
    }

    /// Resume the addressed track. When the previous acquisition failed this
    /// is the retry path: one fresh acquisition attempt.
    pub fn resume(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if session.playing {
            self.session = Some(session);
            return;
        }
        match session.handle.as_mut() {
            Some(handle) => {
                handle.play();
                session.playing = true;
            }
            None => self.acquire_for(&mut session),
        }
        self.session = Some(session);
    }

    /// Tear the session down. Always safe, including when already idle;
    /// afterwards the snapshot reports no track and zeroed time fields.
    pub fn stop(&mut self) {
        self.session = None;
        // Anything still in flight from the released resource is now stale.
        self.generation += 1;
    }

    /// Requester-facing sugar: start the track, or pause/resume it when it
    /// is already the addressed one.
    pub fn toggle(&mut self, track: TrackDescriptor) {
        if self.is_current_track(&track.id) {
            if self.session.as_ref().is_some_and(|s| s.playing) {
                self.pause();
            } else {
                self.resume();
            }
        } else {
            self.play(track);
        }
    }

    /// Seek to `fraction` of the track length. Out-of-range input clamps to
    /// `[0, 1]`; unknown duration makes this a no-op.
    pub fn seek_to(&mut self, fraction: f64) {
        if !fraction.is_finite() {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.duration.is_zero() {
            return;
        }
        let target = session.duration.mul_f64(fraction.clamp(0.0, 1.0));
        if let Some(handle) = session.handle.as_mut() {
            handle.seek(target);
            session.progress = target;
        }
    }

    /// Jump ahead by the skip step, clamped to the track end when the
    /// duration is known.
    pub fn skip_forward(&mut self) {
        let step = self.skip_step;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(handle) = session.handle.as_mut() else {
            return;
        };
        let mut target = handle.position() + step;
        if let Some(total) = handle.duration() {
            if !total.is_zero() {
                target = target.min(total);
            }
        }
        handle.seek(target);
        session.progress = target;
    }

    /// Jump back by the skip step, clamped to the start of the track.
    pub fn skip_backward(&mut self) {
        let step = self.skip_step;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(handle) = session.handle.as_mut() else {
            return;
        };
        let target = handle.position().saturating_sub(step);
        handle.seek(target);
        session.progress = target;
    }

    /// Flip the sticky loop preference and apply it to the loaded resource.
    pub fn toggle_loop(&mut self) {
        self.looping = !self.looping;
        if let Some(handle) = self.session.as_mut().and_then(|s| s.handle.as_mut()) {
            handle.set_looping(self.looping);
        }
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Whether `id` is the addressed track. Requesters use this to render
    /// their own "mine is playing" state without duplicating any of it.
    pub fn is_current_track(&self, id: &str) -> bool {
        self.session.as_ref().is_some_and(|s| s.track.id == id)
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        match &self.session {
            Some(session) => PlayerSnapshot {
                current_track: Some(session.track.clone()),
                phase: if session.playing {
                    PlaybackPhase::Playing
                } else {
                    PlaybackPhase::Paused
                },
                progress: session.progress,
                duration: session.duration,
                is_looping: self.looping,
            },
            None => PlayerSnapshot {
                is_looping: self.looping,
                ..PlayerSnapshot::default()
            },
        }
    }

    /// Cooperative sampling step, driven once per event-loop iteration.
    ///
    /// Drains backend events (discarding stale generations) and, while
    /// playing, refreshes `progress`/`duration` from the handle. Sampling
    /// stops the moment the session pauses or tears down.
    pub fn tick(&mut self) {
        self.drain_events();

        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.playing {
            return;
        }
        let Some(handle) = session.handle.as_ref() else {
            return;
        };
        if let Some(total) = handle.duration() {
            session.duration = total;
        }
        session.progress = handle.position();
        if !session.duration.is_zero() {
            session.progress = session.progress.min(session.duration);
        }
    }

    fn acquire_for(&mut self, session: &mut Session<B::Handle>) {
        self.generation += 1;
        let sink = EventSink::new(self.generation, self.events.clone());
        match self.backend.acquire(&session.track.url, sink) {
            Ok(mut handle) => {
                handle.set_looping(self.looping);
                if let Some(total) = handle.duration() {
                    session.duration = total;
                }
                handle.play();
                session.handle = Some(handle);
                session.playing = true;
                session.progress = Duration::ZERO;
            }
            Err(err) => {
                warn!("could not start \"{}\": {err}", session.track.title);
                session.playing = false;
            }
        }
    }

    fn drain_events(&mut self) {
        let pending: Vec<(u64, MediaEvent)> = match self.events.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(_) => return,
        };

        for (generation, event) in pending {
            if generation != self.generation {
                // A released resource talking past its teardown.
                continue;
            }
            match event {
                MediaEvent::MetadataLoaded { duration } => {
                    if let Some(session) = self.session.as_mut() {
                        session.duration = duration;
                    }
                }
                MediaEvent::Ended => {
                    // Natural end with looping off; same outcome as stop().
                    self.session = None;
                }
                MediaEvent::Failed => {
                    if let Some(session) = self.session.as_mut() {
                        warn!("playback of \"{}\" failed", session.track.title);
                        session.handle = None;
                        session.playing = false;
                    }
                }
            }
        }
    }
}
