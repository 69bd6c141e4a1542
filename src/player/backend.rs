//! The injectable media seam the coordinator drives.
//!
//! A backend hands out at most one live [`MediaHandle`] at a time; dropping
//! the handle releases the underlying resource. Asynchronous notifications
//! (metadata, end-of-track, late failures) flow back through a
//! generation-tagged event queue so the coordinator can discard events from
//! resources it no longer owns.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by resource acquisition.
///
/// The coordinator absorbs these; they never reach UI callers as errors.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("audio output unavailable: {0}")]
    OutputUnavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Asynchronous notification from the currently (or formerly) owned resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// The resource learned its total length.
    MetadataLoaded { duration: Duration },
    /// Natural end-of-track with looping off. Looping resources restart
    /// themselves and never emit this.
    Ended,
    /// The resource died after acquisition (decode error mid-stream).
    Failed,
}

/// Shared queue of `(generation, event)` pairs drained by the coordinator.
pub type EventQueue = Arc<Mutex<VecDeque<(u64, MediaEvent)>>>;

pub fn new_event_queue() -> EventQueue {
    Arc::new(Mutex::new(VecDeque::new()))
}

/// Write side of the event queue, bound to one acquisition generation.
///
/// Every event emitted through a sink carries the generation it was created
/// with, which is what lets a fast `play(B)` after `play(A)` ignore A's
/// stragglers.
#[derive(Clone)]
pub struct EventSink {
    generation: u64,
    queue: EventQueue,
}

impl EventSink {
    pub fn new(generation: u64, queue: EventQueue) -> Self {
        Self { generation, queue }
    }

    pub fn emit(&self, event: MediaEvent) {
        if let Ok(mut q) = self.queue.lock() {
            q.push_back((self.generation, event));
        }
    }
}

/// One acquired, exclusively owned playable resource.
///
/// Transport calls are infallible from the caller's point of view; a handle
/// that can no longer comply reports [`MediaEvent::Failed`] instead.
pub trait MediaHandle {
    fn play(&mut self);
    fn pause(&mut self);
    /// Position the resource at `pos` from the start of the track.
    fn seek(&mut self, pos: Duration);
    fn position(&self) -> Duration;
    /// Total length, once known.
    fn duration(&self) -> Option<Duration>;
    /// Repeat-at-end behavior for this resource only.
    fn set_looping(&mut self, looping: bool);
}

/// Factory for media handles.
pub trait AudioBackend {
    type Handle: MediaHandle;

    /// Acquire a resource for `url`. Single attempt; synchronous validation
    /// only. Later failures arrive as [`MediaEvent::Failed`] through
    /// `events`.
    fn acquire(&mut self, url: &str, events: EventSink) -> Result<Self::Handle, BackendError>;
}
