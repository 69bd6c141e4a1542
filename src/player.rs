//! Global audio playback.
//!
//! One [`Coordinator`] instance owns the single live audio resource for the
//! whole app. UI surfaces request playback with track descriptors and render
//! from the coordinator's snapshot; the backend seam keeps the state machine
//! testable without real audio decoding.

mod backend;
mod coordinator;
mod rodio_backend;
mod types;

pub use backend::{AudioBackend, BackendError, EventSink, MediaEvent, MediaHandle};
pub use coordinator::{Coordinator, DEFAULT_SKIP_STEP};
pub use rodio_backend::RodioBackend;
pub use types::{PlaybackPhase, PlayerSnapshot, TrackDescriptor, TrackSource};

#[cfg(test)]
mod tests;
