//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the merged session
//! entries, selection and filter state. Playback state lives elsewhere;
//! every surface reads it from the player snapshot.

mod model;

pub use model::*;
