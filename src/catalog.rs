//! Curated wellness session catalog.
//!
//! Static reference data (focus playlists, guided meditations, the morning
//! activation cue) plus the link helpers requesters use to resolve a raw
//! stored link into something the player can be handed.

mod links;
mod model;

pub use links::*;
pub use model::*;

#[cfg(test)]
mod tests;
