//! Runtime state and media switching engine for the Briefing peer-to-peer
//! video call client.
//!
//! The [`Session`] worker owns the shared [`session::ProcessState`] and
//! turns device, mute and background intent into an active local media
//! stream, reporting material state changes to the embedding host page.
//! Everything external (capture primitives, the background transform,
//! the signaling connection, the host channel) is reached through the
//! capability traits in [`platform`].

#[macro_use]
extern crate tracing;

pub mod logging;
pub mod media;
pub mod platform;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use briefing_client_config::ClientConfig;
pub use session::Session;
