//! Type-safe client for the Synology AudioStation remote player API.
//!
//! The remote player API is not a clean RPC surface: playlist mutation
//! is expressed as differential updates against a server-side queue,
//! addressed by player identity, with positional semantics that must be
//! reproduced exactly. This crate models each call as a stateless
//! [`AudioStationOperation`] with pure parameter/response mappings, and
//! executes them through [`AudioStationClient`] on top of the session
//! layer in `dsm-client`.
//!
//! Modules:
//!
//! * [`players`] — remote player discovery;
//! * [`status`] — status polling and normalization into [`PlayerStatus`];
//! * [`queue`] — the differential queue protocol (the hard part);
//! * [`control`] — transport control (play/pause/volume/shuffle/...).
//!
//! Status is pull-only: the device pushes nothing, and this crate never
//! spawns background pollers.

pub mod client;
pub mod control;
pub mod error;
pub mod operation;
pub mod players;
pub mod queue;
pub mod status;

pub use client::AudioStationClient;
pub use control::{ControlCommand, TransportAction};
pub use error::{ApiError, Result};
pub use operation::AudioStationOperation;
pub use players::{Player, Subplayer};
pub use queue::{ContainerFilter, Playlist, QueueMode, QueueMutation, QueueSource};
pub use status::{PlaybackState, PlayerStatus, RepeatMode, Song};

// Session types callers need for construction and error handling.
pub use dsm_client::{AuthReason, DsmClient, DsmConfig};
