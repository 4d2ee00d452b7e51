//! # AudioStation SDK
//!
//! High-level, sync-first SDK for controlling the remote players of a
//! Synology AudioStation instance:
//!
//! ```rust,no_run
//! use audiostation_sdk::{AudioStation, DsmConfig, QueueMode};
//!
//! fn main() -> Result<(), audiostation_sdk::SdkError> {
//!     let config = DsmConfig::new("diskstation.local", "admin", "hunter2");
//!     let station = AudioStation::connect(config)?;
//!
//!     let player = station.player("player-uuid")?;
//!     player.queue_album("Abbey Road", "The Beatles", true)?;
//!     player.set_volume(40)?;
//!
//!     let status = player.status()?;
//!     println!("{:?}", status.state);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! audiostation-sdk (player handles, command dispatch)
//!     ↓
//! audiostation-api (typed operations, queue protocol, status mapping)
//!     ↓
//! dsm-client (HTTP transport, session lifecycle)
//! ```
//!
//! Commands return `Ok(bool)`: `true` when the device applied the
//! command, `false` when it declined it. After every command the player
//! refreshes its cached status once, so [`RemotePlayer::snapshot`]
//! reflects the device's reaction without an extra call.

pub use error::SdkError;
pub use player::RemotePlayer;
pub use system::AudioStation;

// Re-export the types callers need to drive the SDK.
pub use audiostation_api::{
    ApiError, AuthReason, DsmConfig, PlaybackState, PlayerStatus, Playlist, QueueMode, RepeatMode,
    Song,
};

mod error;
mod player;
mod system;
