//! AudioStation - main entry point for the SDK.
//!
//! Owns the authenticated session and hands out [`RemotePlayer`] handles.

use std::sync::Arc;

use audiostation_api::{AudioStationClient, DsmClient, DsmConfig};
use tracing::info;

use crate::{RemotePlayer, SdkError};

/// Connection to one AudioStation instance.
///
/// Connecting logs in immediately so that credential problems surface at
/// startup rather than on the first command. Player handles created from
/// this struct share the session; the token is refreshed transparently
/// when the device expires it.
///
/// # Example
///
/// ```rust,no_run
/// use audiostation_sdk::{AudioStation, DsmConfig};
///
/// fn main() -> Result<(), audiostation_sdk::SdkError> {
///     let config = DsmConfig::new("diskstation.local", "admin", "hunter2");
///     let station = AudioStation::connect(config)?;
///
///     for player in station.players()? {
///         println!("{} ({})", player.name, player.id);
///     }
///
///     let player = station.player("player-uuid")?;
///     player.queue_album("Abbey Road", "The Beatles", true)?;
///     Ok(())
/// }
/// ```
pub struct AudioStation {
    client: AudioStationClient,
}

impl AudioStation {
    /// Connect to the device and authenticate.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed or the login
    /// is rejected ([`ApiError::Auth`](audiostation_api::ApiError::Auth)
    /// carries the reason, including a required second factor).
    pub fn connect(config: DsmConfig) -> Result<Self, SdkError> {
        let host = config.host.clone();
        let dsm = Arc::new(DsmClient::new(config).map_err(audiostation_api::ApiError::from)?);
        dsm.login().map_err(audiostation_api::ApiError::from)?;
        info!(host = %host, "connected to AudioStation");

        Ok(Self {
            client: AudioStationClient::new(dsm),
        })
    }

    /// Wrap an already-constructed API client. Useful when the session is
    /// shared with other AudioStation surfaces.
    pub fn from_client(client: AudioStationClient) -> Self {
        Self { client }
    }

    /// List the remote players the device currently advertises.
    ///
    /// The list reflects the devices visible to AudioStation right now;
    /// players come and go as renderers join or leave the network, so an
    /// empty list is an ordinary steady state.
    pub fn players(&self) -> Result<Vec<RemotePlayer>, SdkError> {
        let players = self.client.list_players()?;
        Ok(players
            .into_iter()
            .map(|p| RemotePlayer::new(self.client.clone(), p.id, p.name))
            .collect())
    }

    /// Get a handle for the player with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::PlayerNotFound`] if the device does not list
    /// a player with that id.
    pub fn player(&self, id: &str) -> Result<RemotePlayer, SdkError> {
        self.players()?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| SdkError::PlayerNotFound(id.to_string()))
    }

    /// Access the underlying typed API client.
    pub fn client(&self) -> &AudioStationClient {
        &self.client
    }

    /// End the session on the device. Best effort; the token becomes
    /// unusable locally either way.
    pub fn logout(&self) {
        self.client.dsm().logout();
    }
}
