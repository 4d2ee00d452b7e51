use std::sync::Arc;

use dsm_client::{DsmClient, HttpMethod};
use tracing::debug;

use crate::control::{ControlCommand, ControlOperation, ControlRequest};
use crate::error::Result;
use crate::operation::AudioStationOperation;
use crate::players::{ListPlayersOperation, Player};
use crate::queue::{
    GetPlaylistOperation, GetPlaylistRequest, Playlist, PlaylistEdit, QueueMode, QueueMutation,
    UpdatePlaylistOperation, UpdatePlaylistRequest,
};
use crate::status::{GetStatusOperation, GetStatusRequest, PlayerStatus};

/// A client for executing AudioStation operations against a device.
///
/// This client bridges the stateless operation definitions and actual
/// network requests. It shares one [`DsmClient`] (and therefore one
/// session token) between clones; calls to different players are
/// independent and may run concurrently from separate threads.
#[derive(Debug, Clone)]
pub struct AudioStationClient {
    dsm: Arc<DsmClient>,
}

impl AudioStationClient {
    /// Create a client on top of an authenticated-session handle.
    pub fn new(dsm: Arc<DsmClient>) -> Self {
        Self { dsm }
    }

    /// The underlying session handle.
    pub fn dsm(&self) -> &DsmClient {
        &self.dsm
    }

    /// Execute any operation: build its parameters, issue the request
    /// through the session layer, and parse the envelope.
    pub fn execute<Op: AudioStationOperation>(&self, request: &Op::Request) -> Result<Op::Response> {
        let params = Op::build_params(request)?;
        let envelope = match Op::HTTP {
            HttpMethod::Get => self.dsm.get(Op::API, Op::METHOD, Op::VERSION, &params),
            HttpMethod::Post => self.dsm.post(Op::API, Op::METHOD, Op::VERSION, &params),
        }?;
        Op::parse_response(&envelope)
    }

    /// List the remote players known to the device, in server order.
    ///
    /// A device with zero players yields an empty list.
    pub fn list_players(&self) -> Result<Vec<Player>> {
        self.execute::<ListPlayersOperation>(&())
    }

    /// Poll the current status of a player.
    pub fn player_status(&self, player_id: &str) -> Result<PlayerStatus> {
        self.execute::<GetStatusOperation>(&GetStatusRequest {
            player_id: player_id.to_string(),
        })
    }

    /// Fetch the server-held queue of a player.
    pub fn current_playlist(&self, player_id: &str) -> Result<Playlist> {
        self.execute::<GetPlaylistOperation>(&GetPlaylistRequest {
            player_id: player_id.to_string(),
        })
    }

    /// Apply a queue mutation.
    ///
    /// Append mutations are positioned at the end of the current queue,
    /// which requires one preceding queue query; replace mutations go
    /// straight out.
    ///
    /// # Returns
    ///
    /// `Ok(false)` when the device declined to apply the edit — a
    /// reportable outcome, not an error.
    pub fn update_queue(&self, player_id: &str, mutation: &QueueMutation) -> Result<bool> {
        let queue_len = match mutation.mode {
            QueueMode::Append => self.current_playlist(player_id)?.total,
            QueueMode::Replace => 0,
        };
        debug!(player = player_id, mode = ?mutation.mode, queue_len, "updating queue");
        self.execute::<UpdatePlaylistOperation>(&UpdatePlaylistRequest {
            player_id: player_id.to_string(),
            edit: PlaylistEdit::Mutate {
                mutation: mutation.clone(),
                queue_len,
            },
        })
    }

    /// Truncate the queue of a player to zero length.
    ///
    /// The current queue length is fetched first; clearing an already
    /// empty queue is a no-error success.
    pub fn clear_queue(&self, player_id: &str) -> Result<bool> {
        let total = self.current_playlist(player_id)?.total;
        debug!(player = player_id, total, "clearing queue");
        self.execute::<UpdatePlaylistOperation>(&UpdatePlaylistRequest {
            player_id: player_id.to_string(),
            edit: PlaylistEdit::Clear { total },
        })
    }

    /// Move the play cursor to the song at `index` and start playback.
    pub fn jump_to(&self, player_id: &str, index: usize) -> Result<bool> {
        self.execute::<UpdatePlaylistOperation>(&UpdatePlaylistRequest {
            player_id: player_id.to_string(),
            edit: PlaylistEdit::Jump { index },
        })
    }

    /// Send a control command to a player.
    pub fn control(&self, player_id: &str, command: ControlCommand) -> Result<bool> {
        self.execute::<ControlOperation>(&ControlRequest {
            player_id: player_id.to_string(),
            command,
        })
    }
}
