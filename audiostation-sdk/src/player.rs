//! Remote player handle.
//!
//! Every command follows the same shape: validate locally, send the
//! request, then refresh the cached status once so the handle reflects
//! the outcome of the command it just issued.

use std::sync::Arc;

use audiostation_api::{
    AudioStationClient, ContainerFilter, ControlCommand, PlayerStatus, Playlist, QueueMode,
    QueueMutation, QueueSource, RepeatMode, TransportAction,
};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::SdkError;

/// Handle for one remote player.
///
/// Cloning is cheap; clones share the session and the cached status
/// snapshot. Commands return `Ok(true)` when the device applied them and
/// `Ok(false)` when it declined (an unknown player id, or a renderer
/// that just dropped off the network). Transport or auth failures are
/// errors.
#[derive(Clone, Debug)]
pub struct RemotePlayer {
    /// Device-assigned player identifier.
    pub id: String,
    /// Friendly name reported by the device.
    pub name: String,

    client: AudioStationClient,
    snapshot: Arc<Mutex<Option<PlayerStatus>>>,
}

impl RemotePlayer {
    pub(crate) fn new(client: AudioStationClient, id: String, name: String) -> Self {
        Self {
            id,
            name,
            client,
            snapshot: Arc::new(Mutex::new(None)),
        }
    }

    /// Fetch the current playback status and update the cached snapshot.
    pub fn status(&self) -> Result<PlayerStatus, SdkError> {
        let status = self.client.player_status(&self.id)?;
        *self.snapshot.lock() = Some(status.clone());
        Ok(status)
    }

    /// Last status fetched by [`status`](Self::status) or by a command
    /// refresh. `None` until the first fetch.
    pub fn snapshot(&self) -> Option<PlayerStatus> {
        self.snapshot.lock().clone()
    }

    /// Fetch the player's current queue.
    pub fn playlist(&self) -> Result<Playlist, SdkError> {
        Ok(self.client.current_playlist(&self.id)?)
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    pub fn play(&self) -> Result<bool, SdkError> {
        self.control(ControlCommand::Transport(TransportAction::Play))
    }

    pub fn pause(&self) -> Result<bool, SdkError> {
        self.control(ControlCommand::Transport(TransportAction::Pause))
    }

    pub fn stop(&self) -> Result<bool, SdkError> {
        self.control(ControlCommand::Transport(TransportAction::Stop))
    }

    pub fn next(&self) -> Result<bool, SdkError> {
        self.control(ControlCommand::Transport(TransportAction::Next))
    }

    pub fn previous(&self) -> Result<bool, SdkError> {
        self.control(ControlCommand::Transport(TransportAction::Prev))
    }

    /// Seek to a position within the current song, in milliseconds.
    /// The device works in whole seconds; sub-second precision is lost.
    pub fn seek(&self, position_ms: u64) -> Result<bool, SdkError> {
        self.control(ControlCommand::Seek(position_ms / 1000))
    }

    /// Set the player volume.
    ///
    /// # Errors
    ///
    /// Values outside `0..=100` are rejected locally with
    /// [`ApiError::InvalidVolume`](audiostation_api::ApiError::InvalidVolume);
    /// nothing is sent to the device.
    pub fn set_volume(&self, volume: i64) -> Result<bool, SdkError> {
        let command = ControlCommand::set_volume(volume)?;
        self.control(command)
    }

    pub fn set_shuffle(&self, shuffle: bool) -> Result<bool, SdkError> {
        self.control(ControlCommand::Shuffle(shuffle))
    }

    pub fn set_repeat(&self, repeat: RepeatMode) -> Result<bool, SdkError> {
        self.control(ControlCommand::Repeat(repeat))
    }

    // ------------------------------------------------------------------
    // Queue
    // ------------------------------------------------------------------

    /// Replace or extend the queue with the given song ids.
    pub fn queue_songs(
        &self,
        song_ids: Vec<String>,
        mode: QueueMode,
        play_now: bool,
    ) -> Result<bool, SdkError> {
        self.mutate_queue(QueueMutation {
            mode,
            play: play_now,
            source: QueueSource::Songs(song_ids),
        })
    }

    /// Replace the queue with a whole album, in track order.
    pub fn queue_album(
        &self,
        album: &str,
        album_artist: &str,
        play_now: bool,
    ) -> Result<bool, SdkError> {
        self.mutate_queue(QueueMutation {
            mode: QueueMode::Replace,
            play: play_now,
            source: QueueSource::Container(ContainerFilter::album(album, album_artist)),
        })
    }

    /// Replace the queue with everything by an artist, grouped by album.
    pub fn queue_artist(&self, artist: &str, play_now: bool) -> Result<bool, SdkError> {
        self.mutate_queue(QueueMutation {
            mode: QueueMode::Replace,
            play: play_now,
            source: QueueSource::Container(ContainerFilter::artist(artist)),
        })
    }

    /// Remove every song from the queue.
    pub fn clear_queue(&self) -> Result<bool, SdkError> {
        let applied = self.client.clear_queue(&self.id)?;
        self.finish_command("clear_queue", applied)
    }

    /// Move the playback cursor to the song at `index` and start playing.
    pub fn jump_to(&self, index: usize) -> Result<bool, SdkError> {
        let applied = self.client.jump_to(&self.id, index)?;
        self.finish_command("jump_to", applied)
    }

    // ------------------------------------------------------------------

    fn control(&self, command: ControlCommand) -> Result<bool, SdkError> {
        let applied = self.client.control(&self.id, command)?;
        self.finish_command("control", applied)
    }

    fn mutate_queue(&self, mutation: QueueMutation) -> Result<bool, SdkError> {
        let applied = self.client.update_queue(&self.id, &mutation)?;
        self.finish_command("updateplaylist", applied)
    }

    /// One status refresh per command, applied or not, so the snapshot
    /// tracks what the device actually did. A refresh failure is logged
    /// but never masks the command's own outcome.
    fn finish_command(&self, what: &str, applied: bool) -> Result<bool, SdkError> {
        if !applied {
            warn!(player = %self.id, command = what, "device declined command");
        }
        if let Err(err) = self.status() {
            debug!(player = %self.id, error = %err, "status refresh after command failed");
        }
        Ok(applied)
    }
}
