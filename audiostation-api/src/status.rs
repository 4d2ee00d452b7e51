//! Remote player status polling and normalization.
//!
//! Raw status responses are heterogeneous nested structures; this module
//! flattens them into one [`PlayerStatus`] snapshot per poll. Snapshots
//! are built fresh each time and never mutated in place.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::operation::{
    uuid_param, AudioStationOperation, HttpMethod, REMOTE_PLAYER_STATUS_API,
};

/// Canonical playback state of a remote player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Idle,
}

/// Repeat mode of a player queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatMode {
    None,
    One,
    All,
}

impl RepeatMode {
    /// Wire value used by both status responses and control requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatMode::None => "none",
            RepeatMode::One => "one",
            RepeatMode::All => "all",
        }
    }

    fn from_wire(value: &str) -> Result<Self> {
        match value {
            "none" => Ok(RepeatMode::None),
            "one" => Ok(RepeatMode::One),
            "all" => Ok(RepeatMode::All),
            other => Err(ApiError::Parse(format!("unknown repeat mode '{}'", other))),
        }
    }
}

/// Metadata of the song a player currently has loaded.
///
/// Fields missing from the device response stay `None`; they are never
/// filled with zero or empty-string placeholders, so "unknown" remains
/// distinguishable from "empty".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub id: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_ms: Option<u64>,
}

/// A point-in-time snapshot of a remote player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStatus {
    pub state: PlaybackState,
    pub position_ms: u64,
    /// Volume in `0..=100`.
    pub volume: u8,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    /// `None` exactly when the player reported a stopped/none state.
    pub song: Option<Song>,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    state: String,
    #[serde(default)]
    position: Option<u64>,
    #[serde(default)]
    volume: Option<u8>,
    #[serde(default)]
    play_mode: Option<RawPlayMode>,
    #[serde(default)]
    song: Option<RawSong>,
}

#[derive(Debug, Deserialize)]
struct RawPlayMode {
    #[serde(default)]
    repeat: Option<String>,
    #[serde(default)]
    shuffle: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSong {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    additional: Option<RawSongAdditional>,
}

#[derive(Debug, Deserialize)]
struct RawSongAdditional {
    #[serde(default)]
    song_tag: Option<RawSongTag>,
    #[serde(default)]
    song_audio: Option<RawSongAudio>,
}

#[derive(Debug, Deserialize)]
struct RawSongTag {
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    album: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSongAudio {
    /// Milliseconds when present. The device occasionally reports this
    /// as a non-integer placeholder, which normalizes to `None`.
    #[serde(default)]
    duration: Option<Value>,
}

/// Map a device-reported state onto the canonical state machine.
///
/// The table is exhaustive over the states the device emits; anything
/// else is a parse error rather than a silent default.
fn map_state(raw: &str) -> Result<PlaybackState> {
    match raw {
        "transitioning" | "playing" => Ok(PlaybackState::Playing),
        "pause" => Ok(PlaybackState::Paused),
        "stopped" | "none" => Ok(PlaybackState::Idle),
        other => Err(ApiError::Parse(format!("unknown player state '{}'", other))),
    }
}

fn normalize(raw: RawStatus) -> Result<PlayerStatus> {
    let state = map_state(&raw.state)?;
    // A stopped/none player has no current song; the device sometimes
    // echoes the last loaded one anyway.
    let song = match raw.state.as_str() {
        "stopped" | "none" => None,
        _ => raw.song.map(Song::from),
    };
    let (repeat, shuffle) = match raw.play_mode {
        Some(mode) => (
            match mode.repeat {
                Some(value) => RepeatMode::from_wire(&value)?,
                None => RepeatMode::None,
            },
            mode.shuffle.unwrap_or(false),
        ),
        None => (RepeatMode::None, false),
    };

    Ok(PlayerStatus {
        state,
        position_ms: raw.position.unwrap_or(0),
        volume: raw.volume.unwrap_or(0),
        shuffle,
        repeat,
        song,
    })
}

impl From<RawSong> for Song {
    fn from(raw: RawSong) -> Self {
        let (tag, audio) = match raw.additional {
            Some(additional) => (additional.song_tag, additional.song_audio),
            None => (None, None),
        };
        let (artist, album) = match tag {
            Some(tag) => (tag.artist, tag.album),
            None => (None, None),
        };
        let duration_ms = audio
            .and_then(|audio| audio.duration)
            .and_then(|value| value.as_u64());

        Song {
            id: raw.id,
            title: raw.title,
            artist,
            album,
            duration_ms,
        }
    }
}

/// `SYNO.AudioStation.RemotePlayerStatus` / `getstatus`.
pub struct GetStatusOperation;

/// Request for [`GetStatusOperation`].
#[derive(Debug, Clone)]
pub struct GetStatusRequest {
    pub player_id: String,
}

impl AudioStationOperation for GetStatusOperation {
    type Request = GetStatusRequest;
    type Response = PlayerStatus;

    const API: &'static str = REMOTE_PLAYER_STATUS_API;
    const METHOD: &'static str = "getstatus";
    const VERSION: u32 = 1;
    const HTTP: HttpMethod = HttpMethod::Get;

    fn build_params(request: &Self::Request) -> Result<Vec<(String, String)>> {
        Ok(vec![
            ("id".to_string(), uuid_param(&request.player_id)),
            (
                "additional".to_string(),
                "song_tag,song_audio,subplayer_volume".to_string(),
            ),
        ])
    }

    fn parse_response(envelope: &Value) -> Result<Self::Response> {
        let data = envelope
            .get("data")
            .cloned()
            .ok_or_else(|| ApiError::Parse("status response missing data".to_string()))?;
        let raw: RawStatus = serde_json::from_value(data)
            .map_err(|e| ApiError::Parse(format!("player status: {}", e)))?;
        normalize(raw)
    }
}
