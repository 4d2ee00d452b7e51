//! The queue protocol: differential playlist mutations.
//!
//! The device exposes one `updateplaylist` endpoint for three different
//! edit intents (clear, append, replace-and-play), distinguished only by
//! the positional `offset`/`limit`/`updated_index` parameters. Getting
//! these exactly right is the crux of queue correctness; the rule table
//! lives in the pure [`mutation_params`], [`clear_params`] and
//! [`jump_params`] functions so it can be tested without a device.
//!
//! The positional semantics:
//!
//! * replace: `offset=-1, limit=0` — `-1` is a sentinel meaning "ignore
//!   position, discard the existing queue";
//! * append: `offset=<current queue length>, limit=0` — the length has
//!   to be fetched with a preceding `getplaylist` call;
//! * clear: `offset=0, limit=<current total>, updated_index=-1` with an
//!   empty song reference — truncates the queue; `limit=0` would NOT
//!   clear it;
//! * jump: `offset=0, limit=0, updated_index=<index>, play=true` moves
//!   the play cursor without touching queue content.
//!
//! Song lists longer than the device page size (8192) are not paginated
//! by this client; truncation is the caller's responsibility.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::operation::{uuid_param, AudioStationOperation, HttpMethod, REMOTE_PLAYER_API};
use crate::status::Song;

/// Page size used when fetching the current queue.
pub const PLAYLIST_PAGE_SIZE: usize = 8192;

/// How a mutation combines with the existing queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueMode {
    /// Discard the existing queue and install the new content.
    Replace,
    /// Keep the existing queue and add the new content at its end.
    Append,
}

/// A server-side selection criterion used instead of an explicit song
/// list, e.g. "all songs of album X by artist Y".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerFilter {
    #[serde(rename = "type")]
    pub kind: String,
    pub sort_by: String,
    pub sort_direction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
}

impl ContainerFilter {
    /// All songs of an album, in track order.
    pub fn album(album: impl Into<String>, album_artist: impl Into<String>) -> Self {
        Self {
            kind: "album".to_string(),
            sort_by: "track".to_string(),
            sort_direction: "ASC".to_string(),
            album: Some(album.into()),
            album_artist: Some(album_artist.into()),
            artist: None,
        }
    }

    /// All songs of an artist, grouped by album.
    pub fn artist(artist: impl Into<String>) -> Self {
        Self {
            kind: "artist".to_string(),
            sort_by: "album".to_string(),
            sort_direction: "ASC".to_string(),
            album: None,
            album_artist: None,
            artist: Some(artist.into()),
        }
    }
}

/// What a mutation plays: an explicit song list or a container filter.
///
/// The device distinguishes the two with disjoint request fields
/// (`songs` vs `containers_json`) and leaves their combination
/// undefined; the enum makes mixing them unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueSource {
    Songs(Vec<String>),
    Container(ContainerFilter),
}

/// One playlist edit against a remote player queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMutation {
    pub mode: QueueMode,
    /// Start playback immediately after the edit is applied.
    pub play: bool,
    pub source: QueueSource,
}

/// Wire parameters for a [`QueueMutation`].
///
/// `queue_len` is the current queue length, only consulted for
/// [`QueueMode::Append`].
pub fn mutation_params(mutation: &QueueMutation, queue_len: usize) -> Result<Vec<(String, String)>> {
    let mut params: Vec<(String, String)> = Vec::new();
    match mutation.mode {
        QueueMode::Replace => {
            params.push(("offset".to_string(), "-1".to_string()));
            params.push(("limit".to_string(), "0".to_string()));
        }
        QueueMode::Append => {
            params.push(("offset".to_string(), queue_len.to_string()));
            params.push(("limit".to_string(), "0".to_string()));
        }
    }
    match &mutation.source {
        QueueSource::Songs(ids) => {
            params.push(("songs".to_string(), ids.join(",")));
        }
        QueueSource::Container(filter) => {
            let json = serde_json::to_string(&[filter])
                .map_err(|e| ApiError::Parse(format!("container filter: {}", e)))?;
            params.push(("containers_json".to_string(), json));
        }
    }
    params.push(("library".to_string(), "shared".to_string()));
    params.push(("keep_shuffle_order".to_string(), "false".to_string()));
    params.push(("play".to_string(), mutation.play.to_string()));
    Ok(params)
}

/// Wire parameters for truncating the queue to zero length.
///
/// `total` is the current queue length, fetched immediately beforehand.
pub fn clear_params(total: usize) -> Vec<(String, String)> {
    vec![
        ("offset".to_string(), "0".to_string()),
        ("limit".to_string(), total.to_string()),
        ("updated_index".to_string(), "-1".to_string()),
        ("song".to_string(), String::new()),
    ]
}

/// Wire parameters for jumping the play cursor to `index`.
pub fn jump_params(index: usize) -> Vec<(String, String)> {
    vec![
        ("offset".to_string(), "0".to_string()),
        ("limit".to_string(), "0".to_string()),
        ("updated_index".to_string(), index.to_string()),
        ("play".to_string(), "true".to_string()),
    ]
}

/// The server-held queue of a remote player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    /// Total number of songs in the queue.
    pub total: usize,
    /// Index of the current play cursor, when the device reports one.
    pub current: Option<usize>,
    pub songs: Vec<Song>,
}

#[derive(Debug, Deserialize)]
struct RawPlaylist {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    current: Option<usize>,
    #[serde(default)]
    songs: Vec<crate::status::RawSong>,
}

/// `SYNO.AudioStation.RemotePlayer` / `getplaylist`.
pub struct GetPlaylistOperation;

/// Request for [`GetPlaylistOperation`].
#[derive(Debug, Clone)]
pub struct GetPlaylistRequest {
    pub player_id: String,
}

impl AudioStationOperation for GetPlaylistOperation {
    type Request = GetPlaylistRequest;
    type Response = Playlist;

    const API: &'static str = REMOTE_PLAYER_API;
    const METHOD: &'static str = "getplaylist";
    const VERSION: u32 = 3;
    const HTTP: HttpMethod = HttpMethod::Post;

    fn build_params(request: &Self::Request) -> Result<Vec<(String, String)>> {
        Ok(vec![
            ("id".to_string(), uuid_param(&request.player_id)),
            ("offset".to_string(), "0".to_string()),
            ("limit".to_string(), PLAYLIST_PAGE_SIZE.to_string()),
            (
                "additional".to_string(),
                "song_tag,song_audio,song_rating".to_string(),
            ),
        ])
    }

    fn parse_response(envelope: &Value) -> Result<Self::Response> {
        let data = envelope
            .get("data")
            .cloned()
            .ok_or_else(|| ApiError::Parse("playlist response missing data".to_string()))?;
        let raw: RawPlaylist = serde_json::from_value(data)
            .map_err(|e| ApiError::Parse(format!("playlist: {}", e)))?;
        Ok(Playlist {
            total: raw.total,
            current: raw.current,
            songs: raw.songs.into_iter().map(Song::from).collect(),
        })
    }
}

/// One edit applied through the `updateplaylist` endpoint.
#[derive(Debug, Clone)]
pub enum PlaylistEdit {
    /// Install or extend queue content.
    Mutate {
        mutation: QueueMutation,
        /// Current queue length, needed for append positioning.
        queue_len: usize,
    },
    /// Truncate the queue; `total` is its current length.
    Clear { total: usize },
    /// Move the play cursor to `index`.
    Jump { index: usize },
}

/// `SYNO.AudioStation.RemotePlayer` / `updateplaylist`.
///
/// The response is the bare success flag: the device reports edits it
/// will not apply (wrong protocol version, invalid positional
/// parameters) as `success=false` without an error code, which maps to
/// `Ok(false)` here rather than an error.
pub struct UpdatePlaylistOperation;

/// Request for [`UpdatePlaylistOperation`].
#[derive(Debug, Clone)]
pub struct UpdatePlaylistRequest {
    pub player_id: String,
    pub edit: PlaylistEdit,
}

impl AudioStationOperation for UpdatePlaylistOperation {
    type Request = UpdatePlaylistRequest;
    type Response = bool;

    const API: &'static str = REMOTE_PLAYER_API;
    const METHOD: &'static str = "updateplaylist";
    const VERSION: u32 = 3;
    const HTTP: HttpMethod = HttpMethod::Post;

    fn build_params(request: &Self::Request) -> Result<Vec<(String, String)>> {
        let mut params = vec![("id".to_string(), uuid_param(&request.player_id))];
        match &request.edit {
            PlaylistEdit::Mutate { mutation, queue_len } => {
                params.extend(mutation_params(mutation, *queue_len)?);
            }
            PlaylistEdit::Clear { total } => params.extend(clear_params(*total)),
            PlaylistEdit::Jump { index } => params.extend(jump_params(*index)),
        }
        Ok(params)
    }

    fn parse_response(envelope: &Value) -> Result<Self::Response> {
        envelope
            .get("success")
            .and_then(Value::as_bool)
            .ok_or_else(|| ApiError::Parse("update response missing success flag".to_string()))
    }
}
