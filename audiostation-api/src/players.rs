//! Remote player discovery.
//!
//! Players are re-fetched wholesale on every listing call; the device
//! does not offer incremental updates. Server order is preserved as-is
//! (it carries display order only).

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::operation::{AudioStationOperation, HttpMethod, REMOTE_PLAYER_API};

/// A network playback endpoint controlled via the device.
///
/// The `id` is an opaque device-assigned UUID string; callers must not
/// assume anything about its format beyond uniqueness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub name: String,
    /// Device-reported player kind, e.g. `upnp`. Informational.
    pub player_type: Option<String>,
    /// Sub-players of a grouped endpoint, if reported.
    pub subplayers: Vec<Subplayer>,
}

/// A member of a grouped player.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subplayer {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct RawPlayerList {
    #[serde(default)]
    players: Vec<RawPlayer>,
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    id: String,
    name: String,
    #[serde(rename = "type")]
    player_type: Option<String>,
    #[serde(default)]
    additional: RawPlayerAdditional,
}

#[derive(Debug, Default, Deserialize)]
struct RawPlayerAdditional {
    #[serde(default)]
    subplayer_list: Vec<Subplayer>,
}

impl From<RawPlayer> for Player {
    fn from(raw: RawPlayer) -> Self {
        Player {
            id: raw.id,
            name: raw.name,
            player_type: raw.player_type,
            subplayers: raw.additional.subplayer_list,
        }
    }
}

/// `SYNO.AudioStation.RemotePlayer` / `list`.
///
/// Requests all player types with sub-player information. A device that
/// reports zero players yields an empty list, not an error.
pub struct ListPlayersOperation;

impl AudioStationOperation for ListPlayersOperation {
    type Request = ();
    type Response = Vec<Player>;

    const API: &'static str = REMOTE_PLAYER_API;
    const METHOD: &'static str = "list";
    const VERSION: u32 = 3;
    const HTTP: HttpMethod = HttpMethod::Get;

    fn build_params(_request: &Self::Request) -> Result<Vec<(String, String)>> {
        Ok(vec![
            ("type".to_string(), "all".to_string()),
            ("additional".to_string(), "subplayer_list".to_string()),
        ])
    }

    fn parse_response(envelope: &Value) -> Result<Self::Response> {
        let data = envelope.get("data").cloned().unwrap_or(Value::Null);
        if data.is_null() {
            return Ok(Vec::new());
        }
        let raw: RawPlayerList = serde_json::from_value(data)
            .map_err(|e| ApiError::Parse(format!("player list: {}", e)))?;
        Ok(raw.players.into_iter().map(Player::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_players_in_server_order() {
        let envelope = json!({
            "success": true,
            "data": {
                "players": [
                    {
                        "id": "uuid-b",
                        "name": "Bedroom",
                        "type": "upnp",
                        "additional": {"subplayer_list": []}
                    },
                    {
                        "id": "uuid-a",
                        "name": "Living Room",
                        "type": "upnp",
                        "additional": {
                            "subplayer_list": [
                                {"id": "sub-1", "name": "Left"},
                                {"id": "sub-2", "name": "Right"}
                            ]
                        }
                    }
                ]
            }
        });

        let players = ListPlayersOperation::parse_response(&envelope).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].id, "uuid-b");
        assert_eq!(players[1].name, "Living Room");
        assert_eq!(players[1].subplayers.len(), 2);
        assert_eq!(players[1].subplayers[0].name, "Left");
    }

    #[test]
    fn zero_players_is_a_valid_steady_state() {
        let envelope = json!({"success": true, "data": {"players": []}});
        assert!(ListPlayersOperation::parse_response(&envelope)
            .unwrap()
            .is_empty());

        let envelope = json!({"success": true, "data": {}});
        assert!(ListPlayersOperation::parse_response(&envelope)
            .unwrap()
            .is_empty());

        let envelope = json!({"success": true});
        assert!(ListPlayersOperation::parse_response(&envelope)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn player_without_additional_block() {
        let envelope = json!({
            "success": true,
            "data": {"players": [{"id": "uuid-c", "name": "Kitchen"}]}
        });
        let players = ListPlayersOperation::parse_response(&envelope).unwrap();
        assert_eq!(players[0].player_type, None);
        assert!(players[0].subplayers.is_empty());
    }

    #[test]
    fn list_params() {
        let params = ListPlayersOperation::build_params(&()).unwrap();
        assert!(params.contains(&("type".to_string(), "all".to_string())));
        assert!(params.contains(&("additional".to_string(), "subplayer_list".to_string())));
    }
}
