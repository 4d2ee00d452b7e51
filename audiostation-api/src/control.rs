//! Transport control of a remote player.
//!
//! All control goes through the `control` method with an `action`
//! parameter and, for some actions, a `value`. The device does not
//! validate values server-side, so out-of-range volume is rejected here
//! before any network call.

use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::operation::{uuid_param, AudioStationOperation, HttpMethod, REMOTE_PLAYER_API};
use crate::status::RepeatMode;

/// Plain transport actions without a value parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportAction {
    Play,
    Pause,
    Stop,
    Next,
    Prev,
}

impl TransportAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportAction::Play => "play",
            TransportAction::Pause => "pause",
            TransportAction::Stop => "stop",
            TransportAction::Next => "next",
            TransportAction::Prev => "prev",
        }
    }
}

/// A normalized control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Transport(TransportAction),
    /// Volume in `0..=100`. Use [`ControlCommand::set_volume`] to get
    /// range checking on arbitrary input.
    SetVolume(u8),
    Shuffle(bool),
    Repeat(RepeatMode),
    /// Seek to a position, in seconds.
    Seek(u64),
}

impl ControlCommand {
    /// Build a volume command, rejecting values outside `0..=100`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidVolume`] for out-of-range input; no
    /// request is constructed in that case.
    pub fn set_volume(volume: i64) -> Result<Self> {
        if !(0..=100).contains(&volume) {
            return Err(ApiError::InvalidVolume(volume));
        }
        Ok(ControlCommand::SetVolume(volume as u8))
    }

    fn action_params(&self) -> Vec<(String, String)> {
        match self {
            ControlCommand::Transport(action) => {
                vec![("action".to_string(), action.as_str().to_string())]
            }
            ControlCommand::SetVolume(volume) => vec![
                ("action".to_string(), "set_volume".to_string()),
                ("value".to_string(), volume.to_string()),
            ],
            ControlCommand::Shuffle(enabled) => vec![
                ("action".to_string(), "shuffle".to_string()),
                ("value".to_string(), enabled.to_string()),
            ],
            ControlCommand::Repeat(mode) => vec![
                ("action".to_string(), "repeat".to_string()),
                ("value".to_string(), mode.as_str().to_string()),
            ],
            ControlCommand::Seek(seconds) => vec![
                ("action".to_string(), "seek".to_string()),
                ("value".to_string(), seconds.to_string()),
            ],
        }
    }
}

/// `SYNO.AudioStation.RemotePlayer` / `control`.
pub struct ControlOperation;

/// Request for [`ControlOperation`].
#[derive(Debug, Clone)]
pub struct ControlRequest {
    pub player_id: String,
    pub command: ControlCommand,
}

impl AudioStationOperation for ControlOperation {
    type Request = ControlRequest;
    type Response = bool;

    const API: &'static str = REMOTE_PLAYER_API;
    const METHOD: &'static str = "control";
    const VERSION: u32 = 3;
    const HTTP: HttpMethod = HttpMethod::Post;

    fn build_params(request: &Self::Request) -> Result<Vec<(String, String)>> {
        if let ControlCommand::SetVolume(volume) = request.command {
            // Guards direct construction of the variant; set_volume()
            // already rejects the i64 range.
            if volume > 100 {
                return Err(ApiError::InvalidVolume(i64::from(volume)));
            }
        }
        let mut params = vec![("id".to_string(), uuid_param(&request.player_id))];
        params.extend(request.command.action_params());
        Ok(params)
    }

    fn parse_response(envelope: &Value) -> Result<Self::Response> {
        envelope
            .get("success")
            .and_then(Value::as_bool)
            .ok_or_else(|| ApiError::Parse("control response missing success flag".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn params_for(command: ControlCommand) -> Vec<(String, String)> {
        ControlOperation::build_params(&ControlRequest {
            player_id: "ABCD".to_string(),
            command,
        })
        .unwrap()
    }

    fn value_of<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[rstest]
    #[case(TransportAction::Play, "play")]
    #[case(TransportAction::Pause, "pause")]
    #[case(TransportAction::Stop, "stop")]
    #[case(TransportAction::Next, "next")]
    #[case(TransportAction::Prev, "prev")]
    fn transport_actions(#[case] action: TransportAction, #[case] wire: &str) {
        let params = params_for(ControlCommand::Transport(action));
        assert_eq!(value_of(&params, "action"), Some(wire));
        assert_eq!(value_of(&params, "value"), None);
        assert_eq!(value_of(&params, "id"), Some("uuid:ABCD"));
    }

    #[test]
    fn shuffle_and_repeat_carry_values() {
        let params = params_for(ControlCommand::Shuffle(true));
        assert_eq!(value_of(&params, "action"), Some("shuffle"));
        assert_eq!(value_of(&params, "value"), Some("true"));

        let params = params_for(ControlCommand::Repeat(RepeatMode::One));
        assert_eq!(value_of(&params, "action"), Some("repeat"));
        assert_eq!(value_of(&params, "value"), Some("one"));
    }

    #[test]
    fn seek_value_is_seconds() {
        let params = params_for(ControlCommand::Seek(93));
        assert_eq!(value_of(&params, "action"), Some("seek"));
        assert_eq!(value_of(&params, "value"), Some("93"));
    }

    proptest! {
        #[test]
        fn valid_volumes_build_one_value_param(volume in 0i64..=100) {
            let command = ControlCommand::set_volume(volume).unwrap();
            let params = params_for(command);
            prop_assert_eq!(value_of(&params, "action"), Some("set_volume"));
            let volume_text = volume.to_string();
            prop_assert_eq!(value_of(&params, "value"), Some(volume_text.as_str()));
        }

        #[test]
        fn out_of_range_volumes_are_rejected(volume in prop_oneof![-10_000i64..0, 101i64..10_000]) {
            let err = ControlCommand::set_volume(volume).unwrap_err();
            prop_assert!(matches!(err, ApiError::InvalidVolume(v) if v == volume));
        }
    }

    #[test]
    fn directly_constructed_overflow_volume_never_reaches_the_wire() {
        let err = ControlOperation::build_params(&ControlRequest {
            player_id: "ABCD".to_string(),
            command: ControlCommand::SetVolume(150),
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidVolume(150)));
    }
}
