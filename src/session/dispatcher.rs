use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::player::{Capabilities, InternalProps, LoopStatus, PlayerCommand, PlayerLink};
use crate::rpc::{Outbound, Request, codes, methods};
use crate::store::PropertyTree;

use super::with_capabilities;

/// Parameters of a Control request.
#[derive(Debug, Deserialize)]
struct ControlParams {
    command: String,
    #[serde(default)]
    params: ControlArgs,
}

/// Nested arguments of seek/setPosition control commands.
#[derive(Debug, Deserialize, Default)]
struct ControlArgs {
    offset: Option<f64>,
    position: Option<f64>,
}

/// Decodes inbound RPC requests into upstream player commands and builds the
/// response.
///
/// Each request maps to zero or one upstream command. No state transition is
/// asserted synchronously; the resulting status change arrives later through
/// the event channel.
pub(crate) struct Dispatcher;

impl Dispatcher {
    /// Handles one well-formed request, sending at most one upstream
    /// command, and returns the response to write back.
    pub(crate) fn dispatch(
        request: Request,
        capabilities: &Capabilities,
        store: &PropertyTree,
        internal: &InternalProps,
        link: &PlayerLink,
    ) -> Outbound {
        match request.method.as_str() {
            methods::GET_PROPERTIES => Self::get_properties(request.id, capabilities, store),
            methods::SET_PROPERTY => Self::set_property(request.id, request.params, link),
            methods::CONTROL => {
                Self::control(request.id, request.params, store, internal, link)
            }
            other => {
                warn!("Rejecting unknown method: {other}");
                Outbound::error(request.id, codes::METHOD_NOT_FOUND, "unknown method")
            }
        }
    }

    /// Capabilities merged with the complete current player state, no
    /// diffing involved.
    fn get_properties(id: Value, capabilities: &Capabilities, store: &PropertyTree) -> Outbound {
        Outbound::success(id, with_capabilities(capabilities, store.snapshot()))
    }

    fn set_property(id: Value, params: Option<Value>, link: &PlayerLink) -> Outbound {
        let result = Self::set_property_command(params.as_ref());

        match result {
            Ok(command) => Self::send_upstream(id, command, link, "SetProperty"),
            Err(message) => {
                error!("SetProperty failed: {message}");
                Outbound::error(id, codes::INVALID_PARAMS, message)
            }
        }
    }

    /// Exactly one property key is acted on per call, checked in fixed
    /// priority order: loopStatus, shuffle, volume, rate.
    fn set_property_command(params: Option<&Value>) -> Result<PlayerCommand, &'static str> {
        let params = params
            .and_then(Value::as_object)
            .ok_or("unsupported property")?;

        if let Some(loop_status) = params.get("loopStatus") {
            let requested = loop_status
                .as_str()
                .and_then(LoopStatus::from_wire)
                .ok_or("unsupported loopStatus parameter")?;

            return Ok(match requested {
                LoopStatus::None => PlayerCommand::SetRepeat {
                    value: false,
                    repeat_single: false,
                },
                LoopStatus::Track => PlayerCommand::SetRepeat {
                    value: true,
                    repeat_single: true,
                },
                LoopStatus::Playlist => PlayerCommand::SetRepeat {
                    value: true,
                    repeat_single: false,
                },
            });
        }

        if let Some(shuffle) = params.get("shuffle") {
            let value = shuffle.as_bool().ok_or("unsupported shuffle parameter")?;
            return Ok(PlayerCommand::SetRandom(value));
        }

        if let Some(volume) = params.get("volume") {
            let value = volume.as_i64().ok_or("unsupported volume parameter")?;
            return Ok(PlayerCommand::SetVolume(value));
        }

        // rate is recognized syntactically but the player has no rate
        // control; it always takes the unsupported-property reply.
        Err("unsupported property")
    }

    fn control(
        id: Value,
        params: Option<Value>,
        store: &PropertyTree,
        internal: &InternalProps,
        link: &PlayerLink,
    ) -> Outbound {
        let result = params
            .ok_or_else(|| "unsupported control command".to_string())
            .and_then(|value| {
                serde_json::from_value::<ControlParams>(value)
                    .map_err(|e| format!("malformed control params: {e}"))
            })
            .and_then(|control| Self::control_command(&control, store, internal));

        match result {
            Ok(command) => Self::send_upstream(id, command, link, "Control"),
            Err(message) => {
                error!("Control failed: {message}");
                Outbound::error(id, codes::INVALID_PARAMS, message)
            }
        }
    }

    fn control_command(
        control: &ControlParams,
        store: &PropertyTree,
        internal: &InternalProps,
    ) -> Result<PlayerCommand, String> {
        let playing = store.get(&["playbackStatus"]) == Some(&json!("playing"));

        match control.command.as_str() {
            "play" => Ok(PlayerCommand::Play),
            "pause" => {
                if playing {
                    Ok(Self::pause_command(internal))
                } else {
                    Err("unsupported control command".to_string())
                }
            }
            "playPause" => {
                if playing {
                    Ok(Self::pause_command(internal))
                } else {
                    Ok(PlayerCommand::Play)
                }
            }
            "stop" => Ok(PlayerCommand::Stop),
            "next" => Ok(PlayerCommand::Next),
            "previous" => Ok(PlayerCommand::Prev),
            "seek" => {
                let offset = control
                    .params
                    .offset
                    .ok_or_else(|| "malformed control params: missing offset".to_string())?;
                let current = store
                    .get(&["position"])
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0);
                let target = (current + offset).max(0.0);
                Ok(PlayerCommand::Seek(target))
            }
            "setPosition" => {
                let position = control
                    .params
                    .position
                    .ok_or_else(|| "malformed control params: missing position".to_string())?;
                Ok(PlayerCommand::Seek(position))
            }
            _ => Err("unsupported control command".to_string()),
        }
    }

    /// Radio streams have no pause, only stop/restart.
    fn pause_command(internal: &InternalProps) -> PlayerCommand {
        if internal.is_radio() {
            PlayerCommand::Stop
        } else {
            PlayerCommand::Pause
        }
    }

    fn send_upstream(
        id: Value,
        command: PlayerCommand,
        link: &PlayerLink,
        context: &str,
    ) -> Outbound {
        if link.send_command(command) {
            Outbound::success(id, json!("ok"))
        } else {
            error!("{context} failed: player unavailable");
            Outbound::error(id, codes::INVALID_PARAMS, "player unavailable")
        }
    }
}
