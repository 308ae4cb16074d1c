use serde_json::{Value, json};

/// A fire-and-forget control instruction for the upstream player.
///
/// No acknowledgement is expected at this layer; the resulting state change
/// arrives later as a state-update event.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// Start playback.
    Play,

    /// Pause playback.
    Pause,

    /// Stop playback.
    Stop,

    /// Skip to the next track.
    Next,

    /// Go back to the previous track.
    Prev,

    /// Seek to an absolute position, in seconds.
    Seek(f64),

    /// Set the repeat flags.
    SetRepeat {
        /// Plain repeat flag.
        value: bool,
        /// Repeat-single-track flag.
        repeat_single: bool,
    },

    /// Set the shuffle flag.
    SetRandom(bool),

    /// Set the volume, 0-100.
    SetVolume(i64),

    /// Re-query the full player state.
    GetState,
}

impl PlayerCommand {
    /// Encodes the command as the upstream wire pair: command name plus
    /// optional single parameter.
    pub fn encode(&self) -> (&'static str, Option<Value>) {
        match self {
            Self::Play => ("play", None),
            Self::Pause => ("pause", None),
            Self::Stop => ("stop", None),
            Self::Next => ("next", None),
            Self::Prev => ("prev", None),
            Self::Seek(position) => ("seek", Some(json!(position))),
            Self::SetRepeat {
                value,
                repeat_single,
            } => (
                "setRepeat",
                Some(json!({ "value": value, "repeatSingle": repeat_single })),
            ),
            Self::SetRandom(value) => ("setRandom", Some(json!({ "value": value }))),
            Self::SetVolume(volume) => ("volume", Some(json!(volume))),
            Self::GetState => ("getState", None),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn encodes_bare_commands_without_param() {
        assert_eq!(PlayerCommand::Play.encode(), ("play", None));
        assert_eq!(PlayerCommand::Prev.encode(), ("prev", None));
        assert_eq!(PlayerCommand::GetState.encode(), ("getState", None));
    }

    #[test]
    fn encodes_repeat_with_both_flags() {
        let (name, param) = PlayerCommand::SetRepeat {
            value: true,
            repeat_single: false,
        }
        .encode();

        assert_eq!(name, "setRepeat");
        assert_eq!(param, Some(json!({ "value": true, "repeatSingle": false })));
    }

    #[test]
    fn encodes_seek_as_bare_number() {
        assert_eq!(PlayerCommand::Seek(12.5).encode(), ("seek", Some(json!(12.5))));
        assert_eq!(PlayerCommand::SetVolume(80).encode(), ("volume", Some(json!(80))));
    }
}
