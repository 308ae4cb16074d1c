use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Service identifier of the radio-stream kind.
///
/// Radio streams have no seek or loop semantics, which alters both the loop
/// status translation and the pause handling.
pub const RADIO_SERVICE: &str = "webradio";

/// Current playback state of the mirrored player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Player is stopped.
    Stopped,

    /// Player is currently playing.
    Playing,

    /// Player is paused.
    Paused,
}

impl PlaybackStatus {
    /// Maps an inbound event status string.
    ///
    /// Unrecognized values yield `None`; the caller leaves the mirrored
    /// field unchanged rather than defaulting.
    pub fn from_event_status(status: &str) -> Option<Self> {
        match status {
            "play" => Some(Self::Playing),
            "pause" => Some(Self::Paused),
            "stop" => Some(Self::Stopped),
            _ => None,
        }
    }

    /// Wire representation on the RPC side.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

/// Loop mode of the mirrored player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// No looping.
    None,

    /// Loop current track.
    Track,

    /// Loop entire playlist.
    Playlist,
}

impl LoopStatus {
    /// Parses the RPC-side representation, as carried by SetProperty.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "track" => Some(Self::Track),
            "playlist" => Some(Self::Playlist),
            _ => None,
        }
    }

    /// Derives the loop mode from the player's repeat flags.
    ///
    /// Repeat-single takes priority over plain repeat.
    pub fn from_repeat_flags(repeat: bool, repeat_single: bool) -> Self {
        if repeat_single {
            Self::Track
        } else if repeat {
            Self::Playlist
        } else {
            Self::None
        }
    }

    /// Wire representation on the RPC side.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Track => "track",
            Self::Playlist => "playlist",
        }
    }
}

/// Static per-session capability flags.
///
/// Constant for the lifetime of a session and merged verbatim into every
/// full-state response and properties notification.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Can skip to the next track.
    pub can_go_next: bool,

    /// Can go back to the previous track.
    pub can_go_previous: bool,

    /// Can start playback.
    pub can_play: bool,

    /// Can pause playback.
    pub can_pause: bool,

    /// Can seek within tracks.
    pub can_seek: bool,

    /// Can be controlled at all.
    pub can_control: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            can_go_next: true,
            can_go_previous: true,
            can_play: true,
            can_pause: true,
            can_seek: true,
            can_control: true,
        }
    }
}

/// Player-internal properties mirrored from events.
///
/// Used only to alter translation and control logic; never exposed on the
/// RPC side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InternalProps {
    /// Identifier of the active source/provider.
    pub service: String,

    /// Whether the active source is a stream.
    pub stream: bool,
}

impl InternalProps {
    /// Whether the active service is the radio-stream kind.
    pub fn is_radio(&self) -> bool {
        self.service == RADIO_SERVICE
    }
}

/// One inbound state-update event from the player.
///
/// The player pushes its full state; every field is optional so a sparse or
/// malformed event degrades to "leave the mirrored value unchanged" instead
/// of failing.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StateUpdate {
    /// Raw playback status (play|pause|stop|other).
    pub status: Option<String>,

    /// Playback position in milliseconds.
    pub seek: Option<f64>,

    /// Shuffle flag.
    pub random: Option<bool>,

    /// Repeat flag.
    pub repeat: Option<bool>,

    /// Repeat-single-track flag.
    pub repeat_single: Option<bool>,

    /// Volume, 0-100.
    pub volume: Option<i64>,

    /// Active source/provider identifier.
    pub service: Option<String>,

    /// Whether the source is a stream.
    pub stream: Option<bool>,

    /// Track duration, passed through to metadata as-is.
    pub duration: Option<Value>,

    /// Track artist.
    pub artist: Option<String>,

    /// Album name.
    pub album: Option<String>,

    /// Track title.
    pub title: Option<String>,

    /// Track URI, exposed as the track id.
    pub uri: Option<String>,

    /// Album art reference, absolute URL or relative path.
    pub albumart: Option<String>,
}

/// Schema of the mirrored player state with its per-session defaults.
///
/// Defaults: stopped / none / no shuffle / volume 100 / position 0 / empty
/// metadata.
pub fn state_schema() -> Value {
    json!({
        "playbackStatus": PlaybackStatus::Stopped.as_str(),
        "loopStatus": LoopStatus::None.as_str(),
        "shuffle": false,
        "volume": 100,
        "position": 0,
        "metadata": {
            "title": "",
            "artist": "",
            "album": "",
            "artUrl": "",
            "duration": "",
            "trackId": ""
        }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn unrecognized_status_maps_to_none() {
        assert_eq!(PlaybackStatus::from_event_status("play"), Some(PlaybackStatus::Playing));
        assert_eq!(PlaybackStatus::from_event_status("buffering"), None);
    }

    #[test]
    fn repeat_single_takes_priority() {
        assert_eq!(LoopStatus::from_repeat_flags(true, true), LoopStatus::Track);
        assert_eq!(LoopStatus::from_repeat_flags(false, true), LoopStatus::Track);
        assert_eq!(LoopStatus::from_repeat_flags(true, false), LoopStatus::Playlist);
        assert_eq!(LoopStatus::from_repeat_flags(false, false), LoopStatus::None);
    }

    #[test]
    fn capabilities_serialize_camel_case() {
        let value = serde_json::to_value(Capabilities::default()).unwrap();

        assert_eq!(
            value,
            json!({
                "canGoNext": true,
                "canGoPrevious": true,
                "canPlay": true,
                "canPause": true,
                "canSeek": true,
                "canControl": true
            })
        );
    }

    #[test]
    fn sparse_event_deserializes() {
        let event: StateUpdate =
            serde_json::from_str(r#"{"status":"play","seek":1234,"repeatSingle":true}"#).unwrap();

        assert_eq!(event.status.as_deref(), Some("play"));
        assert_eq!(event.seek, Some(1234.0));
        assert_eq!(event.repeat_single, Some(true));
        assert_eq!(event.volume, None);
    }
}
