use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

use crate::player::{InternalProps, LoopStatus, PlaybackStatus, StateUpdate};
use crate::store::PropertyTree;

/// Shape check for absolute art URLs: scheme, host, optional port, path,
/// query, fragment. References that fail it get the configured base URL
/// prefixed.
static URL_SHAPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://([a-z\d]([a-z\d-]*[a-z\d])*)(\.[a-z\d]([a-z\d-]*[a-z\d])*)*(:\d+)?(/[-a-z\d%_.~+]*)*(\?[;&a-z\d%_.~+=-]*)?(#[-a-z\d_]*)?$",
    )
    .ok()
});

fn is_absolute_url(reference: &str) -> bool {
    URL_SHAPE.as_ref().is_some_and(|shape| shape.is_match(reference))
}

/// Result of applying one state-update event.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Translated {
    /// Delta of fields that changed, or `None` when the event changed
    /// nothing.
    pub changes: Option<Value>,

    /// Whether the event reported playing status, asking the session to arm
    /// its coalesced one-shot state re-query.
    pub arm_refresh: bool,
}

/// Translates inbound state-update events into store writes.
///
/// All mirrored state flows through the store; the translator never touches
/// the RPC side directly.
pub(crate) struct Translator {
    base_url: String,
}

impl Translator {
    pub(crate) fn new(base_url: String) -> Self {
        Self { base_url }
    }

    /// Applies one event to the mirrored state.
    ///
    /// Missing or unrecognized fields leave the corresponding store values
    /// unchanged, preserving last-known-good state. Always resets dirty
    /// flags after extracting the delta, so a repeated event yields an empty
    /// delta.
    pub(crate) fn apply(
        &self,
        event: &StateUpdate,
        store: &mut PropertyTree,
        internal: &mut InternalProps,
    ) -> Translated {
        let mut arm_refresh = false;

        if let Some(status) = event.status.as_deref()
            && let Some(mapped) = PlaybackStatus::from_event_status(status)
        {
            store.update(&["playbackStatus"], json!(mapped.as_str()));
            arm_refresh = mapped == PlaybackStatus::Playing;
        }

        if let Some(seek_ms) = event.seek {
            let seconds = (seek_ms / 1000.0 * 100.0).round() / 100.0;
            store.update(&["position"], json!(seconds));
        }

        store.update(&["shuffle"], json!(event.random.unwrap_or(false)));

        // Loop status is suppressed for radio streams; the service checked
        // here is the one from the previous event, updated below.
        if !internal.is_radio() {
            let loop_status = LoopStatus::from_repeat_flags(
                event.repeat.unwrap_or(false),
                event.repeat_single.unwrap_or(false),
            );
            store.update(&["loopStatus"], json!(loop_status.as_str()));
        }

        if let Some(volume) = event.volume {
            store.update(&["volume"], json!(volume));
        }

        internal.stream = event.stream.unwrap_or(false);
        if let Some(service) = &event.service {
            internal.service = service.clone();
        }

        if let Some(duration) = &event.duration {
            store.update(&["metadata", "duration"], duration.clone());
        }
        if let Some(artist) = &event.artist {
            store.update(&["metadata", "artist"], json!(artist));
        }
        if let Some(album) = &event.album {
            store.update(&["metadata", "album"], json!(album));
        }
        if let Some(title) = &event.title {
            store.update(&["metadata", "title"], json!(title));
        }
        if let Some(uri) = &event.uri {
            store.update(&["metadata", "trackId"], json!(uri));
        }
        if let Some(albumart) = &event.albumart {
            let art_url = self.complete_url(albumart);
            store.update(&["metadata", "artUrl"], json!(art_url));
        }

        let changes = store.diff();
        store.reset_dirty(false);

        Translated {
            changes,
            arm_refresh,
        }
    }

    /// Prefixes the base URL onto references that are not absolute URLs.
    fn complete_url(&self, reference: &str) -> String {
        if !is_absolute_url(reference) && !self.base_url.is_empty() {
            format!("{}{}", self.base_url, reference)
        } else {
            reference.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use crate::player::state_schema;

    use super::*;

    fn setup() -> (Translator, PropertyTree, InternalProps) {
        (
            Translator::new("http://host/art/".to_string()),
            PropertyTree::from_schema(&state_schema()),
            InternalProps::default(),
        )
    }

    fn full_event() -> StateUpdate {
        StateUpdate {
            status: Some("play".to_string()),
            seek: Some(12_345.0),
            random: Some(true),
            repeat: Some(true),
            repeat_single: Some(false),
            volume: Some(75),
            service: Some("mpd".to_string()),
            stream: Some(false),
            duration: Some(json!(240)),
            artist: Some("Band".to_string()),
            album: Some("Album".to_string()),
            title: Some("Song".to_string()),
            uri: Some("music/track.flac".to_string()),
            albumart: Some("cover.jpg".to_string()),
        }
    }

    #[test]
    fn maps_full_event_into_store() {
        let (translator, mut store, mut internal) = setup();

        let result = translator.apply(&full_event(), &mut store, &mut internal);

        let changes = result.changes.unwrap();
        assert_eq!(changes["playbackStatus"], json!("playing"));
        assert_eq!(changes["position"], json!(12.35));
        assert_eq!(changes["shuffle"], json!(true));
        assert_eq!(changes["loopStatus"], json!("playlist"));
        assert_eq!(changes["volume"], json!(75));
        assert_eq!(changes["metadata"]["title"], json!("Song"));
        assert_eq!(changes["metadata"]["trackId"], json!("music/track.flac"));
        assert!(result.arm_refresh);
        assert_eq!(internal.service, "mpd");
    }

    #[test]
    fn second_identical_event_yields_no_changes() {
        let (translator, mut store, mut internal) = setup();
        let event = full_event();

        translator.apply(&event, &mut store, &mut internal);
        let second = translator.apply(&event, &mut store, &mut internal);

        assert_eq!(second.changes, None);
        // Still reports playing, so the session may re-arm once the previous
        // timer fired.
        assert!(second.arm_refresh);
    }

    #[test]
    fn unrecognized_status_leaves_field_unchanged() {
        let (translator, mut store, mut internal) = setup();
        translator.apply(&full_event(), &mut store, &mut internal);

        let event = StateUpdate {
            status: Some("buffering".to_string()),
            ..full_event()
        };
        let result = translator.apply(&event, &mut store, &mut internal);

        assert_eq!(result.changes, None);
        assert!(!result.arm_refresh);
        assert_eq!(store.get(&["playbackStatus"]), Some(&json!("playing")));
    }

    #[test]
    fn pause_does_not_arm_refresh() {
        let (translator, mut store, mut internal) = setup();

        let event = StateUpdate {
            status: Some("pause".to_string()),
            ..StateUpdate::default()
        };
        let result = translator.apply(&event, &mut store, &mut internal);

        assert!(!result.arm_refresh);
        assert_eq!(store.get(&["playbackStatus"]), Some(&json!("paused")));
    }

    #[test]
    fn radio_service_suppresses_loop_status() {
        let (translator, mut store, mut internal) = setup();

        // First event switches the service to webradio.
        let radio = StateUpdate {
            service: Some("webradio".to_string()),
            ..StateUpdate::default()
        };
        translator.apply(&radio, &mut store, &mut internal);

        // Now repeat flags must not overwrite the mirrored loop status.
        let event = StateUpdate {
            repeat: Some(true),
            service: Some("webradio".to_string()),
            ..StateUpdate::default()
        };
        translator.apply(&event, &mut store, &mut internal);

        assert_eq!(store.get(&["loopStatus"]), Some(&json!("none")));
    }

    #[test]
    fn loop_suppression_uses_previous_service() {
        let (translator, mut store, mut internal) = setup();

        // The same event both switches to webradio and carries repeat flags:
        // the suppression check sees the previous (non-radio) service, so
        // the loop status is still derived this one time.
        let event = StateUpdate {
            repeat: Some(true),
            service: Some("webradio".to_string()),
            ..StateUpdate::default()
        };
        translator.apply(&event, &mut store, &mut internal);

        assert_eq!(store.get(&["loopStatus"]), Some(&json!("playlist")));
        assert!(internal.is_radio());
    }

    #[test]
    fn relative_art_reference_gets_base_url() {
        let (translator, mut store, mut internal) = setup();

        let event = StateUpdate {
            albumart: Some("cover.jpg".to_string()),
            ..StateUpdate::default()
        };
        translator.apply(&event, &mut store, &mut internal);

        assert_eq!(
            store.get(&["metadata", "artUrl"]),
            Some(&json!("http://host/art/cover.jpg"))
        );
    }

    #[test]
    fn absolute_art_reference_is_unchanged() {
        let (translator, mut store, mut internal) = setup();

        let event = StateUpdate {
            albumart: Some("https://cdn/x.jpg".to_string()),
            ..StateUpdate::default()
        };
        translator.apply(&event, &mut store, &mut internal);

        assert_eq!(
            store.get(&["metadata", "artUrl"]),
            Some(&json!("https://cdn/x.jpg"))
        );
    }

    #[test]
    fn empty_base_url_passes_relative_reference_through() {
        let translator = Translator::new(String::new());
        let mut store = PropertyTree::from_schema(&state_schema());
        let mut internal = InternalProps::default();

        let event = StateUpdate {
            albumart: Some("cover.jpg".to_string()),
            ..StateUpdate::default()
        };
        translator.apply(&event, &mut store, &mut internal);

        assert_eq!(store.get(&["metadata", "artUrl"]), Some(&json!("cover.jpg")));
    }

    #[test]
    fn seek_milliseconds_round_to_two_decimals() {
        let (translator, mut store, mut internal) = setup();

        let event = StateUpdate {
            seek: Some(1_234.0),
            ..StateUpdate::default()
        };
        translator.apply(&event, &mut store, &mut internal);

        assert_eq!(store.get(&["position"]), Some(&json!(1.23)));
    }

    #[test]
    fn duration_passes_through_as_is() {
        let (translator, mut store, mut internal) = setup();

        let event = StateUpdate {
            duration: Some(json!("03:45")),
            ..StateUpdate::default()
        };
        translator.apply(&event, &mut store, &mut internal);

        assert_eq!(store.get(&["metadata", "duration"]), Some(&json!("03:45")));
    }
}
