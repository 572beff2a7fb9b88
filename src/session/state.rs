use crate::media::{
    CaptureError,
    DeviceDescriptor,
    MediaStream,
    DESKTOP_DEVICE_ID,
};
use briefing_client_config::ClientConfig;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;

/// Status of one peer connection. Owned by the signaling layer, read-only
/// here; we only project it into the host status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub id: String,
    pub active: bool,
    pub initiator: bool,
    pub error: Option<String>,
    pub fingerprint: Option<String>,
}

/// UI element visibility, seeded from config and overridable per session
/// through URL query parameters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UiVisibility {
    pub show_invite_on_start: bool,
    pub show_invite_hint: bool,
    pub show_fullscreen: bool,
    pub show_settings: bool,
    pub show_share: bool,
    pub show_chat: bool,
}

/// The single shared record of the client session. Created at startup,
/// owned and mutated by the session worker for its whole lifetime, and
/// published to readers as a snapshot through a watch channel.
#[derive(Debug, Default, Clone)]
pub struct ProcessState {
    /// Id of the current room. `None` means no active session.
    pub room: Option<String>,
    /// The active local stream, owned by the media switching engine.
    pub stream: Option<MediaStream>,
    /// Peer connection states, keyed by peer id.
    pub status: BTreeMap<String, PeerInfo>,

    pub bandwidth: bool,
    pub fill: bool,

    /// Empty string means no background effect.
    pub background_mode: String,

    pub mute_video: bool,
    pub mute_audio: bool,

    /// Requested device ids. [`DESKTOP_DEVICE_ID`] as the video device
    /// requests screen capture instead of a camera.
    pub device_audio: Option<String>,
    pub device_video: Option<String>,

    /// Capture devices from the last enumeration.
    pub devices: Vec<DeviceDescriptor>,

    /// Id of the maximized peer tile, empty if none.
    pub maximized: String,

    /// Last media acquisition error, surfaced for inline UI feedback.
    pub error: Option<CaptureError>,

    pub upgrade: bool,
    pub request_bug_tracking: bool,
    pub embed_demo: bool,

    pub running: bool,

    pub ui: UiVisibility,
}

impl ProcessState {
    pub fn new(config: &ClientConfig, query: &str) -> Self {
        let flags = QueryFlags::parse(query);
        Self {
            fill: true,
            mute_video: !flags.get("video", true),
            mute_audio: !flags.get("audio", true),
            ui: UiVisibility {
                show_invite_on_start: flags.get("invite", config.show_invitation),
                show_invite_hint: flags.get("invite", config.show_invitation_hint),
                show_fullscreen: flags.get("fs", config.show_fullscreen),
                show_settings: flags.get("prefs", config.show_settings),
                show_share: flags.get("share", config.show_share),
                show_chat: flags.get("chat", config.show_chat),
            },
            ..Default::default()
        }
    }

    pub fn shows_desktop(&self) -> bool {
        self.device_video.as_deref() == Some(DESKTOP_DEVICE_ID)
    }
}

/// Boolean flags from the page's query string.
struct QueryFlags {
    pairs: Vec<(String, String)>,
}

impl QueryFlags {
    fn parse(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        Self {
            pairs: url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    fn get(&self, name: &str, fallback: bool) -> bool {
        let value = self.pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());
        is_true(value, fallback)
    }
}

fn is_true(value: Option<&str>, fallback: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if ["1", "true", "yes", "y", "on"].contains(&v.as_str()) => true,
        Some(v) if ["0", "false", "no", "n", "off"].contains(&v.as_str()) => false,
        _ => fallback,
    }
}
