mod constraints;
mod error;
mod stream;

pub use constraints::{
    AudioConstraints,
    MediaConstraints,
    VideoConstraints,
};
pub use error::{
    CaptureError,
    CaptureOutcome,
};
pub use stream::{
    MediaStream,
    MediaTrack,
    TrackKind,
};

use serde::{
    Deserialize,
    Serialize,
};

/// Sentinel device id that requests screen capture instead of a camera.
pub const DESKTOP_DEVICE_ID: &str = "desktop";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    AudioInput,
    AudioOutput,
    VideoInput,
    #[default]
    #[strum(to_string = "?")]
    #[serde(rename = "?")]
    Unknown,
}

/// One enumerated capture device as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub kind: DeviceKind,
    pub device_id: String,
    pub label: String,
}
