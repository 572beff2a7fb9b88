use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            device_id: None,
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            device_id: None,
            width: 1280,
            height: 720,
            frame_rate: 30,
        }
    }
}

/// The combined request handed to `getUserMedia`. A `None` video side
/// means video is withheld from the request entirely, as happens once a
/// desktop capture stream has been acquired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaConstraints {
    pub audio: AudioConstraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoConstraints>,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: AudioConstraints::default(),
            video: Some(VideoConstraints::default()),
        }
    }
}

impl MediaConstraints {
    /// Engine defaults merged with the currently requested device ids.
    pub fn from_selection(device_audio: Option<&str>, device_video: Option<&str>) -> Self {
        let mut constraints = Self::default();
        if let Some(device_id) = device_audio {
            constraints.audio.device_id = Some(device_id.to_string());
        }
        if let Some(device_id) = device_video {
            if let Some(video) = constraints.video.as_mut() {
                video.device_id = Some(device_id.to_string());
            }
        }
        constraints
    }
}
