use super::MediaStream;
use derive_more::Display;
use serde::{
    Deserialize,
    Serialize,
};

/// Why a capture request produced no (or an incomplete) stream. Recorded
/// on the process state for UI feedback, never raised past the engine.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "name", content = "message")]
pub enum CaptureError {
    #[display("Permission to use the capture device was denied")]
    NotAllowed,
    #[display("No matching capture device was found")]
    NotFound,
    #[display("{_0}")]
    Other(String),
}

/// Outcome of a capture primitive. Acquisition failures are data, not
/// errors: the stream side is simply absent.
#[derive(Debug, Clone, Default)]
pub struct CaptureOutcome {
    pub stream: Option<MediaStream>,
    pub error: Option<CaptureError>,
}

impl CaptureOutcome {
    pub fn stream(stream: MediaStream) -> Self {
        Self {
            stream: Some(stream),
            error: None,
        }
    }

    pub fn error(error: CaptureError) -> Self {
        Self {
            stream: None,
            error: Some(error),
        }
    }
}
