use crate::media::MediaStream;
use derive_more::Display;

/// Inbound control messages for the session worker. This is the typed
/// replacement for the loosely named pub/sub events of the embedding
/// frontends (`switchMedia`, `updateStream`, `upgrade`, ...).
#[derive(Debug, Clone, Display)]
pub enum SessionMessage {
    SwitchMedia,
    UpdateStream,
    PostUpdate,
    RequestBugTracking,
    Upgrade,
    #[display("LocationChanged({_0})")]
    LocationChanged(String),
    #[display("SetMuteAudio({_0})")]
    SetMuteAudio(bool),
    #[display("SetMuteVideo({_0})")]
    SetMuteVideo(bool),
    #[display("SetDeviceAudio({_0:?})")]
    SetDeviceAudio(Option<String>),
    #[display("SetDeviceVideo({_0:?})")]
    SetDeviceVideo(Option<String>),
    #[display("SetBackgroundMode({_0})")]
    SetBackgroundMode(String),
    #[display("SetMaximized({_0})")]
    SetMaximized(String),
    Close,
}

/// Outbound notifications from the session worker.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The local stream changed; consumed by the signaling layer. Emitted
    /// exactly once per media switch, `None` when acquisition failed or
    /// the session ended.
    LocalStream(Option<MediaStream>),
}
