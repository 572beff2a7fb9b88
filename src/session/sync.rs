use super::inner::SessionInner;
use crate::{
    media::{
        MediaStream,
        TrackKind,
    },
    platform::{
        BackgroundTransform,
        ConnectionService,
        ErrorTracker,
        HostChannel,
        MediaDevices,
        PageContext,
    },
};

/// Set every track's enabled flag from the mute intent. Idempotent, and
/// safe on ended tracks.
fn apply_mute_intent(stream: &MediaStream, mute_audio: bool, mute_video: bool) -> eyre::Result<()> {
    for track in stream.try_tracks()? {
        let mute = match track.kind() {
            TrackKind::Audio => mute_audio,
            TrackKind::Video => mute_video,
        };
        track.set_enabled(!mute);
    }
    Ok(())
}

impl<C, M, T, H, E, P> SessionInner<C, M, T, H, E, P>
where
    C: ConnectionService,
    M: MediaDevices,
    T: BackgroundTransform,
    H: HostChannel,
    E: ErrorTracker,
    P: PageContext,
{
    /// Reconcile the live stream's tracks with the mute intent. A no-op
    /// without a stream; failures are reported to the error tracker and
    /// never interrupt the caller.
    pub(super) fn update_stream(&self) {
        let Some(stream) = &self.state.stream else {
            return;
        };
        if let Err(err) = apply_mute_intent(stream, self.state.mute_audio, self.state.mute_video) {
            error!("failed to update stream tracks: {err}");
            self.platform.bugs.track_exception(&err);
        }
    }
}
