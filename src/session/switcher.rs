use super::{
    inner::SessionInner,
    messages::SessionEvent,
};
use crate::{
    media::{
        MediaConstraints,
        MediaStream,
    },
    platform::{
        BackgroundTransform,
        ConnectionService,
        ErrorTracker,
        HostChannel,
        MediaDevices,
        PageContext,
        TransformPipeline as _,
    },
};

/// One full pass through the acquisition sequence.
struct Acquisition {
    stream: Option<MediaStream>,
    /// The resulting stream is the desktop capture (with transplanted
    /// microphone audio).
    from_desktop: bool,
    /// A requested device turned out to be unavailable; its selection has
    /// already been reset.
    retry: bool,
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
    /// Replace the active local stream according to the current device
    /// and background intent. Acquisition failures are recorded on the
    /// state, never raised; the "local stream changed" notification goes
    /// out exactly once per invocation, retries included.
    #[instrument(level = "debug", skip(self))]
    pub(super) async fn switch_media(&mut self) {
        let mut acquisition = self.acquire_media().await;
        if acquisition.retry {
            // The first attempt's stream is superseded before it was ever
            // installed; release its capture devices right away.
            if let Some(stream) = &acquisition.stream {
                stream.stop_all_tracks();
            }
            // Exactly one retry: the failing device selection was cleared,
            // so this pass runs with default constraints and cannot ask
            // for the missing device again.
            debug!("retrying media acquisition with default devices");
            acquisition = self.acquire_media().await;
        }

        let mut next = acquisition.stream;

        let mode = self.state.background_mode.clone();
        let wants_transform = !mode.is_empty() && !acquisition.from_desktop;
        match next.clone() {
            Some(raw) if wants_transform => {
                // A fresh stream gets a fresh pipeline; the previous one
                // is torn down first so only a single pipeline ever
                // exists.
                self.stop_pipeline();
                match self.platform.transform.start(&mode, &raw).await {
                    Ok(pipeline) => {
                        let processed = pipeline.stream();
                        // The transform is video only and must not drop
                        // audio.
                        processed.set_audio_tracks(raw.audio_tracks());
                        self.pipeline = Some(pipeline);
                        next = Some(processed);
                    }
                    Err(err) => {
                        error!("failed to start background transform: {err}");
                        self.platform.bugs.track_silent_exception(&err);
                    }
                }
            }
            _ => self.stop_pipeline(),
        }

        // Release the superseded stream before installing its successor.
        if let Some(old) = self.state.stream.take() {
            let superseded = !next.as_ref().is_some_and(|n| n.same_stream(&old));
            if superseded {
                old.stop_all_tracks();
            }
        }

        self.state.stream = next;
        self.update_stream();
        self.publish();
        let _ = self.events_tx.send(SessionEvent::LocalStream(self.state.stream.clone()));
    }

    /// Steps 1-5 of a media switch: constraint build, desktop capture,
    /// user media request and device availability validation.
    async fn acquire_media(&mut self) -> Acquisition {
        let mut constraints =
            MediaConstraints::from_selection(self.state.device_audio.as_deref(), self.state.device_video.as_deref());

        let mut desktop_stream = None;
        if self.state.shows_desktop() {
            let outcome = self.platform.media.get_display_media().await;
            if let Some(stream) = outcome.stream {
                desktop_stream = Some(stream);
                // Desktop capture and camera capture are mutually
                // exclusive within one acquisition.
                constraints.video = None;
            }
        }

        let media = self.platform.media.get_user_media(Some(constraints.clone())).await;
        self.state.error = media.error;

        let Some(mut stream) = media.stream else {
            if let Some(error) = &self.state.error {
                error!("media error: {error}");
            }
            // A desktop capture acquired just before must not stay lit.
            if let Some(desktop) = desktop_stream {
                desktop.stop_all_tracks();
            }
            return Acquisition {
                stream: None,
                from_desktop: false,
                retry: false,
            };
        };

        debug!(?constraints, "acquired local stream");

        let mut retry = false;

        let audio_tracks = stream.audio_tracks();
        if self.state.device_audio.is_some() && audio_tracks.is_empty() {
            // The requested microphone is gone; fall back to the default.
            self.state.device_audio = None;
            retry = true;
        }

        let from_desktop = if let Some(desktop) = desktop_stream {
            // Desktop capture has no usable microphone audio; transplant
            // the one we just acquired.
            desktop.set_audio_tracks(audio_tracks);
            stream = desktop;
            true
        } else {
            false
        };

        if self.state.device_video.is_some() && stream.video_tracks().is_empty() {
            self.state.device_video = None;
            retry = true;
        }

        Acquisition {
            stream: Some(stream),
            from_desktop,
            retry,
        }
    }

    pub(super) fn stop_pipeline(&mut self) {
        if let Some(pipeline) = self.pipeline.take() {
            debug!("stopping background transform");
            pipeline.stop();
        }
    }
}
