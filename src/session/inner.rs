use super::{
    messages::{
        SessionEvent,
        SessionMessage,
    },
    reporter::StatusReporter,
    room,
    state::ProcessState,
};
use crate::platform::{
    BackgroundTransform,
    ConnectionHandle as _,
    ConnectionService,
    ErrorTracker,
    HostChannel,
    MediaDevices,
    PageContext,
    Platform,
};
use briefing_client_config::ClientConfig;
use eyre::Result;
use std::{
    ops::ControlFlow,
    time::Duration,
};
use tokio::sync::{
    mpsc::UnboundedReceiver,
    mpsc::UnboundedSender,
    watch,
};

const UNSUPPORTED_BROWSER_MESSAGE: &str = "Your browser does not support the required WebRTC technologies.\n\n\
     Please reconnect using an up to date web browser.\n\n\
     Thanks for your understanding.";

/// Async session "worker" that owns the process state. All mutations go
/// through this one task; readers get snapshots via the watch channel.
/// It mirrors the split between the public [`super::Session`] handle and
/// this message-driven inner half.
pub(crate) struct SessionInner<C, M, T, H, E, P>
where
    C: ConnectionService,
    T: BackgroundTransform,
{
    pub(super) config: ClientConfig,
    pub(super) platform: Platform<C, M, T, H, E, P>,
    pub(super) state: ProcessState,
    state_tx: watch::Sender<ProcessState>,
    pub(super) events_tx: UnboundedSender<SessionEvent>,
    reporter: StatusReporter,
    pub(super) pipeline: Option<T::Pipeline>,
    connection: Option<C::Handle>,
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
    pub(super) fn new(
        config: ClientConfig,
        platform: Platform<C, M, T, H, E, P>,
        state: ProcessState,
        state_tx: watch::Sender<ProcessState>,
        events_tx: UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            config,
            platform,
            state,
            state_tx,
            events_tx,
            reporter: StatusReporter::default(),
            pipeline: None,
            connection: None,
        }
    }

    #[instrument(level = "debug", skip_all)]
    pub(super) async fn run(mut self, mut receiver: UnboundedReceiver<SessionMessage>) -> Result<()> {
        if !self.bootstrap().await? {
            return Ok(());
        }

        loop {
            let Some(message) = receiver.recv().await else {
                break;
            };

            let mut flow = self.handle_message(message).await;

            // Coalesce bursts of mutation: drain whatever is already
            // queued before reporting once.
            while flow.is_continue() {
                match receiver.try_recv() {
                    Ok(message) => flow = self.handle_message(message).await,
                    Err(_) => break,
                }
            }

            self.post_update();

            if flow.is_break() {
                break;
            }
        }

        self.shutdown();
        Ok(())
    }

    /// First-time setup: resolve the room, establish the connection and
    /// acquire an initial stream with default constraints. Returns false
    /// when the environment is unsupported and the user was redirected.
    async fn bootstrap(&mut self) -> Result<bool> {
        debug!("setup session state");
        self.state.running = true;

        let path = self.platform.page.pathname();
        self.resolve_room_from_location(&path);

        match self.platform.connection.setup(&self.state).await {
            Ok(Some(connection)) => self.connection = Some(connection),
            Ok(None) => {
                self.platform.page.alert(UNSUPPORTED_BROWSER_MESSAGE);
                self.platform.page.navigate(&self.config.entry_path);
                self.state.running = false;
                self.publish();
                return Ok(false);
            }
            Err(err) => {
                // The rest of the setup is pointless without signaling;
                // abort before touching any capture device.
                error!("failed to set up connection: {err}");
                self.platform.bugs.track_exception(&err);
                self.state.running = false;
                self.publish();
                return Ok(false);
            }
        }

        let media = self.platform.media.get_user_media(None).await;
        self.state.error = media.error;
        if let Some(stream) = media.stream {
            // Device enumeration only reliably yields labels right after a
            // successful capture grant (Safari), so do it immediately.
            self.state.devices = self
                .platform
                .media
                .get_devices()
                .await
                .into_iter()
                .map(|mut device| {
                    debug!(?device, "found device");
                    if device.label.is_empty() {
                        device.label = "Unknown name".to_string();
                    }
                    device
                })
                .collect();
            self.state.stream = Some(stream);
        } else if let Some(error) = &self.state.error {
            error!("media error: {error}");
        }

        self.update_stream();
        self.publish();
        let _ = self.events_tx.send(SessionEvent::LocalStream(self.state.stream.clone()));
        self.post_update();

        // Development nicety: a preset background mode kicks off a full
        // media switch shortly after startup.
        if !self.config.production && !self.state.background_mode.is_empty() {
            tokio::time::sleep(Duration::from_millis(250)).await;
            self.switch_media().await;
            self.post_update();
        }

        Ok(true)
    }

    async fn handle_message(&mut self, message: SessionMessage) -> ControlFlow<()> {
        debug!("got message: {message}");

        match message {
            SessionMessage::SwitchMedia => self.switch_media().await,
            SessionMessage::UpdateStream => self.update_stream(),
            // Reporting happens after the message burst is drained.
            SessionMessage::PostUpdate => {}
            SessionMessage::RequestBugTracking => self.state.request_bug_tracking = true,
            SessionMessage::Upgrade => self.state.upgrade = true,
            SessionMessage::LocationChanged(path) => self.resolve_room_from_location(&path),
            SessionMessage::SetMuteAudio(mute) => {
                self.state.mute_audio = mute;
                self.update_stream();
            }
            SessionMessage::SetMuteVideo(mute) => {
                self.state.mute_video = mute;
                self.update_stream();
            }
            SessionMessage::SetDeviceAudio(device) => {
                self.state.device_audio = device;
                self.switch_media().await;
            }
            SessionMessage::SetDeviceVideo(device) => {
                self.state.device_video = device;
                self.switch_media().await;
            }
            SessionMessage::SetBackgroundMode(mode) => {
                self.state.background_mode = mode;
                self.switch_media().await;
            }
            SessionMessage::SetMaximized(id) => self.state.maximized = id,
            SessionMessage::Close => return ControlFlow::Break(()),
        }

        self.publish();
        ControlFlow::Continue(())
    }

    /// Re-resolve the room from the given path, fixing the visible
    /// address where normalization changed it. Also runs on back/forward
    /// navigation.
    fn resolve_room_from_location(&mut self, path: &str) {
        let resolution = room::resolve_room(path, &self.config);
        if let Some(rewrite) = &resolution.rewrite {
            self.platform.page.push_state(rewrite);
        }
        self.state.room = resolution.room;
        self.state.embed_demo = resolution.embed_demo;
        info!(room = ?self.state.room, embed_demo = self.state.embed_demo, "resolved room");
    }

    pub(super) fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }

    pub(super) fn post_update(&mut self) {
        self.reporter
            .post_update(&self.state, &self.platform.host, &self.platform.bugs);
    }

    fn shutdown(&mut self) {
        debug!("closing session");

        if let Some(stream) = self.state.stream.take() {
            stream.stop_all_tracks();
        }
        self.stop_pipeline();
        let _ = self.events_tx.send(SessionEvent::LocalStream(None));

        if let Some(connection) = self.connection.take() {
            connection.cleanup();
        }

        self.state.running = false;
        self.publish();

        info!("session closed");
    }
}
