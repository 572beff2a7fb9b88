use crate::platform::{
    BackgroundTransform,
    ConnectionService,
    ErrorTracker,
    HostChannel,
    MediaDevices,
    PageContext,
    Platform,
};
use briefing_client_config::ClientConfig;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{
        unbounded_channel,
        UnboundedReceiver,
        UnboundedSender,
    },
    watch,
};
use tokio_util::sync::{
    CancellationToken,
    DropGuard,
};

pub(crate) mod inner;
mod messages;
mod reporter;
mod room;
mod state;
mod switcher;
mod sync;

use inner::SessionInner;
pub use messages::{
    SessionEvent,
    SessionMessage,
};
pub use reporter::{
    object_snapshot,
    HostMessage,
    PeerSummary,
    StatusUpdate,
};
pub use room::{
    normalize_room_name,
    resolve_room,
    RoomResolution,
    DEMO_ROOM,
};
pub use state::{
    PeerInfo,
    ProcessState,
    UiVisibility,
};

/// Handle to a running client session. Spawns a worker task that owns the
/// process state; dropping the handle cancels the worker.
#[derive(Debug, Clone)]
pub struct Session {
    pub created: chrono::DateTime<chrono::Utc>,
    pub state: watch::Receiver<ProcessState>,
    sender: UnboundedSender<SessionMessage>,
    _session_task_guard: Arc<DropGuard>,
}

impl Session {
    /// Start a session against the given platform bindings. Also returns
    /// the event stream carrying "local stream changed" notifications for
    /// the signaling layer.
    pub fn spawn<C, M, T, H, E, P>(
        config: ClientConfig,
        platform: Platform<C, M, T, H, E, P>,
    ) -> (Self, UnboundedReceiver<SessionEvent>)
    where
        C: ConnectionService,
        M: MediaDevices,
        T: BackgroundTransform,
        H: HostChannel,
        E: ErrorTracker,
        P: PageContext,
    {
        let (sender_tx, receiver_tx) = unbounded_channel::<SessionMessage>();
        let (events_tx, events_rx) = unbounded_channel::<SessionEvent>();

        let query = platform.page.query();
        let state = ProcessState::new(&config, &query);
        let (state_tx, state_rx) = watch::channel(state.clone());

        let task_cancellation_token = CancellationToken::new();
        let task_cancellation_guard = task_cancellation_token.clone().drop_guard();

        let worker = SessionInner::new(config, platform, state, state_tx, events_tx);

        tokio::task::spawn(async move {
            tokio::select! {
                biased;
                _ = task_cancellation_token.cancelled() => {},

                result = worker.run(receiver_tx) => {
                    if let Err(err) = result {
                        error!("session worker failed: {err}");
                    }
                }
            };

            debug!("session task stopped");
        });

        (
            Self {
                created: Utc::now(),
                state: state_rx,
                sender: sender_tx,
                _session_task_guard: Arc::new(task_cancellation_guard),
            },
            events_rx,
        )
    }

    pub fn send_message(&self, message: SessionMessage) {
        if self.sender.send(message).is_err() {
            error!("was not able to send message, session already closed");
        }
    }

    /// Re-acquire the local stream for the current device and background
    /// intent.
    pub fn switch_media(&self) {
        self.send_message(SessionMessage::SwitchMedia);
    }

    /// Re-apply the mute intent to the current stream.
    pub fn update_stream(&self) {
        self.send_message(SessionMessage::UpdateStream);
    }

    /// Push a status snapshot to the embedding host (deduplicated).
    pub fn post_update_to_parent(&self) {
        self.send_message(SessionMessage::PostUpdate);
    }

    pub fn set_mute_audio(&self, mute: bool) {
        self.send_message(SessionMessage::SetMuteAudio(mute));
    }

    pub fn set_mute_video(&self, mute: bool) {
        self.send_message(SessionMessage::SetMuteVideo(mute));
    }

    pub fn set_device_audio(&self, device: Option<String>) {
        self.send_message(SessionMessage::SetDeviceAudio(device));
    }

    pub fn set_device_video(&self, device: Option<String>) {
        self.send_message(SessionMessage::SetDeviceVideo(device));
    }

    pub fn set_background_mode(&self, mode: impl Into<String>) {
        self.send_message(SessionMessage::SetBackgroundMode(mode.into()));
    }

    pub fn set_maximized(&self, id: impl Into<String>) {
        self.send_message(SessionMessage::SetMaximized(id.into()));
    }

    /// The visible address changed, e.g. through back/forward navigation.
    pub fn location_changed(&self, path: impl Into<String>) {
        self.send_message(SessionMessage::LocationChanged(path.into()));
    }

    pub fn request_bug_tracking(&self) {
        self.send_message(SessionMessage::RequestBugTracking);
    }

    pub fn upgrade(&self) {
        self.send_message(SessionMessage::Upgrade);
    }

    /// Close the session and wait until the worker released the stream,
    /// the background pipeline and the connection.
    pub async fn close(mut self) {
        if !self.state.borrow().running {
            debug!("session already closed");
            return;
        }
        if self.sender.send(SessionMessage::Close).is_ok() {
            if let Err(err) = self.state.wait_for(|state| !state.running).await {
                error!("failed to wait for session to close: {err}");
            }
        } else {
            error!("was not able to send the close message");
        }
    }
}
