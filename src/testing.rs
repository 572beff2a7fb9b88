//! Scripted collaborator fakes shared by the unit tests.

use crate::{
    media::{
        CaptureError,
        CaptureOutcome,
        DeviceDescriptor,
        DeviceKind,
        MediaConstraints,
        MediaStream,
        MediaTrack,
        TrackKind,
        DESKTOP_DEVICE_ID,
    },
    platform::{
        BackgroundTransform,
        ConnectionHandle,
        ConnectionService,
        ErrorTracker,
        HostChannel,
        MediaDevices,
        PageContext,
        Platform,
    },
    session::{
        HostMessage,
        ProcessState,
        StatusUpdate,
    },
};
use eyre::bail;
use std::sync::{
    atomic::{
        AtomicUsize,
        Ordering,
    },
    Arc,
    Mutex,
};

pub(crate) type TestPlatform =
    Platform<StubConnection, ScriptedMediaDevices, CountingTransform, RecordingHost, RecordingTracker, FakePage>;

pub(crate) type TestSessionInner = crate::session::inner::SessionInner<
    StubConnection,
    ScriptedMediaDevices,
    CountingTransform,
    RecordingHost,
    RecordingTracker,
    FakePage,
>;

pub(crate) fn test_platform() -> TestPlatform {
    Platform {
        connection: StubConnection::default(),
        media: ScriptedMediaDevices::default(),
        transform: CountingTransform::default(),
        host: RecordingHost::default(),
        bugs: RecordingTracker::default(),
        page: FakePage::default(),
    }
}

/// Capture primitives with a configurable set of available devices. The
/// default device always exists unless switched off; specifically
/// requested devices exist only when listed.
#[derive(Debug, Clone)]
pub(crate) struct ScriptedMediaDevices {
    pub microphones: Vec<String>,
    pub cameras: Vec<String>,
    pub default_microphone: bool,
    pub default_camera: bool,
    pub desktop_available: bool,
    pub deny_user_media: bool,
    pub user_media_calls: Arc<AtomicUsize>,
    pub display_media_calls: Arc<AtomicUsize>,
    /// Every stream ever returned, in acquisition order.
    pub handed_out: Arc<Mutex<Vec<MediaStream>>>,
    next_track: Arc<AtomicUsize>,
}

impl Default for ScriptedMediaDevices {
    fn default() -> Self {
        Self {
            microphones: Vec::new(),
            cameras: Vec::new(),
            default_microphone: true,
            default_camera: true,
            desktop_available: false,
            deny_user_media: false,
            user_media_calls: Default::default(),
            display_media_calls: Default::default(),
            handed_out: Default::default(),
            next_track: Default::default(),
        }
    }
}

impl ScriptedMediaDevices {
    fn track(&self, kind: TrackKind, label: &str, device_id: &str) -> MediaTrack {
        let id = format!("track-{}", self.next_track.fetch_add(1, Ordering::SeqCst));
        MediaTrack::from_device(kind, id, label, device_id)
    }

    fn hand_out(&self, stream: MediaStream) -> CaptureOutcome {
        self.handed_out.lock().unwrap().push(stream.clone());
        CaptureOutcome::stream(stream)
    }

    fn audio_track_for(&self, requested: Option<&str>) -> Option<MediaTrack> {
        match requested {
            Some(id) if self.microphones.iter().any(|m| m == id) => {
                Some(self.track(TrackKind::Audio, "Mock Microphone", id))
            }
            Some(_) => None,
            None if self.default_microphone => Some(self.track(TrackKind::Audio, "Mock Microphone", "default-audio")),
            None => None,
        }
    }

    fn video_track_for(&self, requested: Option<&str>) -> Option<MediaTrack> {
        match requested {
            Some(id) if self.cameras.iter().any(|c| c == id) => Some(self.track(TrackKind::Video, "Mock Camera", id)),
            Some(_) => None,
            None if self.default_camera => Some(self.track(TrackKind::Video, "Mock Camera", "default-video")),
            None => None,
        }
    }
}

impl MediaDevices for ScriptedMediaDevices {
    async fn get_user_media(&self, constraints: Option<MediaConstraints>) -> CaptureOutcome {
        self.user_media_calls.fetch_add(1, Ordering::SeqCst);

        if self.deny_user_media {
            return CaptureOutcome::error(CaptureError::NotAllowed);
        }

        let constraints = constraints.unwrap_or_default();
        let mut tracks = Vec::new();
        if let Some(track) = self.audio_track_for(constraints.audio.device_id.as_deref()) {
            tracks.push(track);
        }
        if let Some(video) = &constraints.video {
            if let Some(track) = self.video_track_for(video.device_id.as_deref()) {
                tracks.push(track);
            }
        }

        self.hand_out(MediaStream::new(tracks))
    }

    async fn get_display_media(&self) -> CaptureOutcome {
        self.display_media_calls.fetch_add(1, Ordering::SeqCst);

        if self.desktop_available {
            let track = self.track(TrackKind::Video, "Screen", DESKTOP_DEVICE_ID);
            self.hand_out(MediaStream::new(vec![track]))
        } else {
            CaptureOutcome::error(CaptureError::NotAllowed)
        }
    }

    async fn get_devices(&self) -> Vec<DeviceDescriptor> {
        vec![
            DeviceDescriptor {
                kind: DeviceKind::AudioInput,
                device_id: "default-audio".to_string(),
                label: "Mock Microphone".to_string(),
            },
            DeviceDescriptor {
                kind: DeviceKind::VideoInput,
                device_id: "default-video".to_string(),
                label: "Mock Camera".to_string(),
            },
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CountingTransform {
    pub started: Arc<AtomicUsize>,
    pub stopped: Arc<AtomicUsize>,
    pub fail_start: bool,
}

#[derive(Debug)]
pub(crate) struct CountingPipeline {
    stream: MediaStream,
    stopped: Arc<AtomicUsize>,
}

impl crate::platform::TransformPipeline for CountingPipeline {
    fn stream(&self) -> MediaStream {
        self.stream.clone()
    }

    fn stop(self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

impl BackgroundTransform for CountingTransform {
    type Pipeline = CountingPipeline;

    async fn start(&self, mode: &str, _stream: &MediaStream) -> eyre::Result<CountingPipeline> {
        if self.fail_start {
            bail!("transform {mode} unavailable");
        }
        self.started.fetch_add(1, Ordering::SeqCst);
        Ok(CountingPipeline {
            stream: MediaStream::new(vec![MediaTrack::new(TrackKind::Video, "processed", "Processed")]),
            stopped: self.stopped.clone(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StubConnection {
    pub unsupported: bool,
    pub fail: bool,
    pub cleaned: Arc<AtomicUsize>,
}

#[derive(Debug)]
pub(crate) struct StubConnectionHandle {
    cleaned: Arc<AtomicUsize>,
}

impl ConnectionHandle for StubConnectionHandle {
    fn cleanup(self) {
        self.cleaned.fetch_add(1, Ordering::SeqCst);
    }
}

impl ConnectionService for StubConnection {
    type Handle = StubConnectionHandle;

    async fn setup(&self, _state: &ProcessState) -> eyre::Result<Option<StubConnectionHandle>> {
        if self.fail {
            bail!("signaling setup failed");
        }
        if self.unsupported {
            return Ok(None);
        }
        Ok(Some(StubConnectionHandle {
            cleaned: self.cleaned.clone(),
        }))
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingHost {
    pub messages: Arc<Mutex<Vec<HostMessage>>>,
}

impl RecordingHost {
    pub fn statuses(&self) -> Vec<StatusUpdate> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|HostMessage::Status(update)| update.clone())
            .collect()
    }
}

impl HostChannel for RecordingHost {
    fn post_message(&self, message: HostMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingTracker {
    pub exceptions: Arc<Mutex<Vec<String>>>,
    pub silent_exceptions: Arc<Mutex<Vec<String>>>,
}

impl ErrorTracker for RecordingTracker {
    fn track_exception(&self, error: &eyre::Report) {
        self.exceptions.lock().unwrap().push(error.to_string());
    }

    fn track_silent_exception(&self, error: &eyre::Report) {
        self.silent_exceptions.lock().unwrap().push(error.to_string());
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakePage {
    path: Arc<Mutex<String>>,
    query_string: Arc<Mutex<String>>,
    pub pushed_states: Arc<Mutex<Vec<String>>>,
    pub navigated: Arc<Mutex<Vec<String>>>,
    pub alert_messages: Arc<Mutex<Vec<String>>>,
}

impl Default for FakePage {
    fn default() -> Self {
        Self {
            path: Arc::new(Mutex::new("/".to_string())),
            query_string: Default::default(),
            pushed_states: Default::default(),
            navigated: Default::default(),
            alert_messages: Default::default(),
        }
    }
}

impl FakePage {
    pub fn set_path(&self, path: &str) {
        *self.path.lock().unwrap() = path.to_string();
    }

    pub fn pushed(&self) -> Vec<String> {
        self.pushed_states.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigated.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alert_messages.lock().unwrap().clone()
    }
}

impl PageContext for FakePage {
    fn pathname(&self) -> String {
        self.path.lock().unwrap().clone()
    }

    fn query(&self) -> String {
        self.query_string.lock().unwrap().clone()
    }

    fn push_state(&self, path: &str) {
        self.pushed_states.lock().unwrap().push(path.to_string());
        self.set_path(path);
    }

    fn navigate(&self, path: &str) {
        self.navigated.lock().unwrap().push(path.to_string());
    }

    fn alert(&self, message: &str) {
        self.alert_messages.lock().unwrap().push(message.to_string());
    }
}
