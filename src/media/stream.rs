use eyre::eyre;
use std::sync::{
    atomic::{
        AtomicBool,
        AtomicU64,
        Ordering,
    },
    Arc,
    Mutex,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

#[derive(Debug)]
struct TrackInner {
    id: String,
    kind: TrackKind,
    label: String,
    device_id: Option<String>,
    enabled: AtomicBool,
    stopped: AtomicBool,
    flips: AtomicU64,
}

/// A single audio or video track. Clones share the underlying track, like
/// the platform track objects they model.
#[derive(Debug, Clone)]
pub struct MediaTrack {
    inner: Arc<TrackInner>,
}

impl MediaTrack {
    pub fn new(kind: TrackKind, id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::build(kind, id.into(), label.into(), None)
    }

    /// A track that remembers which capture device produced it.
    pub fn from_device(
        kind: TrackKind,
        id: impl Into<String>,
        label: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        Self::build(kind, id.into(), label.into(), Some(device_id.into()))
    }

    fn build(kind: TrackKind, id: String, label: String, device_id: Option<String>) -> Self {
        Self {
            inner: Arc::new(TrackInner {
                id,
                kind,
                label,
                device_id,
                enabled: AtomicBool::new(true),
                stopped: AtomicBool::new(false),
                flips: AtomicU64::new(0),
            }),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.inner.kind
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn device_id(&self) -> Option<&str> {
        self.inner.device_id.as_deref()
    }

    pub fn enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        if self.inner.enabled.swap(enabled, Ordering::SeqCst) != enabled {
            self.inner.flips.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// How often the enabled flag actually changed value.
    pub fn enabled_flips(&self) -> u64 {
        self.inner.flips.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
    }

    pub fn stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    pub fn same_track(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A local media stream: a shared, mutable list of tracks. Clones refer to
/// the same stream.
#[derive(Debug, Clone, Default)]
pub struct MediaStream {
    tracks: Arc<Mutex<Vec<MediaTrack>>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<MediaTrack>) -> Self {
        Self {
            tracks: Arc::new(Mutex::new(tracks)),
        }
    }

    pub fn tracks(&self) -> Vec<MediaTrack> {
        self.tracks.lock().unwrap().clone()
    }

    /// Fallible track access for callers that must not panic on a poisoned
    /// stream, like the stream synchronizer.
    pub fn try_tracks(&self) -> eyre::Result<Vec<MediaTrack>> {
        self.tracks
            .lock()
            .map(|tracks| tracks.clone())
            .map_err(|_| eyre!("stream track list is poisoned"))
    }

    pub fn audio_tracks(&self) -> Vec<MediaTrack> {
        self.tracks_of_kind(TrackKind::Audio)
    }

    pub fn video_tracks(&self) -> Vec<MediaTrack> {
        self.tracks_of_kind(TrackKind::Video)
    }

    fn tracks_of_kind(&self, kind: TrackKind) -> Vec<MediaTrack> {
        self.tracks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn add_track(&self, track: MediaTrack) {
        self.tracks.lock().unwrap().push(track);
    }

    /// Replace all audio tracks with the given ones. Used to transplant
    /// microphone audio onto a desktop capture or a processed video stream.
    pub fn set_audio_tracks(&self, audio: Vec<MediaTrack>) {
        let mut tracks = self.tracks.lock().unwrap();
        tracks.retain(|t| t.kind() != TrackKind::Audio);
        tracks.extend(audio);
    }

    /// Stop every track. Called when the stream is superseded or the
    /// session ends, so capture devices are actually released.
    pub fn stop_all_tracks(&self) {
        for track in self.tracks() {
            track.stop();
        }
    }

    pub fn same_stream(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tracks, &other.tracks)
    }
}
