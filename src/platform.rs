//! Capability interfaces for everything the session engine talks to but
//! does not own: capture primitives, the background transform, the
//! signaling connection, the host page, and error tracking. Production
//! code plugs in platform bindings; tests plug in scripted fakes.

use crate::{
    media::{
        CaptureOutcome,
        DeviceDescriptor,
        MediaConstraints,
        MediaStream,
    },
    session::{
        HostMessage,
        ProcessState,
    },
};
use eyre::Result;
use std::future::Future;

/// Raw device enumeration and capture. `get_user_media` never fails as an
/// error; missing devices and denied permissions show up in the outcome.
pub trait MediaDevices: Send + Sync + 'static {
    fn get_user_media(
        &self,
        constraints: Option<MediaConstraints>,
    ) -> impl Future<Output = CaptureOutcome> + Send;

    fn get_display_media(&self) -> impl Future<Output = CaptureOutcome> + Send;

    fn get_devices(&self) -> impl Future<Output = Vec<DeviceDescriptor>> + Send;
}

/// An active background-processing pipeline. There is at most one of
/// these alive at a time; stopping consumes the handle.
pub trait TransformPipeline: Send + 'static {
    /// The processed, video-only output stream.
    fn stream(&self) -> MediaStream;

    fn stop(self);
}

/// Factory for background-processing pipelines (blur and friends),
/// selected by the configured background mode identifier.
pub trait BackgroundTransform: Send + Sync + 'static {
    type Pipeline: TransformPipeline;

    fn start(&self, mode: &str, stream: &MediaStream) -> impl Future<Output = Result<Self::Pipeline>> + Send;
}

pub trait ConnectionHandle: Send + 'static {
    /// Release the underlying connection.
    fn cleanup(self);
}

/// The peer-connection/signaling layer. `setup` returns `None` when the
/// environment lacks the required real-time capabilities.
pub trait ConnectionService: Send + Sync + 'static {
    type Handle: ConnectionHandle;

    fn setup(&self, state: &ProcessState) -> impl Future<Output = Result<Option<Self::Handle>>> + Send;
}

/// Messaging channel towards the embedding host page.
pub trait HostChannel: Send + Sync + 'static {
    fn post_message(&self, message: HostMessage);
}

/// Fire-and-forget exception reporting.
pub trait ErrorTracker: Send + Sync + 'static {
    fn track_exception(&self, error: &eyre::Report);

    fn track_silent_exception(&self, error: &eyre::Report);
}

/// The addressable location and user-facing page primitives.
pub trait PageContext: Send + Sync + 'static {
    fn pathname(&self) -> String;

    /// The raw query string, with or without the leading `?`.
    fn query(&self) -> String;

    /// Rewrite the visible address without navigating.
    fn push_state(&self, path: &str);

    /// Hard redirect.
    fn navigate(&self, path: &str);

    fn alert(&self, message: &str);
}

/// All collaborators bundled, as handed to [`crate::Session::spawn`].
#[derive(Debug, Clone)]
pub struct Platform<C, M, T, H, E, P> {
    pub connection: C,
    pub media: M,
    pub transform: T,
    pub host: H,
    pub bugs: E,
    pub page: P,
}
