use super::state::ProcessState;
use crate::platform::{
    ErrorTracker,
    HostChannel,
};
use eyre::Context as _;
use serde::Serialize;

/// Per-peer status fields surfaced to the host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerSummary {
    pub id: String,
    pub active: bool,
    pub initiator: bool,
    pub error: Option<String>,
    pub fingerprint: Option<String>,
}

/// Projection of the process state reported to the embedding host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub room: Option<String>,
    pub error: Option<String>,
    pub peers: Vec<PeerSummary>,
    pub background_mode: String,
    pub mute_video: bool,
    pub mute_audio: bool,
    pub maximized: String,
    /// Stamped only on actually emitted updates; not part of the change
    /// detection snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<u64>,
}

impl StatusUpdate {
    pub fn project(state: &ProcessState) -> Self {
        Self {
            room: state.room.clone(),
            error: state.error.as_ref().map(ToString::to_string),
            peers: state
                .status
                .values()
                .map(|info| PeerSummary {
                    id: info.id.clone(),
                    active: info.active,
                    initiator: info.initiator,
                    error: info.error.clone(),
                    fingerprint: info.fingerprint.clone(),
                })
                .collect(),
            background_mode: state.background_mode.clone(),
            mute_video: state.mute_video,
            mute_audio: state.mute_audio,
            maximized: state.maximized.clone(),
            counter: None,
        }
    }
}

/// Typed message towards the host page. On the wire this becomes
/// `{"type": "status", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum HostMessage {
    Status(StatusUpdate),
}

/// Deterministic string form of a serializable value, used for change
/// detection. Struct fields keep their declaration order and peer lists
/// are already sorted by id, so equal projections produce equal strings.
pub fn object_snapshot<T: Serialize>(value: &T) -> eyre::Result<String> {
    serde_json::to_string(value).context("failed to serialize snapshot")
}

/// Pushes status snapshots to the host without flooding it: an update
/// whose projection equals the previously emitted one is suppressed, and
/// only emitted updates are stamped with the monotonic counter.
#[derive(Debug, Default)]
pub struct StatusReporter {
    last_snapshot: String,
    counter: u64,
}

impl StatusReporter {
    pub fn post_update(&mut self, state: &ProcessState, host: &impl HostChannel, bugs: &impl ErrorTracker) {
        if let Err(err) = self.try_post_update(state, host) {
            error!("failed to post status update: {err}");
            bugs.track_silent_exception(&err);
        }
    }

    fn try_post_update(&mut self, state: &ProcessState, host: &impl HostChannel) -> eyre::Result<()> {
        let mut update = StatusUpdate::project(state);
        let snapshot = object_snapshot(&update)?;
        if snapshot == self.last_snapshot {
            return Ok(());
        }
        self.last_snapshot = snapshot;

        update.counter = Some(self.counter);
        self.counter += 1;

        host.post_message(HostMessage::Status(update));
        Ok(())
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        session::PeerInfo,
        testing::{
            RecordingHost,
            RecordingTracker,
        },
    };
    use briefing_client_config::ClientConfig;
    use pretty_assertions::assert_eq;

    fn state_with_peer() -> ProcessState {
        let mut state = ProcessState::new(&ClientConfig::default(), "");
        state.room = Some("standup".to_string());
        state.status.insert(
            "peer-1".to_string(),
            PeerInfo {
                id: "peer-1".to_string(),
                active: true,
                initiator: false,
                error: None,
                fingerprint: Some("ab:cd".to_string()),
            },
        );
        state
    }

    #[test]
    fn identical_projections_are_suppressed() {
        let host = RecordingHost::default();
        let bugs = RecordingTracker::default();
        let mut reporter = StatusReporter::default();
        let state = state_with_peer();

        reporter.post_update(&state, &host, &bugs);
        reporter.post_update(&state, &host, &bugs);

        let statuses = host.statuses();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].counter, Some(0));
        assert_eq!(reporter.counter(), 1);
    }

    #[test]
    fn counter_increments_only_on_emission() {
        let host = RecordingHost::default();
        let bugs = RecordingTracker::default();
        let mut reporter = StatusReporter::default();
        let mut state = state_with_peer();

        reporter.post_update(&state, &host, &bugs);
        reporter.post_update(&state, &host, &bugs);
        state.mute_audio = true;
        reporter.post_update(&state, &host, &bugs);

        let statuses = host.statuses();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].counter, Some(0));
        assert_eq!(statuses[1].counter, Some(1));
        assert!(statuses[1].mute_audio);
    }

    #[test]
    fn snapshot_is_deterministic() {
        let state = state_with_peer();
        let a = object_snapshot(&StatusUpdate::project(&state)).unwrap();
        let b = object_snapshot(&StatusUpdate::project(&state.clone())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn wire_format_matches_host_schema() {
        let mut update = StatusUpdate::project(&state_with_peer());
        update.counter = Some(7);
        let json = serde_json::to_value(HostMessage::Status(update)).unwrap();

        assert_eq!(json["type"], "status");
        assert_eq!(json["payload"]["room"], "standup");
        assert_eq!(json["payload"]["muteAudio"], false);
        assert_eq!(json["payload"]["backgroundMode"], "");
        assert_eq!(json["payload"]["counter"], 7);
        assert_eq!(json["payload"]["peers"][0]["id"], "peer-1");
        assert_eq!(json["payload"]["peers"][0]["fingerprint"], "ab:cd");
    }
}
