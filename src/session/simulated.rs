//! In-process stand-in for the real-time media collaborator
//!
//! Used by the desktop binary and by tests. Device requests resolve after a
//! configurable latency; kinds can be marked as denied to exercise errors.

use crate::controls::device::{DeviceError, DeviceErrorKind, DeviceKind, MediaDeviceInfo};
use crate::controls::permissions::ParticipantPermissions;
use crate::session::backend::{MediaDevices, SendError, SessionBackend};
use crate::session::signals::{
    AgentState, Dimensions, RemoteParticipant, SecondTileSource, SessionSignals, TrackInfo,
    TrackPresence,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug)]
struct SimulatedState {
    active: bool,
    agent_state: AgentState,
    tracks: TrackPresence,
    permissions: ParticipantPermissions,
    participants: Vec<RemoteParticipant>,
    devices: Vec<MediaDeviceInfo>,
    active_devices: HashMap<DeviceKind, String>,
    denied: HashSet<DeviceKind>,
    sent: Vec<String>,
    agent_messages: Vec<String>,
}

impl Default for SimulatedState {
    fn default() -> Self {
        Self {
            active: true,
            agent_state: AgentState::Listening,
            tracks: TrackPresence {
                agent_audio: Some(TrackInfo::live()),
                ..Default::default()
            },
            permissions: ParticipantPermissions::all(),
            participants: vec![RemoteParticipant::new("wellness-agent", true)],
            devices: vec![
                MediaDeviceInfo::new(DeviceKind::Microphone, "default", "Default Microphone"),
                MediaDeviceInfo::new(DeviceKind::Microphone, "usb-headset", "USB Headset"),
                MediaDeviceInfo::new(DeviceKind::Camera, "default", "Built-in Camera"),
            ],
            active_devices: HashMap::new(),
            denied: HashSet::new(),
            sent: Vec::new(),
            agent_messages: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SimulatedSession {
    inner: Arc<RwLock<SimulatedState>>,
    latency: Duration,
}

impl SimulatedSession {
    pub fn new(latency: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SimulatedState::default())),
            latency,
        }
    }

    /// Reject every enable request for `kind` with `PermissionDenied`
    pub fn deny(&self, kind: DeviceKind) {
        self.inner.write().denied.insert(kind);
    }

    pub fn allow(&self, kind: DeviceKind) {
        self.inner.write().denied.remove(&kind);
    }

    pub fn set_agent_state(&self, state: AgentState) {
        self.inner.write().agent_state = state;
    }

    /// Switch the agent between avatar video and audio only
    pub fn set_agent_video(&self, dimensions: Option<Dimensions>) {
        self.inner.write().tracks.agent_video = dimensions.map(|d| TrackInfo {
            muted: false,
            dimensions: Some(d),
        });
    }

    /// Mute or unmute a published camera or screen share track
    pub fn set_track_muted(&self, source: SecondTileSource, muted: bool) {
        let mut state = self.inner.write();
        let track = match source {
            SecondTileSource::Camera => &mut state.tracks.camera,
            SecondTileSource::ScreenShare => &mut state.tracks.screen_share,
        };
        if let Some(track) = track.as_mut() {
            track.muted = muted;
        }
    }

    pub fn set_permissions(&self, permissions: ParticipantPermissions) {
        self.inner.write().permissions = permissions;
    }

    pub fn set_participants(&self, participants: Vec<RemoteParticipant>) {
        self.inner.write().participants = participants;
    }

    pub fn add_device(&self, device: MediaDeviceInfo) {
        self.inner.write().devices.push(device);
    }

    pub fn signals(&self, chat_open: bool) -> SessionSignals {
        let state = self.inner.read();
        SessionSignals::from_tracks(chat_open, state.agent_state, &state.tracks)
    }

    pub fn tracks(&self) -> TrackPresence {
        self.inner.read().tracks
    }

    pub fn permissions(&self) -> Option<ParticipantPermissions> {
        let state = self.inner.read();
        state.active.then(|| state.permissions.clone())
    }

    pub fn participants(&self) -> Vec<RemoteParticipant> {
        self.inner.read().participants.clone()
    }

    pub fn devices(&self, kind: DeviceKind) -> Vec<MediaDeviceInfo> {
        self.inner
            .read()
            .devices
            .iter()
            .filter(|d| d.kind == kind)
            .cloned()
            .collect()
    }

    pub fn active_device(&self, kind: DeviceKind) -> Option<String> {
        self.inner.read().active_devices.get(&kind).cloned()
    }

    pub fn sent_messages(&self) -> Vec<String> {
        self.inner.read().sent.clone()
    }

    /// Queue a chat message from the agent; ignored once the session ended
    pub fn agent_says(&self, text: impl Into<String>) {
        let mut state = self.inner.write();
        if state.active {
            state.agent_messages.push(text.into());
        }
    }

    /// Drain agent messages not yet shown in the transcript
    pub fn take_agent_messages(&self) -> Vec<String> {
        std::mem::take(&mut self.inner.write().agent_messages)
    }
}

impl MediaDevices for SimulatedSession {
    fn set_enabled(
        &self,
        kind: DeviceKind,
        enabled: bool,
        device_id: Option<String>,
    ) -> BoxFuture<'static, Result<bool, DeviceError>> {
        let inner = Arc::clone(&self.inner);
        let latency = self.latency;
        async move {
            tokio::time::sleep(latency).await;

            let mut state = inner.write();
            if !state.active {
                return Err(DeviceError::new(DeviceErrorKind::Unknown, "session has ended"));
            }
            if enabled && state.denied.contains(&kind) {
                return Err(DeviceError::permission_denied(format!(
                    "{} access denied",
                    kind
                )));
            }

            let track = enabled.then(TrackInfo::live);
            match kind {
                DeviceKind::Microphone => {}
                DeviceKind::Camera => {
                    state.tracks.camera = track.map(|t| t.with_dimensions(640, 480))
                }
                DeviceKind::ScreenShare => {
                    state.tracks.screen_share = track.map(|t| t.with_dimensions(1920, 1080))
                }
            }
            if let Some(id) = device_id {
                state.active_devices.insert(kind, id);
            }
            debug!("Simulated {} is now {}", kind, if enabled { "on" } else { "off" });
            Ok(enabled)
        }
        .boxed()
    }

    fn switch_device(
        &self,
        kind: DeviceKind,
        device_id: String,
    ) -> BoxFuture<'static, Result<(), DeviceError>> {
        let inner = Arc::clone(&self.inner);
        let latency = self.latency;
        async move {
            tokio::time::sleep(latency).await;

            let mut state = inner.write();
            let known = state
                .devices
                .iter()
                .any(|d| d.kind == kind && d.device_id == device_id);
            if !known {
                return Err(DeviceError::not_found(format!("no {} '{}'", kind, device_id)));
            }
            state.active_devices.insert(kind, device_id);
            Ok(())
        }
        .boxed()
    }
}

impl SessionBackend for SimulatedSession {
    fn is_active(&self) -> bool {
        self.inner.read().active
    }

    fn send_message(&self, text: String) -> BoxFuture<'static, Result<(), SendError>> {
        let inner = Arc::clone(&self.inner);
        let latency = self.latency;
        async move {
            tokio::time::sleep(latency).await;

            let mut state = inner.write();
            if !state.active {
                return Err(SendError::NoTransport);
            }
            state.sent.push(text);
            Ok(())
        }
        .boxed()
    }

    fn end_session(&self) {
        let mut state = self.inner.write();
        state.active = false;
        state.agent_state = AgentState::Disconnected;
        state.tracks = TrackPresence::default();
        info!("Simulated session ended");
    }
}
