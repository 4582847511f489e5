//! Resolves which controls the bar shows
//!
//! Every field is `override ?? default`. `leave` defaults to visible since
//! ending a session needs no publish grant.

use crate::controls::device::DeviceKind;
use crate::controls::permissions::{ParticipantPermissions, PublishPermissions};
use crate::session::RemoteParticipant;
use serde::{Deserialize, Serialize};

/// Caller-supplied visibility overrides; `None` falls back to permissions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlOverrides {
    pub leave: Option<bool>,
    pub camera: Option<bool>,
    pub microphone: Option<bool>,
    pub screen_share: Option<bool>,
    pub chat: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleControls {
    pub leave: bool,
    pub camera: bool,
    pub microphone: bool,
    pub screen_share: bool,
    pub chat: bool,
}

impl VisibleControls {
    pub fn is_visible(&self, kind: DeviceKind) -> bool {
        match kind {
            DeviceKind::Microphone => self.microphone,
            DeviceKind::Camera => self.camera,
            DeviceKind::ScreenShare => self.screen_share,
        }
    }
}

/// Chat affordances; agent availability never hides the transcript toggle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChatAffordance {
    /// The transcript toggle is always shown
    pub toggle_visible: bool,
    pub input_visible: bool,
    pub send_enabled: bool,
}

/// Everything the control bar needs to render
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlSet {
    pub visible: VisibleControls,
    pub chat: ChatAffordance,
}

pub fn compose(overrides: &ControlOverrides, defaults: &PublishPermissions) -> VisibleControls {
    VisibleControls {
        leave: overrides.leave.unwrap_or(true),
        camera: overrides.camera.unwrap_or(defaults.camera),
        microphone: overrides.microphone.unwrap_or(defaults.microphone),
        screen_share: overrides.screen_share.unwrap_or(defaults.screen_share),
        chat: overrides.chat.unwrap_or(defaults.chat),
    }
}

pub fn chat_affordance(visible: &VisibleControls, agent_available: bool) -> ChatAffordance {
    ChatAffordance {
        toggle_visible: true,
        input_visible: visible.chat,
        send_enabled: visible.chat && agent_available,
    }
}

/// Full composition straight from session grants
pub fn compose_controls(
    overrides: &ControlOverrides,
    permissions: Option<&ParticipantPermissions>,
    agent_available: bool,
) -> ControlSet {
    let visible = compose(overrides, &PublishPermissions::derive(permissions));
    ControlSet {
        visible,
        chat: chat_affordance(&visible, agent_available),
    }
}

/// At least one remote participant is flagged as the agent
pub fn is_agent_available(participants: &[RemoteParticipant]) -> bool {
    participants.iter().any(|p| p.is_agent)
}
