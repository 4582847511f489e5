//! Live session signals consumed by the layout resolver
//!
//! Signals are re-derived from track presence on every change; nothing here
//! is stored between renders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversation state reported for the agent participant
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    #[default]
    Disconnected,
    Connecting,
    Initializing,
    Listening,
    Thinking,
    Speaking,
}

impl AgentState {
    pub fn is_speaking(&self) -> bool {
        matches!(self, AgentState::Speaking)
    }

    /// Whether the agent is connected and taking part in the conversation
    pub fn is_engaged(&self) -> bool {
        matches!(
            self,
            AgentState::Listening | AgentState::Thinking | AgentState::Speaking
        )
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentState::Disconnected => write!(f, "Disconnected"),
            AgentState::Connecting => write!(f, "Connecting"),
            AgentState::Initializing => write!(f, "Initializing"),
            AgentState::Listening => write!(f, "Listening"),
            AgentState::Thinking => write!(f, "Thinking"),
            AgentState::Speaking => write!(f, "Speaking"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A published track as seen by the widget
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackInfo {
    pub muted: bool,
    pub dimensions: Option<Dimensions>,
}

impl TrackInfo {
    pub fn live() -> Self {
        Self::default()
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some(Dimensions::new(width, height));
        self
    }

    pub fn muted(mut self) -> Self {
        self.muted = true;
        self
    }
}

/// Track publications relevant to the tiles
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackPresence {
    /// Local camera
    pub camera: Option<TrackInfo>,
    /// Any screen share in the room
    pub screen_share: Option<TrackInfo>,
    pub agent_audio: Option<TrackInfo>,
    pub agent_video: Option<TrackInfo>,
}

fn track_live(track: &Option<TrackInfo>) -> bool {
    track.map(|t| !t.muted).unwrap_or(false)
}

impl TrackPresence {
    /// Published and not muted
    pub fn is_live(&self, source: SecondTileSource) -> bool {
        match source {
            SecondTileSource::Camera => track_live(&self.camera),
            SecondTileSource::ScreenShare => track_live(&self.screen_share),
        }
    }
}

/// Which media fills the second tile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SecondTileSource {
    Camera,
    ScreenShare,
}

impl fmt::Display for SecondTileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecondTileSource::Camera => write!(f, "Camera"),
            SecondTileSource::ScreenShare => write!(f, "Screen share"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSignals {
    pub chat_open: bool,
    pub has_camera: bool,
    pub has_screen_share: bool,
    /// The agent publishes video (avatar) instead of audio only
    pub is_avatar_mode: bool,
    pub agent_state: AgentState,
    /// Avatar video size, zero when unknown
    pub avatar_dimensions: Dimensions,
}

impl SessionSignals {
    /// Derive signals from the current publications; muted tracks count as absent
    pub fn from_tracks(chat_open: bool, agent_state: AgentState, tracks: &TrackPresence) -> Self {
        Self {
            chat_open,
            has_camera: tracks.is_live(SecondTileSource::Camera),
            has_screen_share: tracks.is_live(SecondTileSource::ScreenShare),
            is_avatar_mode: tracks.agent_video.is_some(),
            agent_state,
            avatar_dimensions: tracks
                .agent_video
                .and_then(|t| t.dimensions)
                .unwrap_or_default(),
        }
    }

    pub fn has_second_tile(&self) -> bool {
        self.has_camera || self.has_screen_share
    }

    /// Screen share wins when both are live
    pub fn second_tile_source(&self) -> Option<SecondTileSource> {
        if self.has_screen_share {
            Some(SecondTileSource::ScreenShare)
        } else if self.has_camera {
            Some(SecondTileSource::Camera)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteParticipant {
    pub identity: String,
    pub is_agent: bool,
}

impl RemoteParticipant {
    pub fn new(identity: impl Into<String>, is_agent: bool) -> Self {
        Self {
            identity: identity.into(),
            is_agent,
        }
    }
}
