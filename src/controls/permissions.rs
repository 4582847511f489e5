//! Publish permissions granted by the session and the control defaults
//! derived from them.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Media source a participant may publish
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackSource {
    Microphone,
    Camera,
    ScreenShare,
    ScreenShareAudio,
}

/// Grants as delivered by the session for the local participant
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantPermissions {
    pub can_publish: bool,
    pub can_publish_data: bool,
    /// Allowed sources; empty means every source
    #[serde(default)]
    pub can_publish_sources: Vec<TrackSource>,
}

impl ParticipantPermissions {
    /// Everything allowed
    pub fn all() -> Self {
        Self {
            can_publish: true,
            can_publish_data: true,
            can_publish_sources: Vec::new(),
        }
    }

    pub fn can_publish_source(&self, source: TrackSource) -> bool {
        self.can_publish
            && (self.can_publish_sources.is_empty() || self.can_publish_sources.contains(&source))
    }
}

/// Per-control defaults; a straight pass-through of the grants
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PublishPermissions {
    pub microphone: bool,
    pub camera: bool,
    pub screen_share: bool,
    pub chat: bool,
}

impl PublishPermissions {
    /// Derive defaults; no permissions at all means nothing is allowed
    pub fn derive(permissions: Option<&ParticipantPermissions>) -> Self {
        match permissions {
            Some(p) => Self {
                microphone: p.can_publish_source(TrackSource::Microphone),
                camera: p.can_publish_source(TrackSource::Camera),
                screen_share: p.can_publish_source(TrackSource::ScreenShare),
                chat: p.can_publish_data,
            },
            None => Self::default(),
        }
    }
}

/// Caches the derived defaults so they change only when the grants change
#[derive(Debug, Default)]
pub struct PermissionResolver {
    last: Option<ParticipantPermissions>,
    defaults: PublishPermissions,
}

impl PermissionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current grants; returns whether the defaults were recomputed
    pub fn update(&mut self, permissions: Option<&ParticipantPermissions>) -> bool {
        if self.last.as_ref() == permissions {
            return false;
        }
        self.last = permissions.cloned();
        self.defaults = PublishPermissions::derive(permissions);
        info!("Publish permissions changed: {:?}", self.defaults);
        true
    }

    pub fn defaults(&self) -> PublishPermissions {
        self.defaults
    }
}
