//! Device kinds, device errors and per-kind device selection
//!
//! `DeviceSelection` binds a toggle to a concrete device id, remembers the
//! user's last choice in a [`DeviceChoiceStore`] and tells the caller when
//! that choice should be re-applied.

use crate::controls::store::DeviceChoiceStore;
use crate::controls::toggle::ToggleMachine;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// A controllable capture device
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Microphone,
    Camera,
    ScreenShare,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 3] = [
        DeviceKind::Microphone,
        DeviceKind::Camera,
        DeviceKind::ScreenShare,
    ];

    /// Key used for this kind in the persisted device store
    pub fn store_key(&self) -> &'static str {
        match self {
            DeviceKind::Microphone => "microphone",
            DeviceKind::Camera => "camera",
            DeviceKind::ScreenShare => "screen_share",
        }
    }

    /// Media device class, if the kind is backed by an enumerable device
    pub fn media_kind(&self) -> Option<&'static str> {
        match self {
            DeviceKind::Microphone => Some("audioinput"),
            DeviceKind::Camera => Some("videoinput"),
            DeviceKind::ScreenShare => None,
        }
    }

    /// Whether a specific physical device can be chosen for this kind
    pub fn is_selectable(&self) -> bool {
        self.media_kind().is_some()
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Microphone => write!(f, "microphone"),
            DeviceKind::Camera => write!(f, "camera"),
            DeviceKind::ScreenShare => write!(f, "screen share"),
        }
    }
}

/// Failure class reported by the hardware/permission layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceErrorKind {
    PermissionDenied,
    DeviceNotFound,
    DeviceInUse,
    Unknown,
}

impl DeviceErrorKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            DeviceErrorKind::PermissionDenied => {
                "Access was denied. Grant permission in your system settings and try again."
            }
            DeviceErrorKind::DeviceNotFound => "No matching device was found.",
            DeviceErrorKind::DeviceInUse => "The device is in use by another application.",
            DeviceErrorKind::Unknown => "The device could not be started.",
        }
    }
}

impl fmt::Display for DeviceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceErrorKind::PermissionDenied => write!(f, "permission denied"),
            DeviceErrorKind::DeviceNotFound => write!(f, "device not found"),
            DeviceErrorKind::DeviceInUse => write!(f, "device in use"),
            DeviceErrorKind::Unknown => write!(f, "unknown device error"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct DeviceError {
    pub kind: DeviceErrorKind,
    pub message: String,
}

impl DeviceError {
    pub fn new(kind: DeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(DeviceErrorKind::PermissionDenied, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(DeviceErrorKind::DeviceNotFound, message)
    }
}

/// Payload handed to the caller's device error callback
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceErrorEvent {
    pub kind: DeviceKind,
    pub error: DeviceError,
}

/// A physical device reported by the media collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDeviceInfo {
    pub device_id: String,
    pub label: String,
    pub kind: DeviceKind,
}

impl MediaDeviceInfo {
    pub fn new(kind: DeviceKind, device_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            label: label.into(),
            kind,
        }
    }
}

/// Device choice bookkeeping for one device kind
pub struct DeviceSelection {
    kind: DeviceKind,
    persist: bool,
    /// Last user choice read at mount or written since; `None` means system default
    preferred: Option<String>,
    store: Arc<dyn DeviceChoiceStore>,
}

impl DeviceSelection {
    /// Create the selection, reading the persisted choice when `persist` is set
    pub fn new(kind: DeviceKind, store: Arc<dyn DeviceChoiceStore>, persist: bool) -> Self {
        let preferred = if persist && kind.is_selectable() {
            store.load(kind)
        } else {
            None
        };
        if let Some(id) = &preferred {
            debug!("Restored {} choice: {}", kind, id);
        }

        Self {
            kind,
            persist,
            preferred,
            store,
        }
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn persists(&self) -> bool {
        self.persist
    }

    pub fn preferred_device(&self) -> Option<&str> {
        self.preferred.as_deref()
    }

    /// Record a device change the user asked for and the collaborator completed
    pub fn record_selection(&mut self, machine: &mut ToggleMachine, device_id: &str) -> Result<()> {
        machine.on_device_change(device_id);
        self.preferred = Some(device_id.to_string());

        if self.persist {
            self.store.save(self.kind, device_id)?;
            info!("Saved {} choice: {}", self.kind, device_id);
        }
        Ok(())
    }

    /// Note that a different device became active without the user choosing it
    ///
    /// Returns the persisted choice when it should be re-applied: it differs
    /// from the newly active device and is currently available.
    pub fn observe_active_device(
        &self,
        machine: &mut ToggleMachine,
        device_id: &str,
        available: &[MediaDeviceInfo],
    ) -> Option<String> {
        machine.on_device_change(device_id);

        let preferred = self.preferred.as_deref()?;
        if preferred == device_id {
            return None;
        }
        available
            .iter()
            .any(|d| d.kind == self.kind && d.device_id == preferred)
            .then(|| preferred.to_string())
    }
}
