//! Collaborator contracts: the real-time media library owns capture,
//! transport and signaling; the widget only calls through these traits.

use crate::controls::device::{DeviceError, DeviceKind};
use futures::future::BoxFuture;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("no active transport")]
    NoTransport,

    #[error("no agent is available to receive messages")]
    AgentUnavailable,

    #[error("message is empty")]
    EmptyMessage,

    #[error("message rejected: {0}")]
    Rejected(String),
}

/// Hardware access through the media collaborator
pub trait MediaDevices: Send + Sync {
    /// Enable or disable capture for `kind`; resolves with the achieved state
    fn set_enabled(
        &self,
        kind: DeviceKind,
        enabled: bool,
        device_id: Option<String>,
    ) -> BoxFuture<'static, Result<bool, DeviceError>>;

    /// Switch the active physical device for `kind`
    fn switch_device(
        &self,
        kind: DeviceKind,
        device_id: String,
    ) -> BoxFuture<'static, Result<(), DeviceError>>;
}

/// Session-level operations owned by the collaborator
pub trait SessionBackend: Send + Sync {
    fn is_active(&self) -> bool;

    /// Deliver a chat message; may fail when no transport is active
    fn send_message(&self, text: String) -> BoxFuture<'static, Result<(), SendError>>;

    /// Fire-and-forget session teardown
    fn end_session(&self);
}
