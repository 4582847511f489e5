//! Companion - layout and device-control state for a voice/video assistant widget
//!
//! The crate decides which grid slot each media tile occupies, how tiles
//! animate between slots, what state each hardware toggle is in, and which
//! controls a participant may see. Rendering lives in [`ui`].

pub mod config;
pub mod controls;
pub mod layout;
pub mod messages;
pub mod session;
pub mod ui;

use thiserror::Error;

pub use controls::{DeviceError, DeviceErrorKind, DeviceKind};
pub use session::SendError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompanionError {
    #[error("Toggle for {kind} is already pending")]
    InvalidState { kind: DeviceKind },

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Send error: {0}")]
    Send(#[from] SendError),

    #[error("No active session")]
    SessionUnavailable,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Device store error: {0}")]
    StoreError(String),

    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for CompanionError {
    fn from(e: std::io::Error) -> Self {
        CompanionError::IOError(e.to_string())
    }
}

impl CompanionError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // A manual retry via another toggle is enough
            CompanionError::InvalidState { .. } => true,
            CompanionError::Device(_) => true,
            CompanionError::Send(_) => true,
            // Needs a new session
            CompanionError::SessionUnavailable => false,
            CompanionError::ConfigError(_) => false,
            CompanionError::StoreError(_) => false,
            CompanionError::IOError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            CompanionError::InvalidState { kind } => {
                format!("The {kind} is still switching. Please wait a moment.")
            }
            CompanionError::Device(e) => e.kind.user_message().to_string(),
            CompanionError::Send(_) => {
                "Message could not be delivered. Please try again.".to_string()
            }
            CompanionError::SessionUnavailable => {
                "No active session. Start a new check-in first.".to_string()
            }
            CompanionError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            CompanionError::StoreError(_) => {
                "Saved device choices could not be read or written.".to_string()
            }
            CompanionError::IOError(_) => "File system error occurred.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompanionError>;
