//! Toggle state machine for one capture device
//!
//! ```text
//! Idle ──begin──► Pending ──complete(Ok)──► Enabled | Disabled
//!                    │
//!                    └──complete(Err)──► previous achieved state + last_error
//! ```
//!
//! At most one request is in flight. A second `begin` while pending fails
//! with `InvalidState` and leaves the machine untouched. Results for tickets
//! that are no longer in flight (or arrive after teardown) are discarded.

use crate::controls::device::{DeviceError, DeviceKind};
use crate::{CompanionError, Result};
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TogglePhase {
    /// No request has resolved yet
    #[default]
    Idle,
    /// A request is in flight
    Pending { requested: bool },
    Enabled,
    Disabled,
}

impl TogglePhase {
    pub fn is_pending(&self) -> bool {
        matches!(self, TogglePhase::Pending { .. })
    }
}

impl fmt::Display for TogglePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TogglePhase::Idle => write!(f, "Idle"),
            TogglePhase::Pending { requested: true } => write!(f, "Pending(on)"),
            TogglePhase::Pending { requested: false } => write!(f, "Pending(off)"),
            TogglePhase::Enabled => write!(f, "Enabled"),
            TogglePhase::Disabled => write!(f, "Disabled"),
        }
    }
}

/// What a control renders from
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToggleState {
    pub enabled: bool,
    pub pending: bool,
    pub last_error: Option<DeviceError>,
}

/// Handle for one in-flight request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleTicket {
    kind: DeviceKind,
    id: Uuid,
    requested: bool,
}

impl ToggleTicket {
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn requested(&self) -> bool {
        self.requested
    }
}

#[derive(Debug)]
pub struct ToggleMachine {
    kind: DeviceKind,
    phase: TogglePhase,
    /// Last achieved state; kept while a request is pending
    enabled: bool,
    in_flight: Option<Uuid>,
    last_error: Option<DeviceError>,
    device_id: Option<String>,
    torn_down: bool,
}

impl ToggleMachine {
    pub fn new(kind: DeviceKind) -> Self {
        Self {
            kind,
            phase: TogglePhase::Idle,
            enabled: false,
            in_flight: None,
            last_error: None,
            device_id: None,
            torn_down: false,
        }
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn phase(&self) -> TogglePhase {
        self.phase
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_pending(&self) -> bool {
        self.phase.is_pending()
    }

    pub fn last_error(&self) -> Option<&DeviceError> {
        self.last_error.as_ref()
    }

    /// Remembered device id; `None` means the system default
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn state(&self) -> ToggleState {
        ToggleState {
            enabled: self.enabled,
            pending: self.is_pending(),
            last_error: self.last_error.clone(),
        }
    }

    /// Start a request for `requested`
    ///
    /// Clears the previous error. Fails with `InvalidState` if a request is
    /// already pending or the machine has been torn down.
    pub fn begin(&mut self, requested: bool) -> Result<ToggleTicket> {
        if self.torn_down || self.is_pending() {
            warn!(
                "Rejected {} toggle to {} while {}",
                self.kind, requested, self.phase
            );
            return Err(CompanionError::InvalidState { kind: self.kind });
        }

        let id = Uuid::new_v4();
        self.in_flight = Some(id);
        self.last_error = None;
        self.phase = TogglePhase::Pending { requested };
        debug!("{} toggle {} requested ({})", self.kind, requested, id);

        Ok(ToggleTicket {
            kind: self.kind,
            id,
            requested,
        })
    }

    /// Apply the outcome of a request: `Ok(achieved)` or the device error
    ///
    /// Returns `false` when the result was stale and discarded.
    pub fn complete(
        &mut self,
        ticket: &ToggleTicket,
        outcome: std::result::Result<bool, DeviceError>,
    ) -> bool {
        if self.torn_down || self.in_flight != Some(ticket.id) {
            debug!("Discarding stale {} toggle result ({})", self.kind, ticket.id);
            return false;
        }
        self.in_flight = None;

        match outcome {
            Ok(achieved) => {
                if achieved != ticket.requested {
                    debug!(
                        "{} toggle asked for {} but achieved {}",
                        self.kind, ticket.requested, achieved
                    );
                }
                self.enabled = achieved;
                self.last_error = None;
            }
            Err(error) => {
                warn!("{} toggle failed: {}", self.kind, error);
                self.last_error = Some(error);
            }
        }
        self.phase = self.settled_phase();
        true
    }

    /// A different physical device became active; on/off state is unchanged
    pub fn on_device_change(&mut self, device_id: impl Into<String>) {
        let device_id = device_id.into();
        debug!("{} device is now {}", self.kind, device_id);
        self.device_id = Some(device_id);
    }

    /// Set the device to use before any change is observed (e.g. a restored choice)
    pub fn set_device(&mut self, device_id: Option<String>) {
        self.device_id = device_id;
    }

    /// Track state changed outside of a toggle request (e.g. sharing stopped
    /// from the system UI). Ignored while a request is pending.
    pub fn observe_enabled(&mut self, enabled: bool) {
        let unchanged = self.enabled == enabled && self.phase != TogglePhase::Idle;
        if self.torn_down || self.is_pending() || unchanged {
            return;
        }
        debug!("{} observed as {}", self.kind, if enabled { "on" } else { "off" });
        self.enabled = enabled;
        self.phase = self.settled_phase();
    }

    /// Stop accepting results; any in-flight request is dropped
    pub fn teardown(&mut self) {
        if let Some(id) = self.in_flight.take() {
            debug!("Dropping in-flight {} toggle ({}) on teardown", self.kind, id);
        }
        self.torn_down = true;
        if self.is_pending() {
            self.phase = self.settled_phase();
        }
    }

    fn settled_phase(&self) -> TogglePhase {
        if self.enabled {
            TogglePhase::Enabled
        } else {
            TogglePhase::Disabled
        }
    }
}
