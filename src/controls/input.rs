//! Microphone, camera and screen-share toggles for one control bar
//!
//! Requests go to the [`MediaDevices`] collaborator on a tokio runtime;
//! results come back over a channel and are applied on the UI thread by
//! [`InputControls::poll`]. After [`InputControls::unmount`] late results
//! are dropped.

use crate::controls::device::{
    DeviceError, DeviceErrorEvent, DeviceKind, DeviceSelection, MediaDeviceInfo,
};
use crate::controls::store::DeviceChoiceStore;
use crate::controls::toggle::{ToggleMachine, ToggleState, ToggleTicket};
use crate::session::backend::MediaDevices;
use crate::{CompanionError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

pub type DeviceErrorCallback = Arc<dyn Fn(&DeviceErrorEvent) + Send + Sync>;

#[derive(Clone)]
pub struct InputControlsOptions {
    /// Persist the chosen device per kind across sessions
    pub persist: bool,
    pub on_error: Option<DeviceErrorCallback>,
}

impl Default for InputControlsOptions {
    fn default() -> Self {
        Self {
            persist: true,
            on_error: None,
        }
    }
}

impl InputControlsOptions {
    pub fn without_persistence(mut self) -> Self {
        self.persist = false;
        self
    }

    pub fn with_error_callback(mut self, callback: DeviceErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }
}

/// Snapshot of one toggle for rendering
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleView {
    pub kind: DeviceKind,
    pub enabled: bool,
    pub pending: bool,
    pub last_error: Option<DeviceError>,
    pub device_id: Option<String>,
}

enum Completion {
    Toggle {
        ticket: ToggleTicket,
        outcome: std::result::Result<bool, DeviceError>,
    },
    DeviceSwitch {
        kind: DeviceKind,
        device_id: String,
        outcome: std::result::Result<(), DeviceError>,
    },
}

struct DeviceToggle {
    machine: ToggleMachine,
    selection: DeviceSelection,
}

pub struct InputControls {
    toggles: BTreeMap<DeviceKind, DeviceToggle>,
    devices: Arc<dyn MediaDevices>,
    runtime: Handle,
    completion_tx: Sender<Completion>,
    completion_rx: Receiver<Completion>,
    on_error: Option<DeviceErrorCallback>,
    mounted: bool,
}

impl InputControls {
    /// Mount toggles for every device kind, restoring saved device choices
    pub fn new(
        devices: Arc<dyn MediaDevices>,
        store: Arc<dyn DeviceChoiceStore>,
        runtime: Handle,
        options: InputControlsOptions,
    ) -> Self {
        let toggles = DeviceKind::ALL
            .iter()
            .map(|&kind| {
                let selection = DeviceSelection::new(kind, Arc::clone(&store), options.persist);
                let mut machine = ToggleMachine::new(kind);
                machine.set_device(selection.preferred_device().map(str::to_string));
                (kind, DeviceToggle { machine, selection })
            })
            .collect();
        let (completion_tx, completion_rx) = unbounded();

        Self {
            toggles,
            devices,
            runtime,
            completion_tx,
            completion_rx,
            on_error: options.on_error,
            mounted: true,
        }
    }

    fn toggle_ref(&self, kind: DeviceKind) -> &DeviceToggle {
        // every kind is inserted in `new`
        &self.toggles[&kind]
    }

    fn toggle_mut(&mut self, kind: DeviceKind) -> &mut DeviceToggle {
        self.toggles
            .get_mut(&kind)
            .unwrap_or_else(|| unreachable!("toggle for {kind} is created at mount"))
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn state(&self, kind: DeviceKind) -> ToggleState {
        self.toggle_ref(kind).machine.state()
    }

    pub fn view(&self, kind: DeviceKind) -> ToggleView {
        let toggle = self.toggle_ref(kind);
        let state = toggle.machine.state();
        ToggleView {
            kind,
            enabled: state.enabled,
            pending: state.pending,
            last_error: state.last_error,
            device_id: toggle.machine.device_id().map(str::to_string),
        }
    }

    pub fn is_pending(&self, kind: DeviceKind) -> bool {
        self.toggle_ref(kind).machine.is_pending()
    }

    pub fn any_pending(&self) -> bool {
        self.toggles.values().any(|t| t.machine.is_pending())
    }

    /// Request `kind` to be switched on or off
    ///
    /// Fails fast with `InvalidState` while a request for the same kind is
    /// pending, and with `SessionUnavailable` after unmount.
    pub fn toggle(&mut self, kind: DeviceKind, requested: bool) -> Result<()> {
        if !self.mounted {
            return Err(CompanionError::SessionUnavailable);
        }

        let toggle = self.toggle_mut(kind);
        let ticket = toggle.machine.begin(requested)?;
        let device_id = toggle.machine.device_id().map(str::to_string);

        let request = self.devices.set_enabled(kind, requested, device_id);
        let tx = self.completion_tx.clone();
        self.runtime.spawn(async move {
            let outcome = request.await;
            let _ = tx.send(Completion::Toggle { ticket, outcome });
        });
        Ok(())
    }

    /// Flip the current state of `kind`
    pub fn flip(&mut self, kind: DeviceKind) -> Result<()> {
        let requested = !self.state(kind).enabled;
        self.toggle(kind, requested)
    }

    /// Ask the collaborator to switch `kind` to `device_id`
    ///
    /// The choice is remembered (and persisted) only once the switch succeeds.
    pub fn select_device(&mut self, kind: DeviceKind, device_id: &str) -> Result<()> {
        if !self.mounted {
            return Err(CompanionError::SessionUnavailable);
        }

        let request = self.devices.switch_device(kind, device_id.to_string());
        let tx = self.completion_tx.clone();
        let device_id = device_id.to_string();
        self.runtime.spawn(async move {
            let outcome = request.await;
            let _ = tx.send(Completion::DeviceSwitch {
                kind,
                device_id,
                outcome,
            });
        });
        Ok(())
    }

    /// The active device for `kind` changed on the user's request
    pub fn on_device_change(&mut self, kind: DeviceKind, device_id: &str) {
        if !self.mounted {
            return;
        }
        let toggle = self.toggle_mut(kind);
        if let Err(e) = toggle.selection.record_selection(&mut toggle.machine, device_id) {
            warn!("Could not save {} choice: {}", kind, e);
        }
    }

    /// The collaborator switched to another device on its own (e.g. hot-plug)
    ///
    /// Re-applies the saved choice when it is still available.
    pub fn on_active_device_changed(
        &mut self,
        kind: DeviceKind,
        device_id: &str,
        available: &[MediaDeviceInfo],
    ) -> Result<()> {
        if !self.mounted {
            return Ok(());
        }
        let toggle = self.toggle_mut(kind);
        let reapply = toggle
            .selection
            .observe_active_device(&mut toggle.machine, device_id, available);

        match reapply {
            Some(preferred) => {
                debug!("Re-applying saved {} choice {}", kind, preferred);
                self.select_device(kind, &preferred)
            }
            None => Ok(()),
        }
    }

    /// Device selection failed in the device picker
    pub fn on_device_select_error(&mut self, kind: DeviceKind, error: DeviceError) {
        warn!("{} selection failed: {}", kind, error);
        self.report(kind, error);
    }

    /// Track state changed outside the widget
    pub fn observe_track(&mut self, kind: DeviceKind, enabled: bool) {
        self.toggle_mut(kind).machine.observe_enabled(enabled);
    }

    /// Apply finished requests; returns how many results were applied
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            match completion {
                Completion::Toggle { ticket, outcome } => {
                    let kind = ticket.kind();
                    let error = outcome.as_ref().err().cloned();
                    if self.toggle_mut(kind).machine.complete(&ticket, outcome) {
                        applied += 1;
                        if let Some(error) = error {
                            self.report(kind, error);
                        }
                    }
                }
                Completion::DeviceSwitch {
                    kind,
                    device_id,
                    outcome,
                } => {
                    if !self.mounted {
                        debug!("Discarding {} switch to {} after unmount", kind, device_id);
                        continue;
                    }
                    applied += 1;
                    match outcome {
                        Ok(()) => self.on_device_change(kind, &device_id),
                        Err(error) => self.on_device_select_error(kind, error),
                    }
                }
            }
        }
        applied
    }

    /// Tear down every toggle; in-flight results will be ignored
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        for toggle in self.toggles.values_mut() {
            toggle.machine.teardown();
        }
        debug!("Input controls unmounted");
    }

    fn report(&self, kind: DeviceKind, error: DeviceError) {
        if let Some(callback) = &self.on_error {
            callback(&DeviceErrorEvent { kind, error });
        }
    }
}
