//! Control bar state: device toggles, device selection, permissions and
//! the resolved set of visible controls.

pub mod bar;
pub mod composer;
pub mod device;
pub mod input;
pub mod permissions;
pub mod store;
pub mod toggle;

pub use bar::{ChatOpenCallback, ControlBar, ControlBarOptions, DisconnectCallback};
pub use composer::{
    chat_affordance, compose, compose_controls, is_agent_available, ChatAffordance,
    ControlOverrides, ControlSet, VisibleControls,
};
pub use device::{
    DeviceError, DeviceErrorEvent, DeviceErrorKind, DeviceKind, DeviceSelection, MediaDeviceInfo,
};
pub use input::{DeviceErrorCallback, InputControls, InputControlsOptions, ToggleView};
pub use permissions::{ParticipantPermissions, PermissionResolver, PublishPermissions, TrackSource};
pub use store::{DeviceChoiceStore, JsonFileStore, MemoryStore};
pub use toggle::{ToggleMachine, TogglePhase, ToggleState, ToggleTicket};
