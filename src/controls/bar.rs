//! Control bar model: visible controls, chat-open state, chat sending and
//! leaving the session.

use crate::controls::composer::{
    chat_affordance, compose, is_agent_available, ChatAffordance, ControlOverrides, VisibleControls,
};
use crate::controls::input::{DeviceErrorCallback, InputControls, InputControlsOptions};
use crate::controls::permissions::{ParticipantPermissions, PermissionResolver};
use crate::controls::store::DeviceChoiceStore;
use crate::session::backend::{MediaDevices, SendError, SessionBackend};
use crate::session::controller::{SendErrorCallback, SessionController};
use crate::session::signals::RemoteParticipant;
use crate::{CompanionError, Result};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info};
use uuid::Uuid;

pub type ChatOpenCallback = Arc<dyn Fn(bool) + Send + Sync>;
pub type DisconnectCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct ControlBarOptions {
    pub controls: ControlOverrides,
    pub save_user_choices: bool,
    pub on_disconnect: Option<DisconnectCallback>,
    pub on_chat_open_change: Option<ChatOpenCallback>,
    pub on_device_error: Option<DeviceErrorCallback>,
    pub on_send_error: Option<SendErrorCallback>,
}

impl Default for ControlBarOptions {
    fn default() -> Self {
        Self {
            controls: ControlOverrides::default(),
            save_user_choices: true,
            on_disconnect: None,
            on_chat_open_change: None,
            on_device_error: None,
            on_send_error: None,
        }
    }
}

pub struct ControlBar {
    overrides: ControlOverrides,
    permissions: PermissionResolver,
    input: InputControls,
    session: SessionController,
    chat_open: bool,
    agent_available: bool,
    on_disconnect: Option<DisconnectCallback>,
    on_chat_open_change: Option<ChatOpenCallback>,
}

impl ControlBar {
    /// Mount a control bar for an active session
    pub fn new<C>(
        collaborator: Arc<C>,
        store: Arc<dyn DeviceChoiceStore>,
        runtime: Handle,
        options: ControlBarOptions,
    ) -> Self
    where
        C: MediaDevices + SessionBackend + 'static,
    {
        let input_options = InputControlsOptions {
            persist: options.save_user_choices,
            on_error: options.on_device_error,
        };
        let devices: Arc<dyn MediaDevices> = collaborator.clone();
        let backend: Arc<dyn SessionBackend> = collaborator;

        let input = InputControls::new(devices, store, runtime.clone(), input_options);
        let mut session = SessionController::new(backend, runtime);
        if let Some(callback) = options.on_send_error {
            session = session.with_send_error_callback(callback);
        }

        Self {
            overrides: options.controls,
            permissions: PermissionResolver::new(),
            input,
            session,
            chat_open: false,
            agent_available: false,
            on_disconnect: options.on_disconnect,
            on_chat_open_change: options.on_chat_open_change,
        }
    }

    pub fn input(&self) -> &InputControls {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputControls {
        &mut self.input
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionController {
        &mut self.session
    }

    /// Feed the current publish grants; defaults are re-derived only on change
    pub fn update_permissions(&mut self, permissions: Option<&ParticipantPermissions>) {
        self.permissions.update(permissions);
    }

    pub fn update_participants(&mut self, participants: &[RemoteParticipant]) {
        let available = is_agent_available(participants);
        if available != self.agent_available {
            debug!("Agent available: {}", available);
            self.agent_available = available;
        }
    }

    pub fn set_overrides(&mut self, overrides: ControlOverrides) {
        self.overrides = overrides;
    }

    pub fn is_agent_available(&self) -> bool {
        self.agent_available
    }

    pub fn visible_controls(&self) -> VisibleControls {
        compose(&self.overrides, &self.permissions.defaults())
    }

    pub fn chat(&self) -> ChatAffordance {
        chat_affordance(&self.visible_controls(), self.agent_available)
    }

    pub fn chat_open(&self) -> bool {
        self.chat_open
    }

    pub fn set_chat_open(&mut self, open: bool) {
        if open == self.chat_open {
            return;
        }
        self.chat_open = open;
        if let Some(callback) = &self.on_chat_open_change {
            callback(open);
        }
    }

    pub fn toggle_chat(&mut self) {
        self.set_chat_open(!self.chat_open);
    }

    /// Send a chat message to the agent
    ///
    /// An ended session is reported before anything about the message itself.
    pub fn send_chat(&mut self, text: &str) -> Result<Uuid> {
        if !self.session.is_active() {
            return Err(CompanionError::SessionUnavailable);
        }
        if text.trim().is_empty() {
            return Err(SendError::EmptyMessage.into());
        }
        if !self.visible_controls().chat {
            return Err(SendError::Rejected("chat is not available".to_string()).into());
        }
        if !self.agent_available {
            return Err(SendError::AgentUnavailable.into());
        }
        self.session.send_message(text)
    }

    /// Leave is clickable only while the session is active
    pub fn leave_enabled(&self) -> bool {
        self.session.is_active()
    }

    /// End the session, tear down local state, then notify the caller
    pub fn disconnect(&mut self) {
        let ended = self.session.end_session();
        self.input.unmount();
        if ended {
            info!("Control bar disconnected");
            if let Some(callback) = &self.on_disconnect {
                callback();
            }
        }
    }

    /// Apply finished device and chat requests
    pub fn poll(&mut self) -> usize {
        self.input.poll() + self.session.poll()
    }
}
