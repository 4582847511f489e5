//! Application state shared by the window and its components

use crate::config::WidgetConfig;
use crate::controls::{
    ControlBar, ControlBarOptions, DeviceChoiceStore, DeviceErrorEvent, DeviceKind,
    MediaDeviceInfo,
};
use crate::layout::{LayoutFrame, LayoutTracker};
use crate::session::{SecondTileSource, SendError, SimulatedSession};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{info, warn};

/// How long after a layout change frames keep being requested
const ANIMATION_WINDOW: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPhase {
    /// Start screen
    #[default]
    Welcome,
    /// Connected; tiles and control bar are shown
    Session,
}

/// Latest layout plus the one it replaced
#[derive(Debug, Clone, Copy)]
pub struct LayoutSnapshot {
    pub frame: LayoutFrame,
    pub previous: Option<LayoutFrame>,
    pub changed_at: Instant,
}

pub struct AppState {
    pub config: WidgetConfig,
    pub phase: AppPhase,
    /// Collaborator for the running session
    pub session: Option<SimulatedSession>,
    pub control_bar: Option<ControlBar>,
    pub chat_draft: String,
    /// Last error shown under the control bar
    pub status: Option<String>,
    pub layout: Option<LayoutSnapshot>,

    tracker: LayoutTracker,
    runtime: Handle,
    store: Arc<dyn DeviceChoiceStore>,
    disconnected: Arc<AtomicBool>,
    device_errors: Arc<Mutex<Vec<DeviceErrorEvent>>>,
    send_errors: Arc<Mutex<Vec<SendError>>>,
}

impl AppState {
    pub fn new(config: WidgetConfig, runtime: Handle, store: Arc<dyn DeviceChoiceStore>) -> Self {
        Self {
            config,
            phase: AppPhase::Welcome,
            session: None,
            control_bar: None,
            chat_draft: String::new(),
            status: None,
            layout: None,
            tracker: LayoutTracker::new(),
            runtime,
            store,
            disconnected: Arc::new(AtomicBool::new(false)),
            device_errors: Arc::new(Mutex::new(Vec::new())),
            send_errors: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn is_in_session(&self) -> bool {
        self.phase == AppPhase::Session
    }

    /// Connect a new session and mount a fresh control bar
    pub fn start_session(&mut self) {
        if self.is_in_session() {
            return;
        }

        let session = SimulatedSession::new(self.config.simulated_latency());
        self.disconnected.store(false, Ordering::SeqCst);

        let disconnected = Arc::clone(&self.disconnected);
        let device_errors = Arc::clone(&self.device_errors);
        let send_errors = Arc::clone(&self.send_errors);
        let options = ControlBarOptions {
            controls: self.config.controls,
            save_user_choices: self.config.save_user_choices,
            on_disconnect: Some(Arc::new(move || {
                disconnected.store(true, Ordering::SeqCst);
            })),
            on_chat_open_change: None,
            on_device_error: Some(Arc::new(move |event: &DeviceErrorEvent| {
                device_errors.lock().push(event.clone());
            })),
            on_send_error: Some(Arc::new(move |error: &SendError| {
                send_errors.lock().push(error.clone());
            })),
        };

        let bar = ControlBar::new(
            Arc::new(session.clone()),
            Arc::clone(&self.store),
            self.runtime.clone(),
            options,
        );

        self.session = Some(session);
        self.control_bar = Some(bar);
        self.chat_draft.clear();
        self.status = None;
        self.tracker.reset();
        self.layout = None;
        self.phase = AppPhase::Session;
        // seed permissions and participants before the first render
        self.sync_session();
        info!("Session started");
    }

    /// Pull collaborator state and finished requests into the UI
    pub fn poll(&mut self) {
        if let Some(bar) = self.control_bar.as_mut() {
            bar.poll();
        }
        self.sync_session();

        for event in self.device_errors.lock().drain(..) {
            warn!("{} error: {}", event.kind, event.error);
            self.status = Some(format!("{}: {}", event.kind, event.error.kind.user_message()));
        }
        for error in self.send_errors.lock().drain(..) {
            self.status = Some(format!("Message not delivered: {}", error));
        }

        if self.disconnected.swap(false, Ordering::SeqCst) {
            self.return_to_welcome();
        }
    }

    fn sync_session(&mut self) {
        let (Some(session), Some(bar)) = (self.session.as_ref(), self.control_bar.as_mut()) else {
            return;
        };
        bar.update_permissions(session.permissions().as_ref());
        bar.update_participants(&session.participants());

        for text in session.take_agent_messages() {
            bar.session_mut().receive_message(&text);
        }

        let tracks = session.tracks();
        for (kind, source) in [
            (DeviceKind::Camera, SecondTileSource::Camera),
            (DeviceKind::ScreenShare, SecondTileSource::ScreenShare),
        ] {
            if !bar.input().is_pending(kind) {
                bar.input_mut().observe_track(kind, tracks.is_live(source));
            }
        }

        let signals = session.signals(bar.chat_open());
        let frame = self.tracker.update(&signals);
        let changed = self.layout.map(|l| l.frame != frame).unwrap_or(true);
        if changed {
            self.layout = Some(LayoutSnapshot {
                frame,
                previous: self.layout.map(|l| l.frame),
                changed_at: Instant::now(),
            });
        }
    }

    pub fn toggle_device(&mut self, kind: DeviceKind) {
        let Some(bar) = self.control_bar.as_mut() else {
            return;
        };
        if let Err(e) = bar.input_mut().flip(kind) {
            self.status = Some(e.user_message());
        }
    }

    pub fn select_device(&mut self, kind: DeviceKind, device_id: &str) {
        let Some(bar) = self.control_bar.as_mut() else {
            return;
        };
        if let Err(e) = bar.input_mut().select_device(kind, device_id) {
            self.status = Some(e.user_message());
        }
    }

    pub fn devices(&self, kind: DeviceKind) -> Vec<MediaDeviceInfo> {
        self.session
            .as_ref()
            .map(|s| s.devices(kind))
            .unwrap_or_default()
    }

    pub fn toggle_chat(&mut self) {
        if let Some(bar) = self.control_bar.as_mut() {
            bar.toggle_chat();
        }
        self.sync_session();
    }

    pub fn chat_open(&self) -> bool {
        self.control_bar.as_ref().is_some_and(|b| b.chat_open())
    }

    /// Send the draft; the draft is kept when sending fails
    pub fn send_chat(&mut self) {
        let Some(bar) = self.control_bar.as_mut() else {
            return;
        };
        match bar.send_chat(&self.chat_draft) {
            Ok(_) => {
                self.chat_draft.clear();
                self.status = None;
            }
            Err(e) => self.status = Some(e.user_message()),
        }
    }

    /// Leave the session and go back to the welcome view
    pub fn leave(&mut self) {
        if let Some(bar) = self.control_bar.as_mut() {
            bar.disconnect();
        }
        self.poll();
    }

    fn return_to_welcome(&mut self) {
        self.control_bar = None;
        self.session = None;
        self.layout = None;
        self.tracker.reset();
        self.chat_draft.clear();
        self.phase = AppPhase::Welcome;
        info!("Returned to welcome view");
    }

    /// Something is still switching and needs another frame
    pub fn needs_repaint(&self) -> bool {
        let pending = self
            .control_bar
            .as_ref()
            .is_some_and(|b| b.input().any_pending());
        let animating = self
            .layout
            .is_some_and(|l| l.frame.is_animating() && l.changed_at.elapsed() < ANIMATION_WINDOW);
        pending || animating
    }
}
