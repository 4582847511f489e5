//! Async control-flow tests for toggles, device selection and the control bar
//!
//! A gated fake collaborator holds every enable request until the test
//! releases it, so ordering and stale-result handling can be checked.

use companion::controls::{
    ControlBar, ControlBarOptions, ControlOverrides, DeviceChoiceStore, DeviceError,
    DeviceErrorEvent, DeviceErrorKind, DeviceKind, InputControls, InputControlsOptions,
    MediaDeviceInfo, MemoryStore, ParticipantPermissions,
};
use companion::messages::DeliveryStatus;
use companion::session::{MediaDevices, RemoteParticipant, SendError, SessionBackend};
use companion::CompanionError;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

struct PendingCall {
    kind: DeviceKind,
    enabled: bool,
    device_id: Option<String>,
    reply: oneshot::Sender<Result<bool, DeviceError>>,
}

impl PendingCall {
    fn resolve(self, outcome: Result<bool, DeviceError>) {
        let _ = self.reply.send(outcome);
    }
}

/// Media and session collaborator whose enable requests wait for the test
#[derive(Default)]
struct GatedCollaborator {
    calls: Mutex<VecDeque<PendingCall>>,
    switched: Mutex<Vec<(DeviceKind, String)>>,
    known_devices: Mutex<Vec<String>>,
    log: Arc<Mutex<Vec<String>>>,
    ended: AtomicBool,
    fail_sends: AtomicBool,
}

impl GatedCollaborator {
    fn new() -> Arc<Self> {
        let collaborator = Self::default();
        collaborator
            .known_devices
            .lock()
            .extend(["default".to_string(), "usb-1".to_string()]);
        Arc::new(collaborator)
    }

    fn take_call(&self) -> PendingCall {
        self.calls
            .lock()
            .pop_front()
            .expect("expected a pending enable request")
    }

    fn pending_calls(&self) -> usize {
        self.calls.lock().len()
    }
}

impl MediaDevices for GatedCollaborator {
    fn set_enabled(
        &self,
        kind: DeviceKind,
        enabled: bool,
        device_id: Option<String>,
    ) -> BoxFuture<'static, Result<bool, DeviceError>> {
        let (reply, rx) = oneshot::channel();
        self.calls.lock().push_back(PendingCall {
            kind,
            enabled,
            device_id,
            reply,
        });
        async move {
            rx.await
                .unwrap_or_else(|_| Err(DeviceError::new(DeviceErrorKind::Unknown, "dropped")))
        }
        .boxed()
    }

    fn switch_device(
        &self,
        kind: DeviceKind,
        device_id: String,
    ) -> BoxFuture<'static, Result<(), DeviceError>> {
        let known = self.known_devices.lock().contains(&device_id);
        if known {
            self.switched.lock().push((kind, device_id));
        }
        async move {
            if known {
                Ok(())
            } else {
                Err(DeviceError::not_found("no such device"))
            }
        }
        .boxed()
    }
}

impl SessionBackend for GatedCollaborator {
    fn is_active(&self) -> bool {
        !self.ended.load(Ordering::SeqCst)
    }

    fn send_message(&self, _text: String) -> BoxFuture<'static, Result<(), SendError>> {
        let fail = self.fail_sends.load(Ordering::SeqCst);
        async move {
            if fail {
                Err(SendError::NoTransport)
            } else {
                Ok(())
            }
        }
        .boxed()
    }

    fn end_session(&self) {
        self.ended.store(true, Ordering::SeqCst);
        self.log.lock().push("end_session".to_string());
    }
}

/// Poll until `expected` results have been applied or two seconds pass
async fn settle(mut poll: impl FnMut() -> usize, expected: usize) -> usize {
    let mut applied = 0;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while applied < expected && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(5)).await;
        applied += poll();
    }
    applied
}

fn error_collector() -> (
    Arc<Mutex<Vec<DeviceErrorEvent>>>,
    companion::controls::DeviceErrorCallback,
) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let callback: companion::controls::DeviceErrorCallback =
        Arc::new(move |event: &DeviceErrorEvent| sink.lock().push(event.clone()));
    (events, callback)
}

fn input_controls(
    collaborator: &Arc<GatedCollaborator>,
    store: Arc<dyn DeviceChoiceStore>,
    options: InputControlsOptions,
) -> InputControls {
    let devices: Arc<dyn MediaDevices> = collaborator.clone();
    InputControls::new(devices, store, Handle::current(), options)
}

/// A second request while the first is pending fails fast; the first still applies
#[tokio::test]
async fn test_pending_toggle_rejects_second_request() {
    let collaborator = GatedCollaborator::new();
    let mut controls = input_controls(
        &collaborator,
        Arc::new(MemoryStore::new()),
        InputControlsOptions::default(),
    );

    controls.toggle(DeviceKind::Camera, true).unwrap();
    assert!(controls.is_pending(DeviceKind::Camera));

    let second = controls.toggle(DeviceKind::Camera, false);
    assert!(matches!(
        second,
        Err(CompanionError::InvalidState {
            kind: DeviceKind::Camera
        })
    ));
    assert_eq!(collaborator.pending_calls(), 1);

    let call = collaborator.take_call();
    assert_eq!(call.kind, DeviceKind::Camera);
    assert!(call.enabled);
    call.resolve(Ok(true));

    assert_eq!(settle(|| controls.poll(), 1).await, 1);
    let state = controls.state(DeviceKind::Camera);
    assert!(state.enabled);
    assert!(!state.pending);
    assert!(state.last_error.is_none());
}

/// Other kinds are independent while one kind is pending
#[tokio::test]
async fn test_kinds_toggle_independently() {
    let collaborator = GatedCollaborator::new();
    let mut controls = input_controls(
        &collaborator,
        Arc::new(MemoryStore::new()),
        InputControlsOptions::default(),
    );

    controls.toggle(DeviceKind::Microphone, true).unwrap();
    controls.toggle(DeviceKind::ScreenShare, true).unwrap();
    assert!(controls.any_pending());
    assert_eq!(collaborator.pending_calls(), 2);

    collaborator.take_call().resolve(Ok(true));
    collaborator.take_call().resolve(Ok(true));
    assert_eq!(settle(|| controls.poll(), 2).await, 2);

    assert!(controls.state(DeviceKind::Microphone).enabled);
    assert!(controls.state(DeviceKind::ScreenShare).enabled);
    assert!(!controls.state(DeviceKind::Camera).enabled);
}

/// A denied request keeps the previous state and reports the error once
#[tokio::test]
async fn test_permission_denied_reports_error() {
    let collaborator = GatedCollaborator::new();
    let (events, callback) = error_collector();
    let mut controls = input_controls(
        &collaborator,
        Arc::new(MemoryStore::new()),
        InputControlsOptions::default().with_error_callback(callback),
    );

    controls.toggle(DeviceKind::Microphone, true).unwrap();
    collaborator
        .take_call()
        .resolve(Err(DeviceError::permission_denied("blocked by user")));
    assert_eq!(settle(|| controls.poll(), 1).await, 1);

    let state = controls.state(DeviceKind::Microphone);
    assert!(!state.enabled);
    assert!(!state.pending);
    assert_eq!(
        state.last_error.map(|e| e.kind),
        Some(DeviceErrorKind::PermissionDenied)
    );

    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, DeviceKind::Microphone);
    assert_eq!(events[0].error.kind, DeviceErrorKind::PermissionDenied);
}

/// Results arriving after unmount are ignored and nothing is reported
#[tokio::test]
async fn test_stale_result_after_unmount_is_discarded() {
    let collaborator = GatedCollaborator::new();
    let (events, callback) = error_collector();
    let mut controls = input_controls(
        &collaborator,
        Arc::new(MemoryStore::new()),
        InputControlsOptions::default().with_error_callback(callback),
    );

    controls.toggle(DeviceKind::Camera, true).unwrap();
    controls.unmount();
    assert!(!controls.is_mounted());

    collaborator
        .take_call()
        .resolve(Err(DeviceError::new(DeviceErrorKind::DeviceInUse, "busy")));
    assert_eq!(settle(|| controls.poll(), 1).await, 0);

    assert!(!controls.state(DeviceKind::Camera).enabled);
    assert!(events.lock().is_empty());
    assert!(matches!(
        controls.toggle(DeviceKind::Camera, true),
        Err(CompanionError::SessionUnavailable)
    ));
}

/// A saved choice is restored at mount and sent with the next enable request
#[tokio::test]
async fn test_saved_device_is_restored() {
    let collaborator = GatedCollaborator::new();
    let store = Arc::new(MemoryStore::new());
    store.save(DeviceKind::Microphone, "usb-1").unwrap();

    let mut controls = input_controls(&collaborator, store, InputControlsOptions::default());
    assert_eq!(
        controls.view(DeviceKind::Microphone).device_id.as_deref(),
        Some("usb-1")
    );

    controls.toggle(DeviceKind::Microphone, true).unwrap();
    let call = collaborator.take_call();
    assert_eq!(call.device_id.as_deref(), Some("usb-1"));
    call.resolve(Ok(true));
    settle(|| controls.poll(), 1).await;
}

/// Device choices are written only once the switch succeeded
#[tokio::test]
async fn test_device_choice_persisted_after_success() {
    let collaborator = GatedCollaborator::new();
    let store = Arc::new(MemoryStore::new());
    let (events, callback) = error_collector();
    let mut controls = input_controls(
        &collaborator,
        store.clone(),
        InputControlsOptions::default().with_error_callback(callback),
    );

    controls
        .select_device(DeviceKind::Microphone, "usb-1")
        .unwrap();
    assert_eq!(settle(|| controls.poll(), 1).await, 1);
    assert_eq!(store.load(DeviceKind::Microphone).as_deref(), Some("usb-1"));

    controls
        .select_device(DeviceKind::Microphone, "unplugged")
        .unwrap();
    assert_eq!(settle(|| controls.poll(), 1).await, 1);
    assert_eq!(store.load(DeviceKind::Microphone).as_deref(), Some("usb-1"));

    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].error.kind, DeviceErrorKind::DeviceNotFound);
}

/// With persistence off nothing reaches the store
#[tokio::test]
async fn test_no_persistence_when_disabled() {
    let collaborator = GatedCollaborator::new();
    let store = Arc::new(MemoryStore::new());
    let mut controls = input_controls(
        &collaborator,
        store.clone(),
        InputControlsOptions::default().without_persistence(),
    );

    controls.select_device(DeviceKind::Camera, "usb-1").unwrap();
    assert_eq!(settle(|| controls.poll(), 1).await, 1);

    assert_eq!(store.load(DeviceKind::Camera), None);
    assert_eq!(
        controls.view(DeviceKind::Camera).device_id.as_deref(),
        Some("usb-1")
    );
}

/// When the collaborator falls back to another device the saved one is re-applied
#[tokio::test]
async fn test_saved_choice_reapplied_on_fallback() {
    let collaborator = GatedCollaborator::new();
    let store = Arc::new(MemoryStore::new());
    store.save(DeviceKind::Microphone, "usb-1").unwrap();
    let mut controls = input_controls(&collaborator, store, InputControlsOptions::default());

    let available = vec![
        MediaDeviceInfo::new(DeviceKind::Microphone, "default", "Default"),
        MediaDeviceInfo::new(DeviceKind::Microphone, "usb-1", "USB Headset"),
    ];
    controls
        .on_active_device_changed(DeviceKind::Microphone, "default", &available)
        .unwrap();
    assert_eq!(settle(|| controls.poll(), 1).await, 1);

    assert_eq!(
        collaborator.switched.lock().last(),
        Some(&(DeviceKind::Microphone, "usb-1".to_string()))
    );

    // saved device gone: stay on the fallback
    let only_default = &available[..1];
    controls
        .on_active_device_changed(DeviceKind::Microphone, "default", only_default)
        .unwrap();
    assert_eq!(settle(|| controls.poll(), 1).await, 0);
    assert_eq!(collaborator.switched.lock().len(), 1);
}

fn control_bar(
    collaborator: &Arc<GatedCollaborator>,
    options: ControlBarOptions,
) -> ControlBar {
    ControlBar::new(
        collaborator.clone(),
        Arc::new(MemoryStore::new()),
        Handle::current(),
        options,
    )
}

/// Leaving ends the session before the caller is notified, and only once
#[tokio::test]
async fn test_disconnect_ends_session_before_callback() {
    let collaborator = GatedCollaborator::new();
    let log = Arc::clone(&collaborator.log);
    let callback_log = Arc::clone(&log);
    let options = ControlBarOptions {
        on_disconnect: Some(Arc::new(move || {
            callback_log.lock().push("on_disconnect".to_string())
        })),
        ..Default::default()
    };
    let mut bar = control_bar(&collaborator, options);

    bar.input_mut().toggle(DeviceKind::Camera, true).unwrap();
    assert!(bar.leave_enabled());

    bar.disconnect();
    assert_eq!(*log.lock(), vec!["end_session", "on_disconnect"]);
    assert!(!bar.leave_enabled());
    assert!(!bar.input().is_mounted());

    bar.disconnect();
    assert_eq!(log.lock().len(), 2);

    // the toggle started before leaving never lands
    collaborator.take_call().resolve(Ok(true));
    settle(|| bar.poll(), 1).await;
    assert!(!bar.input().state(DeviceKind::Camera).enabled);
}

/// Overrides win over permission defaults; leave is visible by default
#[tokio::test]
async fn test_overrides_compose_with_permissions() {
    let collaborator = GatedCollaborator::new();
    let options = ControlBarOptions {
        controls: ControlOverrides {
            camera: Some(false),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut bar = control_bar(&collaborator, options);

    bar.update_permissions(Some(&ParticipantPermissions::all()));
    let visible = bar.visible_controls();
    assert!(!visible.camera);
    assert!(visible.microphone);
    assert!(visible.screen_share);
    assert!(visible.chat);
    assert!(visible.leave);

    bar.update_permissions(None);
    let visible = bar.visible_controls();
    assert!(!visible.microphone);
    assert!(!visible.chat);
    assert!(visible.leave);
}

/// Chat sending needs a visible chat control and an agent in the room
#[tokio::test]
async fn test_chat_send_requires_agent() {
    let collaborator = GatedCollaborator::new();
    let mut bar = control_bar(&collaborator, ControlBarOptions::default());
    bar.update_permissions(Some(&ParticipantPermissions::all()));

    assert!(bar.chat().input_visible);
    assert!(!bar.chat().send_enabled);
    assert!(matches!(
        bar.send_chat("hello"),
        Err(CompanionError::Send(SendError::AgentUnavailable))
    ));

    bar.update_participants(&[RemoteParticipant::new("wellness-agent", true)]);
    assert!(bar.chat().send_enabled);
    assert!(matches!(
        bar.send_chat("   "),
        Err(CompanionError::Send(SendError::EmptyMessage))
    ));

    let id = bar.send_chat("  I slept well  ").unwrap();
    assert_eq!(settle(|| bar.poll(), 1).await, 1);
    let message = bar.session().transcript().get(id).unwrap();
    assert_eq!(message.text, "I slept well");
    assert_eq!(message.delivery, DeliveryStatus::Delivered);

    bar.disconnect();
    assert!(matches!(
        bar.send_chat("still there?"),
        Err(CompanionError::SessionUnavailable)
    ));
}

/// Hidden chat rejects sends even with an agent present
#[tokio::test]
async fn test_hidden_chat_rejects_send() {
    let collaborator = GatedCollaborator::new();
    let options = ControlBarOptions {
        controls: ControlOverrides {
            chat: Some(false),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut bar = control_bar(&collaborator, options);
    bar.update_permissions(Some(&ParticipantPermissions::all()));
    bar.update_participants(&[RemoteParticipant::new("wellness-agent", true)]);

    assert!(bar.chat().toggle_visible);
    assert!(!bar.chat().input_visible);
    assert!(matches!(
        bar.send_chat("hello"),
        Err(CompanionError::Send(SendError::Rejected(_)))
    ));
    assert!(bar.session().transcript().is_empty());
}

/// An ended session is reported ahead of message and agent problems
#[tokio::test]
async fn test_send_error_order_without_agent() {
    let collaborator = GatedCollaborator::new();
    let mut bar = control_bar(&collaborator, ControlBarOptions::default());
    bar.update_permissions(Some(&ParticipantPermissions::all()));
    bar.update_participants(&[]);

    assert!(matches!(
        bar.send_chat("   "),
        Err(CompanionError::Send(SendError::EmptyMessage))
    ));
    assert!(matches!(
        bar.send_chat("hi"),
        Err(CompanionError::Send(SendError::AgentUnavailable))
    ));

    bar.disconnect();
    assert!(matches!(
        bar.send_chat("hi"),
        Err(CompanionError::SessionUnavailable)
    ));
    assert!(matches!(
        bar.send_chat("   "),
        Err(CompanionError::SessionUnavailable)
    ));
    assert!(bar.session().transcript().is_empty());
}

/// Overrides can change while mounted and win over permissions at once
#[tokio::test]
async fn test_overrides_replaced_while_mounted() {
    let collaborator = GatedCollaborator::new();
    let mut bar = control_bar(&collaborator, ControlBarOptions::default());
    bar.update_permissions(Some(&ParticipantPermissions::all()));
    bar.update_participants(&[RemoteParticipant::new("wellness-agent", true)]);
    assert!(bar.visible_controls().camera);

    bar.set_overrides(ControlOverrides {
        camera: Some(false),
        chat: Some(false),
        ..Default::default()
    });
    assert!(!bar.visible_controls().camera);
    assert!(matches!(
        bar.send_chat("hello"),
        Err(CompanionError::Send(SendError::Rejected(_)))
    ));

    bar.set_overrides(ControlOverrides::default());
    assert!(bar.visible_controls().camera);
    assert!(bar.send_chat("hello").is_ok());
}

/// Failed deliveries are marked in the transcript and reported
#[tokio::test]
async fn test_send_failure_is_reported() {
    let collaborator = GatedCollaborator::new();
    collaborator.fail_sends.store(true, Ordering::SeqCst);
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    let options = ControlBarOptions {
        on_send_error: Some(Arc::new(move |e: &SendError| sink.lock().push(e.clone()))),
        ..Default::default()
    };
    let mut bar = control_bar(&collaborator, options);
    bar.update_permissions(Some(&ParticipantPermissions::all()));
    bar.update_participants(&[RemoteParticipant::new("wellness-agent", true)]);

    let id = bar.send_chat("hello").unwrap();
    assert_eq!(settle(|| bar.poll(), 1).await, 1);

    let message = bar.session().transcript().get(id).unwrap();
    assert!(matches!(message.delivery, DeliveryStatus::Failed(_)));
    assert_eq!(*errors.lock(), vec![SendError::NoTransport]);
    assert_eq!(bar.session().last_send_error(), Some(&SendError::NoTransport));
}

/// Chat-open changes notify the caller only on change
#[tokio::test]
async fn test_chat_open_callback() {
    let collaborator = GatedCollaborator::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let options = ControlBarOptions {
        on_chat_open_change: Some(Arc::new(move |open: bool| sink.lock().push(open))),
        ..Default::default()
    };
    let mut bar = control_bar(&collaborator, options);

    bar.toggle_chat();
    bar.set_chat_open(true);
    bar.toggle_chat();
    assert_eq!(*seen.lock(), vec![true, false]);
    assert!(!bar.chat_open());
}
