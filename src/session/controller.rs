//! Session lifecycle and chat delivery on top of a [`SessionBackend`]

use crate::messages::{DeliveryStatus, Message, MessageStorage};
use crate::session::backend::{SendError, SessionBackend};
use crate::{CompanionError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub type SendErrorCallback = Arc<dyn Fn(&SendError) + Send + Sync>;

struct SendResult {
    message_id: Uuid,
    outcome: std::result::Result<(), SendError>,
}

pub struct SessionController {
    backend: Arc<dyn SessionBackend>,
    runtime: Handle,
    transcript: MessageStorage,
    result_tx: Sender<SendResult>,
    result_rx: Receiver<SendResult>,
    last_send_error: Option<SendError>,
    on_send_error: Option<SendErrorCallback>,
    ended: bool,
}

impl SessionController {
    pub fn new(backend: Arc<dyn SessionBackend>, runtime: Handle) -> Self {
        let (result_tx, result_rx) = unbounded();
        Self {
            backend,
            runtime,
            transcript: MessageStorage::new(),
            result_tx,
            result_rx,
            last_send_error: None,
            on_send_error: None,
            ended: false,
        }
    }

    pub fn with_send_error_callback(mut self, callback: SendErrorCallback) -> Self {
        self.on_send_error = Some(callback);
        self
    }

    pub fn is_active(&self) -> bool {
        !self.ended && self.backend.is_active()
    }

    pub fn transcript(&self) -> &MessageStorage {
        &self.transcript
    }

    pub fn last_send_error(&self) -> Option<&SendError> {
        self.last_send_error.as_ref()
    }

    /// Queue a chat message for delivery
    ///
    /// The message is added to the transcript immediately; delivery is
    /// reported through [`poll`](Self::poll).
    pub fn send_message(&mut self, text: &str) -> Result<Uuid> {
        if !self.is_active() {
            return Err(CompanionError::SessionUnavailable);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::EmptyMessage.into());
        }

        let message = Message::outgoing(text);
        let message_id = message.id;
        self.transcript.add(message);
        self.last_send_error = None;

        let delivery = self.backend.send_message(text.to_string());
        let tx = self.result_tx.clone();
        self.runtime.spawn(async move {
            let outcome = delivery.await;
            // receiver gone means the controller was dropped; nothing to update
            let _ = tx.send(SendResult { message_id, outcome });
        });
        debug!("Queued chat message {}", message_id);

        Ok(message_id)
    }

    /// Record a message received from the agent
    pub fn receive_message(&mut self, text: &str) {
        self.transcript.add(Message::incoming(text));
    }

    /// Apply finished deliveries; returns how many were processed
    pub fn poll(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(result) = self.result_rx.try_recv() {
            processed += 1;
            match result.outcome {
                Ok(()) => {
                    self.transcript
                        .set_delivery(result.message_id, DeliveryStatus::Delivered);
                }
                Err(error) => {
                    warn!("Chat message {} failed: {}", result.message_id, error);
                    self.transcript.set_delivery(
                        result.message_id,
                        DeliveryStatus::Failed(error.to_string()),
                    );
                    if let Some(callback) = &self.on_send_error {
                        callback(&error);
                    }
                    self.last_send_error = Some(error);
                }
            }
        }
        processed
    }

    /// End the session once; later calls are no-ops and return false
    pub fn end_session(&mut self) -> bool {
        if self.ended {
            return false;
        }
        self.ended = true;
        self.backend.end_session();
        info!("Session ended");
        true
    }
}
