use super::types::{DeliveryStatus, Message};
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Chat transcript shared between the session controller and the UI
#[derive(Debug, Clone)]
pub struct MessageStorage {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl MessageStorage {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn add(&self, message: Message) {
        self.messages.write().push(message);
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<Message> {
        self.messages.read().iter().find(|m| m.id == id).cloned()
    }

    /// Update delivery status; returns false if the message is unknown
    pub fn set_delivery(&self, id: Uuid, delivery: DeliveryStatus) -> bool {
        match self.messages.write().iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.delivery = delivery;
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        self.messages.write().clear();
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

impl Default for MessageStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Sender;

    #[test]
    fn test_add_and_update_delivery() {
        let storage = MessageStorage::new();
        let message = Message::outgoing("hello");
        let id = message.id;
        storage.add(message);
        storage.add(Message::incoming("hi there"));

        assert_eq!(storage.len(), 2);
        assert!(storage.set_delivery(id, DeliveryStatus::Delivered));
        assert_eq!(storage.get(id).unwrap().delivery, DeliveryStatus::Delivered);
        assert_eq!(storage.get_all()[1].sender, Sender::Agent);
    }

    #[test]
    fn test_unknown_message_update() {
        let storage = MessageStorage::new();
        assert!(!storage.set_delivery(Uuid::new_v4(), DeliveryStatus::Delivered));
    }

    #[test]
    fn test_clones_share_transcript() {
        let storage = MessageStorage::new();
        let view = storage.clone();
        storage.add(Message::outgoing("shared"));
        assert_eq!(view.len(), 1);
        view.clear();
        assert!(storage.is_empty());
    }
}
