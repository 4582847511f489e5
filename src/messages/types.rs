use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Sending,
    Delivered,
    Failed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub delivery: DeliveryStatus,
}

impl Message {
    /// Outgoing message, awaiting delivery
    pub fn outgoing(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::User,
            text: text.into(),
            timestamp: Utc::now(),
            delivery: DeliveryStatus::Sending,
        }
    }

    /// Message received from the agent
    pub fn incoming(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::Agent,
            text: text.into(),
            timestamp: Utc::now(),
            delivery: DeliveryStatus::Delivered,
        }
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}
