//! Message envelope, delivery receipt, and delivery error types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A rendered message ready to be handed to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Recipient address
    pub to: String,

    /// Sender address, if one is configured or supplied by the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Subject line
    pub subject: String,

    /// Rendered body
    pub body: String,
}

/// Proof of a successful send attempt
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReceipt {
    /// Locally assigned message ID
    pub message_id: Uuid,

    /// Name of the client that handled the message
    pub client: &'static str,

    /// Identifier returned by the downstream transport, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,

    /// Whether the message was captured instead of delivered
    pub trapped: bool,

    /// When the client finished handling the message
    pub delivered_at: DateTime<Utc>,
}

impl DeliveryReceipt {
    pub fn new(client: &'static str) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            client,
            provider_id: None,
            trapped: false,
            delivered_at: Utc::now(),
        }
    }

    pub fn trapped(mut self) -> Self {
        self.trapped = true;
        self
    }

    pub fn with_provider_id(mut self, provider_id: Option<String>) -> Self {
        self.provider_id = provider_id;
        self
    }
}

/// Failure reported by a client's send attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Transport unreachable: {0}")]
    Unreachable(String),

    #[error("Message rejected: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),
}
