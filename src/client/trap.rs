//! Append-only capture buffer for trapped messages

use std::sync::Arc;

use tokio::sync::RwLock;

use super::types::Message;

/// Shared, append-only record of messages captured by a trapping client.
///
/// Cloning the buffer yields another handle to the same storage, so a test can
/// keep one handle while the client owns another.
#[derive(Debug, Clone, Default)]
pub struct TrapBuffer {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl TrapBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, returning the buffer length after the append
    pub async fn push(&self, message: Message) -> usize {
        let mut messages = self.messages.write().await;
        messages.push(message);
        messages.len()
    }

    /// Copy of every captured message in append order
    pub async fn messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    /// Most recently captured message
    pub async fn last(&self) -> Option<Message> {
        self.messages.read().await.last().cloned()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }
}
