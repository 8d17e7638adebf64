//! Console client: logs or traps messages, never touches the network

use async_trait::async_trait;

use crate::metrics::DispatchMetrics;

use super::trap::TrapBuffer;
use super::types::{DeliveryError, DeliveryReceipt, Message};
use super::MailClient;

/// Options recognised by the console client factory
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleOptions {
    /// Capture messages into the trap buffer instead of printing them
    pub trap: bool,
}

/// Console mail client.
///
/// With `trap` enabled every message is appended to a [`TrapBuffer`] for later
/// inspection. Otherwise the message is written to the log.
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    trap: bool,
    buffer: TrapBuffer,
}

impl ConsoleClient {
    pub fn new(options: ConsoleOptions) -> Self {
        Self {
            trap: options.trap,
            buffer: TrapBuffer::new(),
        }
    }

    /// Whether this client captures instead of printing
    pub fn is_trapping(&self) -> bool {
        self.trap
    }
}

#[async_trait]
impl MailClient for ConsoleClient {
    fn name(&self) -> &'static str {
        "console"
    }

    fn trap_buffer(&self) -> Option<TrapBuffer> {
        self.trap.then(|| self.buffer.clone())
    }

    async fn send(&self, message: &Message) -> Result<DeliveryReceipt, DeliveryError> {
        if self.trap {
            let captured = self.buffer.push(message.clone()).await;
            DispatchMetrics::record_trapped();

            tracing::debug!(
                to = %message.to,
                subject = %message.subject,
                captured = captured,
                "Message trapped (console)"
            );

            return Ok(DeliveryReceipt::new(self.name()).trapped());
        }

        tracing::info!(
            to = %message.to,
            from = message.from.as_deref().unwrap_or(""),
            subject = %message.subject,
            body = %message.body,
            "Message sent (console)"
        );

        Ok(DeliveryReceipt::new(self.name()))
    }
}
