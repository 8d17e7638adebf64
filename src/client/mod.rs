//! Delivery clients.
//!
//! A client receives a fully rendered [`Message`] and performs one delivery
//! attempt. Two variants exist:
//!
//! - `ConsoleClient`: logs the message, or with `trap` enabled captures it into
//!   a [`TrapBuffer`] so tests can inspect what would have been sent
//! - `TransportClient`: hands the message to a caller-supplied [`Transport`]
//!
//! Use [`console`] / [`transport`] to build a client directly, or
//! [`create_client`] to pick one from configuration.

mod console;
mod factory;
mod transport;
mod trap;
mod types;

use std::sync::Arc;

use async_trait::async_trait;

pub use console::{ConsoleClient, ConsoleOptions};
pub use factory::create_client;
pub use transport::{Transport, TransportClient};
pub use trap::TrapBuffer;
pub use types::{DeliveryError, DeliveryReceipt, Message};

/// Capability to deliver a rendered message.
#[async_trait]
pub trait MailClient: Send + Sync {
    /// Short, stable client name used in receipts, logs and metrics
    fn name(&self) -> &'static str;

    /// Capture buffer, for clients running in trap mode
    fn trap_buffer(&self) -> Option<TrapBuffer> {
        None
    }

    /// Perform a single delivery attempt
    async fn send(&self, message: &Message) -> Result<DeliveryReceipt, DeliveryError>;
}

/// Build a console client
pub fn console(options: ConsoleOptions) -> Arc<dyn MailClient> {
    Arc::new(ConsoleClient::new(options))
}

/// Build a client that delivers through the given transport
pub fn transport(transport: Arc<dyn Transport>) -> Arc<dyn MailClient> {
    Arc::new(TransportClient::new(transport))
}
