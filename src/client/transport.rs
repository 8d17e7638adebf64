//! Client backed by a caller-supplied delivery transport

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::metrics::DispatchMetrics;

use super::types::{DeliveryError, DeliveryReceipt, Message};
use super::MailClient;

/// A real delivery mechanism (SMTP relay, HTTP mail API, ...).
///
/// Implementations own their wire protocol and credentials. They are called
/// exactly once per message and may return a provider-assigned identifier.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, message: &Message) -> Result<Option<String>, DeliveryError>;
}

/// Mail client that hands every message to a [`Transport`]
#[derive(Clone)]
pub struct TransportClient {
    transport: Arc<dyn Transport>,
}

impl TransportClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl MailClient for TransportClient {
    fn name(&self) -> &'static str {
        "transport"
    }

    async fn send(&self, message: &Message) -> Result<DeliveryReceipt, DeliveryError> {
        let start = Instant::now();
        let result = self.transport.deliver(message).await;
        DispatchMetrics::observe_delivery(start.elapsed().as_secs_f64());

        match result {
            Ok(provider_id) => {
                tracing::debug!(
                    to = %message.to,
                    provider_id = provider_id.as_deref().unwrap_or(""),
                    "Message delivered via transport"
                );
                Ok(DeliveryReceipt::new(self.name()).with_provider_id(provider_id))
            }
            Err(e) => {
                tracing::warn!(
                    to = %message.to,
                    error = %e,
                    "Transport delivery failed"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTransport {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn deliver(&self, _message: &Message) -> Result<Option<String>, DeliveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(DeliveryError::Unreachable("relay down".to_string()))
            } else {
                Ok(Some("provider-1".to_string()))
            }
        }
    }

    fn message() -> Message {
        Message {
            to: "foo@bar.com".to_string(),
            from: Some("noreply@bar.com".to_string()),
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
        }
    }

    #[tokio::test]
    async fn test_delivers_once_with_provider_id() {
        let transport = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let client = TransportClient::new(transport.clone());

        let receipt = client.send(&message()).await.unwrap();

        assert_eq!(receipt.client, "transport");
        assert_eq!(receipt.provider_id.as_deref(), Some("provider-1"));
        assert!(!receipt.trapped);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_retried() {
        let transport = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let client = TransportClient::new(transport.clone());

        let err = client.send(&message()).await.unwrap_err();

        assert_eq!(err, DeliveryError::Unreachable("relay down".to_string()));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }
}
