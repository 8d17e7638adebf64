//! Client factory

use std::sync::Arc;

use crate::config::{ClientKind, ClientSettings};

use super::console::{ConsoleClient, ConsoleOptions};
use super::transport::{Transport, TransportClient};
use super::MailClient;

/// Create a mail client based on configuration.
///
/// Returns the implementation selected by `settings.kind`:
/// - `"transport"`: a `TransportClient` if a transport is provided
/// - `"console"` (default): a `ConsoleClient` honouring `settings.trap`
///
/// # Example
///
/// ```rust,ignore
/// let client = create_client(&settings.client, Some(Arc::new(MyRelay::new())));
/// ```
pub fn create_client(
    settings: &ClientSettings,
    transport: Option<Arc<dyn Transport>>,
) -> Arc<dyn MailClient> {
    match settings.kind {
        ClientKind::Transport => {
            if let Some(transport) = transport {
                tracing::info!(client = "transport", "Creating transport mail client");
                Arc::new(TransportClient::new(transport))
            } else {
                tracing::warn!(
                    trap = settings.trap,
                    "Transport client requested but no transport provided, falling back to console"
                );
                Arc::new(ConsoleClient::new(ConsoleOptions { trap: settings.trap }))
            }
        }
        ClientKind::Console => {
            tracing::info!(client = "console", trap = settings.trap, "Creating console mail client");
            Arc::new(ConsoleClient::new(ConsoleOptions { trap: settings.trap }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{DeliveryError, Message};
    use async_trait::async_trait;

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn deliver(&self, _message: &Message) -> Result<Option<String>, DeliveryError> {
            Ok(None)
        }
    }

    #[test]
    fn test_console_selected() {
        let settings = ClientSettings {
            kind: ClientKind::Console,
            trap: true,
        };
        let client = create_client(&settings, None);
        assert_eq!(client.name(), "console");
        assert!(client.trap_buffer().is_some());
    }

    #[test]
    fn test_transport_selected() {
        let settings = ClientSettings {
            kind: ClientKind::Transport,
            trap: false,
        };
        let client = create_client(&settings, Some(Arc::new(NullTransport)));
        assert_eq!(client.name(), "transport");
        assert!(client.trap_buffer().is_none());
    }

    #[test]
    fn test_transport_without_collaborator_falls_back() {
        let settings = ClientSettings {
            kind: ClientKind::Transport,
            trap: true,
        };
        let client = create_client(&settings, None);
        assert_eq!(client.name(), "console");
        assert!(client.trap_buffer().is_some());
    }
}
