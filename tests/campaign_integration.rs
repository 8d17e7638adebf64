//! End-to-end dispatch tests
//!
//! These tests drive the public API the way an application would: build a
//! campaign bound to a trapping console client, send, and inspect the trap.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};

use campaign_dispatch::client::{
    self, ConsoleOptions, DeliveryError, Message, Transport, TrapBuffer,
};
use campaign_dispatch::config::{ClientKind, ClientSettings, Settings};
use campaign_dispatch::template::{render, MissingKeyPolicy, Template};
use campaign_dispatch::{Campaign, CampaignConfig, DispatchError, Model, Outcome};

const TEMPLATE: &str = "<p>Some {{data}}</p>";

fn scenario_model() -> Value {
    json!({
        "to": "foo@bar.com",
        "subject": "Awesome Things",
        "data": "interesting stuff"
    })
}

fn trap_campaign(policy: MissingKeyPolicy) -> (Campaign, TrapBuffer) {
    let campaign = Campaign::new(
        CampaignConfig::new(client::console(ConsoleOptions { trap: true }))
            .with_missing_keys(policy),
    );
    let buffer = campaign.trap_buffer().expect("trap client exposes its buffer");
    (campaign, buffer)
}

/// Send and wait for the callback, counting how often it fires
async fn send_and_wait(campaign: &Campaign, template: &str, model: Value) -> (Outcome, usize) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    campaign.send_string(template, model, move |outcome| {
        let _ = tx.send(outcome);
    });

    let outcome = rx.recv().await.expect("callback fired");
    // The sender was moved into the callback, so the channel closes after it runs
    let mut extra = 0;
    while rx.recv().await.is_some() {
        extra += 1;
    }
    (outcome, 1 + extra)
}

struct FlakyTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for FlakyTransport {
    async fn deliver(&self, _message: &Message) -> Result<Option<String>, DeliveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DeliveryError::Unreachable("smtp.example.com:25".to_string()))
    }
}

#[tokio::test]
async fn test_trap_scenario() {
    let (campaign, buffer) = trap_campaign(MissingKeyPolicy::Empty);

    let (outcome, calls) = send_and_wait(&campaign, TEMPLATE, scenario_model()).await;

    let receipt = outcome.expect("trap delivery succeeds");
    assert!(receipt.trapped);
    assert_eq!(calls, 1);

    assert_eq!(
        buffer.messages().await,
        vec![Message {
            to: "foo@bar.com".to_string(),
            from: None,
            subject: "Awesome Things".to_string(),
            body: "<p>Some interesting stuff</p>".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_trapped_body_matches_render() {
    let (campaign, buffer) = trap_campaign(MissingKeyPolicy::Empty);
    let model = scenario_model();

    let expected = render(
        TEMPLATE,
        model.as_object().expect("object model"),
        MissingKeyPolicy::Empty,
    )
    .unwrap();

    send_and_wait(&campaign, TEMPLATE, model).await.0.unwrap();
    send_and_wait(&campaign, TEMPLATE, scenario_model()).await.0.unwrap();

    let messages = buffer.messages().await;
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.body == expected));
}

#[tokio::test]
async fn test_missing_key_permissive() {
    let (campaign, buffer) = trap_campaign(MissingKeyPolicy::Empty);

    let model = json!({ "to": "foo@bar.com", "subject": "Awesome Things" });
    let (outcome, calls) = send_and_wait(&campaign, TEMPLATE, model).await;

    assert!(outcome.is_ok());
    assert_eq!(calls, 1);
    assert_eq!(buffer.last().await.unwrap().body, "<p>Some </p>");
}

#[tokio::test]
async fn test_missing_key_strict() {
    let (campaign, buffer) = trap_campaign(MissingKeyPolicy::Strict);

    let model = json!({ "to": "foo@bar.com", "subject": "Awesome Things" });
    let (outcome, calls) = send_and_wait(&campaign, TEMPLATE, model).await;

    assert_eq!(
        outcome.unwrap_err(),
        DispatchError::MissingKey("data".to_string())
    );
    assert_eq!(calls, 1);
    assert!(buffer.is_empty().await);
    assert_eq!(campaign.stats().total_sent, 0);
}

#[tokio::test]
async fn test_validation_errors_fire_callback_once() {
    let (campaign, buffer) = trap_campaign(MissingKeyPolicy::Empty);

    let (outcome, calls) = send_and_wait(&campaign, "", scenario_model()).await;
    assert!(matches!(outcome, Err(DispatchError::InvalidTemplate(_))));
    assert_eq!(calls, 1);

    let (outcome, calls) = send_and_wait(&campaign, TEMPLATE, json!(["not", "a", "map"])).await;
    assert!(matches!(outcome, Err(DispatchError::InvalidModel(_))));
    assert_eq!(calls, 1);

    let (outcome, calls) = send_and_wait(&campaign, TEMPLATE, json!({ "subject": "x" })).await;
    assert!(matches!(outcome, Err(DispatchError::InvalidModel(_))));
    assert_eq!(calls, 1);

    assert!(buffer.is_empty().await);
    assert_eq!(campaign.stats().total_rejected, 3);
}

#[tokio::test]
async fn test_delivery_failure_through_callback() {
    let transport = Arc::new(FlakyTransport {
        calls: AtomicUsize::new(0),
    });
    let campaign = Campaign::new(CampaignConfig::new(client::transport(transport.clone())));

    let (outcome, calls) = send_and_wait(&campaign, TEMPLATE, scenario_model()).await;

    assert!(matches!(
        outcome,
        Err(DispatchError::Delivery(DeliveryError::Unreachable(_)))
    ));
    assert_eq!(calls, 1);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

    let stats = campaign.stats();
    assert_eq!(stats.total_sent, 1);
    assert_eq!(stats.total_failed, 1);
    assert_eq!(stats.total_delivered, 0);
}

#[tokio::test]
async fn test_concurrent_sends_share_one_campaign() {
    let (campaign, buffer) = trap_campaign(MissingKeyPolicy::Strict);

    let sends = (0..32).map(|n| {
        let campaign = campaign.clone();
        async move {
            let (tx, rx) = oneshot::channel();
            campaign.send_string(
                "Hello {{name}}",
                json!({ "to": format!("user{}@bar.com", n), "subject": "Hi", "name": n }),
                move |outcome| {
                    let _ = tx.send(outcome);
                },
            );
            rx.await.unwrap()
        }
    });

    let outcomes = join_all(sends).await;
    assert!(outcomes.iter().all(|o| o.is_ok()));

    let messages = buffer.messages().await;
    assert_eq!(messages.len(), 32);
    for n in 0..32 {
        let to = format!("user{}@bar.com", n);
        let message = messages.iter().find(|m| m.to == to).expect("every send captured");
        assert_eq!(message.body, format!("Hello {}", n));
    }
}

#[tokio::test]
async fn test_send_stored_template() {
    let (campaign, buffer) = trap_campaign(MissingKeyPolicy::Strict);
    campaign
        .templates()
        .create(
            Template::new("order-shipped", "Order {{order_id}} via {{carrier}}")
                .with_subject("Order {{order_id}} shipped"),
        )
        .unwrap();

    let (tx, rx) = oneshot::channel();
    campaign.send(
        "order-shipped",
        json!({ "to": "foo@bar.com", "order_id": "ORD-456", "carrier": "FedEx" }),
        move |outcome| {
            let _ = tx.send(outcome);
        },
    );
    rx.await.unwrap().unwrap();

    let message = buffer.last().await.unwrap();
    assert_eq!(message.subject, "Order ORD-456 shipped");
    assert_eq!(message.body, "Order ORD-456 via FedEx");

    let (tx, rx) = oneshot::channel();
    campaign.send("unknown", scenario_model(), move |outcome| {
        let _ = tx.send(outcome);
    });
    assert_eq!(
        rx.await.unwrap().unwrap_err(),
        DispatchError::TemplateNotFound("unknown".to_string())
    );
}

#[test]
fn test_dispatch_string_without_spawning() {
    let (campaign, buffer) = trap_campaign(MissingKeyPolicy::Empty);
    let model = Model::new("foo@bar.com", "Awesome Things").with("data", "interesting stuff");

    let receipt = tokio_test::block_on(campaign.dispatch_string(TEMPLATE, &model)).unwrap();

    assert!(receipt.trapped);
    assert_eq!(tokio_test::block_on(buffer.len()), 1);
}

#[tokio::test]
async fn test_campaign_from_settings() {
    let mut settings = Settings {
        client: ClientSettings {
            kind: ClientKind::Console,
            trap: true,
        },
        ..Settings::default()
    };
    settings.mail.from = Some("noreply@bar.com".to_string());

    let campaign = Campaign::from_settings(&settings, None).unwrap();
    let (outcome, _) = send_and_wait(&campaign, TEMPLATE, scenario_model()).await;
    outcome.unwrap();

    let message = campaign.trap_buffer().unwrap().last().await.unwrap();
    assert_eq!(message.from.as_deref(), Some("noreply@bar.com"));
}
