use anyhow::Result;
use serde_json::json;
use tokio::sync::oneshot;

use campaign_dispatch::config::{ClientKind, Settings};
use campaign_dispatch::telemetry::{init_telemetry, TelemetryGuard};
use campaign_dispatch::Campaign;

#[tokio::main]
async fn main() -> Result<()> {
    let (mut settings, _telemetry) = bootstrap()?;
    tracing::info!("Configuration loaded");

    // The demo never performs real delivery
    settings.client.kind = ClientKind::Console;
    settings.client.trap = true;
    let campaign = Campaign::from_settings(&settings, None)?;

    let template = "<p>Some {{data}}</p>";
    let model = json!({
        "to": "foo@bar.com",
        "subject": "Awesome Things",
        "data": "interesting stuff"
    });

    let (done_tx, done_rx) = oneshot::channel();
    campaign.send_string(template, model, move |outcome| {
        let _ = done_tx.send(outcome);
    });

    match done_rx.await? {
        Ok(receipt) => tracing::info!(
            message_id = %receipt.message_id,
            trapped = receipt.trapped,
            "Done!"
        ),
        Err(e) => tracing::error!(error = %e, "Dispatch failed"),
    }

    if let Some(buffer) = campaign.trap_buffer() {
        for message in buffer.messages().await {
            println!("{}", serde_json::to_string_pretty(&message)?);
        }
    }

    Ok(())
}

fn bootstrap() -> campaign_dispatch::error::Result<(Settings, TelemetryGuard)> {
    let settings = Settings::new()?;
    let guard = init_telemetry(&settings.log, &settings.otel)?;
    Ok((settings, guard))
}
