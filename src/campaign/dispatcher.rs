use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::Instrument;

use crate::client::{
    create_client, DeliveryReceipt, MailClient, Message, Transport, TrapBuffer,
};
use crate::config::Settings;
use crate::error::DispatchError;
use crate::metrics::DispatchMetrics;
use crate::template::{create_template_store, render, MissingKeyPolicy, TemplateStore};

use super::Model;

/// Result of one dispatch call, as delivered to the completion callback
pub type Outcome = Result<DeliveryReceipt, DispatchError>;

/// Statistics for the campaign dispatcher
#[derive(Debug, Default)]
pub struct DispatcherStats {
    /// Messages handed to the client
    pub total_sent: AtomicU64,
    /// Messages the client reported as delivered
    pub total_delivered: AtomicU64,
    /// Messages the client reported as failed
    pub total_failed: AtomicU64,
    /// Calls rejected before reaching the client
    pub total_rejected: AtomicU64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            total_sent: self.total_sent.load(Ordering::Relaxed),
            total_delivered: self.total_delivered.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
            total_rejected: self.total_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatcher statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatcherStatsSnapshot {
    pub total_sent: u64,
    pub total_delivered: u64,
    pub total_failed: u64,
    pub total_rejected: u64,
}

/// Construction options for a [`Campaign`]
#[derive(Clone)]
pub struct CampaignConfig {
    /// Client every message is handed to
    pub client: Arc<dyn MailClient>,
    /// Sender used when the model carries no `from`
    pub from: Option<String>,
    /// Layout wrapping each rendered body through its {{body}} placeholder
    pub layout: Option<String>,
    pub missing_keys: MissingKeyPolicy,
    /// Named templates for [`Campaign::send`]; an empty store is used if unset
    pub templates: Option<Arc<TemplateStore>>,
}

impl CampaignConfig {
    pub fn new(client: Arc<dyn MailClient>) -> Self {
        Self {
            client,
            from: None,
            layout: None,
            missing_keys: MissingKeyPolicy::default(),
            templates: None,
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn with_missing_keys(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_keys = policy;
        self
    }

    pub fn with_templates(mut self, templates: Arc<TemplateStore>) -> Self {
        self.templates = Some(templates);
        self
    }
}

/// Binds a mail client to the render-then-send workflow.
///
/// Each call renders synchronously on the caller, then hands the message to
/// the client exactly once. Nothing but statistics is shared between calls,
/// so one instance may serve any number of concurrent sends.
#[derive(Clone)]
pub struct Campaign {
    client: Arc<dyn MailClient>,
    from: Option<String>,
    layout: Option<String>,
    missing_keys: MissingKeyPolicy,
    templates: Arc<TemplateStore>,
    stats: Arc<DispatcherStats>,
}

impl Campaign {
    pub fn new(config: CampaignConfig) -> Self {
        Self {
            client: config.client,
            from: config.from,
            layout: config.layout,
            missing_keys: config.missing_keys,
            templates: config.templates.unwrap_or_else(create_template_store),
            stats: Arc::new(DispatcherStats::default()),
        }
    }

    /// Build a campaign from loaded settings.
    ///
    /// `transport` is only used when `client.kind = "transport"`.
    pub fn from_settings(
        settings: &Settings,
        transport: Option<Arc<dyn Transport>>,
    ) -> crate::error::Result<Self> {
        let client = create_client(&settings.client, transport);
        let mut config = CampaignConfig::new(client).with_missing_keys(settings.mail.missing_keys);

        if let Some(from) = &settings.mail.from {
            config = config.with_from(from.clone());
        }
        if let Some(layout) = settings.load_layout()? {
            config = config.with_layout(layout);
        }

        Ok(Self::new(config))
    }

    pub fn client(&self) -> &Arc<dyn MailClient> {
        &self.client
    }

    /// Capture buffer of the bound client, when it runs in trap mode
    pub fn trap_buffer(&self) -> Option<TrapBuffer> {
        self.client.trap_buffer()
    }

    pub fn templates(&self) -> &Arc<TemplateStore> {
        &self.templates
    }

    pub fn stats(&self) -> DispatcherStatsSnapshot {
        self.stats.snapshot()
    }

    /// Render a template string against a model into a message.
    ///
    /// Fails with `InvalidTemplate` for an empty template, `InvalidModel` when
    /// the model has no subject, and `MissingKey` under the strict policy.
    pub fn render_message(&self, template: &str, model: &Model) -> Result<Message, DispatchError> {
        check_template(template)?;

        let subject = model
            .subject()
            .ok_or_else(|| DispatchError::InvalidModel("model.subject is required".to_string()))?
            .to_string();

        let start = Instant::now();
        let body = render(template, model.variables(), self.missing_keys)?;
        let body = self.apply_layout(body, model)?;
        DispatchMetrics::observe_render(start.elapsed().as_secs_f64());

        Ok(self.envelope(model, subject, body))
    }

    /// Render a stored template against a model into a message.
    ///
    /// The model's subject wins over the template's subject.
    pub fn render_stored(&self, template_id: &str, model: &Model) -> Result<Message, DispatchError> {
        let start = Instant::now();
        let rendered = self
            .templates
            .render(template_id, model.variables(), self.missing_keys)?;

        let subject = model
            .subject()
            .map(str::to_string)
            .or(rendered.subject)
            .ok_or_else(|| DispatchError::InvalidModel("model.subject is required".to_string()))?;

        let body = self.apply_layout(rendered.body, model)?;
        DispatchMetrics::observe_render(start.elapsed().as_secs_f64());

        Ok(self.envelope(model, subject, body))
    }

    /// Render `template` with `model` and send the result, reporting through
    /// `callback`.
    ///
    /// Validation and rendering happen before this returns; if either fails
    /// the callback runs immediately with the error and the client is never
    /// called. Otherwise the send runs on a spawned task and the callback
    /// receives the client's outcome. Outside a tokio runtime the callback
    /// receives `NoRuntime` and nothing is sent.
    #[tracing::instrument(name = "campaign.send_string", skip_all)]
    pub fn send_string<F>(&self, template: &str, model: Value, callback: F)
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let prepared = check_template(template)
            .and_then(|_| Model::from_value(model))
            .and_then(|model| self.render_message(template, &model));
        self.complete(prepared, callback);
    }

    /// Like [`send_string`](Self::send_string), using a stored template.
    #[tracing::instrument(name = "campaign.send", skip(self, model, callback))]
    pub fn send<F>(&self, template_id: &str, model: Value, callback: F)
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let prepared =
            Model::from_value(model).and_then(|model| self.render_stored(template_id, &model));
        self.complete(prepared, callback);
    }

    /// Awaitable form of [`send_string`](Self::send_string).
    #[tracing::instrument(name = "campaign.dispatch_string", skip_all, fields(to = %model.to()))]
    pub async fn dispatch_string(&self, template: &str, model: &Model) -> Outcome {
        let message = self
            .render_message(template, model)
            .inspect_err(|e| self.reject(e))?;
        deliver(self.client.as_ref(), &self.stats, &message).await
    }

    /// Awaitable form of [`send`](Self::send).
    #[tracing::instrument(name = "campaign.dispatch", skip(self, model), fields(to = %model.to()))]
    pub async fn dispatch(&self, template_id: &str, model: &Model) -> Outcome {
        let message = self
            .render_stored(template_id, model)
            .inspect_err(|e| self.reject(e))?;
        deliver(self.client.as_ref(), &self.stats, &message).await
    }

    fn complete<F>(&self, prepared: Result<Message, DispatchError>, callback: F)
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        match prepared {
            Err(e) => {
                self.reject(&e);
                callback(Err(e));
            }
            Ok(message) => {
                let Ok(runtime) = Handle::try_current() else {
                    let e = DispatchError::NoRuntime;
                    self.reject(&e);
                    callback(Err(e));
                    return;
                };

                let client = Arc::clone(&self.client);
                let stats = Arc::clone(&self.stats);
                runtime.spawn(
                    async move {
                        let outcome = deliver(client.as_ref(), &stats, &message).await;
                        callback(outcome);
                    }
                    .in_current_span(),
                );
            }
        }
    }

    fn reject(&self, error: &DispatchError) {
        self.stats.total_rejected.fetch_add(1, Ordering::Relaxed);
        DispatchMetrics::record_rejected(error.kind());
        tracing::warn!(kind = error.kind(), error = %error, "Dispatch rejected");
    }

    fn apply_layout(&self, body: String, model: &Model) -> Result<String, DispatchError> {
        let Some(layout) = &self.layout else {
            return Ok(body);
        };

        let mut variables = model.variables().clone();
        variables.insert("body".to_string(), Value::String(body));
        Ok(render(layout, &variables, self.missing_keys)?)
    }

    fn envelope(&self, model: &Model, subject: String, body: String) -> Message {
        Message {
            to: model.to().to_string(),
            from: model
                .from_address()
                .map(str::to_string)
                .or_else(|| self.from.clone()),
            subject,
            body,
        }
    }
}

fn check_template(template: &str) -> Result<(), DispatchError> {
    if template.is_empty() {
        return Err(DispatchError::InvalidTemplate(
            "template must be a non-empty string".to_string(),
        ));
    }
    Ok(())
}

async fn deliver(client: &dyn MailClient, stats: &DispatcherStats, message: &Message) -> Outcome {
    stats.total_sent.fetch_add(1, Ordering::Relaxed);

    match client.send(message).await {
        Ok(receipt) => {
            stats.total_delivered.fetch_add(1, Ordering::Relaxed);
            DispatchMetrics::record_sent(client.name());

            tracing::debug!(
                message_id = %receipt.message_id,
                client = client.name(),
                to = %message.to,
                trapped = receipt.trapped,
                "Message dispatched"
            );
            Ok(receipt)
        }
        Err(e) => {
            stats.total_failed.fetch_add(1, Ordering::Relaxed);
            DispatchMetrics::record_failed(client.name());

            tracing::warn!(
                client = client.name(),
                to = %message.to,
                error = %e,
                "Message delivery failed"
            );
            Err(e.into())
        }
    }
}
