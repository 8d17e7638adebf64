use thiserror::Error;

use crate::client::DeliveryError;
use crate::telemetry::TelemetryError;
use crate::template::TemplateError;

/// Failure of a single dispatch call.
///
/// `InvalidTemplate`, `InvalidModel`, `MissingKey`, `TemplateNotFound` and
/// `NoRuntime` are raised before anything is sent. `Delivery` only ever
/// arrives through the completion channel, after the client has been called.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Missing value for placeholder: {0}")]
    MissingKey(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("No async runtime available to run the send")]
    NoRuntime,

    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

impl DispatchError {
    /// Stable label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::InvalidTemplate(_) => "invalid_template",
            DispatchError::InvalidModel(_) => "invalid_model",
            DispatchError::MissingKey(_) => "missing_key",
            DispatchError::TemplateNotFound(_) => "template_not_found",
            DispatchError::NoRuntime => "no_runtime",
            DispatchError::Delivery(_) => "delivery_failure",
        }
    }

    /// Whether the error was raised before the client was called
    pub fn is_rejection(&self) -> bool {
        !matches!(self, DispatchError::Delivery(_))
    }
}

impl From<TemplateError> for DispatchError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::MissingKey(key) => DispatchError::MissingKey(key),
            TemplateError::NotFound(id) => DispatchError::TemplateNotFound(id),
            other => DispatchError::InvalidTemplate(other.to_string()),
        }
    }
}

/// Application-level errors (startup, configuration, telemetry)
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
