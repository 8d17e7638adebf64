//! Template types and error definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Template-specific error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid template ID: {0}")]
    InvalidId(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Missing value for placeholder: {0}")]
    MissingKey(String),
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// What to do with a placeholder whose key is absent from the variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingKeyPolicy {
    /// Substitute an empty string
    #[default]
    Empty,
    /// Fail the render with `TemplateError::MissingKey`
    Strict,
}

/// A named message template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Unique template identifier (alphanumeric, dash, underscore)
    pub id: String,

    /// Subject line template, used when the model carries no subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Body template with {{variable}} placeholders
    pub body: String,

    /// Template description (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// Build a template with the given id and body
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            subject: None,
            body: body.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validate the template
    pub fn validate(&self) -> TemplateResult<()> {
        if self.id.is_empty() || self.id.len() > 64 {
            return Err(TemplateError::InvalidId(
                "ID must be 1-64 characters".to_string(),
            ));
        }

        if !self
            .id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TemplateError::InvalidId(
                "ID must contain only alphanumeric, dash, or underscore".to_string(),
            ));
        }

        if self.body.is_empty() {
            return Err(TemplateError::InvalidTemplate(
                "Body must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Partial update for a stored template
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTemplateRequest {
    /// Body template (optional)
    pub body: Option<String>,

    /// Subject template (optional, use null to clear)
    pub subject: Option<Option<String>>,

    /// Template description (optional, use null to clear)
    pub description: Option<Option<String>>,
}

/// Output of rendering a stored template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    /// Rendered subject, if the template defines one
    pub subject: Option<String>,

    /// Rendered body
    pub body: String,
}
