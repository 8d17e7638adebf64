//! Validated data model for a dispatch call

use serde_json::{Map, Value};

use crate::error::DispatchError;

/// Envelope fields plus template variables.
///
/// Every key, envelope fields included, is visible to the renderer, so a
/// template may reference `{{subject}}` or `{{to}}` like any other variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    to: String,
    subject: Option<String>,
    from: Option<String>,
    variables: Map<String, Value>,
}

impl Model {
    /// Build a model with the required envelope fields
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        let to = to.into();
        let subject = subject.into();

        let mut variables = Map::new();
        variables.insert("to".to_string(), Value::String(to.clone()));
        variables.insert("subject".to_string(), Value::String(subject.clone()));

        Self {
            to,
            subject: Some(subject),
            from: None,
            variables,
        }
    }

    /// Add a template variable.
    ///
    /// `to`, `subject` and `from` also set the envelope field. Their value is
    /// stored in text form so the envelope and `{{key}}` always agree; `null`
    /// clears `subject` or `from`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();

        let slot = match key.as_str() {
            "to" => None,
            "subject" => Some(&mut self.subject),
            "from" => Some(&mut self.from),
            _ => {
                self.variables.insert(key, value);
                return self;
            }
        };

        let text = match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        };

        match slot {
            Some(field) => *field = text.clone(),
            None => self.to = text.clone().unwrap_or_default(),
        }
        match text {
            Some(text) => {
                self.variables.insert(key, Value::String(text));
            }
            None if key == "to" => {
                self.variables.insert(key, Value::String(String::new()));
            }
            None => {
                self.variables.remove(&key);
            }
        }
        self
    }

    /// Override the sender address for this model
    pub fn with_from(self, from: impl Into<String>) -> Self {
        self.with("from", from.into())
    }

    /// Validate an arbitrary JSON value as a model.
    ///
    /// The value must be an object with a non-empty string `to`. `subject`
    /// and `from`, when present, must be strings. A missing subject is only
    /// accepted when a stored template supplies one.
    pub fn from_value(value: Value) -> Result<Self, DispatchError> {
        let Value::Object(variables) = value else {
            return Err(DispatchError::InvalidModel(
                "model must be an object".to_string(),
            ));
        };

        let to = match variables.get("to") {
            Some(Value::String(to)) if !to.trim().is_empty() => to.clone(),
            Some(Value::String(_)) | None => {
                return Err(DispatchError::InvalidModel(
                    "model.to is required".to_string(),
                ))
            }
            Some(_) => {
                return Err(DispatchError::InvalidModel(
                    "model.to must be a string".to_string(),
                ))
            }
        };

        let subject = optional_string(&variables, "subject")?;
        let from = optional_string(&variables, "from")?;

        Ok(Self {
            to,
            subject,
            from,
            variables,
        })
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn from_address(&self) -> Option<&str> {
        self.from.as_deref()
    }

    /// All variables available to the renderer
    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }
}

impl TryFrom<Value> for Model {
    type Error = DispatchError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Model::from_value(value)
    }
}

fn optional_string(
    variables: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>, DispatchError> {
    match variables.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DispatchError::InvalidModel(format!(
            "model.{} must be a string",
            key
        ))),
    }
}
