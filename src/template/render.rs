//! Placeholder substitution engine

use serde_json::{Map, Value};

use super::types::{MissingKeyPolicy, TemplateError, TemplateResult};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Substitute {{variable}} placeholders in a text template.
///
/// The template is scanned once, left to right. Values taken from `variables`
/// are written to the output as-is and never scanned again, so a value that
/// itself looks like `{{other}}` comes through literally.
///
/// A key is the trimmed text between `{{` and the first following `}}`;
/// `{` inside it has no special meaning, so `{{{data}}}` looks up `{data`.
pub fn render(
    template: &str,
    variables: &Map<String, Value>,
    policy: MissingKeyPolicy,
) -> TemplateResult<String> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];

        let Some(end) = after_open.find(CLOSE) else {
            // Unterminated marker, keep the remainder verbatim
            output.push_str(&rest[start..]);
            return Ok(output);
        };

        let key = after_open[..end].trim();
        if key.is_empty() {
            output.push_str(OPEN);
            output.push_str(&after_open[..end]);
            output.push_str(CLOSE);
        } else {
            match variables.get(key) {
                Some(value) => output.push_str(&value_to_string(value)),
                None => match policy {
                    MissingKeyPolicy::Empty => {}
                    MissingKeyPolicy::Strict => {
                        return Err(TemplateError::MissingKey(key.to_string()))
                    }
                },
            }
        }

        rest = &after_open[end + CLOSE.len()..];
    }

    output.push_str(rest);
    Ok(output)
}

/// Distinct placeholder keys referenced by a template, in order of first use.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };

        let key = after_open[..end].trim();
        if !key.is_empty() && !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }

        rest = &after_open[end + CLOSE.len()..];
    }

    keys
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // For arrays and objects, use JSON representation
        _ => value.to_string(),
    }
}
