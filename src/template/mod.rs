//! Message template system.
//!
//! This module provides:
//! - Flat `{{variable}}` substitution over a JSON object of variables
//! - Named template storage with CRUD operations
//!
//! # Example
//!
//! ```ignore
//! let variables = json!({ "data": "interesting stuff" });
//! let body = render(
//!     "<p>Some {{data}}</p>",
//!     variables.as_object().unwrap(),
//!     MissingKeyPolicy::Empty,
//! )?;
//! assert_eq!(body, "<p>Some interesting stuff</p>");
//! ```

mod render;
mod store;
mod types;

pub use render::{placeholders, render};
pub use store::{create_template_store, TemplateStore};
pub use types::{
    MissingKeyPolicy, RenderedTemplate, Template, TemplateError, TemplateResult,
    UpdateTemplateRequest,
};
