//! Campaign dispatcher: render a template against a model and hand the
//! result to a mail client.
//!
//! # Example
//!
//! ```rust,ignore
//! let campaign = Campaign::new(CampaignConfig::new(client::console(ConsoleOptions {
//!     trap: true,
//! })));
//!
//! campaign.send_string(
//!     "<p>Some {{data}}</p>",
//!     json!({ "to": "foo@bar.com", "subject": "Awesome Things", "data": "interesting stuff" }),
//!     |outcome| tracing::info!(ok = outcome.is_ok(), "Done!"),
//! );
//! ```

mod dispatcher;
mod model;

pub use dispatcher::{Campaign, CampaignConfig, DispatcherStatsSnapshot, Outcome};
pub use model::Model;
