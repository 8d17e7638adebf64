// Supporting modules
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Dispatch core
pub mod campaign;
pub mod client;
pub mod template;

pub use campaign::{Campaign, CampaignConfig, Model, Outcome};
pub use error::DispatchError;
