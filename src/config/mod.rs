mod settings;

pub use settings::{ClientKind, ClientSettings, LogConfig, MailSettings, OtelConfig, Settings};
