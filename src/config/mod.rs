pub mod settings;

pub use settings::{ChatProfile, ChatRoute, ConfigError, Settings};
