pub mod client;
pub mod types;

pub use client::ChatKitProvider;
pub use types::{SessionRequest, SessionSecret};
