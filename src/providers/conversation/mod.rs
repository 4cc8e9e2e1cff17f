pub mod client;
pub mod normalize;
pub mod types;

pub use client::ConversationProvider;
pub use types::{CanonicalPayload, ChatRequest, ChatResponse};
