pub mod chatkit;
pub mod conversation;
pub mod outcome;

pub use chatkit::ChatKitProvider;
pub use conversation::ConversationProvider;
