//! Inbound moderation requests: validate the action, resolve the content,
//! authenticate, then dispatch.

pub mod handler;
pub mod ports;
pub mod types;

pub use handler::ModerationHandler;
pub use ports::{
    ActionDispatcher, DispatchedAction, EntityMapping, MemoryEntityMapping, RecordingDispatcher,
};
pub use types::{EntityRef, ModerationAction, ModerationOutcome};
