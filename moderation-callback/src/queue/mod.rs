//! Queue module for RabbitMQ operations.
//!
//! Verified moderation actions leave this service as JSON messages on the
//! `moderation_actions` queue; the host application consumes them and
//! applies the effect.
//!
//! ```text
//! ModerationHandler → QueueDispatcher → Publisher → moderation_actions
//! ```

pub mod dispatcher;
pub mod publisher;
pub mod types;

pub use dispatcher::QueueDispatcher;
pub use publisher::Publisher;
pub use types::{ModerationJob, MODERATION_QUEUE};
