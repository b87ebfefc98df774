//! Inbound moderation callback receiver.
//!
//! An external moderation service calls back to approve, mark as spam, or
//! delete a piece of content. Each callback is authenticated as an OAuth1
//! HMAC-SHA1 signed request, checked against replayed nonces, resolved to a
//! local entity, and handed to a dispatcher.
//!
//! ## Architecture
//!
//! ```text
//! HTTP → web::moderate → ModerationHandler ─┬─ EntityMapping
//!                                           ├─ SignatureVerifier ─ ReplayGuard ─ ConfigStore
//!                                           └─ ActionDispatcher → moderation_actions queue
//! ```

pub mod auth;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod moderation;
pub mod queue;
pub mod store;
pub mod util;
pub mod web;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use auth::{AuthHeader, Credentials, RequestContext, SignatureVerifier};
pub use config::Config;
pub use diagnostics::{LogEntry, LogSink, TracingSink};
pub use error::{AuthError, StoreError};
pub use moderation::{ModerationAction, ModerationHandler, ModerationOutcome};
pub use queue::{Publisher, QueueDispatcher};
pub use store::{ConfigStore, JsonFileStore, MemoryStore};
pub use web::AppState;
