//! Queue message types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::moderation::{EntityRef, ModerationAction};

/// Queue name for dispatched moderation actions.
pub const MODERATION_QUEUE: &str = "moderation_actions";

/// A verified moderation action, ready for the host application to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationJob {
    /// Unique per dispatched action
    pub job_id: Uuid,
    /// Moderation service's content id
    pub content_id: String,
    /// Local entity type (e.g. `comment`)
    pub entity_type: String,
    /// Local entity id
    pub entity_id: String,
    /// Requested action
    pub action: ModerationAction,
}

impl ModerationJob {
    pub fn new(content_id: &str, entity: &EntityRef, action: ModerationAction) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            content_id: content_id.to_string(),
            entity_type: entity.entity_type.clone(),
            entity_id: entity.entity_id.clone(),
            action,
        }
    }

    /// Message id used for broker-side tracking.
    pub fn message_id(&self) -> String {
        self.job_id.to_string()
    }
}
