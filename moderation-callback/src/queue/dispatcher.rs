//! Queue-backed action dispatcher.

use tokio::runtime::Handle;
use tracing::{error, warn};

use crate::moderation::{ActionDispatcher, EntityRef, ModerationAction};
use crate::queue::{ModerationJob, Publisher};

/// Publishes each dispatched action without waiting for the broker.
#[derive(Clone)]
pub struct QueueDispatcher {
    publisher: Publisher,
}

impl QueueDispatcher {
    pub fn new(publisher: Publisher) -> Self {
        Self { publisher }
    }
}

impl ActionDispatcher for QueueDispatcher {
    fn dispatch(&self, content_id: &str, entity: &EntityRef, action: ModerationAction) {
        let job = ModerationJob::new(content_id, entity, action);

        let handle = match Handle::try_current() {
            Ok(h) => h,
            Err(_) => {
                warn!(message_id = %job.message_id(), "moderation_dispatch_no_runtime");
                return;
            }
        };

        let publisher = self.publisher.clone();
        handle.spawn(async move {
            if let Err(e) = publisher.publish_job(&job).await {
                error!(error = %e, message_id = %job.message_id(), "moderation_publish_failed");
            }
        });
    }
}
