//! Moderation request orchestration.
//!
//! ```text
//! action valid? ──no──▶ 400
//!      │
//! entity known? ──no──▶ 410  (logs "Not Found")
//!      │
//! authenticated? ─no──▶ 401  (reason logged by the verifier)
//!      │
//! dispatch ─────────────▶ 200
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::auth::{RequestContext, SignatureVerifier};
use crate::diagnostics::{LogEntry, LogSink};
use crate::moderation::ports::{ActionDispatcher, EntityMapping};
use crate::moderation::types::{ModerationAction, ModerationOutcome};

/// Handles inbound moderation callbacks.
///
/// Stateless apart from its injected collaborators; one instance serves
/// every request.
pub struct ModerationHandler {
    mapping: Arc<dyn EntityMapping>,
    verifier: SignatureVerifier,
    dispatcher: Arc<dyn ActionDispatcher>,
    sink: Arc<dyn LogSink>,
}

impl ModerationHandler {
    pub fn new(
        mapping: Arc<dyn EntityMapping>,
        verifier: SignatureVerifier,
        dispatcher: Arc<dyn ActionDispatcher>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            mapping,
            verifier,
            dispatcher,
            sink,
        }
    }

    /// Handle a request to apply `action` to `content_id`.
    pub fn handle(
        &self,
        content_id: &str,
        action: &str,
        request: &RequestContext,
    ) -> ModerationOutcome {
        let action: ModerationAction = match action.parse() {
            Ok(a) => a,
            Err(()) => {
                debug!(content_id = %content_id, action = %action, "moderation_invalid_action");
                return ModerationOutcome::BadRequest;
            }
        };

        let entity = match self.mapping.lookup(content_id) {
            Some(e) => e,
            None => {
                self.sink.record(
                    LogEntry::new("Not Found")
                        .with("request", request.request_line())
                        .with("content_id", content_id),
                );
                return ModerationOutcome::Gone;
            }
        };

        if !self.verifier.authenticate(request) {
            return ModerationOutcome::Unauthorized;
        }

        self.dispatcher.dispatch(content_id, &entity, action);

        info!(
            content_id = %content_id,
            entity_type = %entity.entity_type,
            entity_id = %entity.entity_id,
            action = %action,
            "moderation_dispatched"
        );

        ModerationOutcome::Success
    }
}

impl std::fmt::Debug for ModerationHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModerationHandler")
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::moderation::ports::{MemoryEntityMapping, RecordingDispatcher};
    use crate::moderation::types::EntityRef;
    use crate::store::{ConfigStore, MemoryStore, PUBLIC_KEY};
    use crate::test_support::{credentials, signed_request, SITE_URL};
    use crate::util::ManualClock;

    const NOW: i64 = 1_700_000_000;
    const PATH: &str = "/moderation/abc123/spam";

    struct Fixture {
        handler: ModerationHandler,
        store: Arc<MemoryStore>,
        dispatcher: Arc<RecordingDispatcher>,
        sink: Arc<MemorySink>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        credentials().save(store.as_ref()).unwrap();

        let mapping = Arc::new(MemoryEntityMapping::new());
        mapping.insert("abc123", EntityRef::new("comment", "42"));

        let clock = Arc::new(ManualClock::new(NOW));
        let sink = Arc::new(MemorySink::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let verifier = SignatureVerifier::new(SITE_URL, store.clone(), clock, 900, sink.clone());

        Fixture {
            handler: ModerationHandler::new(mapping, verifier, dispatcher.clone(), sink.clone()),
            store,
            dispatcher,
            sink,
        }
    }

    #[test]
    fn test_valid_spam_request_dispatched() {
        let f = fixture();
        let req = signed_request("POST", PATH, b"", "nonce-1", NOW);

        let outcome = f.handler.handle("abc123", "spam", &req);

        assert_eq!(outcome, ModerationOutcome::Success);
        assert_eq!(outcome.status(), None);
        let calls = f.dispatcher.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].content_id, "abc123");
        assert_eq!(calls[0].entity, EntityRef::new("comment", "42"));
        assert_eq!(calls[0].action, ModerationAction::Spam);
        assert!(f.sink.entries().is_empty());
    }

    #[test]
    fn test_invalid_action_short_circuits() {
        let f = fixture();
        // Unknown content and no auth: neither is consulted
        let req = RequestContext::new("POST", "/moderation/nope/publish");

        for action in ["publish", "SPAM", "", "approve "] {
            assert_eq!(
                f.handler.handle("nope", action, &req),
                ModerationOutcome::BadRequest
            );
        }
        assert!(f.sink.entries().is_empty());
        assert!(f.dispatcher.calls().is_empty());
    }

    #[test]
    fn test_unknown_content_is_gone() {
        let f = fixture();
        let req = signed_request("POST", "/moderation/missing/approve", b"", "n1", NOW);

        assert_eq!(
            f.handler.handle("missing", "approve", &req),
            ModerationOutcome::Gone
        );
        assert_eq!(f.sink.messages(), vec!["Not Found"]);
        assert!(f.dispatcher.calls().is_empty());
    }

    #[test]
    fn test_unknown_content_does_not_consume_nonce() {
        let f = fixture();
        let req = signed_request("POST", PATH, b"", "n1", NOW);
        f.handler.handle("missing", "spam", &req);

        assert_eq!(f.handler.handle("abc123", "spam", &req), ModerationOutcome::Success);
    }

    #[test]
    fn test_bad_signature_unauthorized() {
        let f = fixture();
        let req = signed_request("POST", PATH, b"", "n1", NOW);
        // Signed for a different action
        let req = RequestContext {
            path: "/moderation/abc123/delete".to_string(),
            ..req
        };

        assert_eq!(
            f.handler.handle("abc123", "delete", &req),
            ModerationOutcome::Unauthorized
        );
        assert_eq!(f.sink.messages(), vec!["Invalid authentication signature"]);
        assert!(f.dispatcher.calls().is_empty());
    }

    #[test]
    fn test_replayed_request_unauthorized() {
        let f = fixture();
        let req = signed_request("POST", PATH, b"", "n1", NOW);

        assert_eq!(f.handler.handle("abc123", "spam", &req), ModerationOutcome::Success);
        assert_eq!(
            f.handler.handle("abc123", "spam", &req),
            ModerationOutcome::Unauthorized
        );
        assert_eq!(f.sink.messages(), vec!["Replay attack"]);
        assert_eq!(f.dispatcher.calls().len(), 1);
    }

    #[test]
    fn test_missing_configuration_unauthorized() {
        let f = fixture();
        f.store.delete(PUBLIC_KEY).unwrap();
        let req = signed_request("POST", PATH, b"", "n1", NOW);

        assert_eq!(
            f.handler.handle("abc123", "spam", &req),
            ModerationOutcome::Unauthorized
        );
        assert_eq!(f.sink.messages(), vec!["Missing module configuration"]);
    }

    #[test]
    fn test_form_parameters_are_part_of_signature() {
        let f = fixture();
        let req = signed_request("POST", PATH, b"reason=abusive+language", "n1", NOW);
        assert_eq!(f.handler.handle("abc123", "spam", &req), ModerationOutcome::Success);
    }
}
