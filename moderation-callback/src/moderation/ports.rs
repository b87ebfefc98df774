//! Collaborators the handler depends on.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, PoisonError, RwLock};

use tracing::info;

use crate::error::StoreError;
use crate::moderation::types::{EntityRef, ModerationAction};

/// Resolves an opaque content id to a local entity.
pub trait EntityMapping: Send + Sync {
    fn lookup(&self, content_id: &str) -> Option<EntityRef>;
}

/// Triggers the local side effects of a moderation action.
///
/// Fire-and-forget: the handler never learns whether the effect succeeded.
pub trait ActionDispatcher: Send + Sync {
    fn dispatch(&self, content_id: &str, entity: &EntityRef, action: ModerationAction);
}

// =============================================================================
// In-memory entity mapping
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryEntityMapping {
    entries: RwLock<HashMap<String, EntityRef>>,
}

impl MemoryEntityMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON object of `content_id → {entity_type, entity_id}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let raw = fs::read(path.as_ref())?;
        let entries: HashMap<String, EntityRef> = serde_json::from_slice(&raw)?;
        info!(
            path = %path.as_ref().display(),
            entries = entries.len(),
            "entity_mapping_loaded"
        );
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    pub fn insert(&self, content_id: impl Into<String>, entity: EntityRef) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(content_id.into(), entity);
    }

    pub fn remove(&self, content_id: &str) -> Option<EntityRef> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(content_id)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EntityMapping for MemoryEntityMapping {
    fn lookup(&self, content_id: &str) -> Option<EntityRef> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(content_id)
            .cloned()
    }
}

// =============================================================================
// Recording dispatcher
// =============================================================================

/// One recorded dispatch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedAction {
    pub content_id: String,
    pub entity: EntityRef,
    pub action: ModerationAction,
}

/// Dispatcher that only remembers what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    calls: Mutex<Vec<DispatchedAction>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DispatchedAction> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ActionDispatcher for RecordingDispatcher {
    fn dispatch(&self, content_id: &str, entity: &EntityRef, action: ModerationAction) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(DispatchedAction {
                content_id: content_id.to_string(),
                entity: entity.clone(),
                action,
            });
    }
}
