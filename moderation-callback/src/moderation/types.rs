//! Moderation domain types.

use std::fmt;
use std::str::FromStr;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Effect requested on a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Spam,
    Delete,
}

impl ModerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::Approve => "approve",
            ModerationAction::Spam => "spam",
            ModerationAction::Delete => "delete",
        }
    }
}

impl FromStr for ModerationAction {
    type Err = ();

    /// Exact, case-sensitive match only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ModerationAction::Approve),
            "spam" => Ok(ModerationAction::Spam),
            "delete" => Ok(ModerationAction::Delete),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local entity a content id maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity_type: String,
    pub entity_id: String,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
        }
    }
}

/// Result of handling one moderation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationOutcome {
    Success,
    BadRequest,
    Gone,
    Unauthorized,
}

impl ModerationOutcome {
    /// Status to emit, or `None` to leave the transport's default in place.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ModerationOutcome::Success => None,
            ModerationOutcome::BadRequest => Some(StatusCode::BAD_REQUEST),
            ModerationOutcome::Gone => Some(StatusCode::GONE),
            ModerationOutcome::Unauthorized => Some(StatusCode::UNAUTHORIZED),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModerationOutcome::Success => "ok",
            ModerationOutcome::BadRequest => "bad_request",
            ModerationOutcome::Gone => "gone",
            ModerationOutcome::Unauthorized => "unauthorized",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ModerationOutcome::Success)
    }
}
