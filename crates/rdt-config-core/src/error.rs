//! Error types for the configuration tree

use crate::NodeType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: NodeType, id: String },

    #[error("parent system '{parent_id}' not found")]
    ParentNotFound { parent_id: String },

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("forest is corrupt: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TreeError {
    pub fn system_not_found(id: impl Into<String>) -> Self {
        TreeError::NotFound {
            kind: NodeType::System,
            id: id.into(),
        }
    }

    pub fn subsystem_not_found(id: impl Into<String>) -> Self {
        TreeError::NotFound {
            kind: NodeType::Subsystem,
            id: id.into(),
        }
    }

    pub fn parent_not_found(parent_id: impl Into<String>) -> Self {
        TreeError::ParentNotFound {
            parent_id: parent_id.into(),
        }
    }
}
