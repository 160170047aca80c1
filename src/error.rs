// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error types for board operations

use crate::intents::Intent;

/// Result type for board operations
pub type BoardResult<T> = Result<T, BoardError>;

/// Error type for board operations
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// A flat identifier could not be decoded
    #[error("Malformed identifier {id:?}: {reason}")]
    MalformedIdentifier {
        /// The offending identifier
        id: String,
        /// What was wrong with it
        reason: String,
    },

    /// The requested move is structurally impossible or references a stale id
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// The backend rejected a persistence intent after the local move
    #[error("Persistence failed for {intent}: {source}")]
    PersistenceFailure {
        /// The intent that failed
        intent: Box<Intent>,
        /// Backend error
        #[source]
        source: SurfaceError,
    },

    /// Fetching the authoritative schedules failed
    #[error("Failed to fetch schedules: {0}")]
    Source(#[source] SurfaceError),

    /// Local store I/O or encoding error
    #[error("Store error: {0}")]
    Store(String),
}

impl BoardError {
    /// Shorthand for a malformed identifier error
    pub(crate) fn malformed(id: &str, reason: impl Into<String>) -> Self {
        Self::MalformedIdentifier {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Local errors are swallowed by drag handlers; everything else surfaces
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::MalformedIdentifier { .. } | Self::InvalidMove(_))
    }
}

/// Error type reported by persistence collaborators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// Backend could not be reached
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the mutation
    #[error("Mutation rejected: {0}")]
    Rejected(String),

    /// Referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for BoardError {
    fn from(e: std::io::Error) -> Self {
        Self::Store(e.to_string())
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(e: serde_json::Error) -> Self {
        Self::Store(e.to_string())
    }
}
