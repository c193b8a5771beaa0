//! Command protocol between the facade and the session actor.

use thiserror::Error;
use tokio::sync::oneshot;

use super::types::{SessionId, SessionStore};

// ============================================================================
// Session Command
// ============================================================================

/// Commands the session actor applies, one at a time, to its map.
pub(crate) enum SessionCommand {
    Create {
        reply: oneshot::Sender<Result<SessionId, SessionError>>,
    },
    LoadStore {
        id: SessionId,
        reply: oneshot::Sender<Result<SessionStore, SessionError>>,
    },
    SaveStore {
        id: SessionId,
        store: SessionStore,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Delete {
        id: SessionId,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    DeleteExpired {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    /// IDs of every record still held, swept or not.
    ListIds {
        reply: oneshot::Sender<Result<Vec<SessionId>, SessionError>>,
    },
}

impl SessionCommand {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::LoadStore { .. } => "load_store",
            Self::SaveStore { .. } => "save_store",
            Self::Delete { .. } => "delete",
            Self::DeleteExpired { .. } => "delete_expired",
            Self::ListIds { .. } => "list_ids",
        }
    }

    /// Answer the command with `err` without applying it.
    pub(crate) fn reject(self, err: SessionError) {
        match self {
            Self::Create { reply } => {
                let _ = reply.send(Err(err));
            }
            Self::LoadStore { reply, .. } => {
                let _ = reply.send(Err(err));
            }
            Self::SaveStore { reply, .. } | Self::Delete { reply, .. } => {
                let _ = reply.send(Err(err));
            }
            Self::DeleteExpired { reply } => {
                let _ = reply.send(Err(err));
            }
            Self::ListIds { reply } => {
                let _ = reply.send(Err(err));
            }
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors surfaced by session manager operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The request reached the actor malformed (e.g. an empty session ID).
    #[error("bad parameter: {0}")]
    BadParameter(String),

    /// Unknown, deleted or expired session.
    #[error("session not found")]
    NotFound,

    /// The presented consistency token is not the current one.
    #[error("invalid consistency token")]
    InvalidToken,

    /// The actor does not recognise the requested operation.
    #[error("invalid command")]
    InvalidCommand,

    /// The actor dropped a request without answering it.
    #[error("unexpected session manager failure: {0}")]
    Other(String),

    /// The actor has stopped and no longer accepts commands.
    #[error("session manager stopped")]
    Stopped,

    /// No reply arrived within the configured request timeout.
    #[error("session manager timed out")]
    Timeout,
}
