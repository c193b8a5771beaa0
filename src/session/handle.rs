//! Session handle: the public face of the session manager.
//!
//! `SessionHandle` is a thin wrapper around an `mpsc::Sender<SessionCommand>`.
//! Each method performs exactly one request/response exchange with the actor
//! over a private `oneshot` reply channel. It is cheap to clone and can be used
//! from any number of tasks at once.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use super::command::{SessionCommand, SessionError};
use super::types::{SessionId, SessionStore};

/// Handle for issuing session operations to the actor.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
    request_timeout: Option<Duration>,
}

impl SessionHandle {
    pub(crate) fn new(tx: mpsc::Sender<SessionCommand>, request_timeout: Option<Duration>) -> Self {
        Self {
            tx,
            request_timeout,
        }
    }

    /// Create a session with an empty store and return its ID.
    pub async fn create(&self) -> Result<SessionId, SessionError> {
        let result = self
            .request(|reply| SessionCommand::Create { reply })
            .await;
        if let Err(e) = &result {
            debug!(error = %e, "Session create failed");
        }
        result
    }

    /// Read a copy of the session's store and refresh its expiry.
    pub async fn load_store(&self, id: &SessionId) -> Result<SessionStore, SessionError> {
        let result = self
            .request(|reply| SessionCommand::LoadStore {
                id: id.clone(),
                reply,
            })
            .await;
        if let Err(e) = &result {
            debug!(session_id = %id, error = %e, "Session load store failed");
        }
        result
    }

    /// Replace the session's store.
    ///
    /// `store.consistency_token` must be the token most recently handed out for
    /// this session, otherwise the write is refused with
    /// [`SessionError::InvalidToken`]. On success the token is rotated, so the
    /// caller has to load again before the next save.
    pub async fn save_store(&self, id: &SessionId, store: SessionStore) -> Result<(), SessionError> {
        let result = self
            .request(|reply| SessionCommand::SaveStore {
                id: id.clone(),
                store,
                reply,
            })
            .await;
        if let Err(e) = &result {
            debug!(session_id = %id, error = %e, "Session save store failed");
        }
        result
    }

    /// Remove a live session.
    pub async fn delete(&self, id: &SessionId) -> Result<(), SessionError> {
        let result = self
            .request(|reply| SessionCommand::Delete {
                id: id.clone(),
                reply,
            })
            .await;
        if let Err(e) = &result {
            debug!(session_id = %id, error = %e, "Session delete failed");
        }
        result
    }

    /// Remove every session whose expiry has passed.
    pub async fn delete_expired(&self) -> Result<(), SessionError> {
        let result = self
            .request(|reply| SessionCommand::DeleteExpired { reply })
            .await;
        if let Err(e) = &result {
            debug!(error = %e, "Session delete expired failed");
        }
        result
    }

    /// IDs of all records currently held, including expired ones not yet swept.
    pub async fn session_ids(&self) -> Result<Vec<SessionId>, SessionError> {
        self.request(|reply| SessionCommand::ListIds { reply })
            .await
    }

    /// Whether the actor has stopped accepting commands.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, SessionError>>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let command = build(reply_tx);
        let name = command.name();

        let exchange = async {
            self.tx
                .send(command)
                .await
                .map_err(|_| SessionError::Stopped)?;

            match reply_rx.await {
                Ok(result) => result,
                Err(_) => {
                    error!(command = name, "Session actor dropped a request without replying");
                    Err(SessionError::Other(format!("no reply to {name}")))
                }
            }
        };

        with_timeout(self.request_timeout, exchange).await
    }
}

async fn with_timeout<T>(
    limit: Option<Duration>,
    exchange: impl Future<Output = Result<T, SessionError>>,
) -> Result<T, SessionError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, exchange)
            .await
            .map_err(|_| SessionError::Timeout)?,
        None => exchange.await,
    }
}
