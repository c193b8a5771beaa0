//! The session actor: sole owner of the session map.
//!
//! Every mutation arrives as a [`SessionCommand`] on a bounded channel and is
//! applied to completion before the next one is received. That ordering is what
//! makes each facade operation atomic, so the map itself needs no lock.
//!
//! Expired records are reported as absent but only physically removed by a
//! `DeleteExpired` sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, error, info};

use super::command::{SessionCommand, SessionError};
use super::ids::IdGenerator;
use super::types::{SessionId, SessionStore};

/// Draws allowed per create before giving up on the ID generator.
const MAX_ID_DRAWS: usize = 16;

/// Lifecycle of the actor task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    /// Spawned but not yet consuming commands.
    Starting,
    /// Consuming the command channel.
    Running,
    /// Loop exited; further commands are rejected.
    Stopped,
}

/// A stored session.
#[derive(Debug)]
struct Session {
    store: SessionStore,
    expires_at: Instant,
}

impl Session {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Per-manager actor that owns every session record.
pub(crate) struct SessionActor {
    sessions: HashMap<SessionId, Session>,
    ttl: Duration,
    ids: Arc<dyn IdGenerator>,

    command_rx: mpsc::Receiver<SessionCommand>,
    stop_rx: oneshot::Receiver<()>,
    state_tx: watch::Sender<ActorState>,
}

impl SessionActor {
    pub(crate) fn new(
        ttl: Duration,
        ids: Arc<dyn IdGenerator>,
        command_rx: mpsc::Receiver<SessionCommand>,
        stop_rx: oneshot::Receiver<()>,
        state_tx: watch::Sender<ActorState>,
    ) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
            ids,
            command_rx,
            stop_rx,
            state_tx,
        }
    }

    /// Main loop. Returns once the stop signal fires (or its sender is dropped)
    /// or every command sender is gone.
    pub(crate) async fn run(mut self) {
        info!(ttl_secs = self.ttl.as_secs(), "Session actor started");
        self.state_tx.send_replace(ActorState::Running);

        loop {
            tokio::select! {
                biased;

                _ = &mut self.stop_rx => {
                    debug!("Session actor received stop signal");
                    break;
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(command) => self.handle_command(command),
                        None => {
                            debug!("All session handles dropped");
                            break;
                        }
                    }
                }
            }
        }

        // Refuse new sends and answer whatever is already queued.
        self.command_rx.close();
        while let Ok(command) = self.command_rx.try_recv() {
            command.reject(SessionError::Stopped);
        }

        self.state_tx.send_replace(ActorState::Stopped);
        info!(sessions = self.sessions.len(), "Session actor stopped");
    }

    fn handle_command(&mut self, command: SessionCommand) {
        let now = Instant::now();
        match command {
            SessionCommand::Create { reply } => {
                let _ = reply.send(self.create(now));
            }
            SessionCommand::LoadStore { id, reply } => {
                let _ = reply.send(self.load_store(&id, now));
            }
            SessionCommand::SaveStore { id, store, reply } => {
                let _ = reply.send(self.save_store(&id, store, now));
            }
            SessionCommand::Delete { id, reply } => {
                let _ = reply.send(self.delete(&id, now));
            }
            SessionCommand::DeleteExpired { reply } => {
                self.delete_expired(now);
                let _ = reply.send(Ok(()));
            }
            SessionCommand::ListIds { reply } => {
                let _ = reply.send(Ok(self.sessions.keys().cloned().collect()));
            }
        }
    }

    fn create(&mut self, now: Instant) -> Result<SessionId, SessionError> {
        let id = (0..MAX_ID_DRAWS)
            .map(|_| self.ids.session_id())
            .find(|id| {
                let usable = !id.is_empty() && !self.sessions.contains_key(id);
                if !usable {
                    debug!(session_id = %id, "Generated session ID unusable, drawing another");
                }
                usable
            });
        let Some(id) = id else {
            error!(draws = MAX_ID_DRAWS, "ID generator produced no unused session ID");
            return Err(SessionError::Other(format!(
                "no unused session id after {MAX_ID_DRAWS} draws"
            )));
        };

        let session = Session {
            store: SessionStore {
                data: HashMap::new(),
                consistency_token: self.ids.token(),
            },
            expires_at: now + self.ttl,
        };
        debug!(session_id = %id, ttl_secs = self.ttl.as_secs(), "Session created");
        self.sessions.insert(id.clone(), session);
        Ok(id)
    }

    fn load_store(&mut self, id: &SessionId, now: Instant) -> Result<SessionStore, SessionError> {
        let session = live_session(&mut self.sessions, id, now)?;
        session.expires_at = now + self.ttl;
        debug!(session_id = %id, keys = session.store.data.len(), "Session store loaded");
        Ok(session.store.clone())
    }

    fn save_store(
        &mut self,
        id: &SessionId,
        store: SessionStore,
        now: Instant,
    ) -> Result<(), SessionError> {
        let session = live_session(&mut self.sessions, id, now)?;
        if session.store.consistency_token != store.consistency_token {
            debug!(session_id = %id, "Session store rejected, stale consistency token");
            return Err(SessionError::InvalidToken);
        }

        session.store = SessionStore {
            data: store.data,
            consistency_token: self.ids.token(),
        };
        session.expires_at = now + self.ttl;
        debug!(session_id = %id, keys = session.store.data.len(), "Session store saved");
        Ok(())
    }

    fn delete(&mut self, id: &SessionId, now: Instant) -> Result<(), SessionError> {
        live_session(&mut self.sessions, id, now)?;
        self.sessions.remove(id);
        debug!(session_id = %id, "Session deleted");
        Ok(())
    }

    fn delete_expired(&mut self, now: Instant) {
        let before = self.sessions.len();
        self.sessions.retain(|id, session| {
            let expired = session.is_expired(now);
            if expired {
                debug!(session_id = %id, "Expired session removed");
            }
            !expired
        });
        debug!(
            removed = before - self.sessions.len(),
            remaining = self.sessions.len(),
            "Expired session sweep finished"
        );
    }
}

/// Look up a session that exists and has not expired as of `now`.
///
/// An empty ID is a malformed request and gets `BadParameter`, not `NotFound`.
fn live_session<'a>(
    sessions: &'a mut HashMap<SessionId, Session>,
    id: &SessionId,
    now: Instant,
) -> Result<&'a mut Session, SessionError> {
    if id.is_empty() {
        return Err(SessionError::BadParameter("empty session id".to_string()));
    }
    match sessions.get_mut(id) {
        Some(session) if !session.is_expired(now) => Ok(session),
        _ => Err(SessionError::NotFound),
    }
}
