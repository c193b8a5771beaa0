//! Session manager lifecycle.
//!
//! Start spawns the actor, waits until it reports [`ActorState::Running`], and
//! only then spawns the sweeper. Stop runs the other way round: the sweeper is
//! signalled and joined before the actor is, so a sweep can never be left
//! waiting on an actor that is gone.
//!
//! Dropping a `SessionManager` without calling [`SessionManager::stop`] drops
//! both stop senders, which ends both tasks on their next poll.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{error, info_span, Instrument, Span};

use crate::config::{ConfigError, SessionConfig};

use super::actor::{ActorState, SessionActor};
use super::handle::SessionHandle;
use super::ids::{IdGenerator, UuidGenerator};
use super::sweeper::{SweepStats, Sweeper};

/// Errors starting a [`SessionManager`].
#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("session actor exited before becoming ready")]
    ActorNotReady,
}

/// A spawned task and the signal that ends it.
struct Worker<T> {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<T>,
}

impl<T> Worker<T> {
    /// Signal the task and wait for it to finish. `None` if it panicked.
    async fn stop(self, name: &'static str) -> Option<T> {
        // The task may already be gone if every handle was dropped.
        let _ = self.stop_tx.send(());
        match self.task.await {
            Ok(output) => Some(output),
            Err(e) => {
                error!(worker = name, error = %e, "Session worker ended abnormally");
                None
            }
        }
    }
}

/// Owns the actor and sweeper tasks of one session store.
pub struct SessionManager {
    handle: SessionHandle,
    state_rx: watch::Receiver<ActorState>,
    actor: Worker<()>,
    sweeper: Worker<SweepStats>,
}

impl SessionManager {
    /// Start a manager with UUID identifiers and the default tracing span.
    pub async fn start(config: SessionConfig) -> Result<Self, StartError> {
        Self::builder(config).start().await
    }

    pub fn builder(config: SessionConfig) -> SessionManagerBuilder {
        SessionManagerBuilder {
            config,
            ids: Arc::new(UuidGenerator),
            span: None,
        }
    }

    /// A facade handle; clone it freely.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> ActorState {
        *self.state_rx.borrow()
    }

    /// Stop the sweeper, wait for it to exit, then do the same for the actor.
    pub async fn stop(self) {
        self.shutdown().await;
    }

    /// Ordered shutdown; returns what the sweeper managed before it exited.
    pub(crate) async fn shutdown(self) -> Option<SweepStats> {
        let stats = self.sweeper.stop("sweeper").await;
        self.actor.stop("actor").await;
        stats
    }
}

/// Configures the collaborators injected into a [`SessionManager`].
pub struct SessionManagerBuilder {
    config: SessionConfig,
    ids: Arc<dyn IdGenerator>,
    span: Option<Span>,
}

impl SessionManagerBuilder {
    /// Replace the UUID generator used for session IDs and tokens.
    pub fn id_generator(mut self, ids: impl IdGenerator) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// Span that the actor and sweeper tasks log under.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub async fn start(self) -> Result<SessionManager, StartError> {
        let config = self.config;
        config.validate()?;
        let span = self.span.unwrap_or_else(|| info_span!("session_manager"));

        let (tx, rx) = mpsc::channel(config.command_buffer);
        let (actor_stop_tx, actor_stop_rx) = oneshot::channel();
        let (state_tx, mut state_rx) = watch::channel(ActorState::Starting);

        let actor = SessionActor::new(config.ttl, self.ids, rx, actor_stop_rx, state_tx);
        let actor_task = tokio::spawn(actor.run().instrument(span.clone()));

        // Readiness handshake.
        let ready = state_rx
            .wait_for(|state| *state != ActorState::Starting)
            .await
            .map(|state| *state == ActorState::Running)
            .unwrap_or(false);
        if !ready {
            let _ = actor_stop_tx.send(());
            let _ = actor_task.await;
            return Err(StartError::ActorNotReady);
        }

        let handle = SessionHandle::new(tx, config.request_timeout);

        let (sweeper_stop_tx, sweeper_stop_rx) = oneshot::channel();
        let sweeper = Sweeper::new(handle.clone(), config.sweep_interval, sweeper_stop_rx);
        let sweeper_task = tokio::spawn(sweeper.run().instrument(span));

        Ok(SessionManager {
            handle,
            state_rx,
            actor: Worker {
                stop_tx: actor_stop_tx,
                task: actor_task,
            },
            sweeper: Worker {
                stop_tx: sweeper_stop_tx,
                task: sweeper_task,
            },
        })
    }
}
