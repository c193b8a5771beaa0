//! Shared application state.

use crate::session::SessionHandle;

/// State handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionHandle,
}

impl AppState {
    pub fn new(sessions: SessionHandle) -> Self {
        Self { sessions }
    }
}
