//! In-memory session storage.
//!
//! A single actor task owns every session record; [`SessionHandle`] sends it
//! typed commands and waits for the reply. A sweeper task periodically asks the
//! actor to drop expired sessions. [`SessionManager`] starts and stops both.

mod actor;
mod command;
mod handle;
mod ids;
mod manager;
mod sweeper;
mod types;

pub use actor::ActorState;
pub use command::SessionError;
pub use handle::SessionHandle;
pub use ids::{IdGenerator, UuidGenerator};
pub use manager::{SessionManager, SessionManagerBuilder, StartError};
pub use types::{ConsistencyToken, SessionId, SessionStore};
