//! Session manager configuration.

use std::time::Duration;

use thiserror::Error;

/// Session inactivity lifetime (3 minutes).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(180);

/// Period between expired-session sweeps (1 minute).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Depth of the actor's command queue. One pending command gives callers
/// backpressure as soon as the actor falls behind.
pub const DEFAULT_COMMAND_BUFFER: usize = 1;

/// Tunables for a [`SessionManager`](crate::session::SessionManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Sliding expiry applied on create and on every successful load or save.
    pub ttl: Duration,
    /// Tick period of the expiration sweeper.
    pub sweep_interval: Duration,
    /// Capacity of the command queue.
    pub command_buffer: usize,
    /// Upper bound on a single facade call. `None` waits for the actor.
    pub request_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_SESSION_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            command_buffer: DEFAULT_COMMAND_BUFFER,
            request_timeout: None,
        }
    }
}

impl SessionConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    pub fn with_command_buffer(mut self, command_buffer: usize) -> Self {
        self.command_buffer = command_buffer;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl.is_zero() {
            return Err(ConfigError::ZeroTtl);
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::ZeroSweepInterval);
        }
        if self.command_buffer == 0 {
            return Err(ConfigError::ZeroCommandBuffer);
        }
        if self.request_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        Ok(())
    }
}

/// Invalid [`SessionConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("session ttl must be greater than zero")]
    ZeroTtl,
    #[error("sweep interval must be greater than zero")]
    ZeroSweepInterval,
    #[error("command buffer must hold at least one command")]
    ZeroCommandBuffer,
    #[error("request timeout must be greater than zero when set")]
    ZeroRequestTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SessionConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(180));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.command_buffer, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_values_are_rejected() {
        let base = SessionConfig::default();
        assert_eq!(
            base.clone().with_ttl(Duration::ZERO).validate(),
            Err(ConfigError::ZeroTtl)
        );
        assert_eq!(
            base.clone().with_sweep_interval(Duration::ZERO).validate(),
            Err(ConfigError::ZeroSweepInterval)
        );
        assert_eq!(
            base.clone().with_command_buffer(0).validate(),
            Err(ConfigError::ZeroCommandBuffer)
        );
        assert_eq!(
            base.with_request_timeout(Some(Duration::ZERO)).validate(),
            Err(ConfigError::ZeroRequestTimeout)
        );
    }
}
