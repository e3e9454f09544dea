//! Course session integration settings.
//!
//! The session core itself has no timeouts: a hung fetch leaves the session
//! `Resolving`. Hosts that wait on a resolution apply their own liveness
//! bound, configured here.
//!
//! # Environment Variables
//!
//! - `COURSEKIT_SETTLE_TIMEOUT_SECS`: How long a host waits for a course to
//!   resolve before giving up (default: 30)

use std::env;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub settle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_timeout_secs: 30,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            settle_timeout_secs: env::var("COURSEKIT_SETTLE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(30),
        }
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_secs(self.settle_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.settle_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_clone() {
        let config = SessionConfig::default();
        assert_eq!(config.clone(), config);
    }
}
