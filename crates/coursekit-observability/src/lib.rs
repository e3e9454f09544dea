//! Coursekit Observability
//!
//! Provides configurable observability features:
//! - Console and rolling-file logging via `tracing-subscriber`
//! - Course session metrics via the `metrics` facade
//!
//! This crate can be enabled or disabled at compile time via the
//! `observability` feature flag. At runtime, metrics can be further
//! controlled via the `OBSERVABILITY_ENABLED` environment variable.
//!
//! # Features
//!
//! - `observability` (default): Enables logging setup and metrics tracking
//!
//! # Examples
//!
//! ```no_run
//! use coursekit_observability::{LogConfig, init_tracing};
//!
//! let _guard = init_tracing(&LogConfig::from_env());
//! // ... application code; keep the guard alive so file logs are flushed ...
//! ```

#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

#[cfg(feature = "observability")]
pub use logging::{LogConfig, LogFormat, LogGuard, build_env_filter, init_tracing};
#[cfg(feature = "observability")]
pub use metrics::{
    is_observability_enabled, track_course_exit, track_resolution, track_resolution_duration,
    track_stale_resolution,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    /// Logging settings are ignored when the feature is disabled.
    #[derive(Clone, Debug, Default)]
    pub struct LogConfig;

    impl LogConfig {
        pub fn from_env() -> Self {
            Self
        }
    }

    /// Placeholder for the file writer guard.
    pub struct LogGuard;

    /// No-op observability check when feature disabled
    pub fn is_observability_enabled() -> bool {
        false
    }

    /// No-op tracing initialization when feature disabled
    pub fn init_tracing(_config: &LogConfig) -> Option<LogGuard> {
        None
    }

    // No-op tracking functions
    pub fn track_resolution(_outcome: &str) {}
    pub fn track_resolution_duration(_outcome: &str, _duration_secs: f64) {}
    pub fn track_stale_resolution() {}
    pub fn track_course_exit() {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
