//! # Coursekit Config
//!
//! Configuration types loaded from environment variables:
//!
//! - [`api`]: remote API location, credentials and HTTP timeout
//! - [`session`]: integration-layer settings for course sessions
//!
//! # Example
//!
//! ```ignore
//! use coursekit_config::{ApiConfig, SessionConfig};
//!
//! let api = ApiConfig::from_env()?;
//! let session = SessionConfig::from_env();
//! ```

pub mod api;
pub mod session;

// Re-export commonly used types at crate root
pub use api::{ApiConfig, ConfigError};
pub use session::SessionConfig;
