//! # Coursekit API
//!
//! [`HttpCourseClient`] implements [`coursekit_session::CourseDetailSource`]
//! over the platform's REST API.
//!
//! | response            | error                   |
//! |---------------------|-------------------------|
//! | 404                 | `NotFound`              |
//! | 401, 403            | `Forbidden`             |
//! | other non-2xx       | `Status`                |
//! | connection, timeout | `Transport`             |
//! | malformed JSON      | `Decode`                |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use coursekit_api::HttpCourseClient;
//! use coursekit_config::ApiConfig;
//! use coursekit_session::SessionScope;
//!
//! let client = HttpCourseClient::new(ApiConfig::from_env()?)?;
//! let scope = SessionScope::new(Arc::new(client));
//! ```

pub mod client;
pub mod errors;

pub use client::HttpCourseClient;
pub use errors::ApiError;
