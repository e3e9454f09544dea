//! # Coursekit Session
//!
//! The course-scoped session context and capability gate.
//!
//! - [`session`]: the [`CourseSession`] snapshot and its [`ResolutionState`]
//! - [`store`]: [`CourseSessionStore`], the single writer of the snapshot
//! - [`gate`]: [`CapabilityGate`], pure allow/deny decisions over a snapshot
//! - [`scope`]: [`SessionScope`] and [`CourseContext`], which carry the store
//!   to nested screens
//! - [`source`]: the [`CourseDetailSource`] boundary to the remote API
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use coursekit_core::PermissionId;
//! use coursekit_session::SessionScope;
//!
//! let scope = SessionScope::new(Arc::new(http_source));
//! let course = scope.enter("c2".parse()?);
//!
//! course.settled().await;
//! if course.is_owner() {
//!     // teacher view
//! } else if course.can(PermissionId::CreateResource) {
//!     // assistant with upload rights
//! } else {
//!     // view only
//! }
//! ```

pub mod errors;
pub mod gate;
pub mod scope;
pub mod session;
pub mod source;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types at crate root
pub use errors::SessionError;
pub use gate::{AllowReason, Capability, CapabilityGate, Decision, DenyReason};
pub use scope::{CourseContext, SessionScope};
pub use session::{CourseSession, ResolutionState};
pub use source::{CourseDetailSource, FetchError};
pub use store::{CourseSessionStore, Entry, Resolution, ResolutionOutcome, SessionWatch};
