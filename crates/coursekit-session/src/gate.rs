//! Capability gate: the single place where course permissions are decided.
//!
//! | role      | permission granted | result |
//! |-----------|--------------------|--------|
//! | Owner     | (ignored)          | allow  |
//! | Assistant | yes                | allow  |
//! | Assistant | no                 | deny   |
//! | Student   | (ignored)          | deny   |
//! | None      | (ignored)          | deny   |
//!
//! Any session that is not `Ready` denies everything. A screen never grants a
//! privileged action while permission data is unknown.
//!
//! # Example
//!
//! ```ignore
//! use coursekit_session::{CapabilityGate, Capability};
//! use coursekit_core::PermissionId;
//!
//! let session = store.current_session();
//! if CapabilityGate::can(&session, PermissionId::CreateAssessment) {
//!     // render "New assessment"
//! }
//! match CapabilityGate::decide(&session, Capability::Owner) {
//!     decision if decision.is_allowed() => { /* teacher view */ }
//!     decision => tracing::debug!(reason = %decision, "Restricted view"),
//! }
//! ```

use std::fmt;

use coursekit_core::PermissionId;
use coursekit_models::{CourseId, CourseRole};
use tracing::error;

use crate::errors::SessionError;
use crate::session::{CourseSession, ResolutionState};

/// What a screen asks the gate for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Permission(PermissionId),
    /// The teacher view; only the owner passes.
    Owner,
}

impl From<PermissionId> for Capability {
    fn from(permission: PermissionId) -> Self {
        Self::Permission(permission)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllowReason {
    /// Ownership supersedes explicit grants.
    Owner,
    /// The assistant holds the requested permission.
    Granted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// No course subtree is active.
    NoCourse,
    /// The course is still being resolved.
    Resolving,
    /// The course detail could not be fetched.
    ResolutionFailed,
    /// The assistant was not granted the permission.
    NotGranted,
    /// Students hold no course permissions.
    NotStaff,
    /// Only the owner passes an ownership check.
    NotOwner,
    /// The session in scope belongs to another course than the one asked about.
    CourseMismatch,
}

/// Outcome of a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Allow(AllowReason),
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Allow(AllowReason::Owner) => "allowed: course owner",
            Self::Allow(AllowReason::Granted) => "allowed: granted to assistant",
            Self::Deny(DenyReason::NoCourse) => "denied: no course in scope",
            Self::Deny(DenyReason::Resolving) => "denied: course still resolving",
            Self::Deny(DenyReason::ResolutionFailed) => "denied: course could not be resolved",
            Self::Deny(DenyReason::NotGranted) => "denied: permission not granted",
            Self::Deny(DenyReason::NotStaff) => "denied: no course permissions",
            Self::Deny(DenyReason::NotOwner) => "denied: not the course owner",
            Self::Deny(DenyReason::CourseMismatch) => "denied: another course is in scope",
        };
        f.write_str(text)
    }
}

/// Pure decision functions over a [`CourseSession`] snapshot.
pub struct CapabilityGate;

impl CapabilityGate {
    /// Decides `capability` against whatever course the session holds.
    pub fn decide(session: &CourseSession, capability: Capability) -> Decision {
        match session.resolution_state() {
            ResolutionState::Idle => return Decision::Deny(DenyReason::NoCourse),
            ResolutionState::Resolving => return Decision::Deny(DenyReason::Resolving),
            ResolutionState::Failed => return Decision::Deny(DenyReason::ResolutionFailed),
            ResolutionState::Ready => {}
        }

        match (session.role(), capability) {
            (CourseRole::Owner, _) => Decision::Allow(AllowReason::Owner),
            (_, Capability::Owner) => Decision::Deny(DenyReason::NotOwner),
            (CourseRole::Assistant, Capability::Permission(permission)) => {
                if session.permissions().contains(&permission) {
                    Decision::Allow(AllowReason::Granted)
                } else {
                    Decision::Deny(DenyReason::NotGranted)
                }
            }
            (CourseRole::Student | CourseRole::None, Capability::Permission(_)) => {
                Decision::Deny(DenyReason::NotStaff)
            }
        }
    }

    /// Like [`decide`](Self::decide), but only for the given course.
    ///
    /// Screens hold on to the course id they entered with; if the session in
    /// scope has moved on to another course they are denied instead of seeing
    /// that course's grants.
    pub fn decide_for(
        session: &CourseSession,
        course_id: &CourseId,
        capability: Capability,
    ) -> Decision {
        if session.course_id().is_some_and(|active| active != course_id) {
            return Decision::Deny(DenyReason::CourseMismatch);
        }
        Self::decide(session, capability)
    }

    pub fn can(session: &CourseSession, permission: PermissionId) -> bool {
        Self::decide(session, Capability::Permission(permission)).is_allowed()
    }

    pub fn is_owner(session: &CourseSession) -> bool {
        session.is_ready() && session.role() == CourseRole::Owner
    }

    /// String-typed check for identifiers that arrive untyped.
    ///
    /// An identifier outside the catalog is a programming error: it panics in
    /// debug builds and denies in release builds.
    pub fn can_str(session: &CourseSession, permission: &str) -> bool {
        match Self::parse_permission(permission) {
            Ok(permission) => Self::can(session, permission),
            Err(_) => false,
        }
    }

    /// Parses an untyped identifier against the catalog.
    pub fn permission(permission: &str) -> Result<PermissionId, SessionError> {
        Ok(permission.parse::<PermissionId>()?)
    }

    fn parse_permission(permission: &str) -> Result<PermissionId, SessionError> {
        Self::permission(permission).inspect_err(|e| {
            error!(error = %e, "Capability check with unknown permission");
            if cfg!(debug_assertions) {
                panic!("{e}");
            }
        })
    }
}
