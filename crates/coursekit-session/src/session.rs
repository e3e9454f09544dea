//! The course session snapshot.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use coursekit_core::PermissionId;
use coursekit_models::{CourseId, CourseRole, FullCourseDetail};

/// Progress of resolving the active course.
///
/// Transitions only `Idle -> Resolving -> {Ready, Failed}`; entering a new
/// course restarts the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolutionState {
    #[default]
    Idle,
    Resolving,
    Ready,
    Failed,
}

impl ResolutionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }

    /// True once a resolution has finished, successfully or not.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only snapshot of the course in scope.
///
/// Snapshots are replaced wholesale by the store, never patched, so a reader
/// always sees one consistent state. Cloning is cheap; the detail is shared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseSession {
    course_id: Option<CourseId>,
    course_detail: Option<Arc<FullCourseDetail>>,
    role: CourseRole,
    permissions: BTreeSet<PermissionId>,
    resolution_state: ResolutionState,
    generation: u64,
    resolved_at: Option<DateTime<Utc>>,
    failure: Option<String>,
}

impl CourseSession {
    /// No course in scope.
    pub(crate) fn idle(generation: u64) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    /// Freshly entered course with nothing known yet.
    pub(crate) fn resolving(course_id: CourseId, generation: u64) -> Self {
        Self {
            course_id: Some(course_id),
            resolution_state: ResolutionState::Resolving,
            generation,
            ..Self::default()
        }
    }

    pub(crate) fn ready(
        generation: u64,
        detail: FullCourseDetail,
        permissions: BTreeSet<PermissionId>,
    ) -> Self {
        let role = CourseRole::derive(&detail, &permissions);
        // Only assistants carry an explicit grant set.
        let permissions = if role == CourseRole::Assistant {
            permissions
        } else {
            BTreeSet::new()
        };
        Self {
            course_id: Some(detail.id.clone()),
            course_detail: Some(Arc::new(detail)),
            role,
            permissions,
            resolution_state: ResolutionState::Ready,
            generation,
            resolved_at: Some(Utc::now()),
            failure: None,
        }
    }

    pub(crate) fn failed(course_id: CourseId, generation: u64, failure: String) -> Self {
        Self {
            course_id: Some(course_id),
            resolution_state: ResolutionState::Failed,
            generation,
            resolved_at: Some(Utc::now()),
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn course_id(&self) -> Option<&CourseId> {
        self.course_id.as_ref()
    }

    pub fn course_detail(&self) -> Option<&FullCourseDetail> {
        self.course_detail.as_deref()
    }

    pub fn role(&self) -> CourseRole {
        self.role
    }

    /// Explicit grants. Empty unless the caller is an assistant.
    pub fn permissions(&self) -> &BTreeSet<PermissionId> {
        &self.permissions
    }

    pub fn resolution_state(&self) -> ResolutionState {
        self.resolution_state
    }

    /// Resolution epoch. Bumped by every reset of the store.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Why the last resolution failed, for display.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.resolution_state == ResolutionState::Ready
    }

    pub fn is_for(&self, course_id: &CourseId) -> bool {
        self.course_id.as_ref() == Some(course_id)
    }
}
