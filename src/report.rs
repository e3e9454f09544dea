//! Course inspection for the `coursekit` binary.
//!
//! Enters a course through a [`SessionScope`], waits for it to settle within
//! the configured liveness bound, and renders the capability table a screen
//! would see.

use std::fmt;
use std::time::Duration;

use anyhow::Context;
use coursekit_core::PermissionId;
use coursekit_models::{CourseId, CourseRole};
use coursekit_session::{Capability, CourseContext, Decision, ResolutionState, SessionScope};
use tracing::{info, warn};

/// One line of the capability table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRow {
    pub permission: PermissionId,
    pub decision: Decision,
}

/// What a screen for this course would be allowed to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseReport {
    pub course_id: CourseId,
    pub title: Option<String>,
    pub state: ResolutionState,
    pub role: CourseRole,
    pub failure: Option<String>,
    pub owner: Decision,
    pub capabilities: Vec<CapabilityRow>,
}

impl CourseReport {
    pub fn from_context(context: &CourseContext) -> Self {
        let session = context.current_session();
        let capabilities = PermissionId::all()
            .iter()
            .map(|permission| CapabilityRow {
                permission: *permission,
                decision: context.decide(Capability::Permission(*permission)),
            })
            .collect();

        Self {
            course_id: context.course_id().clone(),
            title: session.course_detail().map(|detail| detail.title.clone()),
            state: session.resolution_state(),
            role: session.role(),
            failure: session.failure().map(str::to_owned),
            owner: context.decide(Capability::Owner),
            capabilities,
        }
    }

    pub fn allowed(&self) -> impl Iterator<Item = PermissionId> + '_ {
        self.capabilities
            .iter()
            .filter(|row| row.decision.is_allowed())
            .map(|row| row.permission)
    }
}

impl fmt::Display for CourseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Course:  {}", self.course_id)?;
        if let Some(title) = &self.title {
            writeln!(f, "Title:   {}", title)?;
        }
        writeln!(f, "State:   {}", self.state)?;
        writeln!(f, "Role:    {}", self.role)?;
        if let Some(failure) = &self.failure {
            writeln!(f, "Failure: {}", failure)?;
        }
        writeln!(f, "Owner:   {}", self.owner)?;
        writeln!(f)?;
        for row in &self.capabilities {
            let mark = if row.decision.is_allowed() { "✅" } else { "❌" };
            writeln!(
                f,
                "{} {:<20} {:<20} {}",
                mark,
                row.permission.as_str(),
                row.permission.label(),
                row.decision
            )?;
        }
        Ok(())
    }
}

/// Enters `course_id` and waits until it is resolved or failed.
///
/// # Errors
///
/// Fails if the course is still resolving after `settle_timeout`. A failed
/// resolution is not an error; it shows up in the returned context as a
/// `Failed` session.
pub async fn resolve_course(
    scope: &SessionScope,
    course_id: CourseId,
    settle_timeout: Duration,
) -> anyhow::Result<CourseContext> {
    let context = scope.enter(course_id);

    let session = tokio::time::timeout(settle_timeout, context.settled())
        .await
        .with_context(|| {
            format!(
                "Course {} did not resolve within {}s",
                context.course_id(),
                settle_timeout.as_secs()
            )
        })?;

    match session.failure() {
        Some(error) => warn!(course.id = %context.course_id(), %error, "Course unavailable"),
        None => info!(
            course.id = %context.course_id(),
            course.role = %session.role(),
            "Course ready"
        ),
    }
    Ok(context)
}
