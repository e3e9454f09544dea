use coursekit_core::CatalogError;
use coursekit_models::CourseId;

use crate::source::FetchError;

/// Conditions raised inside the session core.
///
/// None of these cross into the gate or into screens: resolution failures
/// become `ResolutionState::Failed`, stale results are dropped, and unknown
/// permissions deny.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to resolve course {course_id}: {source}")]
    ResolutionFailed {
        course_id: CourseId,
        #[source]
        source: FetchError,
    },

    #[error(transparent)]
    UnknownPermission(#[from] CatalogError),

    #[error("Discarded stale resolution for course {course_id} (generation {generation})")]
    StaleResolution { course_id: CourseId, generation: u64 },
}
