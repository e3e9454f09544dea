//! Boundary to the remote course-detail endpoint.

use async_trait::async_trait;
use coursekit_models::{CourseId, FullCourseDetail};

/// Error type for course-detail fetches.
///
/// The store treats every variant the same way (the session becomes
/// `Failed`); the distinction exists for logs and for hosts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Course {0} not found")]
    NotFound(CourseId),

    #[error("Access to course {0} is forbidden")]
    Forbidden(CourseId),

    #[error("Unexpected response status {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid course payload: {0}")]
    Decode(String),

    #[error("Requested course {requested} but received {received}")]
    Mismatch {
        requested: CourseId,
        received: CourseId,
    },
}

/// Source of [`FullCourseDetail`] for the calling user.
#[async_trait]
pub trait CourseDetailSource: Send + Sync {
    async fn fetch_course_detail(&self, course_id: &CourseId)
    -> Result<FullCourseDetail, FetchError>;
}
