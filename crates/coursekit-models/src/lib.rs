//! # Coursekit Models
//!
//! Domain models consumed by the course session core.
//!
//! # Modules
//!
//! - [`ids`]: strongly-typed identifiers
//! - [`courses`]: course-detail payload and the caller's role in a course
//!
//! # Example
//!
//! ```
//! use coursekit_models::{CourseId, FullCourseDetail};
//!
//! let detail: FullCourseDetail = serde_json::from_str(
//!     r#"{"id":"c1","title":"Algebra","isTeacher":false,"permissions":["CREATE_RESOURCE"]}"#,
//! ).unwrap();
//! assert_eq!(detail.id, CourseId::new("c1"));
//! ```

pub mod courses;
pub mod ids;

// Re-export commonly used types at crate root for convenience
pub use courses::{CourseRole, FullCourseDetail, ParsedPermissions};
pub use ids::{CourseId, IdError, UserId};
