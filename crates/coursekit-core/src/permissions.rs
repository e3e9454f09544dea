//! Permission catalog for course-scoped capabilities.
//!
//! Permissions are identified by the literal strings the remote API returns
//! in the `permissions` array of a course-detail response. The catalog is a
//! closed set: [`PermissionId`] has one variant per identifier, and strings
//! outside the set fail to parse with [`CatalogError::UnknownPermission`].
//!
//! # Example
//!
//! ```
//! use coursekit_core::permissions::{self, PermissionId};
//!
//! for id in permissions::assistant_grantable() {
//!     println!("{:<20} {}", id.as_str(), id.label());
//! }
//!
//! assert_eq!(permissions::label_of("EDIT_COURSE"), Ok("Edit course"));
//! assert!(!permissions::assistant_grantable().contains(&PermissionId::DeleteCourse));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::CatalogError;

// =============================================================================
// Assessment permissions
// =============================================================================

/// Permission to create assessments (assignments and exams)
pub const CREATE_ASSESSMENT: &str = "CREATE_ASSESSMENT";
/// Permission to edit assessments
pub const EDIT_ASSESSMENT: &str = "EDIT_ASSESSMENT";
/// Permission to delete assessments
pub const DELETE_ASSESSMENT: &str = "DELETE_ASSESSMENT";
/// Permission to review and grade submitted assessments
pub const REVIEW_ASSESSMENT: &str = "REVIEW_ASSESSMENT";

// =============================================================================
// Resource permissions
// =============================================================================

/// Permission to create resources
pub const CREATE_RESOURCE: &str = "CREATE_RESOURCE";
/// Permission to edit resources
pub const EDIT_RESOURCE: &str = "EDIT_RESOURCE";
/// Permission to delete resources
pub const DELETE_RESOURCE: &str = "DELETE_RESOURCE";

// =============================================================================
// Module permissions
// =============================================================================

/// Permission to create modules
pub const CREATE_MODULE: &str = "CREATE_MODULE";
/// Permission to edit modules
pub const EDIT_MODULE: &str = "EDIT_MODULE";
/// Permission to delete modules
pub const DELETE_MODULE: &str = "DELETE_MODULE";

// =============================================================================
// Course permissions
// =============================================================================

/// Permission to edit the course itself
pub const EDIT_COURSE: &str = "EDIT_COURSE";
/// Permission to delete the course. Owner only.
pub const DELETE_COURSE: &str = "DELETE_COURSE";

/// A single capability within a course.
///
/// Serializes to and from the catalog string (e.g. `"CREATE_ASSESSMENT"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PermissionId {
    CreateAssessment,
    EditAssessment,
    DeleteAssessment,
    ReviewAssessment,
    CreateResource,
    EditResource,
    DeleteResource,
    CreateModule,
    EditModule,
    DeleteModule,
    EditCourse,
    DeleteCourse,
}

/// Every identifier in the catalog, in display order.
const ALL: [PermissionId; 12] = [
    PermissionId::CreateAssessment,
    PermissionId::EditAssessment,
    PermissionId::DeleteAssessment,
    PermissionId::ReviewAssessment,
    PermissionId::CreateResource,
    PermissionId::EditResource,
    PermissionId::DeleteResource,
    PermissionId::CreateModule,
    PermissionId::EditModule,
    PermissionId::DeleteModule,
    PermissionId::EditCourse,
    PermissionId::DeleteCourse,
];

/// Identifiers an owner may grant to a course assistant, in the order the
/// settings screen lists them.
const ASSISTANT_GRANTABLE: [PermissionId; 11] = [
    PermissionId::CreateAssessment,
    PermissionId::EditAssessment,
    PermissionId::DeleteAssessment,
    PermissionId::ReviewAssessment,
    PermissionId::CreateResource,
    PermissionId::EditResource,
    PermissionId::DeleteResource,
    PermissionId::CreateModule,
    PermissionId::EditModule,
    PermissionId::DeleteModule,
    PermissionId::EditCourse,
];

impl PermissionId {
    /// All identifiers in the catalog.
    pub fn all() -> &'static [PermissionId] {
        &ALL
    }

    /// The wire identifier shared with the remote API.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateAssessment => CREATE_ASSESSMENT,
            Self::EditAssessment => EDIT_ASSESSMENT,
            Self::DeleteAssessment => DELETE_ASSESSMENT,
            Self::ReviewAssessment => REVIEW_ASSESSMENT,
            Self::CreateResource => CREATE_RESOURCE,
            Self::EditResource => EDIT_RESOURCE,
            Self::DeleteResource => DELETE_RESOURCE,
            Self::CreateModule => CREATE_MODULE,
            Self::EditModule => EDIT_MODULE,
            Self::DeleteModule => DELETE_MODULE,
            Self::EditCourse => EDIT_COURSE,
            Self::DeleteCourse => DELETE_COURSE,
        }
    }

    /// Human readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreateAssessment => "Create assessments",
            Self::EditAssessment => "Edit assessments",
            Self::DeleteAssessment => "Delete assessments",
            Self::ReviewAssessment => "Review assessments",
            Self::CreateResource => "Create resources",
            Self::EditResource => "Edit resources",
            Self::DeleteResource => "Delete resources",
            Self::CreateModule => "Create modules",
            Self::EditModule => "Edit modules",
            Self::DeleteModule => "Delete modules",
            Self::EditCourse => "Edit course",
            Self::DeleteCourse => "Delete course",
        }
    }

    /// Whether an owner may grant this permission to an assistant.
    pub fn is_assistant_grantable(self) -> bool {
        ASSISTANT_GRANTABLE.contains(&self)
    }
}

/// Ordered list of the permissions grantable to a non-owner role.
pub fn assistant_grantable() -> &'static [PermissionId] {
    &ASSISTANT_GRANTABLE
}

/// Looks up the label of a wire identifier.
///
/// # Errors
///
/// Returns [`CatalogError::UnknownPermission`] if `id` is outside the catalog.
pub fn label_of(id: &str) -> Result<&'static str, CatalogError> {
    id.parse::<PermissionId>().map(PermissionId::label)
}

impl FromStr for PermissionId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL.iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| CatalogError::unknown(s))
    }
}

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PermissionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PermissionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_identifier_parses_back() {
        for id in PermissionId::all() {
            assert_eq!(id.as_str().parse::<PermissionId>(), Ok(*id));
        }
    }

    #[test]
    fn test_identifiers_and_labels_are_unique() {
        let strings: HashSet<_> = PermissionId::all().iter().map(|p| p.as_str()).collect();
        let labels: HashSet<_> = PermissionId::all().iter().map(|p| p.label()).collect();
        assert_eq!(strings.len(), PermissionId::all().len());
        assert_eq!(labels.len(), PermissionId::all().len());
    }

    #[test]
    fn test_label_of_known() {
        assert_eq!(label_of("REVIEW_ASSESSMENT"), Ok("Review assessments"));
        assert_eq!(label_of("DELETE_MODULE"), Ok("Delete modules"));
    }

    #[test]
    fn test_label_of_unknown() {
        assert_eq!(
            label_of("create_assessment"),
            Err(CatalogError::UnknownPermission("create_assessment".to_string()))
        );
        assert!(label_of("").is_err());
    }

    #[test]
    fn test_assistant_grantable_order_is_stable() {
        let first: Vec<_> = assistant_grantable().to_vec();
        let second: Vec<_> = assistant_grantable().to_vec();
        assert_eq!(first, second);
        assert_eq!(first[0], PermissionId::CreateAssessment);
        assert_eq!(first.last(), Some(&PermissionId::EditCourse));
    }

    #[test]
    fn test_delete_course_is_owner_only() {
        assert!(!PermissionId::DeleteCourse.is_assistant_grantable());
        assert!(PermissionId::EditCourse.is_assistant_grantable());
        assert_eq!(assistant_grantable().len(), PermissionId::all().len() - 1);
    }

    #[test]
    fn test_serde_uses_wire_strings() {
        let json = serde_json::to_string(&PermissionId::CreateResource).unwrap();
        assert_eq!(json, r#""CREATE_RESOURCE""#);

        let parsed: Vec<PermissionId> =
            serde_json::from_str(r#"["EDIT_MODULE","DELETE_COURSE"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![PermissionId::EditModule, PermissionId::DeleteCourse]
        );

        assert!(serde_json::from_str::<PermissionId>(r#""FLY""#).is_err());
    }
}
