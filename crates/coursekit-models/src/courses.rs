//! Course-detail payload and the caller's role in a course.
//!
//! Only the fields the capability gate consumes are typed; everything else
//! the API returns is kept verbatim in [`FullCourseDetail::extra`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use coursekit_core::PermissionId;
use serde::{Deserialize, Serialize};

use crate::ids::{CourseId, UserId};

/// Course detail as returned by `GET /courses/{id}` for the calling user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullCourseDetail {
    pub id: CourseId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    /// True when the caller created the course.
    #[serde(default)]
    pub is_teacher: bool,
    /// Permission identifiers granted to the caller. Kept as raw strings so an
    /// identifier this client does not know cannot fail the whole payload.
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Catch-all for any other course fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Outcome of mapping the raw `permissions` array onto the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPermissions {
    /// Catalog identifiers an assistant may hold.
    pub granted: BTreeSet<PermissionId>,
    /// Strings outside the catalog, or catalog entries that are owner-only.
    pub rejected: Vec<String>,
}

impl FullCourseDetail {
    /// Maps the raw permission strings onto the assistant-grantable catalog.
    pub fn parse_permissions(&self) -> ParsedPermissions {
        let mut parsed = ParsedPermissions::default();
        for raw in &self.permissions {
            match raw.parse::<PermissionId>() {
                Ok(id) if id.is_assistant_grantable() => {
                    parsed.granted.insert(id);
                }
                _ => parsed.rejected.push(raw.clone()),
            }
        }
        parsed
    }
}

/// The caller's role within a single course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseRole {
    /// The course's creating teacher; holds every permission.
    Owner,
    /// Holds an explicit subset of the catalog.
    Assistant,
    Student,
    /// No course resolved.
    #[default]
    None,
}

impl CourseRole {
    /// Derives the role from a resolved detail and its granted set.
    ///
    /// Ownership wins over explicit grants.
    pub fn derive(detail: &FullCourseDetail, granted: &BTreeSet<PermissionId>) -> Self {
        if detail.is_teacher {
            Self::Owner
        } else if !granted.is_empty() {
            Self::Assistant
        } else {
            Self::Student
        }
    }

    pub fn is_staff(self) -> bool {
        matches!(self, Self::Owner | Self::Assistant)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Assistant => "assistant",
            Self::Student => "student",
            Self::None => "none",
        }
    }
}

impl fmt::Display for CourseRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(is_teacher: bool, permissions: &[&str]) -> FullCourseDetail {
        FullCourseDetail {
            id: CourseId::new("c1"),
            title: "Biology".to_string(),
            description: None,
            owner_id: None,
            is_teacher,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            created_at: None,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn test_deserialize_api_payload() {
        let json = r#"{
            "id": "c1",
            "title": "Biology",
            "ownerId": "u-9",
            "isTeacher": false,
            "permissions": ["CREATE_RESOURCE", "REVIEW_ASSESSMENT"],
            "createdAt": "2024-09-01T08:00:00Z",
            "modulesCount": 4
        }"#;
        let detail: FullCourseDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.id, CourseId::new("c1"));
        assert_eq!(detail.owner_id, Some(UserId::new("u-9")));
        assert!(!detail.is_teacher);
        assert_eq!(detail.permissions.len(), 2);
        assert!(detail.created_at.is_some());
        assert_eq!(detail.extra.get("modulesCount"), Some(&serde_json::json!(4)));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let detail: FullCourseDetail = serde_json::from_str(r#"{"id":"c2"}"#).unwrap();
        assert!(!detail.is_teacher);
        assert!(detail.permissions.is_empty());
        assert!(detail.title.is_empty());
    }

    #[test]
    fn test_parse_permissions_rejects_unknown_and_owner_only() {
        let parsed = detail(false, &["EDIT_MODULE", "TELEPORT", "DELETE_COURSE"]).parse_permissions();
        assert_eq!(
            parsed.granted,
            BTreeSet::from([PermissionId::EditModule])
        );
        assert_eq!(parsed.rejected, vec!["TELEPORT", "DELETE_COURSE"]);
    }

    #[test]
    fn test_derive_role() {
        let owner = detail(true, &[]);
        assert_eq!(
            CourseRole::derive(&owner, &owner.parse_permissions().granted),
            CourseRole::Owner
        );

        let assistant = detail(false, &["CREATE_RESOURCE"]);
        assert_eq!(
            CourseRole::derive(&assistant, &assistant.parse_permissions().granted),
            CourseRole::Assistant
        );

        let student = detail(false, &[]);
        assert_eq!(
            CourseRole::derive(&student, &student.parse_permissions().granted),
            CourseRole::Student
        );
    }

    #[test]
    fn test_owner_with_grants_is_still_owner() {
        let detail = detail(true, &["CREATE_RESOURCE"]);
        assert_eq!(
            CourseRole::derive(&detail, &detail.parse_permissions().granted),
            CourseRole::Owner
        );
    }

    #[test]
    fn test_only_unknown_grants_is_student() {
        let detail = detail(false, &["SOMETHING_NEW"]);
        assert_eq!(
            CourseRole::derive(&detail, &detail.parse_permissions().granted),
            CourseRole::Student
        );
    }

    #[test]
    fn test_role_display() {
        assert_eq!(CourseRole::Assistant.to_string(), "assistant");
        assert_eq!(CourseRole::default(), CourseRole::None);
        assert!(CourseRole::Owner.is_staff());
        assert!(!CourseRole::Student.is_staff());
    }
}
