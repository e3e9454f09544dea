//! Strongly-typed ID newtypes for remote entities.
//!
//! The remote API identifies entities with opaque strings. Wrapping them
//! prevents passing a `UserId` where a `CourseId` is expected.
//!
//! # Example
//!
//! ```
//! use coursekit_models::ids::{CourseId, UserId};
//!
//! fn open_course(id: &CourseId) -> &str { id.as_str() }
//!
//! let course = CourseId::new("42");
//! let _user = UserId::new("7");
//!
//! assert_eq!(open_course(&course), "42");
//! // open_course(&_user); // Compile error! Type mismatch.
//! assert!("  ".parse::<CourseId>().is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when parsing an identifier from user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Macro to define a strongly-typed string ID newtype.
///
/// Generates a transparent wrapper with serde, display and parsing support.
/// Parsing trims surrounding whitespace and rejects empty input.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an identifier received from the API.
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Unwrap into the raw identifier.
            #[inline]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(IdError::Empty(stringify!($name)));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

define_id!(
    /// Strongly-typed ID for Course entities.
    CourseId
);

define_id!(
    /// Strongly-typed ID for User entities.
    UserId
);
