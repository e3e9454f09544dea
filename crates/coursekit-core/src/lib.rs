//! # Coursekit Core
//!
//! Foundational types shared by every Coursekit crate.
//!
//! - [`permissions`]: the closed permission catalog (identifiers, labels,
//!   and the set grantable to course assistants)
//! - [`errors`]: catalog error types
//!
//! # Example
//!
//! ```
//! use coursekit_core::permissions::{self, PermissionId};
//!
//! let id: PermissionId = "CREATE_RESOURCE".parse().unwrap();
//! assert_eq!(id.label(), "Create resources");
//! assert!(permissions::assistant_grantable().contains(&id));
//! assert!(permissions::label_of("LAUNCH_ROCKETS").is_err());
//! ```

pub mod errors;
pub mod permissions;

// Re-export commonly used types at crate root
pub use errors::CatalogError;
pub use permissions::{PermissionId, assistant_grantable, label_of};
