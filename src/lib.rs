//! # Coursekit
//!
//! Course-scoped session context and capability gate for an educational
//! platform client.
//!
//! ## Overview
//!
//! When a user opens a course, every screen inside that course needs the
//! same answer to two questions: what is this course, and what may the user
//! do in it. Coursekit resolves the course detail once per course entry and
//! shares it with every nested screen:
//!
//! - **Course session**: one snapshot per course subtree, written only by the
//!   store; stale responses for superseded courses are discarded
//! - **Capability gate**: owner sees everything, an assistant sees what they
//!   were granted, anyone else sees nothing; while a course is resolving or
//!   failed, everything is denied
//! - **Propagation**: screens hold [`CourseContext`] handles derived from a
//!   [`SessionScope`]; the last handle leaving exits the course
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── coursekit-core/           # Permission catalog
//! ├── coursekit-models/         # Ids, course-detail payload, roles
//! ├── coursekit-config/         # Env-based configuration
//! ├── coursekit-session/        # Store, gate, propagation layer
//! ├── coursekit-api/            # HTTP course-detail source
//! └── coursekit-observability/  # Logging and metrics
//! src/
//! ├── report.rs                 # Course inspection for the CLI
//! └── main.rs                   # `coursekit` binary
//! ```
//!
//! ## Quick Start
//!
//! ### Environment Variables
//!
//! ```bash
//! COURSEKIT_API_URL=https://edu.example.com/api
//! COURSEKIT_API_TOKEN=your-access-token
//! COURSEKIT_HTTP_TIMEOUT_SECS=15
//! COURSEKIT_SETTLE_TIMEOUT_SECS=30
//! LOG_LEVEL=info
//! ```
//!
//! ### Inspecting a course
//!
//! ```bash
//! cargo run -- inspect --course c2
//! cargo run -- check --course c2 --permission CREATE_RESOURCE
//! ```
//!
//! ## Modules
//!
//! - [`report`]: capability report of a course, as the CLI prints it

pub mod report;

// Re-export workspace crates for convenience
pub use coursekit_api;
pub use coursekit_config;
pub use coursekit_core;
pub use coursekit_models;
pub use coursekit_observability;
pub use coursekit_session;

pub use coursekit_session::{CourseContext, SessionScope};
