//! Session-scoped propagation layer.
//!
//! A [`SessionScope`] owns the one [`CourseSessionStore`] of a navigation
//! subtree and hands screens [`CourseContext`] handles instead of the store
//! itself, so the store stays the only writer. Nested screens derive their
//! handle from their parent with [`CourseContext::child`]; no screen fetches
//! or derives course state on its own.
//!
//! The scope counts live handles of the active course. Entering a different
//! course supersedes the previous subtree; dropping the last handle of the
//! active course exits it.
//!
//! # Example
//!
//! ```ignore
//! use coursekit_session::SessionScope;
//! use coursekit_core::PermissionId;
//!
//! let scope = SessionScope::new(source);
//! let course = scope.enter("c1".parse()?);
//! let modules_screen = course.child();
//!
//! let session = modules_screen.settled().await;
//! if modules_screen.can(PermissionId::CreateModule) {
//!     // show "Add module"
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use coursekit_core::PermissionId;
use coursekit_models::CourseId;
use tracing::debug;

use crate::gate::{Capability, CapabilityGate, Decision};
use crate::session::CourseSession;
use crate::source::CourseDetailSource;
use crate::store::{CourseSessionStore, Entry, SessionWatch};

/// Live handles of the active course subtree.
#[derive(Debug, Default)]
struct Holders {
    course_id: Option<CourseId>,
    /// Bumped whenever a different course takes over the subtree.
    epoch: u64,
    count: usize,
}

struct ScopeInner {
    store: CourseSessionStore,
    holders: Mutex<Holders>,
}

impl ScopeInner {
    fn holders(&self) -> MutexGuard<'_, Holders> {
        self.holders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Provider of course sessions for one navigation subtree.
#[derive(Clone)]
pub struct SessionScope {
    inner: Arc<ScopeInner>,
}

impl SessionScope {
    pub fn new(source: Arc<dyn CourseDetailSource>) -> Self {
        Self::with_store(CourseSessionStore::new(source))
    }

    pub fn with_store(store: CourseSessionStore) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                store,
                holders: Mutex::new(Holders::default()),
            }),
        }
    }

    /// Declares that a screen needs `course_id` in scope.
    ///
    /// Concurrent entries for the same course share one resolution. Entering
    /// after a failure starts a new attempt.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime when a resolution has to be
    /// started, since the fetch runs on a spawned task.
    pub fn enter(&self, course_id: CourseId) -> CourseContext {
        let mut holders = self.inner.holders();
        if holders.course_id.as_ref() == Some(&course_id) {
            holders.count += 1;
        } else {
            holders.course_id = Some(course_id.clone());
            holders.epoch += 1;
            holders.count = 1;
        }
        let epoch = holders.epoch;
        // Under the holders lock so two screens switching courses cannot
        // interleave their store updates with the bookkeeping.
        let entry = self.inner.store.enter_course(course_id.clone());
        drop(holders);

        debug!(
            course.id = %course_id,
            scope.epoch = epoch,
            started = entry.is_started(),
            "Screen entered course"
        );
        CourseContext {
            scope: Arc::clone(&self.inner),
            course_id,
            epoch,
        }
    }

    /// Snapshot of whatever course the subtree currently holds.
    pub fn current_session(&self) -> CourseSession {
        self.inner.store.current_session()
    }

    pub fn subscribe(&self) -> SessionWatch {
        self.inner.store.subscribe()
    }

    /// Number of live handles on the active course.
    pub fn active_handles(&self) -> usize {
        self.inner.holders().count
    }
}

/// A screen's view of its course.
///
/// Reads always go through the scope's store, so every handle of a course
/// sees the same snapshot. A handle whose course has been superseded reads
/// an empty session and is denied every capability.
pub struct CourseContext {
    scope: Arc<ScopeInner>,
    course_id: CourseId,
    epoch: u64,
}

impl CourseContext {
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    /// True while this handle's course is the one in scope.
    pub fn is_active(&self) -> bool {
        self.scope.store.current_session().is_for(&self.course_id)
    }

    /// Handle for a nested screen. Does not fetch.
    pub fn child(&self) -> CourseContext {
        let mut holders = self.scope.holders();
        if holders.epoch == self.epoch {
            holders.count += 1;
        }
        CourseContext {
            scope: Arc::clone(&self.scope),
            course_id: self.course_id.clone(),
            epoch: self.epoch,
        }
    }

    /// Snapshot of this handle's course, or an empty session if another
    /// course has taken over the subtree.
    pub fn current_session(&self) -> CourseSession {
        let session = self.scope.store.current_session();
        if session.is_for(&self.course_id) {
            session
        } else {
            CourseSession::default()
        }
    }

    pub fn decide(&self, capability: Capability) -> Decision {
        CapabilityGate::decide_for(
            &self.scope.store.current_session(),
            &self.course_id,
            capability,
        )
    }

    pub fn can(&self, permission: PermissionId) -> bool {
        self.decide(Capability::Permission(permission)).is_allowed()
    }

    pub fn is_owner(&self) -> bool {
        self.decide(Capability::Owner).is_allowed()
    }

    /// Waits until this course is resolved (or failed), or until another
    /// course takes over, and returns this handle's view of the session.
    pub async fn settled(&self) -> CourseSession {
        let session = self.scope.store.subscribe().settled_for(&self.course_id).await;
        if session.is_for(&self.course_id) {
            session
        } else {
            CourseSession::default()
        }
    }

    /// Manual retry or refresh of this handle's course.
    ///
    /// Does nothing when the course is no longer in scope.
    pub fn retry(&self) -> Option<Entry> {
        if !self.is_active() {
            return None;
        }
        self.scope.store.refresh()
    }
}

impl Clone for CourseContext {
    fn clone(&self) -> Self {
        self.child()
    }
}

impl std::fmt::Debug for CourseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseContext")
            .field("course_id", &self.course_id)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl Drop for CourseContext {
    fn drop(&mut self) {
        let mut holders = self.scope.holders();
        if holders.epoch != self.epoch || holders.count == 0 {
            return;
        }
        holders.count -= 1;
        if holders.count == 0 {
            holders.course_id = None;
            self.scope.store.exit_course();
            debug!(course.id = %self.course_id, "Last screen left course");
        }
    }
}
