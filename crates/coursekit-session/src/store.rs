//! Course session store: the only writer of the [`CourseSession`] snapshot.
//!
//! The snapshot lives in a `tokio::sync::watch` channel. Every mutation is a
//! single `send_if_modified` closure, so the identity check and the write
//! happen under one lock and readers never observe a half-applied update.
//!
//! Subscribers receive every published snapshot in publication order over
//! their own unbounded queue, so `Resolving` is always observed before the
//! `Ready` or `Failed` that follows it.
//!
//! Resolutions run on spawned tasks and must therefore be started from
//! within a Tokio runtime. Each reset of the store bumps the session
//! generation; a resolution only lands if the generation it was started for
//! is still current. Superseded resolutions run to completion and their
//! results are discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use coursekit_core::PermissionId;
use coursekit_models::CourseId;
use coursekit_observability::{
    track_course_exit, track_resolution, track_resolution_duration, track_stale_resolution,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, instrument, warn};
use uuid::Uuid;

use crate::errors::SessionError;
use crate::gate::{Capability, CapabilityGate, Decision};
use crate::session::{CourseSession, ResolutionState};
use crate::source::{CourseDetailSource, FetchError};

/// What `enter_course` / `refresh` did.
#[derive(Debug)]
pub enum Entry {
    /// The course was already resolved; nothing changed.
    AlreadyReady,
    /// A resolution for the course is in flight; no second fetch was made.
    Joined,
    /// A new resolution was started.
    Started(Resolution),
}

impl Entry {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }
}

/// Handle to a spawned resolution.
///
/// Dropping it does not cancel the resolution.
#[derive(Debug)]
pub struct Resolution {
    course_id: CourseId,
    generation: u64,
    handle: JoinHandle<ResolutionOutcome>,
}

impl Resolution {
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Waits for the fetch to complete and reports what happened to its result.
    pub async fn finished(self) -> ResolutionOutcome {
        self.handle.await.unwrap_or(ResolutionOutcome::Aborted)
    }
}

/// Fate of a resolution's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The result became the current session (`Ready` or `Failed`).
    Applied(ResolutionState),
    /// The course was superseded before the result arrived.
    Stale,
    /// The resolution task panicked or was cancelled by the runtime.
    Aborted,
}

/// Result of the atomic reset step inside `send_if_modified`.
enum Reset {
    Kept(ResolutionState),
    Started(CourseId, u64),
}

/// Holds the course currently in scope and resolves its detail.
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct CourseSessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    source: Arc<dyn CourseDetailSource>,
    state: watch::Sender<CourseSession>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<CourseSession>>>,
}

impl std::fmt::Debug for CourseSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseSessionStore")
            .field("session", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl CourseSessionStore {
    pub fn new(source: Arc<dyn CourseDetailSource>) -> Self {
        let (state, _) = watch::channel(CourseSession::default());
        Self {
            inner: Arc::new(StoreInner {
                source,
                state,
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Puts `course_id` in scope and starts resolving it.
    ///
    /// Re-entering a course that is `Ready` or already `Resolving` is a no-op.
    /// Any other entry resets the session before the fetch starts, so the
    /// previous course's data is never visible under the new id.
    ///
    /// # Panics
    ///
    /// Panics outside a Tokio runtime when a new resolution is started.
    #[instrument(skip(self, course_id), fields(course.id = %course_id))]
    pub fn enter_course(&self, course_id: CourseId) -> Entry {
        let mut reset = Reset::Kept(ResolutionState::Idle);
        self.inner.publish(|session| {
            let state = session.resolution_state();
            if session.is_for(&course_id)
                && matches!(state, ResolutionState::Resolving | ResolutionState::Ready)
            {
                reset = Reset::Kept(state);
                return false;
            }
            let generation = session.generation() + 1;
            *session = CourseSession::resolving(course_id.clone(), generation);
            reset = Reset::Started(course_id.clone(), generation);
            true
        });
        self.finish_reset(reset)
    }

    /// Re-resolves the course in scope through the same state machine.
    ///
    /// Used for manual retry after a failure and to pick up permission changes
    /// mid-session. Returns `None` when no course is in scope.
    #[instrument(skip(self))]
    pub fn refresh(&self) -> Option<Entry> {
        let mut reset = None;
        self.inner.publish(|session| {
            let Some(course_id) = session.course_id().cloned() else {
                return false;
            };
            if session.resolution_state() == ResolutionState::Resolving {
                reset = Some(Reset::Kept(ResolutionState::Resolving));
                return false;
            }
            let generation = session.generation() + 1;
            *session = CourseSession::resolving(course_id.clone(), generation);
            reset = Some(Reset::Started(course_id, generation));
            true
        });
        reset.map(|reset| self.finish_reset(reset))
    }

    /// Leaves the course subtree. Idempotent.
    #[instrument(skip(self))]
    pub fn exit_course(&self) {
        let mut left = None;
        let changed = self.inner.publish(|session| {
            if session.course_id().is_none() {
                return false;
            }
            left = session.course_id().cloned();
            *session = CourseSession::idle(session.generation() + 1);
            true
        });
        if changed {
            track_course_exit();
            if let Some(course_id) = left {
                info!(course.id = %course_id, "Exited course");
            }
        }
    }

    /// Snapshot of the session in scope.
    pub fn current_session(&self) -> CourseSession {
        self.inner.state.borrow().clone()
    }

    pub fn can(&self, permission: PermissionId) -> bool {
        CapabilityGate::can(&self.inner.state.borrow(), permission)
    }

    pub fn is_owner(&self) -> bool {
        CapabilityGate::is_owner(&self.inner.state.borrow())
    }

    pub fn decide(&self, capability: Capability) -> Decision {
        CapabilityGate::decide(&self.inner.state.borrow(), capability)
    }

    /// Read-only change notifications, starting after the current snapshot.
    pub fn subscribe(&self) -> SessionWatch {
        let (tx, events) = mpsc::unbounded_channel();
        // Registered under the state lock so no publication is missed or
        // delivered twice.
        self.inner.state.send_if_modified(|_| {
            self.inner.subscribers().push(tx);
            false
        });
        SessionWatch {
            rx: self.inner.state.subscribe(),
            events,
        }
    }

    fn finish_reset(&self, reset: Reset) -> Entry {
        match reset {
            Reset::Started(course_id, generation) => {
                info!(course.id = %course_id, session.generation = generation, "Resolving course");
                Entry::Started(self.spawn_resolution(course_id, generation))
            }
            Reset::Kept(ResolutionState::Ready) => {
                debug!("Course already resolved");
                Entry::AlreadyReady
            }
            Reset::Kept(_) => {
                debug!("Joining in-flight resolution");
                Entry::Joined
            }
        }
    }

    fn spawn_resolution(&self, course_id: CourseId, generation: u64) -> Resolution {
        let inner = Arc::clone(&self.inner);
        let span = info_span!(
            "course_resolution",
            resolution.id = %Uuid::new_v4(),
            course.id = %course_id,
            session.generation = generation,
        );
        let task_course_id = course_id.clone();
        let handle = tokio::spawn(
            async move { inner.resolve(task_course_id, generation).await }.instrument(span),
        );
        Resolution {
            course_id,
            generation,
            handle,
        }
    }
}

impl StoreInner {
    fn subscribers(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<CourseSession>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `modify` atomically and, if it changed the session, queues the
    /// new snapshot for every live subscriber before the lock is released.
    fn publish(&self, modify: impl FnOnce(&mut CourseSession) -> bool) -> bool {
        self.state.send_if_modified(|session| {
            if !modify(session) {
                return false;
            }
            self.subscribers()
                .retain(|tx| tx.send(session.clone()).is_ok());
            true
        })
    }

    async fn resolve(&self, course_id: CourseId, generation: u64) -> ResolutionOutcome {
        let started = Instant::now();

        let next = match self.source.fetch_course_detail(&course_id).await {
            Ok(detail) if detail.id != course_id => {
                let source = FetchError::Mismatch {
                    requested: course_id.clone(),
                    received: detail.id,
                };
                Self::failed(course_id.clone(), generation, source)
            }
            Ok(detail) => {
                let parsed = detail.parse_permissions();
                if !parsed.rejected.is_empty() {
                    warn!(
                        rejected = ?parsed.rejected,
                        "Ignoring permissions outside the assistant catalog"
                    );
                }
                CourseSession::ready(generation, detail, parsed.granted)
            }
            Err(source) => Self::failed(course_id.clone(), generation, source),
        };

        let state = next.resolution_state();
        let role = next.role();
        let failure = next.failure().map(str::to_owned);

        let applied = self.publish(|session| {
            if session.generation() == generation
                && session.is_for(&course_id)
                && session.resolution_state() == ResolutionState::Resolving
            {
                *session = next;
                true
            } else {
                false
            }
        });

        if !applied {
            let stale = SessionError::StaleResolution {
                course_id,
                generation,
            };
            debug!(error = %stale, "Discarding superseded resolution");
            track_stale_resolution();
            return ResolutionOutcome::Stale;
        }

        let outcome = state.as_str();
        track_resolution(outcome);
        track_resolution_duration(outcome, started.elapsed().as_secs_f64());
        match failure {
            Some(error) => warn!(%error, "Course resolution failed"),
            None => info!(course.role = %role, "Course resolved"),
        }

        ResolutionOutcome::Applied(state)
    }

    fn failed(course_id: CourseId, generation: u64, source: FetchError) -> CourseSession {
        let error = SessionError::ResolutionFailed {
            course_id: course_id.clone(),
            source,
        };
        CourseSession::failed(course_id, generation, error.to_string())
    }
}

/// Read-only view of the store that is notified of every change.
///
/// Snapshots published while nobody reads are queued, so a slow subscriber
/// still sees `Resolving` before the settled state that replaced it.
pub struct SessionWatch {
    rx: watch::Receiver<CourseSession>,
    events: mpsc::UnboundedReceiver<CourseSession>,
}

impl SessionWatch {
    pub fn current(&self) -> CourseSession {
        self.rx.borrow().clone()
    }

    /// Next published snapshot, in publication order. Returns `None` once the
    /// store and its resolutions are gone.
    pub async fn changed(&mut self) -> Option<CourseSession> {
        self.events.recv().await
    }

    /// Waits until the session is not `Resolving`.
    ///
    /// There is no timeout: a hung fetch keeps this pending. Hosts that need
    /// a bound wrap the call in `tokio::time::timeout`.
    pub async fn settled(&mut self) -> CourseSession {
        self.wait_until(|session| session.resolution_state() != ResolutionState::Resolving)
            .await
    }

    /// Waits until `course_id` is settled or no longer in scope.
    pub async fn settled_for(&mut self, course_id: &CourseId) -> CourseSession {
        self.wait_until(|session| {
            !session.is_for(course_id)
                || session.resolution_state() != ResolutionState::Resolving
        })
        .await
    }

    async fn wait_until(&mut self, done: impl FnMut(&CourseSession) -> bool) -> CourseSession {
        if let Ok(session) = self.rx.wait_for(done).await {
            return session.clone();
        }
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedSource, StaticSource, course_detail};
    use tokio_test::{assert_pending, assert_ready, task};

    fn store_with(source: Arc<dyn CourseDetailSource>) -> CourseSessionStore {
        CourseSessionStore::new(source)
    }

    async fn finish(entry: Entry) -> ResolutionOutcome {
        match entry {
            Entry::Started(resolution) => resolution.finished().await,
            other => panic!("expected a started resolution, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_enter_resets_before_fetch() {
        let source = Arc::new(ScriptedSource::new());
        let store = store_with(source.clone());

        let _ = store.enter_course(CourseId::new("c1"));
        let session = store.current_session();
        assert_eq!(session.resolution_state(), ResolutionState::Resolving);
        assert!(session.is_for(&CourseId::new("c1")));
        assert!(session.course_detail().is_none());
    }

    #[tokio::test]
    async fn test_ready_reentry_is_noop() {
        let source = Arc::new(StaticSource::new().with_course(course_detail("c1", true, &[])));
        let store = store_with(source.clone());

        let outcome = finish(store.enter_course(CourseId::new("c1"))).await;
        assert_eq!(outcome, ResolutionOutcome::Applied(ResolutionState::Ready));
        let before = store.current_session();

        assert!(matches!(
            store.enter_course(CourseId::new("c1")),
            Entry::AlreadyReady
        ));
        assert_eq!(store.current_session(), before);
        assert_eq!(source.fetch_count(&CourseId::new("c1")), 1);
    }

    #[tokio::test]
    async fn test_resolving_reentry_joins() {
        let source = Arc::new(ScriptedSource::new());
        let store = store_with(source.clone());

        let first = store.enter_course(CourseId::new("c1"));
        assert!(first.is_started());
        assert!(matches!(
            store.enter_course(CourseId::new("c1")),
            Entry::Joined
        ));

        source.respond(&CourseId::new("c1"), Ok(course_detail("c1", false, &[])));
        finish(first).await;
        assert_eq!(source.fetch_count(&CourseId::new("c1")), 1);
        assert_eq!(store.current_session().generation(), 1);
    }

    #[tokio::test]
    async fn test_failed_reentry_retries() {
        let id = CourseId::new("c5");
        let source = Arc::new(StaticSource::new().with_failure(id.clone(), FetchError::Status(500)));
        let store = store_with(source.clone());

        let outcome = finish(store.enter_course(id.clone())).await;
        assert_eq!(outcome, ResolutionOutcome::Applied(ResolutionState::Failed));
        let outcome = finish(store.enter_course(id.clone())).await;
        assert_eq!(outcome, ResolutionOutcome::Applied(ResolutionState::Failed));
        assert_eq!(source.fetch_count(&id), 2);
    }

    #[tokio::test]
    async fn test_exit_is_idempotent() {
        let source = Arc::new(StaticSource::new().with_course(course_detail("c1", true, &[])));
        let store = store_with(source);
        let mut watch = store.subscribe();

        finish(store.enter_course(CourseId::new("c1"))).await;
        store.exit_course();
        let after_first = store.current_session();
        store.exit_course();

        assert_eq!(store.current_session(), after_first);
        assert!(after_first.course_id().is_none());
        assert_eq!(after_first.resolution_state(), ResolutionState::Idle);
        assert!(!store.can(PermissionId::EditCourse));
        assert!(!store.is_owner());

        // Only one exit notification was published.
        store.exit_course();
        let states: Vec<_> = std::iter::from_fn(|| watch.events.try_recv().ok())
            .map(|session| session.resolution_state())
            .collect();
        assert_eq!(
            states,
            vec![
                ResolutionState::Resolving,
                ResolutionState::Ready,
                ResolutionState::Idle
            ]
        );
    }

    #[tokio::test]
    async fn test_subscriber_sees_resolving_before_ready() {
        let source = Arc::new(StaticSource::new().with_course(course_detail("c1", false, &[])));
        let store = store_with(source);
        let mut watch = store.subscribe();

        finish(store.enter_course(CourseId::new("c1"))).await;
        store.exit_course();

        let first = watch.changed().await.unwrap();
        assert!(first.is_for(&CourseId::new("c1")));
        assert_eq!(first.resolution_state(), ResolutionState::Resolving);
        let second = watch.changed().await.unwrap();
        assert_eq!(second.resolution_state(), ResolutionState::Ready);
        assert_eq!(second.generation(), first.generation());
        let third = watch.changed().await.unwrap();
        assert_eq!(third.resolution_state(), ResolutionState::Idle);
        assert_eq!(watch.current(), third);
    }

    #[tokio::test]
    async fn test_superseded_course_never_published() {
        let source = Arc::new(ScriptedSource::new());
        let store = store_with(source.clone());
        let mut watch = store.subscribe();

        let first = store.enter_course(CourseId::new("c3"));
        let second = store.enter_course(CourseId::new("c4"));
        source.respond(&CourseId::new("c3"), Ok(course_detail("c3", true, &[])));
        assert_eq!(finish(first).await, ResolutionOutcome::Stale);
        source.respond(&CourseId::new("c4"), Ok(course_detail("c4", false, &[])));
        finish(second).await;

        let mut published = Vec::new();
        while let Ok(session) = watch.events.try_recv() {
            published.push((session.course_id().cloned(), session.resolution_state()));
        }
        assert_eq!(
            published,
            vec![
                (Some(CourseId::new("c3")), ResolutionState::Resolving),
                (Some(CourseId::new("c4")), ResolutionState::Resolving),
                (Some(CourseId::new("c4")), ResolutionState::Ready),
            ]
        );
    }

    #[tokio::test]
    async fn test_exit_discards_in_flight_result() {
        let source = Arc::new(ScriptedSource::new());
        let store = store_with(source.clone());
        let entry = store.enter_course(CourseId::new("c1"));

        store.exit_course();
        source.respond(&CourseId::new("c1"), Ok(course_detail("c1", true, &[])));

        assert_eq!(finish(entry).await, ResolutionOutcome::Stale);
        assert!(store.current_session().course_id().is_none());
        assert!(!store.is_owner());
    }

    #[tokio::test]
    async fn test_refresh_picks_up_revoked_permission() {
        let source = Arc::new(ScriptedSource::new());
        let store = store_with(source.clone());
        let id = CourseId::new("c2");

        let entry = store.enter_course(id.clone());
        source.respond(&id, Ok(course_detail("c2", false, &["CREATE_RESOURCE", "EDIT_RESOURCE"])));
        finish(entry).await;
        assert!(store.can(PermissionId::EditResource));

        let entry = store.refresh().unwrap();
        assert!(!store.can(PermissionId::EditResource), "refresh must not expose old grants");
        source.respond(&id, Ok(course_detail("c2", false, &["CREATE_RESOURCE"])));
        finish(entry).await;

        assert!(store.can(PermissionId::CreateResource));
        assert!(!store.can(PermissionId::EditResource));
        assert_eq!(source.fetch_count(&id), 2);
    }

    #[tokio::test]
    async fn test_refresh_without_course() {
        let store = store_with(Arc::new(ScriptedSource::new()));
        assert!(store.refresh().is_none());
    }

    #[tokio::test]
    async fn test_mismatched_payload_fails_closed() {
        let source = Arc::new(ScriptedSource::new());
        let store = store_with(source.clone());
        let entry = store.enter_course(CourseId::new("c1"));
        source.respond(&CourseId::new("c1"), Ok(course_detail("other", true, &[])));

        assert_eq!(
            finish(entry).await,
            ResolutionOutcome::Applied(ResolutionState::Failed)
        );
        assert!(!store.is_owner());
        assert!(store.current_session().failure().unwrap().contains("other"));
    }

    #[tokio::test]
    async fn test_settled_waits_for_resolution() {
        let source = Arc::new(ScriptedSource::new());
        let store = store_with(source.clone());
        let _ = store.enter_course(CourseId::new("c1"));

        let mut watch = store.subscribe();
        let mut settled = task::spawn(async move { watch.settled().await });
        assert_pending!(settled.poll());

        source.respond(&CourseId::new("c1"), Ok(course_detail("c1", false, &[])));
        // Let the resolution task run.
        while store.current_session().resolution_state() == ResolutionState::Resolving {
            tokio::task::yield_now().await;
        }

        assert!(settled.is_woken());
        let session = assert_ready!(settled.poll());
        assert_eq!(session.resolution_state(), ResolutionState::Ready);
    }
}
