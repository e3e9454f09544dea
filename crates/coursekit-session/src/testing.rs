//! In-memory course-detail sources for tests.
//!
//! Enabled by the `test-utils` feature.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use coursekit_models::{CourseId, FullCourseDetail};
use tokio::sync::oneshot;

use crate::source::{CourseDetailSource, FetchError};

type FetchResult = Result<FullCourseDetail, FetchError>;

/// Builds a course detail the way the API would return it.
pub fn course_detail(id: &str, is_teacher: bool, permissions: &[&str]) -> FullCourseDetail {
    FullCourseDetail {
        id: CourseId::new(id),
        title: format!("Course {id}"),
        description: None,
        owner_id: None,
        is_teacher,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        created_at: None,
        extra: HashMap::new(),
    }
}

/// Answers every fetch immediately from a fixed table.
#[derive(Default)]
pub struct StaticSource {
    courses: HashMap<CourseId, FetchResult>,
    calls: Mutex<HashMap<CourseId, usize>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_course(mut self, detail: FullCourseDetail) -> Self {
        self.courses.insert(detail.id.clone(), Ok(detail));
        self
    }

    pub fn with_failure(mut self, course_id: CourseId, error: FetchError) -> Self {
        self.courses.insert(course_id, Err(error));
        self
    }

    pub fn fetch_count(&self, course_id: &CourseId) -> usize {
        let calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        calls.get(course_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl CourseDetailSource for StaticSource {
    async fn fetch_course_detail(&self, course_id: &CourseId) -> FetchResult {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(course_id.clone())
            .or_default() += 1;
        self.courses
            .get(course_id)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::NotFound(course_id.clone())))
    }
}

/// One fetch slot; whichever side arrives first creates the channel.
struct Slot {
    tx: Option<oneshot::Sender<FetchResult>>,
    rx: Option<oneshot::Receiver<FetchResult>>,
}

impl Slot {
    fn open() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            tx: Some(tx),
            rx: Some(rx),
        }
    }
}

#[derive(Default)]
struct Script {
    slots: Vec<Slot>,
    fetched: usize,
    answered: usize,
}

/// A source whose fetches stay pending until the test answers them.
///
/// The n-th call to [`respond`](Self::respond) for a course answers the n-th
/// fetch of that course, regardless of whether the fetch has started yet.
/// This lets tests deliver responses in any order.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<CourseId, Script>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers the oldest unanswered fetch of `course_id`.
    pub fn respond(&self, course_id: &CourseId, result: FetchResult) {
        let tx = {
            let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
            let script = scripts.entry(course_id.clone()).or_default();
            let index = script.answered;
            script.answered += 1;
            Self::slot(script, index).tx.take()
        };
        if let Some(tx) = tx {
            // The fetch may have been dropped along with its runtime.
            let _ = tx.send(result);
        }
    }

    /// Number of fetches started for `course_id`.
    pub fn fetch_count(&self, course_id: &CourseId) -> usize {
        let scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        scripts.get(course_id).map_or(0, |script| script.fetched)
    }

    /// Total fetches started across all courses.
    pub fn total_fetches(&self) -> usize {
        let scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        scripts.values().map(|script| script.fetched).sum()
    }

    fn slot(script: &mut Script, index: usize) -> &mut Slot {
        while script.slots.len() <= index {
            script.slots.push(Slot::open());
        }
        &mut script.slots[index]
    }
}

#[async_trait]
impl CourseDetailSource for ScriptedSource {
    async fn fetch_course_detail(&self, course_id: &CourseId) -> FetchResult {
        let rx = {
            let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
            let script = scripts.entry(course_id.clone()).or_default();
            let index = script.fetched;
            script.fetched += 1;
            Self::slot(script, index).rx.take()
        };
        match rx {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::Transport("response dropped".to_string()))),
            None => Err(FetchError::Transport("fetch slot reused".to_string())),
        }
    }
}
