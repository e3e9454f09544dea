use std::sync::Arc;
use std::time::Duration;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use coursekit::SessionScope;
use coursekit::coursekit_api::HttpCourseClient;
use coursekit::coursekit_config::ApiConfig;
use coursekit::coursekit_core::PermissionId;
use coursekit::coursekit_models::{CourseId, CourseRole};
use coursekit::coursekit_session::ResolutionState;
use coursekit::coursekit_session::testing::{StaticSource, course_detail};
use coursekit::report::{CourseReport, resolve_course};
use serde_json::json;

async fn course(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "algebra" => Json(json!({
            "id": "algebra",
            "title": "Algebra I",
            "description": "Linear equations and inequalities",
            "isTeacher": false,
            "permissions": ["CREATE_ASSESSMENT", "REVIEW_ASSESSMENT", "DELETE_COURSE"]
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn http_scope() -> SessionScope {
    let app = Router::new().route("/api/courses/{id}", get(course));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ApiConfig {
        base_url: format!("http://{addr}/api"),
        token: Some("token".to_string()),
        http_timeout_secs: 5,
    };
    SessionScope::new(Arc::new(HttpCourseClient::new(config).unwrap()))
}

#[tokio::test]
async fn test_report_over_http() {
    let scope = http_scope().await;

    let context = resolve_course(&scope, CourseId::new("algebra"), Duration::from_secs(5))
        .await
        .unwrap();
    let report = CourseReport::from_context(&context);

    assert_eq!(report.state, ResolutionState::Ready);
    assert_eq!(report.role, CourseRole::Assistant);
    assert_eq!(report.title.as_deref(), Some("Algebra I"));
    // DELETE_COURSE is never granted to an assistant, even if the API lists it.
    assert_eq!(
        report.allowed().collect::<Vec<_>>(),
        vec![PermissionId::CreateAssessment, PermissionId::ReviewAssessment]
    );
}

#[tokio::test]
async fn test_missing_course_over_http() {
    let scope = http_scope().await;

    let context = resolve_course(&scope, CourseId::new("nope"), Duration::from_secs(5))
        .await
        .unwrap();
    let report = CourseReport::from_context(&context);

    assert_eq!(report.state, ResolutionState::Failed);
    assert_eq!(report.allowed().count(), 0);
    assert!(report.failure.unwrap().contains("not found"));
}

#[tokio::test]
async fn test_switching_course_supersedes_previous_handles() {
    let source = Arc::new(
        StaticSource::new()
            .with_course(course_detail("c1", true, &[]))
            .with_course(course_detail("c2", false, &["EDIT_RESOURCE"])),
    );
    let scope = SessionScope::new(source);

    let first = resolve_course(&scope, CourseId::new("c1"), Duration::from_secs(5))
        .await
        .unwrap();
    assert!(first.is_owner());

    let second = resolve_course(&scope, CourseId::new("c2"), Duration::from_secs(5))
        .await
        .unwrap();

    let stale = CourseReport::from_context(&first);
    assert_eq!(stale.allowed().count(), 0);
    assert_eq!(stale.state, ResolutionState::Idle);

    let current = CourseReport::from_context(&second);
    assert_eq!(
        current.allowed().collect::<Vec<_>>(),
        vec![PermissionId::EditResource]
    );
}
