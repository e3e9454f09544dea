//! Course-detail client for the platform REST API.

use async_trait::async_trait;
use coursekit_config::ApiConfig;
use coursekit_models::{CourseId, FullCourseDetail};
use coursekit_session::{CourseDetailSource, FetchError};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, instrument, warn};

use crate::errors::ApiError;

const USER_AGENT: &str = concat!("coursekit/", env!("CARGO_PKG_VERSION"));

/// Fetches `GET {base}/courses/{id}` for the configured user.
#[derive(Clone, Debug)]
pub struct HttpCourseClient {
    client: Client,
    config: ApiConfig,
}

impl HttpCourseClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.http_timeout())
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `{base}/courses/{id}` with the id escaped as a single path segment.
    fn course_url(&self, course_id: &CourseId) -> Result<Url, ApiError> {
        let base = self.config.endpoint("courses");
        let mut url = Url::parse(&base).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(base.clone()))?
            .push(course_id.as_str());
        Ok(url)
    }

    #[instrument(skip(self, course_id), fields(course.id = %course_id))]
    pub async fn course_detail(&self, course_id: &CourseId) -> Result<FullCourseDetail, ApiError> {
        let url = self.course_url(course_id)?;
        debug!(%url, "Fetching course detail");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => return Err(ApiError::NotFound(course_id.clone())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ApiError::Forbidden(course_id.clone()));
            }
            s if !s.is_success() => {
                warn!(status = s.as_u16(), "Course detail request failed");
                return Err(ApiError::Status(s.as_u16()));
            }
            _ => {}
        }

        let body = response.bytes().await.map_err(ApiError::Transport)?;
        let detail: FullCourseDetail = serde_json::from_slice(&body)?;
        debug!(
            is_teacher = detail.is_teacher,
            permissions = detail.permissions.len(),
            "Course detail received"
        );
        Ok(detail)
    }
}

#[async_trait]
impl CourseDetailSource for HttpCourseClient {
    async fn fetch_course_detail(
        &self,
        course_id: &CourseId,
    ) -> Result<FullCourseDetail, FetchError> {
        self.course_detail(course_id).await.map_err(FetchError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_token_with_newline() {
        let config = ApiConfig {
            token: Some("abc\ndef".to_string()),
            ..ApiConfig::default()
        };
        assert!(matches!(
            HttpCourseClient::new(config),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn test_course_url_escapes_id() {
        let client = HttpCourseClient::new(ApiConfig::default()).unwrap();
        let url = client.course_url(&CourseId::new("c#1/x?y=2")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/courses/c%231%2Fx%3Fy=2"
        );
    }

    #[test]
    fn test_builds_with_defaults() {
        let client = HttpCourseClient::new(ApiConfig::default()).unwrap();
        assert_eq!(client.config().http_timeout_secs, 15);
    }
}
