//! 피드백 API 핸들러.
//!
//! 모든 입력 검증은 저장소 호출 전에 끝난다. 저장소 실패는 클라이언트 오류로
//! 바뀌지 않고 500으로 응답한다.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::SecondsFormat;
use feedback_core::models::feedback::{FeedbackEntry, FeedbackQuery, NewFeedback, SortOrder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::AppState;

/// 필수 필드 누락 메시지
pub const MISSING_FIELDS_MESSAGE: &str = "Invalid payload: 'message' and 'rating' are required.";

/// 평점 타입 오류 메시지
pub const RATING_TYPE_MESSAGE: &str = "Invalid data format: 'rating' must be an integer.";

/// 메시지 타입 오류 메시지
pub const MESSAGE_TYPE_MESSAGE: &str = "Invalid data format: 'message' must be a string.";

/// 피드백 응답 DTO
#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    /// 피드백 ID
    pub id: i64,
    /// 피드백 본문
    pub message: String,
    /// 평점
    pub rating: i64,
    /// 생성 시각 (RFC3339, UTC)
    pub created_at: String,
}

impl From<FeedbackEntry> for FeedbackResponse {
    fn from(entry: FeedbackEntry) -> Self {
        Self {
            id: entry.id,
            message: entry.message,
            rating: entry.rating,
            created_at: entry.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

/// 피드백 제출 요청 DTO
///
/// 타입 검사를 직접 하기 위해 필드를 JSON 값으로 받는다. `null`은 누락으로 취급.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitFeedbackRequest {
    /// 피드백 본문 (문자열)
    #[serde(default)]
    pub message: Option<Value>,
    /// 평점 (정수)
    #[serde(default)]
    pub rating: Option<Value>,
}

impl SubmitFeedbackRequest {
    /// 필드 존재/타입 확인 후 도메인 검증
    pub fn validate(self) -> Result<NewFeedback, ApiError> {
        let (Some(message), Some(rating)) = (self.message, self.rating) else {
            return Err(ApiError::BadRequest(MISSING_FIELDS_MESSAGE.to_string()));
        };

        let message = message
            .as_str()
            .ok_or_else(|| ApiError::BadRequest(MESSAGE_TYPE_MESSAGE.to_string()))?;
        let rating = rating
            .as_i64()
            .ok_or_else(|| ApiError::BadRequest(RATING_TYPE_MESSAGE.to_string()))?;

        Ok(NewFeedback::new(message, rating)?)
    }
}

/// 피드백 조회 쿼리 파라미터
///
/// 원문 문자열로 받아 직접 파싱한다. 빈 값은 생략과 같다.
#[derive(Debug, Default, Deserialize)]
pub struct ListFeedbackQuery {
    /// 정확히 일치할 평점 (정수)
    pub rating: Option<String>,
    /// 정렬 방향 (asc/desc/ascending/descending)
    pub sort: Option<String>,
}

impl ListFeedbackQuery {
    /// 저장소 조회 조건으로 변환
    pub fn to_query(&self) -> Result<FeedbackQuery, ApiError> {
        let rating = non_empty(self.rating.as_deref())
            .map(|raw| {
                raw.parse::<i64>().map_err(|_| {
                    ApiError::BadRequest(format!(
                        "Invalid 'rating' filter: expected an integer, got {raw:?}."
                    ))
                })
            })
            .transpose()?;

        let sort = non_empty(self.sort.as_deref())
            .map(|raw| {
                raw.parse::<SortOrder>().map_err(|_| {
                    ApiError::BadRequest(format!(
                        "Invalid 'sort' value: expected 'asc' or 'desc', got {raw:?}."
                    ))
                })
            })
            .transpose()?;

        Ok(FeedbackQuery { rating, sort })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 피드백 제출
///
/// POST /api/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    payload: Result<Json<SubmitFeedbackRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!("피드백 본문 거부: {rejection}");
        ApiError::BadRequest(format!("Invalid payload: {}", rejection.body_text()))
    })?;

    let feedback = req.validate().inspect_err(|e| warn!("피드백 검증 실패: {e}"))?;

    let entry = state.store.insert(&feedback).await?;
    info!("피드백 생성: id={}, rating={}", entry.id, entry.rating);

    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// 피드백 목록 조회
///
/// GET /api/feedback?rating=5&sort=desc
pub async fn list_feedback(
    State(state): State<AppState>,
    params: Result<Query<ListFeedbackQuery>, QueryRejection>,
) -> Result<Json<Vec<FeedbackResponse>>, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        warn!("조회 파라미터 거부: {rejection}");
        ApiError::BadRequest(format!("Invalid query: {}", rejection.body_text()))
    })?;

    let query = params
        .to_query()
        .inspect_err(|e| warn!("조회 파라미터 검증 실패: {e}"))?;

    let entries = state.store.query(&query).await?;

    Ok(Json(entries.into_iter().map(FeedbackResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_router;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::Router;
    use feedback_core::error::CoreError;
    use feedback_core::ports::storage::FeedbackStore;
    use feedback_storage::sqlite::SqliteStorage;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(store: Arc<dyn FeedbackStore>) -> Router {
        build_router(AppState { store })
    }

    fn app() -> (Router, Arc<SqliteStorage>) {
        let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
        (app_with(storage.clone()), storage)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/feedback")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    /// 항상 실패하는 저장소
    struct FailingStore;

    #[async_trait]
    impl FeedbackStore for FailingStore {
        async fn insert(&self, _: &NewFeedback) -> Result<FeedbackEntry, CoreError> {
            Err(CoreError::Storage("disk I/O error".to_string()))
        }

        async fn query(&self, _: &FeedbackQuery) -> Result<Vec<FeedbackEntry>, CoreError> {
            Err(CoreError::Storage("disk I/O error".to_string()))
        }

        async fn count(&self) -> Result<u64, CoreError> {
            Err(CoreError::Storage("disk I/O error".to_string()))
        }
    }

    #[tokio::test]
    async fn submit_returns_created_entry() {
        let (app, _) = app();

        let (status, body) = send(&app, post_json(r#"{"message": "This is great!", "rating": 5}"#)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 1);
        assert_eq!(body["message"], "This is great!");
        assert_eq!(body["rating"], 5);
        assert!(body["created_at"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn submit_missing_fields_is_bad_request() {
        let (app, storage) = app();

        for payload in [
            r#"{"rating": 4}"#,
            r#"{"message": "No rating here."}"#,
            r#"{"message": null, "rating": 3}"#,
            r#"{}"#,
        ] {
            let (status, body) = send(&app, post_json(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {payload}");
            assert_eq!(body["error"], MISSING_FIELDS_MESSAGE);
            assert_eq!(body["status"], 400);
        }

        assert_eq!(storage.count_feedback().unwrap(), 0);
    }

    #[tokio::test]
    async fn submit_rating_must_be_integer() {
        let (app, storage) = app();

        for payload in [
            r#"{"message": "Rating is a string", "rating": "five"}"#,
            r#"{"message": "Rating is a float", "rating": 4.5}"#,
        ] {
            let (status, body) = send(&app, post_json(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], RATING_TYPE_MESSAGE);
        }

        assert_eq!(storage.count_feedback().unwrap(), 0);
    }

    #[tokio::test]
    async fn submit_message_must_be_string() {
        let (app, _) = app();

        let (status, body) = send(&app, post_json(r#"{"message": 42, "rating": 3}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], MESSAGE_TYPE_MESSAGE);
    }

    #[tokio::test]
    async fn submit_rating_out_of_range() {
        let (app, storage) = app();

        for rating in [0, 6, -1] {
            let payload = format!(r#"{{"message": "out of range", "rating": {rating}}}"#);
            let (status, body) = send(&app, post_json(&payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].as_str().unwrap().starts_with("rating:"));
        }

        assert_eq!(storage.count_feedback().unwrap(), 0);
    }

    #[tokio::test]
    async fn submit_blank_message() {
        let (app, _) = app();

        let (status, body) = send(&app, post_json(r#"{"message": "   ", "rating": 3}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("message:"));
    }

    #[tokio::test]
    async fn submit_malformed_body() {
        let (app, _) = app();

        let (status, body) = send(&app, post_json("{ not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid payload"));

        let (status, _) = send(&app, post_json("[1, 2, 3]")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let no_content_type = Request::builder()
            .method("POST")
            .uri("/api/feedback")
            .body(Body::from(r#"{"message": "hi", "rating": 5}"#))
            .unwrap();
        let (status, _) = send(&app, no_content_type).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_empty_is_ok() {
        let (app, _) = app();

        let (status, body) = send(&app, get("/api/feedback")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn list_filters_by_rating() {
        let (app, _) = app();
        send(&app, post_json(r#"{"message": "A decent rating", "rating": 3}"#)).await;
        send(&app, post_json(r#"{"message": "A great rating", "rating": 5}"#)).await;
        send(&app, post_json(r#"{"message": "Another great one", "rating": 5}"#)).await;

        let (status, body) = send(&app, get("/api/feedback?rating=5")).await;
        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item["rating"] == 5));

        // 빈 값은 필터 없음
        let (_, body) = send(&app, get("/api/feedback?rating=")).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn list_defaults_to_newest_first() {
        let (app, _) = app();
        send(&app, post_json(r#"{"message": "First post", "rating": 4}"#)).await;
        send(&app, post_json(r#"{"message": "Second post", "rating": 5}"#)).await;

        let (status, body) = send(&app, get("/api/feedback")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["message"], "Second post");
        assert_eq!(body[1]["message"], "First post");

        let (_, blank_sort) = send(&app, get("/api/feedback?sort=")).await;
        assert_eq!(blank_sort, body);
    }

    #[tokio::test]
    async fn list_sorts_both_directions() {
        let (app, _) = app();
        send(&app, post_json(r#"{"message": "Post A", "rating": 1}"#)).await;
        send(&app, post_json(r#"{"message": "Post B", "rating": 2}"#)).await;

        let (_, asc) = send(&app, get("/api/feedback?sort=asc")).await;
        assert_eq!(asc[0]["message"], "Post A");
        assert_eq!(asc[1]["message"], "Post B");

        let (_, desc) = send(&app, get("/api/feedback?sort=descending")).await;
        assert_eq!(desc[0]["message"], "Post B");
        assert_eq!(desc[1]["message"], "Post A");
    }

    #[tokio::test]
    async fn list_invalid_sort_is_bad_request() {
        let (app, storage) = app();
        send(&app, post_json(r#"{"message": "Post A", "rating": 1}"#)).await;

        let (status, body) = send(&app, get("/api/feedback?sort=invalid-value")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("invalid-value"));
        assert_eq!(storage.count_feedback().unwrap(), 1);
    }

    #[tokio::test]
    async fn list_non_integer_rating_is_bad_request() {
        let (app, _) = app();

        let (status, body) = send(&app, get("/api/feedback?rating=five")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid 'rating' filter"));
    }

    #[tokio::test]
    async fn storage_failure_is_internal_error() {
        let app = app_with(Arc::new(FailingStore));

        let (status, body) = send(&app, post_json(r#"{"message": "hi", "rating": 5}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], 500);
        // 내부 상세는 노출하지 않는다
        assert!(!body["error"].as_str().unwrap().contains("disk"));

        let (status, _) = send(&app, get("/api/feedback")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = send(&app, get("/api/health")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn validation_runs_before_storage() {
        // 실패하는 저장소라도 입력 오류는 400으로 구분된다
        let app = app_with(Arc::new(FailingStore));

        let (status, _) = send(&app, post_json(r#"{"rating": 5}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, get("/api/feedback?sort=sideways")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_entry_count() {
        let (app, _) = app();
        send(&app, post_json(r#"{"message": "hi", "rating": 4}"#)).await;

        let (status, body) = send(&app, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["entries"], 1);
    }

    #[test]
    fn list_query_parsing() {
        let q = ListFeedbackQuery {
            rating: Some(" 4 ".to_string()),
            sort: Some("DESC".to_string()),
        }
        .to_query()
        .unwrap();
        assert_eq!(q.rating, Some(4));
        assert_eq!(q.sort, Some(SortOrder::Descending));

        let empty = ListFeedbackQuery::default().to_query().unwrap();
        assert_eq!(empty, FeedbackQuery::all());
    }
}
