//! API 라우트 정의.

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::AppState;

/// API 라우트 생성
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // 피드백 제출/조회
        .route(
            "/feedback",
            get(handlers::feedback::list_feedback).post(handlers::feedback::submit_feedback),
        )
        // 상태 확인
        .route("/health", get(handlers::health::health))
}
