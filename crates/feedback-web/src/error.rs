//! API 에러 처리.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use feedback_core::error::CoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// 저장소 실패 시 클라이언트에 노출하는 메시지
const INTERNAL_ERROR_MESSAGE: &str = "Failed to process the request";

/// API 에러
#[derive(Debug, Error)]
pub enum ApiError {
    /// 잘못된 요청 (클라이언트 입력 오류)
    #[error("잘못된 요청: {0}")]
    BadRequest(String),

    /// 내부 서버 오류
    #[error("내부 서버 오류: {0}")]
    Internal(String),
}

/// 에러 응답 본문
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// 에러 메시지
    pub error: String,
    /// HTTP 상태 코드
    pub status: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(detail) => {
                error!("요청 처리 실패: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { .. } => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
