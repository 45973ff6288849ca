//! 상태 확인 핸들러.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::AppState;

/// 상태 응답 DTO
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// 항상 "ok"
    pub status: &'static str,
    /// 저장된 피드백 수
    pub entries: u64,
}

/// 저장소 접근 가능 여부 확인
///
/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let entries = state.store.count().await?;

    Ok(Json(HealthResponse {
        status: "ok",
        entries,
    }))
}
