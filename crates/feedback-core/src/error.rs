//! 피드백 서비스 핵심 에러 타입.
//!
//! 어댑터 crate는 이 타입을 그대로 반환하거나 자체 에러 타입으로 변환한다.
//! `Validation`은 클라이언트 입력 오류, 나머지는 서버 측 실패로 취급한다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패 (클라이언트 입력 오류)
    #[error("{field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 저장소 실패 (연결, 제약 조건, 디스크)
    #[error("저장소 에러: {0}")]
    Storage(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 필드 검증 에러 생성 헬퍼
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 클라이언트 입력 오류 여부
    pub fn is_client_error(&self) -> bool {
        matches!(self, CoreError::Validation { .. })
    }
}
