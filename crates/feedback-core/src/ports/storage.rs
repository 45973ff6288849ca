//! 피드백 저장소 포트.
//!
//! 구현: `feedback-storage` crate (rusqlite)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::feedback::{FeedbackEntry, FeedbackQuery, NewFeedback};

/// 피드백 영속 저장소
///
/// 엔트리는 생성만 가능하며 수정/삭제 연산은 없다.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// 피드백 저장
    ///
    /// ID와 생성 시각을 부여한 완전한 엔트리를 반환한다.
    /// 단일 문장으로 저장되므로 실패 시 아무것도 남지 않는다.
    async fn insert(&self, feedback: &NewFeedback) -> Result<FeedbackEntry, CoreError>;

    /// 필터/정렬 조건으로 조회
    ///
    /// 일치하는 엔트리가 없으면 빈 벡터를 반환한다.
    async fn query(&self, query: &FeedbackQuery) -> Result<Vec<FeedbackEntry>, CoreError>;

    /// 저장된 엔트리 수
    async fn count(&self) -> Result<u64, CoreError>;
}
