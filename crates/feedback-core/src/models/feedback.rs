//! 피드백 모델.
//!
//! 저장된 피드백 엔트리, 검증된 입력, 조회 조건(필터/정렬).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 허용 평점 최솟값
pub const RATING_MIN: i64 = 1;

/// 허용 평점 최댓값
pub const RATING_MAX: i64 = 5;

/// 저장된 피드백 엔트리
///
/// 생성 후 모든 필드는 불변이다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// 저장소가 부여한 ID (단조 증가)
    pub id: i64,
    /// 피드백 본문
    pub message: String,
    /// 평점
    pub rating: i64,
    /// 저장 시각
    pub created_at: DateTime<Utc>,
}

/// 검증을 통과한 신규 피드백
///
/// [`NewFeedback::new`]로만 생성할 수 있으므로 저장소는 입력을 다시 검증하지 않는다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    message: String,
    rating: i64,
}

impl NewFeedback {
    /// 메시지와 평점을 검증하여 생성
    ///
    /// 앞뒤 공백은 제거된다. 빈 메시지나 범위 밖 평점은 `CoreError::Validation`.
    pub fn new(message: impl AsRef<str>, rating: i64) -> Result<Self, CoreError> {
        let message = message.as_ref().trim();
        if message.is_empty() {
            return Err(CoreError::validation("message", "must not be empty"));
        }

        if !(RATING_MIN..=RATING_MAX).contains(&rating) {
            return Err(CoreError::validation(
                "rating",
                format!("must be between {RATING_MIN} and {RATING_MAX}, got {rating}"),
            ));
        }

        Ok(Self {
            message: message.to_string(),
            rating,
        })
    }

    /// 메시지
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 평점
    pub fn rating(&self) -> i64 {
        self.rating
    }
}

/// 생성 시각 정렬 방향
///
/// SQL 텍스트에 들어가는 유일한 사용자 입력 경로이므로 닫힌 집합으로 유지한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// 오래된 순
    Ascending,
    /// 최신 순
    Descending,
}

impl SortOrder {
    /// SQL 정렬 키워드
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(CoreError::validation(
                "sort",
                "expected one of 'asc', 'desc', 'ascending', 'descending'",
            )),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => f.write_str("ascending"),
            SortOrder::Descending => f.write_str("descending"),
        }
    }
}

/// 피드백 조회 조건
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackQuery {
    /// 정확히 일치하는 평점만 조회 (None이면 전체)
    pub rating: Option<i64>,
    /// 생성 시각 정렬 (None이면 저장 순서)
    pub sort: Option<SortOrder>,
}

impl FeedbackQuery {
    /// 전체 조회
    pub fn all() -> Self {
        Self::default()
    }

    /// 평점 필터 설정
    pub fn with_rating(mut self, rating: i64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// 정렬 방향 설정
    pub fn sorted(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }
}
