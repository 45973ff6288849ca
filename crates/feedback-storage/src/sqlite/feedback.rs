//! 피드백 스토리지 (FeedbackStore 포트 구현).
//!
//! 값은 항상 바인드 파라미터로 전달한다. SQL 텍스트에 들어가는 것은
//! 고정 컬럼명과 `SortOrder::as_sql()`의 키워드뿐이다.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use feedback_core::error::CoreError;
use feedback_core::models::feedback::{FeedbackEntry, FeedbackQuery, NewFeedback, SortOrder};
use feedback_core::ports::storage::FeedbackStore;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, ToSql};
use tracing::{debug, warn};

use super::SqliteStorage;

const SELECT_COLUMNS: &str = "SELECT id, message, rating, created_at FROM feedback";

/// 저장 시각을 고정 폭 텍스트로 변환 (사전 순서 = 시간 순서)
pub(super) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// 저장된 시각 파싱
///
/// RFC3339 외에 SQLite `CURRENT_TIMESTAMP` 형식(`YYYY-MM-DD HH:MM:SS`, UTC)도 읽는다.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<FeedbackEntry> {
    let raw: String = row.get(3)?;
    let created_at = parse_timestamp(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("잘못된 created_at 형식: {raw}").into(),
        )
    })?;

    Ok(FeedbackEntry {
        id: row.get(0)?,
        message: row.get(1)?,
        rating: row.get(2)?,
        created_at,
    })
}

/// 조회 SQL 구성
///
/// 반환된 SQL의 `?1`은 `query.rating`이 있을 때만 존재한다.
/// 정렬 미지정 시 최신순. `julianday`로 비교하므로 저장 형식이 섞여 있어도
/// 시간 순서를 따른다.
fn build_select(query: &FeedbackQuery) -> String {
    let mut sql = String::from(SELECT_COLUMNS);

    if query.rating.is_some() {
        sql.push_str(" WHERE rating = ?1");
    }

    let dir = query.sort.unwrap_or(SortOrder::Descending).as_sql();
    sql.push_str(&format!(" ORDER BY julianday(created_at) {dir}, id {dir}"));

    sql
}

/// 마지막으로 저장된 행의 시각
fn latest_created_at(conn: &Connection) -> Result<Option<DateTime<Utc>>, CoreError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT created_at FROM feedback ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| CoreError::Storage(format!("최근 시각 조회 실패: {e}")))?;

    Ok(raw
        .as_deref()
        .and_then(parse_timestamp)
        .map(|ts| ts.trunc_subsecs(6)))
}

/// 새 행의 시각 결정
///
/// 시스템 시계가 뒤로 가도 직전 행보다 이른 시각을 주지 않는다.
fn next_created_at(now: DateTime<Utc>, latest: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    match latest {
        Some(prev) if prev > now => {
            warn!("시스템 시각이 직전 저장 시각보다 이름, 직전 시각 사용: now={now}, prev={prev}");
            prev
        }
        _ => now,
    }
}

impl SqliteStorage {
    /// 피드백 저장
    pub fn insert_feedback(&self, feedback: &NewFeedback) -> Result<FeedbackEntry, CoreError> {
        let conn = self.lock()?;

        // 잠금 안에서 시각을 정해야 저장 순서와 시각 순서가 일치한다.
        // 저장 정밀도(마이크로초)로 잘라 반환값과 저장된 행을 같게 유지한다.
        let created_at = next_created_at(Utc::now(), latest_created_at(&conn)?);

        conn.execute(
            "INSERT INTO feedback (message, rating, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                feedback.message(),
                feedback.rating(),
                format_timestamp(created_at)
            ],
        )
        .map_err(|e| CoreError::Storage(format!("피드백 저장 실패: {e}")))?;

        let id = conn.last_insert_rowid();
        debug!("피드백 저장: id={}, rating={}", id, feedback.rating());

        Ok(FeedbackEntry {
            id,
            message: feedback.message().to_string(),
            rating: feedback.rating(),
            created_at,
        })
    }

    /// 필터/정렬 조건으로 피드백 조회
    pub fn query_feedback(&self, query: &FeedbackQuery) -> Result<Vec<FeedbackEntry>, CoreError> {
        let conn = self.lock()?;

        let sql = build_select(query);
        let mut params: Vec<&dyn ToSql> = Vec::new();
        if let Some(rating) = query.rating.as_ref() {
            params.push(rating);
        }

        let mut stmt = conn
            .prepare_cached(&sql)
            .map_err(|e| CoreError::Storage(format!("쿼리 준비 실패: {e}")))?;

        let entries = stmt
            .query_map(params.as_slice(), map_row)
            .map_err(|e| CoreError::Storage(format!("쿼리 실행 실패: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Storage(format!("행 변환 실패: {e}")))?;

        debug!(
            "피드백 조회: rating={:?}, sort={:?}, count={}",
            query.rating,
            query.sort,
            entries.len()
        );
        Ok(entries)
    }

    /// 저장된 피드백 수
    pub fn count_feedback(&self) -> Result<u64, CoreError> {
        let conn = self.lock()?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))
            .map_err(|e| CoreError::Storage(format!("피드백 수 조회 실패: {e}")))?;

        Ok(count as u64)
    }
}

#[async_trait]
impl FeedbackStore for SqliteStorage {
    async fn insert(&self, feedback: &NewFeedback) -> Result<FeedbackEntry, CoreError> {
        self.insert_feedback(feedback)
    }

    async fn query(&self, query: &FeedbackQuery) -> Result<Vec<FeedbackEntry>, CoreError> {
        self.query_feedback(query)
    }

    async fn count(&self) -> Result<u64, CoreError> {
        self.count_feedback()
    }
}
