//! 샘플 피드백 시드.

use chrono::{SubsecRound, Utc};
use feedback_core::error::CoreError;
use tracing::info;

use super::feedback::format_timestamp;
use super::SqliteStorage;

/// 빈 저장소에 넣는 샘플 피드백 (메시지, 평점)
pub const SAMPLE_FEEDBACK: [(&str, i64); 5] = [
    ("This is an amazing product! Highly recommend.", 5),
    ("The new update is a bit buggy.", 2),
    ("Works as expected. Solid 4-star experience.", 4),
    ("Customer support was very helpful. Five stars!", 5),
    ("Absolutely terrible, would not use again.", 1),
];

impl SqliteStorage {
    /// 저장소가 비어 있을 때만 샘플 피드백 저장
    ///
    /// 한 트랜잭션으로 저장하며, 저장한 개수를 반환한다 (이미 데이터가 있으면 0).
    pub fn seed_samples(&self) -> Result<usize, CoreError> {
        let mut conn = self.lock()?;

        let tx = conn
            .transaction()
            .map_err(|e| CoreError::Storage(format!("트랜잭션 시작 실패: {e}")))?;

        let existing: i64 = tx
            .query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))
            .map_err(|e| CoreError::Storage(format!("피드백 수 조회 실패: {e}")))?;

        if existing > 0 {
            info!("기존 피드백 {existing}건 존재, 샘플 시드 생략");
            return Ok(0);
        }

        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO feedback (message, rating, created_at) VALUES (?1, ?2, ?3)",
                )
                .map_err(|e| CoreError::Storage(format!("쿼리 준비 실패: {e}")))?;

            for (message, rating) in SAMPLE_FEEDBACK {
                let created_at = format_timestamp(Utc::now().trunc_subsecs(6));
                stmt.execute(rusqlite::params![message, rating, created_at])
                    .map_err(|e| CoreError::Storage(format!("샘플 저장 실패: {e}")))?;
            }
        }

        tx.commit()
            .map_err(|e| CoreError::Storage(format!("트랜잭션 커밋 실패: {e}")))?;

        info!("샘플 피드백 {}건 저장", SAMPLE_FEEDBACK.len());
        Ok(SAMPLE_FEEDBACK.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedback_core::models::feedback::{FeedbackQuery, NewFeedback};

    #[test]
    fn seeds_empty_storage_once() {
        let storage = SqliteStorage::open_in_memory().unwrap();

        assert_eq!(storage.seed_samples().unwrap(), SAMPLE_FEEDBACK.len());
        assert_eq!(storage.seed_samples().unwrap(), 0);
        assert_eq!(storage.count_feedback().unwrap(), 5);

        let fives = storage
            .query_feedback(&FeedbackQuery::all().with_rating(5))
            .unwrap();
        assert_eq!(fives.len(), 2);
    }

    #[test]
    fn skips_non_empty_storage() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage
            .insert_feedback(&NewFeedback::new("already here", 3).unwrap())
            .unwrap();

        assert_eq!(storage.seed_samples().unwrap(), 0);
        assert_eq!(storage.count_feedback().unwrap(), 1);
    }

    #[test]
    fn sample_ratings_are_valid() {
        for (message, rating) in SAMPLE_FEEDBACK {
            assert!(NewFeedback::new(message, rating).is_ok());
        }
    }
}
