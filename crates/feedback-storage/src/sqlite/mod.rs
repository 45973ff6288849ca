//! SQLite 저장소 어댑터.
//!
//! `FeedbackStore` 포트 구현.
//!
//! # 모듈 구조
//! - `feedback`: 피드백 저장/조회 (FeedbackStore 포트)
//! - `seed`: 빈 저장소용 샘플 데이터

mod feedback;
mod seed;

pub use seed::SAMPLE_FEEDBACK;

use feedback_core::error::CoreError;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::migration;

/// SQLite 저장소: `FeedbackStore` 포트 구현
///
/// 단일 연결을 뮤텍스로 직렬화한다. 각 연산은 잠금 → 단일 문장 실행 → 해제.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// 파일 기반 SQLite 저장소 생성
    ///
    /// 스키마가 없으면 생성한다.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path)
            .map_err(|e| CoreError::Storage(format!("SQLite 열기 실패: {e}")))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA temp_store=MEMORY;
            ",
        )
        .map_err(|e| CoreError::Storage(format!("PRAGMA 설정 실패: {e}")))?;

        migration::run_migrations(&conn)
            .map_err(|e| CoreError::Storage(format!("마이그레이션 실패: {e}")))?;

        info!("SQLite 저장소 초기화: {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 인메모리 SQLite 저장소 생성 (테스트용)
    pub fn open_in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CoreError::Storage(format!("인메모리 SQLite 생성 실패: {e}")))?;

        migration::run_migrations(&conn)
            .map_err(|e| CoreError::Storage(format!("마이그레이션 실패: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn
            .lock()
            .map_err(|e| CoreError::Storage(format!("잠금 획득 실패: {e}")))
    }
}
