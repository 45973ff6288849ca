//! # feedback-storage
//!
//! 로컬 저장소 어댑터.
//! SQLite 기반 피드백 저장, 스키마 마이그레이션, 샘플 데이터 시드를 담당한다.
//!
//! ## 모듈
//! - `sqlite`: 피드백 저장소 (FeedbackStore 구현)
//! - `migration`: 스키마 마이그레이션

pub mod migration;
pub mod sqlite;
