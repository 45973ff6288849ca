//! 포트 인터페이스 (trait).
//!
//! 어댑터 crate(`feedback-storage`)가 이 trait을 구현하며,
//! `feedback-app`에서 `Arc<dyn T>`로 와이어링한다.

pub mod storage;
