//! 피드백 도메인 모델.
//!
//! 저장소와 웹 레이어가 공유하는 데이터 구조체를 정의한다.
//! 저장된 엔트리는 `serde` Serialize/Deserialize를 구현한다.

pub mod feedback;
