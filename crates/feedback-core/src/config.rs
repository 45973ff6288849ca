//! 애플리케이션 설정 구조체.
//!
//! 웹 서버 바인드 설정과 저장소 경로를 정의한다.
//! `ConfigManager`를 통해 JSON 파일에서 로드하고 CLI 인자로 오버라이드한다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 웹 서버 설정
    #[serde(default)]
    pub web: WebConfig,
    /// 로컬 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
}

// ============================================================
// 웹 서버 설정
// ============================================================

/// 웹 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// 웹 서버 포트 (기본: 5000)
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// 외부 접근 허용 여부 (false: 127.0.0.1 only)
    #[serde(default)]
    pub allow_external: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_web_port(),
            allow_external: false,
        }
    }
}

impl WebConfig {
    /// 바인드 호스트
    pub fn host(&self) -> &'static str {
        if self.allow_external {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }
}

// ============================================================
// 저장소 설정
// ============================================================

/// 로컬 저장소 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite DB 파일 경로 (None이면 플랫폼 기본 경로)
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            web: WebConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_web_port() -> u16 {
    5000
}
