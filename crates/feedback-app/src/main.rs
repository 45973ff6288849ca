//! # feedback-app
//!
//! 피드백 서버 바이너리 진입점.
//! 설정 로드, 저장소/웹 서버 와이어링, 라이프사이클 관리.

mod lifecycle;

use anyhow::Result;
use clap::Parser;
use feedback_core::config::AppConfig;
use feedback_core::config_manager::ConfigManager;
use feedback_core::ports::storage::FeedbackStore;
use feedback_storage::sqlite::SqliteStorage;
use feedback_web::WebServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::lifecycle::ServerSupervisor;

/// DB 파일 이름
const DB_FILE_NAME: &str = "feedback.db";

/// 종료 신호 후 진행 중인 요청을 기다리는 최대 시간
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// 피드백 수집 서버
///
/// 메시지와 평점을 받아 저장하고, 평점 필터/정렬 조회를 제공한다.
#[derive(Parser, Debug)]
#[command(name = "feedback-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 데이터 저장 디렉토리 (feedback.db 위치)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// 웹 서버 포트
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// 외부 접근 허용 (0.0.0.0 바인드)
    #[arg(long)]
    allow_external: bool,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 저장소가 비어 있으면 샘플 피드백 저장
    #[arg(long)]
    seed: bool,
}

/// tracing 초기화
///
/// `RUST_LOG`가 있으면 우선 사용하고, 없으면 `--log-level`로 워크스페이스 crate 필터를 만든다.
fn init_tracing(log_level: &str) {
    let log_filter = format!(
        "feedback_server={0},feedback_core={0},feedback_storage={0},feedback_web={0},tower_http={0}",
        log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();
}

/// 설정 로드
///
/// `--config`가 있으면 그 파일을, 없으면 플랫폼 기본 경로를 사용한다.
/// 기본 경로를 쓸 수 없으면 기본 설정으로 계속한다.
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let manager = match path {
        Some(p) => ConfigManager::with_path(p.to_path_buf())?,
        None => match ConfigManager::new() {
            Ok(m) => m,
            Err(e) => {
                warn!("설정 파일 사용 불가, 기본 설정 사용: {e}");
                return Ok(AppConfig::default_config());
            }
        },
    };

    info!("설정 파일: {}", manager.config_path().display());
    Ok(manager.get()?)
}

/// CLI 인자로 설정 오버라이드 (실행 중인 프로세스에만 적용)
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(port) = args.port {
        config.web.port = port;
    }
    if args.allow_external {
        config.web.allow_external = true;
    }
}

/// 데이터베이스 경로 결정
///
/// 우선순위: `--data-dir` → 설정의 `storage.db_path` → 플랫폼 데이터 디렉토리 → `./feedback.db`
fn resolve_db_path(data_dir: Option<&Path>, configured: Option<&Path>) -> PathBuf {
    data_dir
        .map(|d| d.join(DB_FILE_NAME))
        .or_else(|| configured.map(Path::to_path_buf))
        .or_else(|| {
            ConfigManager::data_dir()
                .ok()
                .map(|d| d.join(DB_FILE_NAME))
        })
        .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);
    info!("피드백 서버 시작");

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    // 스토리지 (파일 기반 SQLite)
    let db_path = resolve_db_path(args.data_dir.as_deref(), config.storage.db_path.as_deref());
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let storage = Arc::new(SqliteStorage::open(&db_path)?);

    if args.seed {
        let seeded = storage.seed_samples()?;
        info!("샘플 시드: {seeded}건");
    }

    info!(
        "SQLite 저장소: {} (피드백 {}건)",
        db_path.display(),
        storage.count_feedback()?
    );

    let store: Arc<dyn FeedbackStore> = storage;

    // 웹 서버
    let supervisor = ServerSupervisor::new(SHUTDOWN_GRACE);
    let web_server = WebServer::new(store, config.web.clone());
    info!("피드백 API: {}/api/feedback", web_server.url());

    let server = tokio::spawn(web_server.run(supervisor.subscribe()));

    info!("피드백 서버 실행 중 (Ctrl+C로 종료)");

    let outcome = supervisor
        .supervise(server, lifecycle::wait_for_signal())
        .await?;

    info!("피드백 서버 종료: {outcome:?}");
    Ok(())
}
