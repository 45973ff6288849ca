//! # feedback-web
//!
//! 피드백 REST API 서버.
//! Axum 기반, 저장소는 `FeedbackStore` 포트로 주입받는다.
//!
//! ## 기능
//! - 피드백 제출 (`POST /api/feedback`)
//! - 피드백 조회, 평점 필터/정렬 (`GET /api/feedback`)
//! - 상태 확인 (`GET /api/health`)

pub mod error;
pub mod handlers;
pub mod routes;

use axum::Router;
use feedback_core::config::WebConfig;
use feedback_core::ports::storage::FeedbackStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// 포트 바인드 최대 시도 횟수
const MAX_PORT_ATTEMPTS: u16 = 10;

/// 웹 서버 애플리케이션 상태
#[derive(Clone)]
pub struct AppState {
    /// 피드백 저장소
    pub store: Arc<dyn FeedbackStore>,
}

/// 전체 라우터 구성 (CORS, 요청 트레이싱 포함)
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 피드백 API 서버
pub struct WebServer {
    config: WebConfig,
    state: AppState,
}

impl WebServer {
    /// 새 웹 서버 생성
    pub fn new(store: Arc<dyn FeedbackStore>, config: WebConfig) -> Self {
        Self {
            config,
            state: AppState { store },
        }
    }

    /// 서버 실행
    ///
    /// 설정 포트에서 시작하여, 포트가 이미 사용 중이면 다음 포트를 시도합니다.
    /// 최대 10개 포트를 시도한 후 실패하면 에러를 반환합니다.
    ///
    /// # Arguments
    /// * `shutdown_rx` - 종료 신호 수신 채널
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<(), std::io::Error> {
        let host = self.config.host();
        let app = build_router(self.state);

        let base_port = self.config.port;
        let mut last_error = None;

        for attempt in 0..MAX_PORT_ATTEMPTS {
            let port = base_port.saturating_add(attempt);

            // u16 상한에 도달하면 같은 포트를 반복하지 않는다
            if attempt > 0 && port == base_port.saturating_add(attempt - 1) {
                break;
            }

            let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
                Ok(a) => a,
                Err(e) => {
                    error!("잘못된 주소 {}:{}: {}", host, port, e);
                    continue;
                }
            };

            match TcpListener::bind(addr).await {
                Ok(listener) => {
                    if attempt > 0 {
                        warn!("포트 {} 사용 불가, 대체 포트 {} 사용", base_port, port);
                    }
                    info!("피드백 API 서버 시작: http://{}", addr);

                    axum::serve(listener, app)
                        .with_graceful_shutdown(async move {
                            loop {
                                if *shutdown_rx.borrow() {
                                    info!("웹 서버 종료 신호 수신");
                                    break;
                                }
                                if shutdown_rx.changed().await.is_err() {
                                    break;
                                }
                            }
                        })
                        .await?;

                    info!("피드백 API 서버 종료");
                    return Ok(());
                }
                Err(e) => {
                    if e.kind() == std::io::ErrorKind::AddrInUse {
                        warn!("포트 {} 이미 사용 중, 다음 포트 시도...", port);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                format!(
                    "포트 {}-{} 모두 사용 불가",
                    base_port,
                    base_port.saturating_add(MAX_PORT_ATTEMPTS - 1)
                ),
            )
        }))
    }

    /// 서버 URL 반환
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.config.host(), self.config.port)
    }
}
