//! 서버 라이프사이클.
//!
//! 웹 서버 태스크를 감독한다. 정지 신호(OS 시그널)가 오면 종료를 알리고,
//! 유예 시간 안에 서버가 끝나지 않으면 태스크를 중단한다.

use anyhow::{bail, Context, Result};
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// 감독 대상 웹 서버 태스크
pub type ServerTask = JoinHandle<io::Result<()>>;

/// 서버 종료 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// 유예 시간 안에 스스로 종료
    Graceful,
    /// 유예 시간 초과로 강제 중단
    Aborted,
}

/// 웹 서버 감독자
pub struct ServerSupervisor {
    shutdown_tx: watch::Sender<bool>,
    grace: Duration,
}

impl ServerSupervisor {
    /// 종료 유예 시간을 지정하여 생성
    pub fn new(grace: Duration) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self { shutdown_tx, grace }
    }

    /// 종료 수신기 발급 (서버에 전달)
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// 종료 신호 발송. 받을 수신기가 없으면 `false`.
    fn broadcast_shutdown(&self) -> bool {
        match self.shutdown_tx.send(true) {
            Ok(()) => {
                info!("종료 신호 발송");
                true
            }
            Err(_) => {
                warn!("종료 신호 수신자 없음, 서버가 이미 종료됨");
                false
            }
        }
    }

    /// 정지 신호까지 서버를 실행하고 종료를 마무리한다.
    ///
    /// 서버가 정지 신호 전에 끝나면 (바인드 실패 등) 에러로 반환한다.
    pub async fn supervise<S>(&self, mut server: ServerTask, stop: S) -> Result<ShutdownOutcome>
    where
        S: Future<Output = io::Result<()>>,
    {
        tokio::select! {
            joined = &mut server => {
                joined.context("웹 서버 태스크 비정상 종료")??;
                bail!("웹 서버가 종료 신호 없이 멈춤");
            }
            signal = stop => signal.context("시그널 대기 실패")?,
        }

        if !self.broadcast_shutdown() {
            // 수신기가 모두 사라졌다면 서버 태스크도 끝나는 중
            server.await.context("웹 서버 태스크 비정상 종료")??;
            return Ok(ShutdownOutcome::Graceful);
        }

        match tokio::time::timeout(self.grace, &mut server).await {
            Ok(joined) => {
                joined.context("웹 서버 태스크 비정상 종료")??;
                info!("웹 서버 정상 종료");
                Ok(ShutdownOutcome::Graceful)
            }
            Err(_) => {
                warn!("웹 서버가 {:?} 안에 종료되지 않아 중단", self.grace);
                server.abort();
                Ok(ShutdownOutcome::Aborted)
            }
        }
    }
}

/// OS 시그널 대기 (SIGINT, SIGTERM / 그 외 플랫폼은 Ctrl+C)
pub async fn wait_for_signal() -> io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => info!("SIGINT 수신"),
            _ = sigterm.recv() => info!("SIGTERM 수신"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Ctrl+C 수신");
    }

    Ok(())
}
