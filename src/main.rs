//! CodeHive 실시간 중계 서버

use anyhow::Context;
use codehive_realtime::config::Config;
use codehive_realtime::directory::{HttpRoomDirectory, InMemoryRoomDirectory, RoomDirectory};
use codehive_realtime::handlers;
use codehive_realtime::server;
use codehive_realtime::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let directory: Arc<dyn RoomDirectory> = match &config.directory.service_url {
        Some(url) => Arc::new(HttpRoomDirectory::new(
            url.clone(),
            Duration::from_millis(config.directory.request_timeout_ms),
        )),
        None => {
            tracing::warn!("ROOM_SERVICE_URL not set, using in-memory room directory");
            Arc::new(InMemoryRoomDirectory::new())
        }
    };

    let state = Arc::new(AppState::new(config.clone(), directory));

    // 잔여 상태 청소 스케줄러
    let sweep_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(
            sweep_state.config.typing.sweep_interval_ms,
        ));
        loop {
            interval.tick().await;
            sweep_stale_state(&sweep_state).await;
        }
    });

    let app = server::router(state.clone());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("🚀 CodeHive Realtime Server started");
    tracing::info!("Address: {}", addr);
    tracing::info!("WebSocket: ws://{}/ws", addr);

    axum::serve(listener, app).await.context("server terminated")?;
    Ok(())
}

/// 타이머가 놓친 타이핑 항목과 빈 브로드캐스트 그룹 정리
async fn sweep_stale_state(state: &Arc<AppState>) {
    let stale_after = Duration::from_millis(state.config.typing.expiry_ms * 10);

    let swept = state.typing.sweep(stale_after);
    for ((room_id, user_id), entry) in swept {
        tracing::warn!(room_id = %room_id, user_id = %user_id, "typing entry outlived its timer");
        handlers::broadcast_stopped(state, &room_id, &user_id, entry).await;
    }

    // 빈 그룹 제거 (입장 도중 락이 잡혀 있으면 다음 차례로 미룸)
    state.groups.retain(|_, group| {
        group
            .members
            .try_read()
            .map(|members| !members.is_empty())
            .unwrap_or(true)
    });
}
