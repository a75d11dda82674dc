//! 테스트 공용 헬퍼

#![allow(dead_code)]

use codehive_realtime::config::{AuthConfig, Config, DirectoryConfig, TypingConfig};
use codehive_realtime::directory::{InMemoryRoomDirectory, RoomRecord};
use codehive_realtime::handlers;
use codehive_realtime::protocol::ServerMessage;
use codehive_realtime::state::AppState;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc::UnboundedReceiver;

pub const SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    Config {
        port: 0,
        host: "127.0.0.1".to_string(),
        cors_origins: vec![],
        auth: AuthConfig {
            secret: SECRET.to_string(),
        },
        typing: TypingConfig {
            expiry_ms: 3000,
            sweep_interval_ms: 60000,
        },
        directory: DirectoryConfig {
            service_url: None,
            request_timeout_ms: 5000,
        },
        log_level: "warn".to_string(),
    }
}

/// 인메모리 디렉터리가 붙은 상태 구성
pub fn seeded_state() -> (Arc<AppState>, Arc<InMemoryRoomDirectory>) {
    let directory = Arc::new(InMemoryRoomDirectory::new());
    let state = Arc::new(AppState::new(test_config(), directory.clone()));
    (state, directory)
}

pub fn room_record(owner: &str, members: &[&str]) -> RoomRecord {
    RoomRecord {
        owner_id: owner.to_string(),
        member_ids: members.iter().map(|m| m.to_string()).collect(),
    }
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    username: Option<String>,
    exp: u64,
    iat: u64,
}

/// 외부 인증 서비스가 발급했을 토큰을 흉내낸다
pub fn credential_for(user_id: &str) -> String {
    credential_with_secret(user_id, SECRET)
}

pub fn credential_with_secret(user_id: &str, secret: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let claims = TestClaims {
        sub: user_id.to_string(),
        username: Some(format!("user-{user_id}")),
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// 가짜 연결 등록. 수신 채널로 아웃바운드 이벤트를 관찰한다
pub async fn connect(state: &Arc<AppState>) -> (String, UnboundedReceiver<ServerMessage>) {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let conn_id = handlers::handle_connection(state.clone(), tx).await;
    (conn_id, rx)
}

/// 지금까지 큐에 쌓인 아웃바운드 이벤트를 모두 꺼낸다
pub fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

/// 방 그룹에 속한 연결 목록
pub async fn group_members(state: &Arc<AppState>, room_id: &str) -> Vec<String> {
    match state.groups.get(room_id) {
        Some(group) => {
            let members = group.members.read().await;
            let mut out: Vec<String> = members.iter().cloned().collect();
            out.sort();
            out
        }
        None => vec![],
    }
}
