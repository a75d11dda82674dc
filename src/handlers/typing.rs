//! 타이핑 표시 핸들러
//!
//! Idle → Typing → Idle 상태 기계. 타이핑 이벤트마다 타이머를 다시
//! 무장하고, 명시적 stoppedTyping은 즉시 해제한다. 식별자가 빠진
//! 이벤트는 발신자에게 알리지 않고 로그만 남긴 채 버린다.

use crate::broadcast::RoomBus;
use crate::error::RelayError;
use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::typing::TypingEntry;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 타이핑 이벤트 처리. 표시를 갱신하고 만료 타이머를 무장한다
pub async fn handle_typing(
    state: Arc<AppState>,
    conn_id: &str,
    room_id: Option<String>,
    line_number: u32,
    username: String,
    user_id: Option<String>,
    filename: String,
) {
    let (room_id, user_id) = match validate_identity(room_id, user_id) {
        Ok(pair) => pair,
        Err(err) => {
            tracing::warn!(conn_id = %conn_id, error = %err, "dropped typing event");
            return;
        }
    };

    let generation = state.typing.refresh(&room_id, &user_id, conn_id, &filename);

    state
        .publish_except(
            &room_id,
            conn_id,
            ServerMessage::UserTyping {
                line_number,
                username,
                user_id: user_id.clone(),
                filename,
                timestamp: unix_millis(),
            },
        )
        .await;

    // 만료 타이머. 그 사이 갱신되면 세대가 달라져 그대로 소멸한다
    let expiry = Duration::from_millis(state.config.typing.expiry_ms);
    let timer_state = state.clone();
    tokio::spawn(async move {
        tokio::time::sleep(expiry).await;
        expire_typing(&timer_state, &room_id, &user_id, generation).await;
    });
}

/// 명시적 stoppedTyping 처리. 활성 표시가 있을 때만 해제를 내보낸다
pub async fn handle_stopped_typing(
    state: Arc<AppState>,
    conn_id: &str,
    room_id: Option<String>,
    user_id: Option<String>,
    _filename: String,
) {
    let (room_id, user_id) = match validate_identity(room_id, user_id) {
        Ok(pair) => pair,
        Err(err) => {
            tracing::warn!(conn_id = %conn_id, error = %err, "dropped stoppedTyping event");
            return;
        }
    };

    if let Some(entry) = state.typing.clear(&room_id, &user_id) {
        broadcast_stopped(&state, &room_id, &user_id, entry).await;
    }
}

/// 타이머 만료 경로. 세대가 그대로일 때만 해제가 나간다
pub async fn expire_typing(state: &Arc<AppState>, room_id: &str, user_id: &str, generation: u64) {
    if let Some(entry) = state.typing.expire(room_id, user_id, generation) {
        tracing::debug!(room_id = %room_id, user_id = %user_id, "typing indicator expired");
        broadcast_stopped(state, room_id, user_id, entry).await;
    }
}

/// 퇴장 정리 경로. 남아 있던 표시를 지우고 해제를 내보낸다
pub async fn clear_typing_for(state: &Arc<AppState>, room_id: &str, user_id: &str, conn_id: &str) {
    if let Some(mut entry) = state.typing.clear(room_id, user_id) {
        // 퇴장하는 연결 기준으로 제외
        entry.conn_id = conn_id.to_string();
        broadcast_stopped(state, room_id, user_id, entry).await;
    }
}

/// 해제 브로드캐스트 공통 경로. 표시를 만든 연결은 제외
pub async fn broadcast_stopped(
    state: &Arc<AppState>,
    room_id: &str,
    user_id: &str,
    entry: TypingEntry,
) {
    state
        .publish_except(
            room_id,
            &entry.conn_id,
            ServerMessage::UserStoppedTyping {
                user_id: user_id.to_string(),
                filename: entry.filename,
                timestamp: unix_millis(),
            },
        )
        .await;
}

/// 필수 식별자 검사. "null" 문자열은 신원 없음으로 취급
fn validate_identity(
    room_id: Option<String>,
    user_id: Option<String>,
) -> Result<(String, String), RelayError> {
    let room_id = room_id
        .filter(|r| !r.is_empty())
        .ok_or(RelayError::InvalidEventPayload("missing roomId"))?;
    let user_id = user_id
        .filter(|u| !u.is_empty() && u != "null")
        .ok_or(RelayError::InvalidEventPayload("missing or null userId"))?;
    Ok((room_id, user_id))
}

pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}
