//! 통화 시그널링 패스스루 핸들러
//!
//! 상태를 만들지 않는 순수 중계. 2자 통화 가정이므로 타겟 지정 없이
//! 발신자만 제외하고 전달한다.

use crate::broadcast::RoomBus;
use crate::protocol::ServerMessage;
use crate::state::AppState;
use std::sync::Arc;

/// Offer 중계
pub async fn handle_offer(
    state: Arc<AppState>,
    conn_id: &str,
    room_id: &str,
    payload: serde_json::Value,
) {
    let from = sender_identity(&state, conn_id).await;
    state
        .publish_except(room_id, conn_id, ServerMessage::Offer { from, payload })
        .await;

    tracing::debug!(conn_id = %conn_id, room_id = %room_id, "relayed offer");
}

/// Answer 중계
pub async fn handle_answer(
    state: Arc<AppState>,
    conn_id: &str,
    room_id: &str,
    payload: serde_json::Value,
) {
    let from = sender_identity(&state, conn_id).await;
    state
        .publish_except(room_id, conn_id, ServerMessage::Answer { from, payload })
        .await;

    tracing::debug!(conn_id = %conn_id, room_id = %room_id, "relayed answer");
}

/// ICE Candidate 중계
pub async fn handle_candidate(
    state: Arc<AppState>,
    conn_id: &str,
    room_id: &str,
    payload: serde_json::Value,
) {
    let from = sender_identity(&state, conn_id).await;
    state
        .publish_except(room_id, conn_id, ServerMessage::Candidate { from, payload })
        .await;

    tracing::debug!(conn_id = %conn_id, room_id = %room_id, "relayed ICE candidate");
}

/// 발신자 표기. 신원이 묶여 있으면 user_id, 아니면 연결 식별자
async fn sender_identity(state: &AppState, conn_id: &str) -> String {
    if let Some(session) = state.peers.get(conn_id) {
        if let Some(user_id) = session.user_id.read().await.as_ref() {
            return user_id.clone();
        }
    }
    conn_id.to_string()
}
