//! 채팅 중계 핸들러

use crate::broadcast::RoomBus;
use crate::protocol::ServerMessage;
use crate::state::AppState;
use std::sync::Arc;

/// 채팅 메시지 팬아웃. 발신자를 포함한 방 전체에 전달
///
/// 영속화는 클라이언트가 영속성 서비스에 별도 HTTP 요청으로 처리하고,
/// 이 이벤트는 실시간 전달만 담당한다
pub async fn handle_send_message(
    state: Arc<AppState>,
    conn_id: &str,
    room_id: &str,
    mut message: serde_json::Map<String, serde_json::Value>,
) {
    message.insert(
        "roomId".to_string(),
        serde_json::Value::String(room_id.to_string()),
    );

    state
        .publish(
            room_id,
            ServerMessage::NewMessage(serde_json::Value::Object(message)),
        )
        .await;

    tracing::debug!(conn_id = %conn_id, room_id = %room_id, "relayed chat message");
}
