//! 코드 편집 중계 핸들러

use crate::broadcast::RoomBus;
use crate::protocol::ServerMessage;
use crate::state::AppState;
use std::sync::Arc;

/// 코드 변경 브로드캐스트. 발신자는 제외
///
/// 마지막 쓰기가 이긴다. 동시 편집 병합(OT/CRDT)은 하지 않는다
pub async fn handle_code_change(state: Arc<AppState>, conn_id: &str, room_id: &str, code: String) {
    state
        .publish_except(room_id, conn_id, ServerMessage::CodeUpdate(code))
        .await;

    tracing::debug!(conn_id = %conn_id, room_id = %room_id, "relayed code change");
}
