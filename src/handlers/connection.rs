//! 연결 핸들러

use crate::protocol::ServerMessage;
use crate::state::{AppState, PeerSession};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc::UnboundedSender, RwLock};
use uuid::Uuid;

/// 새 연결 등록. 신원은 아직 없다
pub async fn handle_connection(
    state: Arc<AppState>,
    sender: UnboundedSender<ServerMessage>,
) -> String {
    let conn_id = Uuid::new_v4().to_string();

    let session = PeerSession {
        id: conn_id.clone(),
        user_id: RwLock::new(None),
        room_id: RwLock::new(None),
        sender,
        connected_at: Instant::now(),
    };

    state.peers.insert(conn_id.clone(), session);

    tracing::info!(conn_id = %conn_id, "new connection established");
    conn_id
}

/// 연결 해제 처리. 명시적 leave 없이 끊겨도 동일하게 정리된다
pub async fn handle_disconnect(state: Arc<AppState>, conn_id: &str) {
    if let Some((_, session)) = state.peers.remove(conn_id) {
        let room_id = session.room_id.read().await.clone();
        let user_id = session.user_id.read().await.clone();

        if let Some(room_id) = room_id {
            crate::handlers::room::leave_room_internal(&state, conn_id, &room_id, user_id.as_deref())
                .await;
        }

        tracing::info!(
            conn_id = %conn_id,
            connected_for_ms = session.connected_at.elapsed().as_millis() as u64,
            "connection closed"
        );
    }
}
