//! 방 입장/퇴장 핸들러
//!
//! 입장은 자격증명 검증 → 멤버십 게이트 → 그룹 편입 → 프레즌스 갱신
//! 순서의 파이프라인이다. 멤버십은 입장 시점마다 영속성 서비스에서
//! 새로 조회하며 캐시하지 않는다.

use crate::auth;
use crate::broadcast::RoomBus;
use crate::error::RelayError;
use crate::protocol::ServerMessage;
use crate::state::{AppState, RoomGroup};
use std::sync::Arc;

/// 방 입장 처리. 실패는 해당 연결에만 `error` 이벤트로 알린다
pub async fn handle_join_room(state: Arc<AppState>, conn_id: &str, room_id: &str, credential: &str) {
    if let Err(err) = join_room(&state, conn_id, room_id, credential).await {
        tracing::warn!(conn_id = %conn_id, room_id = %room_id, error = %err, "join rejected");
        if err.is_surfaced() {
            state
                .send_to(conn_id, ServerMessage::Error(err.to_string()))
                .await;
        }
    }
}

async fn join_room(
    state: &Arc<AppState>,
    conn_id: &str,
    room_id: &str,
    credential: &str,
) -> Result<(), RelayError> {
    let room_id = room_id.trim();

    let claims = auth::verify_credential(credential, &state.config.auth.secret)?;
    let user_id = claims.sub;

    let record = state
        .directory
        .fetch_room(room_id)
        .await?
        .ok_or(RelayError::RoomNotFound)?;
    if !record.authorizes(&user_id) {
        return Err(RelayError::NotAuthorized);
    }

    // 조회로 중단된 사이 연결이 끊겼을 수 있다. 상태를 바꾸기 전에 재확인
    let (prev_room, prev_user) = match state.peers.get(conn_id) {
        Some(session) => (
            session.room_id.read().await.clone(),
            session.user_id.read().await.clone(),
        ),
        None => {
            tracing::debug!(conn_id = %conn_id, "connection dropped during room lookup");
            return Ok(());
        }
    };

    // UI는 한 번에 한 방만 쓰지만 프로토콜은 재입장을 허용한다.
    // 다른 방에 묶여 있으면 먼저 그 방의 퇴장 정리를 수행
    if let Some(prev) = prev_room {
        if prev != room_id {
            leave_room_internal(state, conn_id, &prev, prev_user.as_deref()).await;
        }
    }

    {
        let group = state
            .groups
            .entry(room_id.to_string())
            .or_insert_with(|| RoomGroup::new(room_id.to_string()));
        group.members.write().await.insert(conn_id.to_string());
    }

    if let Some(session) = state.peers.get(conn_id) {
        *session.room_id.write().await = Some(room_id.to_string());
        *session.user_id.write().await = Some(user_id.clone());
    }

    state.presence.mark_online(&user_id, conn_id);

    // 갱신된 온라인 목록을 방 전체에 브로드캐스트 (입장자 포함)
    state
        .publish(
            room_id,
            ServerMessage::OnlineUsers(state.presence.online_users()),
        )
        .await;

    tracing::info!(conn_id = %conn_id, room_id = %room_id, user_id = %user_id, "user joined room");
    Ok(())
}

/// 명시적 퇴장 처리 (leaveRoom / logout / disconnectUser)
pub async fn handle_leave_room(state: Arc<AppState>, conn_id: &str) {
    let (room_id, user_id) = match state.peers.get(conn_id) {
        Some(session) => (
            session.room_id.read().await.clone(),
            session.user_id.read().await.clone(),
        ),
        None => (None, None),
    };

    if let Some(room_id) = room_id {
        leave_room_internal(&state, conn_id, &room_id, user_id.as_deref()).await;

        // 연결은 살아 있으므로 미인증 상태로 되돌린다
        if let Some(session) = state.peers.get(conn_id) {
            *session.room_id.write().await = None;
            *session.user_id.write().await = None;
        }
    }
}

/// 퇴장 공통 경로. 명시적 퇴장과 연결 끊김이 같은 정리를 거친다
pub async fn leave_room_internal(
    state: &Arc<AppState>,
    conn_id: &str,
    room_id: &str,
    user_id: Option<&str>,
) {
    // 떠나는 사용자의 잔여 타이핑 표시 정리
    if let Some(user_id) = user_id {
        crate::handlers::typing::clear_typing_for(state, room_id, user_id, conn_id).await;
    }

    let removed = if let Some(group) = state.groups.get(room_id) {
        group.members.write().await.remove(conn_id)
    } else {
        false
    };

    // 빈 그룹 제거. 동시 입장과 겹치면 스위프 스케줄러가 마저 처리
    state.groups.remove_if(room_id, |_, group| {
        group
            .members
            .try_read()
            .map(|members| members.is_empty())
            .unwrap_or(false)
    });

    let went_offline = match user_id {
        Some(user_id) => state.presence.mark_offline(user_id, conn_id),
        None => false,
    };

    if removed {
        state
            .publish(
                room_id,
                ServerMessage::OnlineUsers(state.presence.online_users()),
            )
            .await;

        tracing::info!(
            conn_id = %conn_id,
            room_id = %room_id,
            user_id = ?user_id,
            went_offline = went_offline,
            "user left room"
        );
    }
}
