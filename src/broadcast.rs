//! 방 단위 이벤트 팬아웃
//!
//! 팬아웃은 RoomBus trait 뒤에 둔다. 다중 인스턴스 확장 시 공유
//! 메시지 버스 구현으로 교체하는 자리이고, 단일 프로세스 구현은
//! 구독자가 하나뿐인 퇴화형이다. 전달은 최선 노력이며 순서 보장은
//! 연결 단위 FIFO뿐이다.

use async_trait::async_trait;

use crate::protocol::ServerMessage;
use crate::state::AppState;

/// 방 단위 이벤트 버스
#[async_trait]
pub trait RoomBus: Send + Sync {
    /// 방의 모든 연결에 전달 (발신자 포함)
    async fn publish(&self, room_id: &str, message: ServerMessage);

    /// 한 연결을 제외한 방의 모든 연결에 전달
    async fn publish_except(&self, room_id: &str, except_conn_id: &str, message: ServerMessage);

    /// 특정 연결 하나에만 전달
    async fn send_to(&self, conn_id: &str, message: ServerMessage);
}

#[async_trait]
impl RoomBus for AppState {
    async fn publish(&self, room_id: &str, message: ServerMessage) {
        if let Some(group) = self.groups.get(room_id) {
            let members = group.members.read().await;
            for conn_id in members.iter() {
                if let Some(session) = self.peers.get(conn_id) {
                    let _ = session.sender.send(message.clone());
                }
            }
        }
    }

    async fn publish_except(&self, room_id: &str, except_conn_id: &str, message: ServerMessage) {
        if let Some(group) = self.groups.get(room_id) {
            let members = group.members.read().await;
            for conn_id in members.iter() {
                if conn_id != except_conn_id {
                    if let Some(session) = self.peers.get(conn_id) {
                        let _ = session.sender.send(message.clone());
                    }
                }
            }
        }
    }

    async fn send_to(&self, conn_id: &str, message: ServerMessage) {
        if let Some(session) = self.peers.get(conn_id) {
            let _ = session.sender.send(message);
        }
    }
}
