//! 애플리케이션 상태 관리

use crate::config::Config;
use crate::directory::RoomDirectory;
use crate::presence::PresenceTracker;
use crate::protocol::ServerMessage;
use crate::typing::TypingTracker;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc::UnboundedSender, RwLock};

/// 전역 애플리케이션 상태
pub struct AppState {
    /// 방 브로드캐스트 그룹 (room_id -> RoomGroup)
    pub groups: DashMap<String, RoomGroup>,
    /// 연결 레지스트리 (conn_id -> PeerSession)
    pub peers: DashMap<String, PeerSession>,
    /// 온라인 사용자 추적기
    pub presence: PresenceTracker,
    /// 타이핑 표시 추적기
    pub typing: TypingTracker,
    /// 방 영속성 서비스
    pub directory: Arc<dyn RoomDirectory>,
    /// 설정
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, directory: Arc<dyn RoomDirectory>) -> Self {
        Self {
            groups: DashMap::new(),
            peers: DashMap::new(),
            presence: PresenceTracker::new(),
            typing: TypingTracker::new(),
            directory,
            config: Arc::new(config),
        }
    }
}

/// 방 브로드캐스트 그룹. 방의 실시간 이벤트를 받는 연결 집합
pub struct RoomGroup {
    #[allow(dead_code)]
    pub id: String,
    pub members: RwLock<HashSet<String>>,
    #[allow(dead_code)]
    pub created_at: Instant,
}

impl RoomGroup {
    pub fn new(id: String) -> Self {
        Self {
            id,
            members: RwLock::new(HashSet::new()),
            created_at: Instant::now(),
        }
    }
}

/// 연결 세션 정보. 신원은 joinRoom 검증 전까지 비어 있다
pub struct PeerSession {
    #[allow(dead_code)]
    pub id: String,
    pub user_id: RwLock<Option<String>>,
    pub room_id: RwLock<Option<String>>,
    pub sender: UnboundedSender<ServerMessage>,
    pub connected_at: Instant,
}
