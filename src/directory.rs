//! 방 영속성 서비스 조회
//!
//! 방 멤버십(소유자 + 멤버 목록)의 원본은 외부 영속성 서비스에 있다.
//! 이 서버는 trait 너머로 조회만 하며, 결과를 캐시하지 않는다.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// 영속성 서비스가 반환하는 방 레코드
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub owner_id: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

impl RoomRecord {
    /// 소유자이거나 멤버 목록에 있으면 입장 허용
    pub fn authorizes(&self, user_id: &str) -> bool {
        self.owner_id == user_id || self.member_ids.iter().any(|m| m == user_id)
    }
}

/// 영속성 서비스 조회 실패
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("room service unavailable: {0}")]
    Unavailable(String),
}

/// 방 조회 인터페이스
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// 방 레코드 조회. 없는 방은 `Ok(None)`
    async fn fetch_room(&self, room_id: &str) -> Result<Option<RoomRecord>, DirectoryError>;
}

/// 영속성 서비스 HTTP 클라이언트
pub struct HttpRoomDirectory {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRoomDirectory {
    pub fn new(base_url: String, request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("failed to build room service HTTP client");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl RoomDirectory for HttpRoomDirectory {
    async fn fetch_room(&self, room_id: &str) -> Result<Option<RoomRecord>, DirectoryError> {
        let url = format!("{}/api/rooms/{}", self.base_url, room_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(DirectoryError::Unavailable(format!(
                "unexpected status {} from {}",
                response.status(),
                url
            )));
        }

        response
            .json::<RoomRecord>()
            .await
            .map(Some)
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))
    }
}

/// 인메모리 구현. 개발 모드와 테스트에서 사용
#[derive(Default)]
pub struct InMemoryRoomDirectory {
    rooms: DashMap<String, RoomRecord>,
}

impl InMemoryRoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, room_id: impl Into<String>, record: RoomRecord) {
        self.rooms.insert(room_id.into(), record);
    }
}

#[async_trait]
impl RoomDirectory for InMemoryRoomDirectory {
    async fn fetch_room(&self, room_id: &str) -> Result<Option<RoomRecord>, DirectoryError> {
        Ok(self.rooms.get(room_id).map(|r| r.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_and_members_are_authorized() {
        let record = RoomRecord {
            owner_id: "u1".to_string(),
            member_ids: vec!["u2".to_string(), "u3".to_string()],
        };
        assert!(record.authorizes("u1"));
        assert!(record.authorizes("u3"));
        assert!(!record.authorizes("u9"));
    }

    #[tokio::test]
    async fn in_memory_lookup() {
        let directory = InMemoryRoomDirectory::new();
        directory.insert(
            "r1",
            RoomRecord {
                owner_id: "u1".to_string(),
                member_ids: vec![],
            },
        );

        let found = directory.fetch_room("r1").await.unwrap();
        assert_eq!(found.unwrap().owner_id, "u1");
        assert!(directory.fetch_room("r2").await.unwrap().is_none());
    }
}
