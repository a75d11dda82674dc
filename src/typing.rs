//! 타이핑 표시 디바운서 상태
//!
//! (room_id, user_id) 키의 일시 상태. 새 타이핑 이벤트마다 세대 번호를
//! 올리고, 만료 타이머는 자기 세대가 그대로일 때만 지운다. 그래서 해제
//! 브로드캐스트는 정확히 한 번만 나간다. 어디에도 영속화하지 않는다.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// (방, 사용자) 키
pub type TypingKey = (String, String);

/// 활성 타이핑 표시 항목
#[derive(Debug, Clone)]
pub struct TypingEntry {
    /// 표시를 만든 연결. 해제 브로드캐스트에서 발신자 제외에 쓰인다
    pub conn_id: String,
    pub filename: String,
    pub generation: u64,
    pub last_update: Instant,
}

/// 타이핑 표시 추적기
#[derive(Default)]
pub struct TypingTracker {
    entries: DashMap<TypingKey, TypingEntry>,
    generation: AtomicU64,
}

impl TypingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 타이핑 이벤트 수신 시 항목 생성/갱신. 새 세대 번호를 돌려준다
    pub fn refresh(&self, room_id: &str, user_id: &str, conn_id: &str, filename: &str) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries.insert(
            (room_id.to_string(), user_id.to_string()),
            TypingEntry {
                conn_id: conn_id.to_string(),
                filename: filename.to_string(),
                generation,
                last_update: Instant::now(),
            },
        );
        generation
    }

    /// 명시적 해제(stoppedTyping) 또는 퇴장 정리. 있던 항목을 돌려준다
    pub fn clear(&self, room_id: &str, user_id: &str) -> Option<TypingEntry> {
        self.entries
            .remove(&(room_id.to_string(), user_id.to_string()))
            .map(|(_, entry)| entry)
    }

    /// 타이머 만료 경로. 세대가 그대로일 때만 지운다
    pub fn expire(&self, room_id: &str, user_id: &str, generation: u64) -> Option<TypingEntry> {
        self.entries
            .remove_if(&(room_id.to_string(), user_id.to_string()), |_, entry| {
                entry.generation == generation
            })
            .map(|(_, entry)| entry)
    }

    /// 타이머가 놓친 항목 청소. 지운 항목들을 돌려준다
    pub fn sweep(&self, older_than: Duration) -> Vec<(TypingKey, TypingEntry)> {
        let now = Instant::now();
        let stale: Vec<TypingKey> = self
            .entries
            .iter()
            .filter(|e| now.duration_since(e.value().last_update) >= older_than)
            .map(|e| e.key().clone())
            .collect();

        stale
            .into_iter()
            .filter_map(|key| self.entries.remove(&key))
            .collect()
    }

    pub fn is_typing(&self, room_id: &str, user_id: &str) -> bool {
        self.entries
            .contains_key(&(room_id.to_string(), user_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stale_generation_does_not_expire() {
        let tracker = TypingTracker::new();
        let first = tracker.refresh("r1", "u1", "c1", "a.js");
        let second = tracker.refresh("r1", "u1", "c1", "a.js");

        // 갱신 이전 세대의 타이머는 무시된다
        assert!(tracker.expire("r1", "u1", first).is_none());
        assert!(tracker.is_typing("r1", "u1"));

        let expired = tracker.expire("r1", "u1", second).unwrap();
        assert_eq!(expired.filename, "a.js");
        assert!(!tracker.is_typing("r1", "u1"));
    }

    #[tokio::test]
    async fn clear_wins_over_pending_timer() {
        let tracker = TypingTracker::new();
        let generation = tracker.refresh("r1", "u1", "c1", "a.js");

        assert!(tracker.clear("r1", "u1").is_some());
        // 명시적 해제 후 도착한 타이머는 아무것도 지우지 않는다
        assert!(tracker.expire("r1", "u1", generation).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_removes_only_old_entries() {
        let tracker = TypingTracker::new();
        tracker.refresh("r1", "u1", "c1", "a.js");

        tokio::time::advance(Duration::from_secs(31)).await;
        tracker.refresh("r1", "u2", "c2", "b.js");

        let swept = tracker.sweep(Duration::from_secs(30));
        assert_eq!(swept.len(), 1);
        assert_eq!(swept[0].0, ("r1".to_string(), "u1".to_string()));
        assert!(tracker.is_typing("r1", "u2"));
    }
}
