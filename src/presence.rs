//! 프로세스 전역 온라인 사용자 추적
//!
//! 단순한 사용자 집합이 아니라 사용자별 활성 연결 집합을 유지한다.
//! 두 번째 탭이 끊겨도 첫 탭이 살아 있으면 온라인으로 남는다.

use dashmap::DashMap;
use std::collections::HashSet;

/// 온라인 사용자 추적기 (user_id -> 활성 연결 집합)
#[derive(Default)]
pub struct PresenceTracker {
    online: DashMap<String, HashSet<String>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 연결을 사용자의 활성 집합에 추가. 멱등
    ///
    /// 사용자가 오프라인 → 온라인으로 전환되면 `true`
    pub fn mark_online(&self, user_id: &str, conn_id: &str) -> bool {
        let mut conns = self.online.entry(user_id.to_string()).or_default();
        let was_empty = conns.is_empty();
        conns.insert(conn_id.to_string());
        was_empty
    }

    /// 연결을 사용자의 활성 집합에서 제거
    ///
    /// 마지막 연결이 사라져 사용자가 오프라인이 되면 `true`
    pub fn mark_offline(&self, user_id: &str, conn_id: &str) -> bool {
        if let Some(mut conns) = self.online.get_mut(user_id) {
            conns.remove(conn_id);
        }
        self.online
            .remove_if(user_id, |_, conns| conns.is_empty())
            .is_some()
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.online
            .get(user_id)
            .map(|conns| !conns.is_empty())
            .unwrap_or(false)
    }

    /// 현재 온라인 사용자 목록. 순서는 의미 없음
    pub fn online_users(&self) -> Vec<String> {
        self.online.iter().map(|e| e.key().clone()).collect()
    }

    pub fn connection_count(&self, user_id: &str) -> usize {
        self.online.get(user_id).map(|c| c.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_online_is_idempotent() {
        let presence = PresenceTracker::new();
        assert!(presence.mark_online("u1", "c1"));
        assert!(!presence.mark_online("u1", "c1"));

        assert_eq!(presence.online_users(), vec!["u1".to_string()]);
        assert_eq!(presence.connection_count("u1"), 1);
    }

    #[test]
    fn second_tab_disconnect_keeps_user_online() {
        let presence = PresenceTracker::new();
        presence.mark_online("u1", "tab1");
        presence.mark_online("u1", "tab2");

        assert!(!presence.mark_offline("u1", "tab2"));
        assert!(presence.is_online("u1"));

        assert!(presence.mark_offline("u1", "tab1"));
        assert!(!presence.is_online("u1"));
        assert!(presence.online_users().is_empty());
    }

    #[test]
    fn offline_for_unknown_user_is_harmless() {
        let presence = PresenceTracker::new();
        assert!(!presence.mark_offline("ghost", "c1"));
    }

    #[test]
    fn users_are_independent() {
        let presence = PresenceTracker::new();
        presence.mark_online("u1", "c1");
        presence.mark_online("u2", "c2");
        presence.mark_offline("u1", "c1");

        assert!(!presence.is_online("u1"));
        assert!(presence.is_online("u2"));
    }
}
