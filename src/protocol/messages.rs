//! 클라이언트-서버 메시지 프로토콜 정의

use serde::{Deserialize, Serialize};

/// 클라이언트 → 서버 메시지
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ClientMessage {
    // Room Management
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: String,
        credential: String,
    },
    #[serde(rename_all = "camelCase")]
    LeaveRoom {
        #[serde(default)]
        room_id: Option<String>,
        // 탈퇴는 연결에 묶인 신원으로 처리하므로 재검증하지 않음
        #[serde(default)]
        credential: Option<String>,
    },

    // Live Editing
    #[serde(rename_all = "camelCase")]
    CodeChange {
        room_id: String,
        code: String,
    },
    #[serde(rename_all = "camelCase")]
    Typing {
        #[serde(default)]
        room_id: Option<String>,
        #[serde(default)]
        line_number: u32,
        #[serde(default)]
        username: String,
        #[serde(default)]
        user_id: Option<String>,
        #[serde(default)]
        filename: String,
    },
    #[serde(rename_all = "camelCase")]
    StoppedTyping {
        #[serde(default)]
        room_id: Option<String>,
        #[serde(default)]
        user_id: Option<String>,
        #[serde(default)]
        filename: String,
    },

    // Chat (영속화는 별도 HTTP 요청, 여기서는 실시간 중계만)
    #[serde(rename_all = "camelCase")]
    SendMessage {
        room_id: String,
        #[serde(flatten)]
        message: serde_json::Map<String, serde_json::Value>,
    },

    // Call Signaling
    #[serde(rename_all = "camelCase")]
    Offer {
        room_id: String,
        payload: serde_json::Value,
    },
    #[serde(rename_all = "camelCase")]
    Answer {
        room_id: String,
        payload: serde_json::Value,
    },
    #[serde(rename_all = "camelCase")]
    Candidate {
        room_id: String,
        payload: serde_json::Value,
    },

    // 비탐색 이탈 경로. leaveRoom과 동일한 정리를 수행
    Logout,
    DisconnectUser,
}

/// 서버 → 클라이언트 메시지
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ServerMessage {
    // Presence
    OnlineUsers(Vec<String>),

    // Live Editing
    CodeUpdate(String),
    #[serde(rename_all = "camelCase")]
    UserTyping {
        line_number: u32,
        username: String,
        user_id: String,
        filename: String,
        timestamp: u64,
    },
    #[serde(rename_all = "camelCase")]
    UserStoppedTyping {
        user_id: String,
        filename: String,
        timestamp: u64,
    },

    // Chat
    NewMessage(serde_json::Value),

    // Call Signaling
    Offer {
        from: String,
        payload: serde_json::Value,
    },
    Answer {
        from: String,
        payload: serde_json::Value,
    },
    Candidate {
        from: String,
        payload: serde_json::Value,
    },

    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_room_wire_format() {
        let raw = r#"{"type":"joinRoom","payload":{"roomId":"r1","credential":"tok"}}"#;
        let msg: ClientMessage = serde_json::from_str(raw).unwrap();
        match msg {
            ClientMessage::JoinRoom { room_id, credential } => {
                assert_eq!(room_id, "r1");
                assert_eq!(credential, "tok");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn typing_tolerates_missing_identity_fields() {
        // 식별자 누락은 파싱 단계가 아니라 핸들러에서 걸러낸다
        let raw = r#"{"type":"typing","payload":{"lineNumber":5,"filename":"a.js"}}"#;
        let msg: ClientMessage = serde_json::from_str(raw).unwrap();
        match msg {
            ClientMessage::Typing { room_id, user_id, line_number, .. } => {
                assert!(room_id.is_none());
                assert!(user_id.is_none());
                assert_eq!(line_number, 5);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn send_message_keeps_extra_fields() {
        let raw = r#"{"type":"sendMessage","payload":{"roomId":"r1","text":"hi","sender":"u1"}}"#;
        let msg: ClientMessage = serde_json::from_str(raw).unwrap();
        match msg {
            ClientMessage::SendMessage { room_id, message } => {
                assert_eq!(room_id, "r1");
                assert_eq!(message.get("text"), Some(&json!("hi")));
                assert_eq!(message.get("sender"), Some(&json!("u1")));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn logout_without_payload() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"logout"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Logout));
    }

    #[test]
    fn online_users_payload_is_bare_array() {
        let msg = ServerMessage::OnlineUsers(vec!["u1".to_string(), "u2".to_string()]);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"type":"onlineUsers","payload":["u1","u2"]}));
    }

    #[test]
    fn code_update_payload_is_bare_string() {
        let msg = ServerMessage::CodeUpdate("x=1".to_string());
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"type":"codeUpdate","payload":"x=1"}));
    }

    #[test]
    fn user_typing_field_names_are_camel_case() {
        let msg = ServerMessage::UserTyping {
            line_number: 5,
            username: "Alice".to_string(),
            user_id: "u1".to_string(),
            filename: "a.js".to_string(),
            timestamp: 1700000000000,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["payload"]["lineNumber"], json!(5));
        assert_eq!(value["payload"]["userId"], json!("u1"));
    }
}
