//! WebSocket 수명주기와 이벤트 디스패치

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

/// 라우터 구성
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn index_handler() -> Html<&'static str> {
    Html("<h1>CodeHive Realtime Server (Rust)</h1><p>WebSocket endpoint: /ws</p>")
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "server": "codehive-realtime-rs",
        "timestamp": std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// 연결 하나의 수명주기. 정리는 끊김 경로와 무관하게 마지막에 수행
pub async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let conn_id = handlers::handle_connection(state.clone(), tx).await;

    // 송신 태스크
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    });

    // 수신 처리. 연결 단위 FIFO는 이 루프가 순서대로 비우면서 보장된다
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => handle_client_message(&state, &conn_id, msg).await,
                Err(e) => {
                    tracing::warn!(conn_id = %conn_id, error = %e, "unparseable client message");
                }
            },
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => {}
        }
    }

    // 연결 해제. 비정상 끊김도 반드시 이 정리를 지난다
    handlers::handle_disconnect(state, &conn_id).await;
    send_task.abort();
}

async fn handle_client_message(state: &Arc<AppState>, conn_id: &str, msg: ClientMessage) {
    match msg {
        ClientMessage::JoinRoom { room_id, credential } => {
            handlers::handle_join_room(state.clone(), conn_id, &room_id, &credential).await;
        }
        ClientMessage::LeaveRoom { .. } | ClientMessage::Logout | ClientMessage::DisconnectUser => {
            handlers::handle_leave_room(state.clone(), conn_id).await;
        }
        ClientMessage::CodeChange { room_id, code } => {
            handlers::handle_code_change(state.clone(), conn_id, &room_id, code).await;
        }
        ClientMessage::Typing {
            room_id,
            line_number,
            username,
            user_id,
            filename,
        } => {
            handlers::handle_typing(
                state.clone(),
                conn_id,
                room_id,
                line_number,
                username,
                user_id,
                filename,
            )
            .await;
        }
        ClientMessage::StoppedTyping {
            room_id,
            user_id,
            filename,
        } => {
            handlers::handle_stopped_typing(state.clone(), conn_id, room_id, user_id, filename)
                .await;
        }
        ClientMessage::SendMessage { room_id, message } => {
            handlers::handle_send_message(state.clone(), conn_id, &room_id, message).await;
        }
        ClientMessage::Offer { room_id, payload } => {
            handlers::handle_offer(state.clone(), conn_id, &room_id, payload).await;
        }
        ClientMessage::Answer { room_id, payload } => {
            handlers::handle_answer(state.clone(), conn_id, &room_id, payload).await;
        }
        ClientMessage::Candidate { room_id, payload } => {
            handlers::handle_candidate(state.clone(), conn_id, &room_id, payload).await;
        }
    }
}
