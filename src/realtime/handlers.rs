use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::realtime::dto::InboundEvent;
use crate::realtime::hub::RealtimeHub;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<RealtimeHub>) {
    let (conn, mut events) = hub.register();
    debug!(conn = %conn, "realtime connection opened");

    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match serde_json::to_string(&event) {
                    Ok(text) => {
                        if sink.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(conn = %conn, error = %e, "failed to encode realtime event"),
                }
            }
            message = stream.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => handle_inbound(&hub, conn, &text),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // binary and ping/pong frames are ignored
                    Some(Err(e)) => {
                        debug!(conn = %conn, error = %e, "realtime read error");
                        break;
                    }
                }
            }
        }
    }

    hub.unregister(conn);
    debug!(conn = %conn, "realtime connection closed");
}

fn handle_inbound(hub: &RealtimeHub, conn: crate::realtime::hub::ConnId, text: &str) {
    match serde_json::from_str::<InboundEvent>(text) {
        Ok(InboundEvent::JoinClass(join)) => {
            debug!(conn = %conn, class = %join.class_name, section = %join.section, "join_class");
            hub.join_class_room(conn, &join.class_name, &join.section);
        }
        Ok(InboundEvent::JoinStudent(join)) => {
            debug!(conn = %conn, student_id = %join.student_id, "join_student");
            hub.join_student_room(conn, &join.student_id);
        }
        Err(e) => debug!(conn = %conn, error = %e, "ignoring unrecognized realtime message"),
    }
}
