//! Live viewer endpoints: WebSocket for admin and display screens, SSE as a read-only mirror

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use futures::{SinkExt, Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info};

use super::server::AppState;
use crate::realtime::{Broadcaster, SharedBroadcaster, ViewerEvent};

/// Interval between heartbeat pings (in seconds)
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// GET /ws - upgrade to a viewer WebSocket
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.broadcaster))
}

/// Drive one WebSocket viewer until either side hangs up.
///
/// Outbound events and heartbeat pings go through a spawned sender task;
/// inbound `draw-start`/`draw-stop` frames are relayed to every viewer.
async fn handle_socket(socket: WebSocket, broadcaster: SharedBroadcaster) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let mut rx = broadcaster.register(&conn_id);
    info!(conn_id = %conn_id, "Viewer connected");

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
        // First tick completes immediately
        heartbeat.tick().await;

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => {
                        if sink.send(Message::Text(event.to_json())).await.is_err() {
                            debug!(conn_id = %sender_conn_id, "Viewer sink closed");
                            break;
                        }
                    }
                    None => {
                        // Unregistered (shutdown): say goodbye
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                },
                _ = heartbeat.tick() => {
                    if sink.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                relay_frame(&broadcaster, &conn_id, &text);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "Viewer receive error");
                break;
            }
        }
    }

    broadcaster.unregister(&conn_id);
    send_task.abort();
    info!(conn_id = %conn_id, "Viewer disconnected");
}

/// Relay a viewer's text frame to every viewer, the sender included.
///
/// Returns how many viewers received it; frames that are not animation relays are dropped.
fn relay_frame(broadcaster: &Broadcaster, conn_id: &str, text: &str) -> usize {
    match ViewerEvent::from_viewer(text) {
        Some(event) => {
            debug!(conn_id = %conn_id, event = event.name(), "Relaying viewer event");
            broadcaster.broadcast(event)
        }
        None => {
            debug!(conn_id = %conn_id, "Ignoring viewer frame: {}", text);
            0
        }
    }
}

/// Removes an SSE viewer from the registry when its stream is dropped
struct ViewerGuard {
    conn_id: String,
    broadcaster: SharedBroadcaster,
}

impl Drop for ViewerGuard {
    fn drop(&mut self) {
        self.broadcaster.unregister(&self.conn_id);
        info!(conn_id = %self.conn_id, "SSE viewer disconnected");
    }
}

/// GET /api/events - server-sent events carrying the same events as the WebSocket
pub async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let rx = state.broadcaster.register(&conn_id);
    info!(conn_id = %conn_id, "SSE viewer connected");

    let guard = ViewerGuard {
        conn_id,
        broadcaster: state.broadcaster.clone(),
    };
    let stream = UnboundedReceiverStream::new(rx).map(move |event| {
        let _guard = &guard;
        Ok(Event::default()
            .event(event.name())
            .data(event.payload().to_string()))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
