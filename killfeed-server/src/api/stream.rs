use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures_util::{Stream, StreamExt};
use killfeed_core::processors::snapshot_stream;

use crate::state::AppState;

/// `GET /stream`: server-sent events.
///
/// Each event's `data:` is one JSON [`StreamMessage`](killfeed_sdk::objects::StreamMessage).
/// The first arrives immediately, then one per cadence tick until the
/// client disconnects, which drops the stream and stops its ticker.
pub(super) async fn sse_stream(
    state: State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let messages = snapshot_stream(state.view.clone(), state.stream.cadence);
    Sse::new(messages.map(|msg| Event::default().json_data(&msg))).keep_alive(KeepAlive::default())
}

/// `GET /ws`: the same snapshots as `/stream`, one text frame each.
pub(super) async fn ws_stream(state: State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let app_state = state.0.clone();
    ws.on_upgrade(move |socket| handle_stream_ws(socket, app_state))
}

/// Background task that drives a single WebSocket connection.
///
/// Pushes snapshots until the client closes the socket or a send fails.
/// Anything the client sends is ignored.
async fn handle_stream_ws(mut socket: WebSocket, state: AppState) {
    let mut messages = std::pin::pin!(snapshot_stream(state.view.clone(), state.stream.cadence));

    loop {
        tokio::select! {
            Some(msg) = messages.next() => {
                if send_json(&mut socket, &msg).await.is_err() {
                    tracing::debug!("WS: subscriber went away");
                    return;
                }
            }

            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => {
                        return;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

/// Serialize `value` as JSON and send it as a text WebSocket frame.
///
/// Returns `Err(())` if the send fails (client disconnected).
async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), ()> {
    let json = serde_json::to_string(value).map_err(|_| ())?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}
