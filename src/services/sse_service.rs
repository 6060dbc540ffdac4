use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    dto::sse::{Handshake, ServerEvent},
    state::SharedState,
};

/// Subscribe to a room's SSE stream, creating its hub on demand.
pub fn subscribe_room(state: &SharedState, room_code: &str) -> broadcast::Receiver<ServerEvent> {
    state.hubs().subscribe(room_code)
}

/// Initial event confirming the subscription to the client.
pub fn handshake_event(state: &SharedState, room_code: &str) -> Option<ServerEvent> {
    ServerEvent::json(
        Some("handshake".to_string()),
        &Handshake {
            room_code: room_code.to_string(),
            message: format!("subscribed to room {room_code}"),
            degraded: state.is_degraded(),
        },
    )
    .ok()
}

/// Convert a broadcast receiver into an SSE response, forwarding events and
/// cleaning up the room hub once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    state: SharedState,
    room_code: String,
    handshake: Option<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        if let Some(payload) = handshake {
            let _ = tx.send(Ok(to_event(payload))).await;
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive;
                            // the next state-update carries the full snapshot.
                            continue;
                        }
                    }
                }
            }
        }

        // Our own receiver counts against the hub's subscriber tally; it has
        // to go before the idle check or the hub is never reclaimed.
        drop(receiver);
        // Own the room code inside the spawned task so the hub is reclaimed
        // even if the request context has already dropped.
        state.hubs().drop_if_idle(&room_code);
        tracing::info!(room_code, "room SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}
