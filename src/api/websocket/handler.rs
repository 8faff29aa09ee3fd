//! WebSocket connection handler

use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::Response,
};
use futures::{future, Sink, SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};

use super::session::{Inbound, SessionLoop};
use super::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, peer, state))
}

/// Drive one connection: a writer task drains the outbound queue while the
/// session loop consumes inbound frames.
async fn handle_socket(socket: WebSocket, peer: SocketAddr, state: Arc<AppState>) {
    let peer = peer.to_string();
    let (sink, stream) = socket.split();
    let (outbound_tx, outbound_rx) = mpsc::channel(state.outbound_buffer);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let writer = tokio::spawn(write_frames(sink, outbound_rx, shutdown_rx, peer.clone()));

    match SessionLoop::open(state.as_ref().clone(), peer.clone(), outbound_tx).await {
        Ok(session) => {
            let inbound = stream.filter_map(|msg| future::ready(to_inbound(msg)));
            session.run(inbound).await;
        }
        Err(e) => tracing::error!(peer = %peer, error = %e, "could not register client"),
    }

    // The socket is closed on every path once the writer exits
    drop(shutdown_tx);
    if let Err(e) = writer.await {
        tracing::warn!(peer = %peer, error = %e, "writer task failed");
    }
}

/// Map a raw WebSocket message to a session input; control frames are skipped
fn to_inbound(msg: Result<Message, axum::Error>) -> Option<Result<Inbound, axum::Error>> {
    match msg {
        Ok(Message::Text(text)) => Some(Ok(Inbound::Frame(text.into_bytes()))),
        Ok(Message::Binary(data)) => Some(Ok(Inbound::Frame(data))),
        Ok(Message::Close(_)) => Some(Ok(Inbound::Close)),
        Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => None,
        Err(e) => Some(Err(e)),
    }
}

/// Drain the outbound queue into the socket until the session ends
///
/// A send blocked on a peer that stopped reading is abandoned as soon as
/// shutdown is signalled; the sink is then dropped without a close handshake.
async fn write_frames<S>(
    mut sink: S,
    mut outbound: mpsc::Receiver<Arc<str>>,
    mut shutdown: oneshot::Receiver<()>,
    peer: String,
) where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    loop {
        tokio::select! {
            // Queued frames go out before shutdown is honoured
            biased;

            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                tokio::select! {
                    sent = sink.send(Message::Text(frame.to_string())) => {
                        if let Err(e) = sent {
                            tracing::warn!(peer = %peer, error = %e, "websocket write failed");
                            break;
                        }
                    }
                    _ = &mut shutdown => {
                        tracing::debug!(peer = %peer, "peer stopped reading, abandoning write");
                        return;
                    }
                }
            }
            _ = &mut shutdown => break,
        }
    }

    if let Err(e) = sink.close().await {
        tracing::debug!(peer = %peer, error = %e, "websocket could not be closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_binary_become_frames() {
        let text = to_inbound(Ok(Message::Text("{}".to_string())));
        assert!(matches!(text, Some(Ok(Inbound::Frame(ref b))) if b == b"{}"));

        let binary = to_inbound(Ok(Message::Binary(b"{}".to_vec())));
        assert!(matches!(binary, Some(Ok(Inbound::Frame(_)))));
    }

    #[test]
    fn test_control_frames_are_skipped() {
        assert!(to_inbound(Ok(Message::Ping(vec![1]))).is_none());
        assert!(to_inbound(Ok(Message::Pong(vec![1]))).is_none());
    }

    #[test]
    fn test_close_frame_closes_session() {
        assert!(matches!(
            to_inbound(Ok(Message::Close(None))),
            Some(Ok(Inbound::Close))
        ));
    }

    #[tokio::test]
    async fn test_writer_forwards_frames_then_closes() {
        let (sink, written) = futures::channel::mpsc::channel::<Message>(8);
        let (outbound_tx, outbound_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let writer = tokio::spawn(write_frames(sink, outbound_rx, shutdown_rx, "peer".into()));

        outbound_tx.send(Arc::from("one")).await.unwrap();
        outbound_tx.send(Arc::from("two")).await.unwrap();
        drop(outbound_tx);
        writer.await.unwrap();
        drop(shutdown_tx);

        let frames: Vec<Message> = written.collect().await;
        assert_eq!(
            frames,
            vec![Message::Text("one".into()), Message::Text("two".into())]
        );
    }

    #[tokio::test]
    async fn test_writer_stops_when_peer_is_not_reading() {
        // Capacity one and nobody reads: the second send never completes
        let (sink, _unread) = futures::channel::mpsc::channel::<Message>(0);
        let (outbound_tx, outbound_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let writer = tokio::spawn(write_frames(sink, outbound_rx, shutdown_rx, "peer".into()));

        for frame in ["a", "b", "c"] {
            outbound_tx.send(Arc::from(frame)).await.unwrap();
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!writer.is_finished());

        drop(shutdown_tx);
        tokio::time::timeout(std::time::Duration::from_secs(1), writer)
            .await
            .expect("writer did not stop on shutdown")
            .unwrap();
    }
}
