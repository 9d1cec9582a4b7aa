//! `ZeroMQ` REQ connection to the broker.
//!
//! The worker is the connecting side. Its socket carries the worker identity
//! so the broker can address it, and follows strict REQ alternation:
//!
//! ```text
//! send(route) -> recv(request) -> send(envelope) -> recv(request) -> ...
//! ```
//!
//! The opening send is the registration frame; every later send is a
//! four-frame response envelope.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use polyblog_types::{Envelope, Request, RouteId, WorkerIdentity};
use tokio::time::timeout;
use tracing::{debug, info};
use zeromq::util::PeerIdentity;
use zeromq::{ReqSocket, Socket, SocketOptions, SocketRecv, SocketSend, ZmqMessage, ZmqResult};

use crate::error::WorkerError;

/// REQ socket wrapper for talking to the broker.
pub struct BrokerConnection {
    socket: ReqSocket,
    endpoint: String,
    send_timeout: Duration,
}

impl BrokerConnection {
    /// Bind `identity` to a new REQ socket and connect it to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Connection`] if the identity is rejected by the
    /// transport, the broker is unreachable, or `connect_timeout` elapses.
    pub async fn connect(
        endpoint: &str,
        identity: WorkerIdentity,
        connect_timeout: Duration,
        send_timeout: Duration,
    ) -> Result<Self, WorkerError> {
        let peer_id = PeerIdentity::try_from(identity.to_wire())
            .map_err(|e| WorkerError::Connection(format!("invalid socket identity: {e}")))?;
        let mut options = SocketOptions::default();
        options.peer_identity(peer_id);
        let mut socket = ReqSocket::with_options(options);

        info!(endpoint = endpoint, identity = %identity, "connecting to broker");
        timeout(connect_timeout, socket.connect(endpoint))
            .await
            .map_err(|_elapsed| {
                WorkerError::Connection(format!(
                    "timed out after {}ms connecting to {endpoint}",
                    connect_timeout.as_millis()
                ))
            })?
            .map_err(|e| WorkerError::Connection(format!("failed to connect to {endpoint}: {e}")))?;
        info!(endpoint = endpoint, "broker connection established");

        Ok(Self {
            socket,
            endpoint: endpoint.to_owned(),
            send_timeout,
        })
    }

    /// Send the one-time registration frame carrying `route`.
    ///
    /// No acknowledgement is awaited; the next inbound frame is the first
    /// request.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Transport`] if the send fails or times out.
    pub async fn register(&mut self, route: &RouteId) -> Result<(), WorkerError> {
        debug!(route = %route, "sending registration frame");
        self.send(ZmqMessage::from(route.to_string())).await
    }

    /// Block until the broker delivers the next request.
    ///
    /// There is no timeout: the call waits for as long as the broker is
    /// idle.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Transport`] if the receive fails.
    pub async fn recv_request(&mut self) -> Result<Request, WorkerError> {
        let message = self.socket.recv().await.map_err(|e| {
            WorkerError::Transport(format!("failed to receive from {}: {e}", self.endpoint))
        })?;
        Ok(decode_request(message))
    }

    /// Send a response envelope as four ordered frames.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Serde`] if the header block cannot be encoded
    /// and [`WorkerError::Transport`] if the send fails or times out.
    pub async fn send_envelope(&mut self, envelope: Envelope) -> Result<(), WorkerError> {
        let message = encode_envelope(envelope)?;
        self.send(message).await
    }

    async fn send(&mut self, message: ZmqMessage) -> Result<(), WorkerError> {
        bounded_send(&self.endpoint, self.send_timeout, self.socket.send(message)).await
    }
}

/// Await a socket send, failing with [`WorkerError::Transport`] when it errors
/// or does not complete within `limit`.
async fn bounded_send<F>(endpoint: &str, limit: Duration, send: F) -> Result<(), WorkerError>
where
    F: Future<Output = ZmqResult<()>>,
{
    timeout(limit, send)
        .await
        .map_err(|_elapsed| {
            WorkerError::Transport(format!(
                "send to {endpoint} timed out after {}ms",
                limit.as_millis()
            ))
        })?
        .map_err(|e| WorkerError::Transport(format!("failed to send to {endpoint}: {e}")))
}

impl std::fmt::Debug for BrokerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerConnection")
            .field("endpoint", &self.endpoint)
            .field("send_timeout", &self.send_timeout)
            .finish_non_exhaustive()
    }
}

/// Build the multi-frame message for an envelope.
///
/// # Errors
///
/// Returns [`WorkerError::Serde`] if the header block cannot be encoded.
pub fn encode_envelope(envelope: Envelope) -> Result<ZmqMessage, WorkerError> {
    let [route, status, headers, body] = envelope.into_frames()?;
    let mut message = ZmqMessage::from(route);
    message.push_back(Bytes::from(status));
    message.push_back(Bytes::from(headers));
    message.push_back(Bytes::from(body));
    Ok(message)
}

/// Turn an inbound message into a [`Request`].
///
/// Only the first frame is kept; its bytes are decoded lossily since the
/// payload is never interpreted.
pub fn decode_request(message: ZmqMessage) -> Request {
    let frames = message.into_vec();
    if frames.len() > 1 {
        debug!(frames = frames.len(), "request carried extra frames, using the first");
    }
    let payload = frames
        .into_iter()
        .next()
        .map(|frame| String::from_utf8_lossy(&frame).into_owned())
        .unwrap_or_default();
    Request::new(payload)
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use zeromq::ZmqError;

    use super::*;

    fn frame_text(message: &ZmqMessage, index: usize) -> Option<String> {
        message
            .get(index)
            .map(|frame| String::from_utf8_lossy(frame).into_owned())
    }

    #[test]
    fn envelope_encodes_four_frames_in_order() -> Result<(), Box<dyn Error>> {
        let route = RouteId::new("GET/_/post/new")?;
        let message = encode_envelope(Envelope::html(route, "<p>body</p>".to_owned()))?;

        assert_eq!(message.len(), 4);
        assert_eq!(frame_text(&message, 0).as_deref(), Some("GET/_/post/new"));
        assert_eq!(frame_text(&message, 1).as_deref(), Some("200"));
        let headers: serde_json::Value =
            serde_json::from_str(&frame_text(&message, 2).unwrap_or_default())?;
        assert_eq!(headers, serde_json::json!({"Content-Type": "text/html"}));
        assert_eq!(frame_text(&message, 3).as_deref(), Some("<p>body</p>"));
        Ok(())
    }

    #[test]
    fn empty_body_still_sends_a_frame() -> Result<(), Box<dyn Error>> {
        let route = RouteId::new("GET/_/post/new")?;
        let message = encode_envelope(Envelope::html(route, String::new()))?;
        assert_eq!(message.len(), 4);
        assert_eq!(frame_text(&message, 3).as_deref(), Some(""));
        Ok(())
    }

    #[test]
    fn request_keeps_first_frame() {
        let mut message = ZmqMessage::from("x");
        message.push_back(Bytes::from_static(b"ignored"));
        assert_eq!(decode_request(message).len(), 1);
    }

    #[test]
    fn non_utf8_request_is_accepted() {
        let message = ZmqMessage::from(Bytes::from_static(&[0xff, 0xfe]));
        let request = decode_request(message);
        assert!(!request.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_send_times_out() {
        let stalled = std::future::pending::<ZmqResult<()>>();
        let result = bounded_send("tcp://broker:4321", Duration::from_millis(50), stalled).await;
        assert!(
            matches!(&result, Err(WorkerError::Transport(msg)) if msg.contains("timed out after 50ms")),
            "expected send timeout, got {result:?}"
        );
    }

    #[tokio::test]
    async fn failed_send_is_a_transport_error() {
        let failing = async { Err::<(), _>(ZmqError::Other("peer went away")) };
        let result = bounded_send("tcp://broker:4321", Duration::from_secs(1), failing).await;
        assert!(
            matches!(&result, Err(WorkerError::Transport(msg)) if msg.contains("peer went away")),
            "expected transport failure, got {result:?}"
        );
    }

    #[tokio::test]
    async fn completed_send_passes_through() {
        let result = bounded_send("tcp://broker:4321", Duration::from_secs(1), async { Ok(()) }).await;
        assert!(result.is_ok());
    }
}
