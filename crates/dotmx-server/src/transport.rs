use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("write timed out")]
    Timeout,
    #[error("peer closed the connection")]
    Closed,
    #[error(transparent)]
    Protocol(#[from] tokio_tungstenite::tungstenite::Error),
}

/// The write half of a bidirectional binary channel to one client.
#[async_trait::async_trait]
pub trait TransportWriter: Send {
    /// Writes one binary application message. Must resolve within
    /// `timeout` or be treated as a slow subscriber.
    async fn send(&mut self, message: Vec<u8>, timeout: Duration) -> Result<(), TransportError>;
}

/// The read half of a bidirectional binary channel to one client.
#[async_trait::async_trait]
pub trait TransportReader: Send {
    /// Reads one binary application message. Returns `None` on clean peer
    /// close.
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}

/// A bidirectional binary channel to one client, before its read and write
/// halves are handed to their respective tasks.
///
/// Kept narrow and transport-agnostic on purpose: the registration and
/// dispatch logic in this crate only ever talks to this trait, not to
/// `tokio-tungstenite` directly, so a future signaling-based transport
/// (e.g. WebRTC data channels) can reuse the same subscriber lifecycle by
/// implementing `split` differently.
pub trait Transport: Send {
    type Writer: TransportWriter + 'static;
    type Reader: TransportReader + 'static;

    fn split(self) -> (Self::Writer, Self::Reader);
}

/// [`Transport`] over a `tokio-tungstenite` WebSocket.
pub struct WebSocketTransport {
    inner: WebSocketStream<TcpStream>,
}

impl WebSocketTransport {
    pub fn new(inner: WebSocketStream<TcpStream>) -> Self {
        Self { inner }
    }
}

impl Transport for WebSocketTransport {
    type Writer = WebSocketWriter;
    type Reader = WebSocketReader;

    fn split(self) -> (Self::Writer, Self::Reader) {
        let (sink, stream) = self.inner.split();
        (WebSocketWriter { sink }, WebSocketReader { stream })
    }
}

pub struct WebSocketWriter {
    sink: SplitSink<WebSocketStream<TcpStream>, Message>,
}

#[async_trait::async_trait]
impl TransportWriter for WebSocketWriter {
    async fn send(&mut self, message: Vec<u8>, timeout: Duration) -> Result<(), TransportError> {
        tokio::time::timeout(timeout, self.sink.send(Message::Binary(message.into())))
            .await
            .map_err(|_elapsed| TransportError::Timeout)??;
        Ok(())
    }
}

pub struct WebSocketReader {
    stream: SplitStream<WebSocketStream<TcpStream>>,
}

#[async_trait::async_trait]
impl TransportReader for WebSocketReader {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match self.stream.next().await {
                None => return Ok(None),
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.into())),
                Some(Ok(Message::Close(_))) => return Ok(None),
                Some(Ok(_other)) => continue,
                Some(Err(err)) => return Err(TransportError::from(err)),
            }
        }
    }
}
