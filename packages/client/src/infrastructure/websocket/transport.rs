//! WebSocket transport: trait seam plus the tokio-tungstenite
//! implementation.
//!
//! The session logic in `chat` never touches a raw socket. It talks to
//! [`SocketTransport`] for outbound events and drains an inbound frame
//! channel fed by a read task, so tests can drive it with an in-memory
//! fake.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::infrastructure::dto::websocket::{ClientEvent, ServerEvent};

/// Transport-level errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Connect(String),

    #[error("send error: {0}")]
    Send(String),

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One inbound item from the read side of the connection
#[derive(Debug)]
pub enum InboundFrame {
    /// A parsed server event
    Event(ServerEvent),
    /// A text frame that did not parse as a known event
    Unknown(String),
    /// The connection ended; `server_initiated` distinguishes a close
    /// frame sent by the server from the stream simply ending
    Closed { server_initiated: bool },
    /// Transport failure while reading
    Failed { reason: String },
}

/// Outbound half of an open connection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocketTransport: Send {
    /// Serialize and send one event envelope
    async fn send(&mut self, event: &ClientEvent) -> Result<(), TransportError>;

    /// Initiate a graceful local close
    async fn close(&mut self);
}

/// An open connection: the outbound transport plus the inbound frame
/// channel its read task feeds
pub struct Connection {
    pub transport: Box<dyn SocketTransport>,
    pub frames: mpsc::UnboundedReceiver<InboundFrame>,
}

/// Dials new connections; the runner calls this once per (re)connect
#[async_trait]
pub trait SocketConnector: Send + Sync {
    async fn connect(&self) -> Result<Connection, TransportError>;
}

/// Production connector speaking tokio-tungstenite
pub struct TungsteniteConnector {
    url: String,
}

impl TungsteniteConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl SocketConnector for TungsteniteConnector {
    async fn connect(&self) -> Result<Connection, TransportError> {
        let (ws_stream, _response) = connect_async(&self.url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let (write, read) = ws_stream.split();
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();

        // Read task: pump frames into the channel until the stream ends
        tokio::spawn(pump_frames(read, frame_tx));

        Ok(Connection {
            transport: Box::new(TungsteniteTransport { write }),
            frames: frame_rx,
        })
    }
}

type WsSink = futures_util::stream::SplitSink<
    WebSocketStream<MaybeTlsStream<TcpStream>>,
    Message,
>;
type WsSource = futures_util::stream::SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

struct TungsteniteTransport {
    write: WsSink,
}

#[async_trait]
impl SocketTransport for TungsteniteTransport {
    async fn send(&mut self, event: &ClientEvent) -> Result<(), TransportError> {
        let json = serde_json::to_string(event)?;
        self.write
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn close(&mut self) {
        if let Err(e) = self.write.send(Message::Close(None)).await {
            tracing::debug!("Close frame could not be sent: {}", e);
        }
    }
}

async fn pump_frames(mut read: WsSource, frame_tx: mpsc::UnboundedSender<InboundFrame>) {
    let terminal = loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => {
                let frame = match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(event) => InboundFrame::Event(event),
                    Err(_) => InboundFrame::Unknown(text.to_string()),
                };
                if frame_tx.send(frame).is_err() {
                    // Session went away; stop reading
                    return;
                }
            }
            Some(Ok(Message::Close(_))) => {
                break InboundFrame::Closed {
                    server_initiated: true,
                };
            }
            Some(Ok(_)) => {
                // Ping/pong/binary frames carry no chat events
            }
            Some(Err(e)) => {
                break InboundFrame::Failed {
                    reason: e.to_string(),
                };
            }
            None => {
                break InboundFrame::Closed {
                    server_initiated: false,
                };
            }
        }
    };
    let _ = frame_tx.send(terminal);
}
