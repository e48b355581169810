//! WebSocket transport layer for the realtime chat session.

pub mod transport;

pub use transport::{
    Connection, InboundFrame, SocketConnector, SocketTransport, TransportError,
    TungsteniteConnector,
};
