//! Infrastructure layer: REST and WebSocket plumbing plus the DTOs for
//! both protocols.

pub mod dto;
pub mod http;
pub mod websocket;
