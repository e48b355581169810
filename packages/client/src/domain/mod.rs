//! Domain model and pure decision logic.
//!
//! Everything in this module is side-effect free: entities, value objects
//! and the state machines behind the chat view. Network and timer concerns
//! live in `infrastructure` and `chat`; the logic here is testable with
//! nothing but plain values and explicit timestamps.

pub mod composer;
pub mod connection;
pub mod entity;
pub mod roster;
pub mod typing;
pub mod value_object;

pub use composer::{can_compose, Composer, OutgoingDraft};
pub use connection::{
    ConnectionEffect, ConnectionEvent, ConnectionStateMachine, ConnectionStatus, ReconnectPolicy,
};
pub use entity::{ChatMessage, OnlineUser, Participant, Reaction, Room, RoomType, User};
pub use roster::RoomRoster;
pub use typing::{TypingDebounce, TypingIndicators};
pub use value_object::{AuthToken, MessageContent, RoomId, UserId, ValueError};
