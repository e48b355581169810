//! Domain entities mirrored from the backend's chat payloads.

use super::value_object::{RoomId, UserId};

/// Authenticated platform user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub role: Option<String>,
}

/// Room category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomType {
    General,
    Help,
    Contest,
    Interview,
    Private,
}

impl RoomType {
    /// Parse the wire tag; unknown tags are treated as general rooms
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "help" => RoomType::Help,
            "contest" => RoomType::Contest,
            "interview" => RoomType::Interview,
            "private" => RoomType::Private,
            _ => RoomType::General,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            RoomType::General => "general",
            RoomType::Help => "help",
            RoomType::Contest => "contest",
            RoomType::Interview => "interview",
            RoomType::Private => "private",
        }
    }
}

/// Room participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub user_id: UserId,
    pub username: String,
}

/// Chat room as listed in the roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub room_type: RoomType,
    pub participants: Vec<Participant>,
    pub message_count: u64,
    /// Unix milliseconds of the last message or membership change
    pub last_activity: i64,
}

impl Room {
    /// Whether the given user is listed among this room's participants
    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.participants.iter().any(|p| &p.user_id == user_id)
    }
}

/// Emoji reaction on a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub emoji: String,
    pub users: Vec<String>,
}

/// One chat message as delivered by the server.
///
/// Message lists are append-only on the client; ordering and delivery
/// guarantees belong to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub content: String,
    /// Unix milliseconds
    pub sent_at: i64,
    pub reply_to: Option<String>,
    pub edited_at: Option<i64>,
    pub reactions: Vec<Reaction>,
}

/// Presence entry from the `onlineUsers` push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlineUser {
    pub user_id: UserId,
    pub username: String,
}
