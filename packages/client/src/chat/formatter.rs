//! Message formatting utilities for terminal display.

use codethrone_shared::time::timestamp_to_rfc3339;

use crate::domain::connection::ConnectionStatus;
use crate::domain::entity::{ChatMessage, OnlineUser, Room};

/// Message formatter for terminal display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the room list shown by the `rooms` subcommand and on chat
    /// startup
    ///
    /// # Arguments
    ///
    /// * `rooms` - Rooms the user can see
    ///
    /// # Returns
    ///
    /// A formatted string with one line per room
    pub fn format_room_list(rooms: &[Room]) -> String {
        let mut output = String::new();
        output.push_str("\n============================================================\n");
        output.push_str("Rooms:\n");

        if rooms.is_empty() {
            output.push_str("(No rooms)\n");
        } else {
            for room in rooms {
                output.push_str(&format!(
                    "[{}] {} ({}) - {} messages, {} participants\n",
                    room.room_type.as_tag(),
                    room.name,
                    room.id.as_str(),
                    room.message_count,
                    room.participants.len()
                ));
            }
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format an incoming chat message
    ///
    /// # Arguments
    ///
    /// * `message` - The message as delivered by the server
    ///
    /// # Returns
    ///
    /// A formatted string with sender, content and timestamp
    pub fn format_chat_message(message: &ChatMessage) -> String {
        let timestamp_str = timestamp_to_rfc3339(message.sent_at);
        let edited_marker = if message.edited_at.is_some() {
            " (edited)"
        } else {
            ""
        };
        format!(
            "\n@{}: {}{}\nsent at {}\n",
            message.sender_name, message.content, edited_marker, timestamp_str
        )
    }

    /// Format the online-user list pushed by the server
    pub fn format_online_users(users: &[OnlineUser]) -> String {
        if users.is_empty() {
            return "\n(no one online)\n".to_string();
        }
        let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
        format!("\nonline: {}\n", names.join(", "))
    }

    /// Format the typing indicator line for a room
    pub fn format_typing(users: &[String]) -> String {
        match users {
            [] => String::new(),
            [one] => format!("\n{} is typing...\n", one),
            many => format!("\n{} are typing...\n", many.join(", ")),
        }
    }

    /// Format the persistent connection-status banner
    pub fn format_status(status: ConnectionStatus, last_error: Option<&str>) -> String {
        match status {
            ConnectionStatus::Disconnected => "\n[status] disconnected\n".to_string(),
            ConnectionStatus::Connecting => "\n[status] connecting...\n".to_string(),
            ConnectionStatus::Connected => "\n[status] connected\n".to_string(),
            ConnectionStatus::Error => match last_error {
                Some(reason) => format!("\n[status] error: {} (type /retry to retry)\n", reason),
                None => "\n[status] error (type /retry to retry)\n".to_string(),
            },
        }
    }
}
