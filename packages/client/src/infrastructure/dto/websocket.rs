//! WebSocket event envelopes and payload DTOs.
//!
//! Every frame on the wire is a JSON envelope `{"event": ..., "data": ...}`.
//! [`ServerEvent`] covers everything the server pushes, [`ClientEvent`]
//! everything the client emits (including the `auth` handshake sent as
//! the first frame after open).

use serde::{Deserialize, Serialize};

/// Events pushed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "newMessage")]
    NewMessage(ChatMessageDto),

    #[serde(rename = "userTyping")]
    UserTyping(UserTypingDto),

    #[serde(rename = "messageReaction")]
    MessageReaction(MessageReactionDto),

    #[serde(rename = "messageEdited")]
    MessageEdited(MessageEditedDto),

    #[serde(rename = "privateRoomCreated")]
    PrivateRoomCreated(RoomDto),

    #[serde(rename = "joinedRoom")]
    JoinedRoom(JoinedRoomDto),

    #[serde(rename = "onlineUsers")]
    OnlineUsers(Vec<OnlineUserDto>),

    #[serde(rename = "error")]
    Error(SocketErrorDto),
}

/// Events emitted by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Handshake payload, first frame after the transport opens
    #[serde(rename = "auth")]
    Auth(AuthPayload),

    #[serde(rename = "joinRoom")]
    JoinRoom(JoinRoomPayload),

    #[serde(rename = "joinRooms")]
    JoinRooms(JoinRoomsPayload),

    #[serde(rename = "typing")]
    Typing(TypingPayload),

    #[serde(rename = "reactToMessage")]
    ReactToMessage(ReactToMessagePayload),

    #[serde(rename = "createPrivateChat")]
    CreatePrivateChat(CreatePrivateChatPayload),

    #[serde(rename = "requestOnlineUsers")]
    RequestOnlineUsers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub token: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomsPayload {
    pub room_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub room_id: String,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactToMessagePayload {
    pub room_id: String,
    pub message_id: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrivateChatPayload {
    pub target_user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub id: String,
    pub room_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    /// Unix milliseconds
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<i64>,
    #[serde(default)]
    pub reactions: Vec<ReactionDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionDto {
    pub emoji: String,
    #[serde(default)]
    pub users: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypingDto {
    pub room_id: String,
    pub user_id: String,
    pub username: String,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReactionDto {
    pub message_id: String,
    pub reactions: Vec<ReactionDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEditedDto {
    pub message_id: String,
    pub content: String,
    /// Unix milliseconds
    pub edited_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: String,
    #[serde(default)]
    pub participants: Vec<ParticipantDto>,
    #[serde(default)]
    pub message_count: u64,
    /// Unix milliseconds
    #[serde(default)]
    pub last_activity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedRoomDto {
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUserDto {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketErrorDto {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_event_new_message_deserializes() {
        // テスト項目: newMessage エンベロープがデシリアライズできる
        // given (前提条件):
        let json = r#"{
            "event": "newMessage",
            "data": {
                "id": "m1",
                "roomId": "r1",
                "senderId": "u1",
                "senderName": "alice",
                "content": "hello",
                "timestamp": 1700000000000
            }
        }"#;

        // when (操作):
        let event: ServerEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        match event {
            ServerEvent::NewMessage(msg) => {
                assert_eq!(msg.id, "m1");
                assert_eq!(msg.room_id, "r1");
                assert_eq!(msg.content, "hello");
                assert!(msg.reactions.is_empty());
            }
            other => panic!("expected NewMessage, got {:?}", other),
        }
    }

    #[test]
    fn test_client_event_request_online_users_serializes_without_data() {
        // テスト項目: data を持たない requestOnlineUsers が event のみで直列化される
        // given (前提条件):
        let event = ClientEvent::RequestOnlineUsers;

        // when (操作):
        let json = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(json["event"], "requestOnlineUsers");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_client_event_typing_round_trips() {
        // テスト項目: typing エンベロープがラウンドトリップで一致する
        // given (前提条件):
        let event = ClientEvent::Typing(TypingPayload {
            room_id: "r1".to_string(),
            is_typing: true,
        });

        // when (操作):
        let json = serde_json::to_string(&event).unwrap();
        let parsed: ClientEvent = serde_json::from_str(&json).unwrap();

        // then (期待する結果):
        assert_eq!(parsed, event);
        assert!(json.contains("\"isTyping\":true"));
    }

    #[test]
    fn test_unknown_server_event_fails_to_parse() {
        // テスト項目: 未知の event タグはエラーになる（呼び出し側でスキップする）
        // given (前提条件):
        let json = r#"{"event": "somethingNew", "data": {}}"#;

        // when (操作):
        let result: Result<ServerEvent, _> = serde_json::from_str(json);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
