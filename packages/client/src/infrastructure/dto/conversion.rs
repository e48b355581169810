//! Conversion logic between DTOs and domain entities.

use crate::domain::{
    entity::{ChatMessage, OnlineUser, Participant, Reaction, Room, RoomType, User},
    value_object::{RoomId, UserId},
};
use crate::infrastructure::dto::http;
use crate::infrastructure::dto::websocket as dto;

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::ChatMessageDto> for ChatMessage {
    fn from(dto: dto::ChatMessageDto) -> Self {
        Self {
            id: dto.id,
            room_id: RoomId::new(dto.room_id).expect("room id should be valid in DTO"),
            sender_id: UserId::new(dto.sender_id).expect("sender id should be valid in DTO"),
            sender_name: dto.sender_name,
            content: dto.content,
            sent_at: dto.timestamp,
            reply_to: dto.reply_to,
            edited_at: dto.edited_at,
            reactions: dto.reactions.into_iter().map(Reaction::from).collect(),
        }
    }
}

impl From<dto::ReactionDto> for Reaction {
    fn from(dto: dto::ReactionDto) -> Self {
        Self {
            emoji: dto.emoji,
            users: dto.users,
        }
    }
}

impl From<dto::RoomDto> for Room {
    fn from(dto: dto::RoomDto) -> Self {
        Self {
            id: RoomId::new(dto.id).expect("room id should be valid in DTO"),
            name: dto.name,
            room_type: RoomType::from_tag(&dto.room_type),
            participants: dto
                .participants
                .into_iter()
                .map(Participant::from)
                .collect(),
            message_count: dto.message_count,
            last_activity: dto.last_activity,
        }
    }
}

impl From<dto::ParticipantDto> for Participant {
    fn from(dto: dto::ParticipantDto) -> Self {
        Self {
            user_id: UserId::new(dto.user_id).expect("user id should be valid in DTO"),
            username: dto.username,
        }
    }
}

impl From<dto::OnlineUserDto> for OnlineUser {
    fn from(dto: dto::OnlineUserDto) -> Self {
        Self {
            user_id: UserId::new(dto.user_id).expect("user id should be valid in DTO"),
            username: dto.username,
        }
    }
}

impl From<http::UserDto> for User {
    fn from(dto: http::UserDto) -> Self {
        Self {
            id: UserId::new(dto.id).expect("user id should be valid in DTO"),
            username: dto.username,
            role: dto.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dto_chat_message_to_domain() {
        // テスト項目: DTO の ChatMessage がドメインエンティティに変換される
        // given (前提条件):
        let dto_msg = dto::ChatMessageDto {
            id: "m1".to_string(),
            room_id: "r1".to_string(),
            sender_id: "u1".to_string(),
            sender_name: "alice".to_string(),
            content: "Hello!".to_string(),
            timestamp: 1000,
            reply_to: None,
            edited_at: None,
            reactions: vec![dto::ReactionDto {
                emoji: "🎉".to_string(),
                users: vec!["bob".to_string()],
            }],
        };

        // when (操作):
        let domain_msg: ChatMessage = dto_msg.into();

        // then (期待する結果):
        assert_eq!(domain_msg.id, "m1");
        assert_eq!(domain_msg.room_id.as_str(), "r1");
        assert_eq!(domain_msg.sender_id.as_str(), "u1");
        assert_eq!(domain_msg.sent_at, 1000);
        assert_eq!(domain_msg.reactions.len(), 1);
    }

    #[test]
    fn test_dto_room_to_domain_parses_type_tag() {
        // テスト項目: RoomDto の type タグがドメインの RoomType に変換される
        // given (前提条件):
        let dto_room = dto::RoomDto {
            id: "r1".to_string(),
            name: "interview prep".to_string(),
            room_type: "interview".to_string(),
            participants: vec![dto::ParticipantDto {
                user_id: "u1".to_string(),
                username: "alice".to_string(),
            }],
            message_count: 3,
            last_activity: 2000,
        };

        // when (操作):
        let room: Room = dto_room.into();

        // then (期待する結果):
        assert_eq!(room.room_type, RoomType::Interview);
        assert_eq!(room.participants.len(), 1);
        assert_eq!(room.message_count, 3);
    }

    #[test]
    fn test_http_user_dto_to_domain() {
        // テスト項目: HTTP の UserDto がドメインの User に変換される
        // given (前提条件):
        let dto_user = http::UserDto {
            id: "u1".to_string(),
            username: "alice".to_string(),
            role: Some("user".to_string()),
            coins: Some(120),
        };

        // when (操作):
        let user: User = dto_user.into();

        // then (期待する結果):
        assert_eq!(user.id.as_str(), "u1");
        assert_eq!(user.username, "alice");
        assert_eq!(user.role.as_deref(), Some("user"));
    }
}
