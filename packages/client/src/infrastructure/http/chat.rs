//! Chat REST endpoints.
//!
//! History, room management and message posting run over REST; only the
//! push direction (new messages, typing, presence) is socket-borne. The
//! session manager calls `post_room_message` for sends, so the
//! one-in-flight rule in `domain::composer` gates exactly these calls.

use crate::infrastructure::dto::http::{
    ChatMessageDto, CreateRoomRequest, PostMessageRequest, RoomDto, UserSearchResultDto,
};

use super::client::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /chats/rooms`
    pub async fn chat_rooms(&self) -> Result<Vec<RoomDto>, ApiError> {
        self.get_json("/chats/rooms").await
    }

    /// `POST /chats/rooms`
    pub async fn create_chat_room(
        &self,
        name: &str,
        room_type: &str,
    ) -> Result<RoomDto, ApiError> {
        self.post_json(
            "/chats/rooms",
            &CreateRoomRequest {
                name: name.to_string(),
                room_type: room_type.to_string(),
            },
        )
        .await
    }

    /// `GET /chats/rooms/:id/messages`
    pub async fn room_messages(&self, room_id: &str) -> Result<Vec<ChatMessageDto>, ApiError> {
        self.get_json(&format!("/chats/rooms/{}/messages", room_id))
            .await
    }

    /// `POST /chats/rooms/:id/messages`
    pub async fn post_room_message(
        &self,
        room_id: &str,
        content: &str,
        reply_to: Option<String>,
    ) -> Result<ChatMessageDto, ApiError> {
        self.post_json(
            &format!("/chats/rooms/{}/messages", room_id),
            &PostMessageRequest {
                content: content.to_string(),
                reply_to,
            },
        )
        .await
    }

    /// `GET /chats/users/search?q=`
    pub async fn search_chat_users(&self, query: &str) -> Result<Vec<UserSearchResultDto>, ApiError> {
        self.execute_json(
            self.request(reqwest::Method::GET, "/chats/users/search")
                .query(&[("q", query)]),
        )
        .await
    }

    /// `POST /chats/rooms/:id/join`
    pub async fn join_chat_room(&self, room_id: &str) -> Result<(), ApiError> {
        self.post_unit(&format!("/chats/rooms/{}/join", room_id))
            .await
    }
}
