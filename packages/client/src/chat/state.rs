//! Client-held chat state: roster, composer, typing and presence.
//!
//! All of this is ephemeral. It is created when the chat view starts,
//! mutated by inbound socket events and user actions, and dropped on
//! teardown; nothing here is persisted.

use crate::domain::composer::{can_compose, Composer};
use crate::domain::entity::OnlineUser;
use crate::domain::roster::RoomRoster;
use crate::domain::typing::{
    TypingDebounce, TypingIndicators, TYPING_IDLE_WINDOW_MS, TYPING_INDICATOR_TTL_MS,
};
use crate::domain::value_object::{RoomId, UserId};

pub struct ChatState {
    pub roster: RoomRoster,
    pub composer: Composer,
    pub debounce: TypingDebounce,
    pub indicators: TypingIndicators,
    pub online: Vec<OnlineUser>,
    user_id: UserId,
    active_room: Option<RoomId>,
}

impl ChatState {
    pub fn new(user_id: UserId) -> Self {
        Self::with_typing_windows(user_id, TYPING_IDLE_WINDOW_MS, TYPING_INDICATOR_TTL_MS)
    }

    /// Constructor with explicit typing windows, used by tests to shrink
    /// the timing
    pub fn with_typing_windows(user_id: UserId, idle_window_ms: i64, indicator_ttl_ms: i64) -> Self {
        Self {
            roster: RoomRoster::new(),
            composer: Composer::new(),
            debounce: TypingDebounce::new(idle_window_ms),
            indicators: TypingIndicators::new(indicator_ttl_ms),
            online: Vec::new(),
            user_id,
            active_room: None,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn active_room(&self) -> Option<&RoomId> {
        self.active_room.as_ref()
    }

    pub fn set_active_room(&mut self, room_id: RoomId) {
        self.active_room = Some(room_id);
    }

    /// All room ids currently in the roster, for the batched membership
    /// announcement after (re)connect
    pub fn known_room_ids(&self) -> Vec<String> {
        self.roster
            .rooms()
            .iter()
            .map(|room| room.id.as_str().to_string())
            .collect()
    }

    /// Whether the composer is available for the active room. `false`
    /// means the view should offer a join action instead.
    pub fn can_compose_active(&self) -> bool {
        match &self.active_room {
            Some(room_id) => self
                .roster
                .room(room_id)
                .is_some_and(|room| can_compose(room, &self.user_id)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Participant, Room, RoomType};

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn room(id: &str, room_type: RoomType, members: &[&str]) -> Room {
        Room {
            id: RoomId::new(id.to_string()).unwrap(),
            name: id.to_string(),
            room_type,
            participants: members
                .iter()
                .map(|m| Participant {
                    user_id: user(m),
                    username: (*m).to_string(),
                })
                .collect(),
            message_count: 0,
            last_activity: 0,
        }
    }

    #[test]
    fn test_can_compose_active_requires_membership_or_private_room() {
        // テスト項目: アクティブルームの投稿可否が参加状態と type で決まる
        // given (前提条件):
        let mut state = ChatState::new(user("bob"));
        state.roster.set_rooms(vec![
            room("public", RoomType::General, &["alice"]),
            room("dm", RoomType::Private, &[]),
        ]);

        // when (操作) / then (期待する結果): 非参加の公開ルームでは不可
        state.set_active_room(RoomId::new("public".to_string()).unwrap());
        assert!(!state.can_compose_active());

        // when (操作) / then (期待する結果): private ルームでは可
        state.set_active_room(RoomId::new("dm".to_string()).unwrap());
        assert!(state.can_compose_active());
    }

    #[test]
    fn test_known_room_ids_lists_roster_order() {
        // テスト項目: known_room_ids がロスター順のルーム ID を返す
        // given (前提条件):
        let mut state = ChatState::new(user("alice"));
        state.roster.set_rooms(vec![
            room("r1", RoomType::General, &[]),
            room("r2", RoomType::Help, &[]),
        ]);

        // when (操作):
        let ids = state.known_room_ids();

        // then (期待する結果):
        assert_eq!(ids, vec!["r1", "r2"]);
    }
}
