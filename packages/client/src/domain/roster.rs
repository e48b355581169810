//! Room roster and per-room message logs.
//!
//! The room-list fetch and the socket connection are deliberately
//! unordered, so a pushed message can arrive for a room the client has
//! not listed yet. Such messages are buffered and drained, in arrival
//! order, once the room shows up. Message logs are append-only; the
//! server owns authoritative ordering, so no client-side resorting or
//! dedup happens here.

use std::collections::HashMap;

use super::entity::{ChatMessage, Reaction, Room};
use super::value_object::RoomId;

#[derive(Debug, Default)]
pub struct RoomRoster {
    rooms: Vec<Room>,
    messages: HashMap<RoomId, Vec<ChatMessage>>,
    pending: HashMap<RoomId, Vec<ChatMessage>>,
}

impl RoomRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the roster with a freshly fetched room list, draining any
    /// buffered messages for rooms that are now known
    pub fn set_rooms(&mut self, rooms: Vec<Room>) {
        self.rooms = rooms;
        let known: Vec<RoomId> = self.rooms.iter().map(|r| r.id.clone()).collect();
        for room_id in known {
            self.drain_pending(&room_id);
        }
    }

    /// Add or replace a single room (e.g. a freshly created private room)
    pub fn upsert_room(&mut self, room: Room) {
        let room_id = room.id.clone();
        match self.rooms.iter_mut().find(|r| r.id == room_id) {
            Some(existing) => *existing = room,
            None => self.rooms.push(room),
        }
        self.drain_pending(&room_id);
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| &r.id == room_id)
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.room(room_id).is_some()
    }

    /// Replace a room's log with fetched history; buffered pushes that
    /// arrived meanwhile are appended after it
    pub fn set_history(&mut self, room_id: RoomId, history: Vec<ChatMessage>) {
        self.messages.insert(room_id.clone(), history);
        self.drain_pending(&room_id);
    }

    /// Append a pushed message in arrival order. Messages for rooms not
    /// yet in the roster are buffered until the room appears.
    pub fn append_message(&mut self, message: ChatMessage) {
        let room_id = message.room_id.clone();
        if self.contains(&room_id) {
            self.messages.entry(room_id).or_default().push(message);
        } else {
            self.pending.entry(room_id).or_default().push(message);
        }
    }

    pub fn messages_in(&self, room_id: &RoomId) -> &[ChatMessage] {
        self.messages
            .get(room_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of messages buffered for rooms not yet listed
    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    /// Apply a `messageEdited` push to whichever log holds the message
    pub fn apply_edit(&mut self, message_id: &str, content: String, edited_at: i64) {
        if let Some(message) = self.find_message_mut(message_id) {
            message.content = content;
            message.edited_at = Some(edited_at);
        }
    }

    /// Apply a `messageReaction` push to whichever log holds the message
    pub fn apply_reactions(&mut self, message_id: &str, reactions: Vec<Reaction>) {
        if let Some(message) = self.find_message_mut(message_id) {
            message.reactions = reactions;
        }
    }

    fn find_message_mut(&mut self, message_id: &str) -> Option<&mut ChatMessage> {
        self.messages
            .values_mut()
            .chain(self.pending.values_mut())
            .flat_map(|log| log.iter_mut())
            .find(|m| m.id == message_id)
    }

    fn drain_pending(&mut self, room_id: &RoomId) {
        if let Some(buffered) = self.pending.remove(room_id) {
            self.messages
                .entry(room_id.clone())
                .or_default()
                .extend(buffered);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::RoomType;
    use crate::domain::value_object::UserId;

    fn room_id(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn room(id: &str) -> Room {
        Room {
            id: room_id(id),
            name: id.to_string(),
            room_type: RoomType::General,
            participants: Vec::new(),
            message_count: 0,
            last_activity: 0,
        }
    }

    fn message(id: &str, room: &str, content: &str) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            room_id: room_id(room),
            sender_id: UserId::new("alice".to_string()).unwrap(),
            sender_name: "alice".to_string(),
            content: content.to_string(),
            sent_at: 0,
            reply_to: None,
            edited_at: None,
            reactions: Vec::new(),
        }
    }

    #[test]
    fn test_messages_append_in_arrival_order() {
        // テスト項目: メッセージが到着順に追記される
        // given (前提条件):
        let mut roster = RoomRoster::new();
        roster.set_rooms(vec![room("r1")]);

        // when (操作):
        roster.append_message(message("m1", "r1", "first"));
        roster.append_message(message("m2", "r1", "second"));

        // then (期待する結果):
        let contents: Vec<_> = roster
            .messages_in(&room_id("r1"))
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[test]
    fn test_message_for_unknown_room_is_buffered() {
        // テスト項目: 未知のルーム宛のメッセージがバッファされ、ログには現れない
        // given (前提条件):
        let mut roster = RoomRoster::new();

        // when (操作):
        roster.append_message(message("m1", "r9", "early"));

        // then (期待する結果):
        assert!(roster.messages_in(&room_id("r9")).is_empty());
        assert_eq!(roster.pending_count(), 1);
    }

    #[test]
    fn test_buffered_messages_drain_when_room_appears() {
        // テスト項目: ルームがロスターに現れた時点でバッファが到着順に取り込まれる
        // given (前提条件):
        let mut roster = RoomRoster::new();
        roster.append_message(message("m1", "r9", "early-1"));
        roster.append_message(message("m2", "r9", "early-2"));

        // when (操作):
        roster.set_rooms(vec![room("r9")]);

        // then (期待する結果):
        let contents: Vec<_> = roster
            .messages_in(&room_id("r9"))
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["early-1", "early-2"]);
        assert_eq!(roster.pending_count(), 0);
    }

    #[test]
    fn test_history_fetch_precedes_buffered_pushes() {
        // テスト項目: 履歴フェッチの結果が先、バッファされたプッシュが後に並ぶ
        // given (前提条件):
        let mut roster = RoomRoster::new();
        roster.append_message(message("m3", "r1", "pushed"));

        // when (操作):
        roster.set_rooms(vec![room("r1")]);
        // set_rooms 時点で m3 は取り込まれている。その後の履歴設定で置き換え、
        // 新たにバッファされたものはない
        roster.set_history(
            room_id("r1"),
            vec![message("m1", "r1", "old-1"), message("m2", "r1", "old-2")],
        );

        // then (期待する結果):
        let contents: Vec<_> = roster
            .messages_in(&room_id("r1"))
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["old-1", "old-2"]);
    }

    #[test]
    fn test_upsert_room_replaces_existing_entry() {
        // テスト項目: 既存ルームの upsert が participants 等を置き換える
        // given (前提条件):
        let mut roster = RoomRoster::new();
        roster.set_rooms(vec![room("r1")]);
        let mut updated = room("r1");
        updated.message_count = 42;

        // when (操作):
        roster.upsert_room(updated);

        // then (期待する結果):
        assert_eq!(roster.rooms().len(), 1);
        assert_eq!(roster.room(&room_id("r1")).unwrap().message_count, 42);
    }

    #[test]
    fn test_apply_edit_updates_content_in_place() {
        // テスト項目: messageEdited が対象メッセージの本文と編集時刻を更新する
        // given (前提条件):
        let mut roster = RoomRoster::new();
        roster.set_rooms(vec![room("r1")]);
        roster.append_message(message("m1", "r1", "typo"));

        // when (操作):
        roster.apply_edit("m1", "fixed".to_string(), 1_000);

        // then (期待する結果):
        let stored = &roster.messages_in(&room_id("r1"))[0];
        assert_eq!(stored.content, "fixed");
        assert_eq!(stored.edited_at, Some(1_000));
    }

    #[test]
    fn test_apply_reactions_replaces_reaction_list() {
        // テスト項目: messageReaction がリアクション一覧を置き換える
        // given (前提条件):
        let mut roster = RoomRoster::new();
        roster.set_rooms(vec![room("r1")]);
        roster.append_message(message("m1", "r1", "hi"));

        // when (操作):
        roster.apply_reactions(
            "m1",
            vec![Reaction {
                emoji: "👍".to_string(),
                users: vec!["bob".to_string()],
            }],
        );

        // then (期待する結果):
        let stored = &roster.messages_in(&room_id("r1"))[0];
        assert_eq!(stored.reactions.len(), 1);
        assert_eq!(stored.reactions[0].emoji, "👍");
    }
}
