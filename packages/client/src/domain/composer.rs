//! Message composition rules: membership gating and the
//! one-send-in-flight guarantee.

use super::entity::{Room, RoomType};
use super::value_object::UserId;

/// The composer is available only if the active room is private or the
/// user is already listed among its participants; otherwise the view
/// offers a join action instead.
pub fn can_compose(room: &Room, user_id: &UserId) -> bool {
    room.room_type == RoomType::Private || room.is_member(user_id)
}

/// Snapshot of a draft taken when a send begins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingDraft {
    pub content: String,
    pub reply_to: Option<String>,
}

/// Draft state for the active room.
///
/// Exactly one send may be in flight; invoking send again before the
/// first resolves is ignored, not queued. On success the draft and any
/// reply context are cleared; on failure both are preserved.
#[derive(Debug, Default)]
pub struct Composer {
    draft: String,
    reply_to: Option<String>,
    in_flight: bool,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    pub fn set_reply_to(&mut self, message_id: Option<String>) {
        self.reply_to = message_id;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Begin a send. Returns the draft to transmit, or `None` when the
    /// draft is empty or another send is still outstanding.
    pub fn begin_send(&mut self) -> Option<OutgoingDraft> {
        if self.in_flight || self.draft.trim().is_empty() {
            return None;
        }
        self.in_flight = true;
        Some(OutgoingDraft {
            content: self.draft.clone(),
            reply_to: self.reply_to.clone(),
        })
    }

    /// The outstanding send succeeded: clear draft and reply context
    pub fn complete_send(&mut self) {
        self.in_flight = false;
        self.draft.clear();
        self.reply_to = None;
    }

    /// The outstanding send failed: keep the draft for the user
    pub fn fail_send(&mut self) {
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Participant;
    use crate::domain::value_object::RoomId;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn room(room_type: RoomType, members: &[&str]) -> Room {
        Room {
            id: RoomId::new("room-1".to_string()).unwrap(),
            name: "room".to_string(),
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
    fn test_member_can_compose_in_public_room() {
        // テスト項目: 参加者リストに載っているユーザーは公開ルームで投稿できる
        // given (前提条件):
        let room = room(RoomType::General, &["alice"]);

        // when (操作) / then (期待する結果):
        assert!(can_compose(&room, &user("alice")));
    }

    #[test]
    fn test_non_member_cannot_compose_in_public_room() {
        // テスト項目: 非参加者は公開ルームで投稿できない（join 導線になる）
        // given (前提条件):
        let room = room(RoomType::Help, &["alice"]);

        // when (操作) / then (期待する結果):
        assert!(!can_compose(&room, &user("bob")));
    }

    #[test]
    fn test_private_room_always_allows_composing() {
        // テスト項目: private ルームでは参加者リストに関わらず投稿できる
        // given (前提条件):
        let room = room(RoomType::Private, &[]);

        // when (操作) / then (期待する結果):
        assert!(can_compose(&room, &user("bob")));
    }

    #[test]
    fn test_second_send_while_in_flight_is_ignored() {
        // テスト項目: 送信中の再送信要求が無視される（キューイングされない）
        // given (前提条件):
        let mut composer = Composer::new();
        composer.set_draft("hello");

        // when (操作):
        let first = composer.begin_send();
        let second = composer.begin_send();

        // then (期待する結果):
        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[test]
    fn test_success_clears_draft_and_reply_context() {
        // テスト項目: 送信成功でドラフトと返信コンテキストがクリアされる
        // given (前提条件):
        let mut composer = Composer::new();
        composer.set_draft("hello");
        composer.set_reply_to(Some("msg-1".to_string()));
        composer.begin_send().unwrap();

        // when (操作):
        composer.complete_send();

        // then (期待する結果):
        assert_eq!(composer.draft(), "");
        assert_eq!(composer.reply_to(), None);
        assert!(!composer.is_in_flight());
    }

    #[test]
    fn test_failure_preserves_draft() {
        // テスト項目: 送信失敗でドラフトが保持され、再送信が可能になる
        // given (前提条件):
        let mut composer = Composer::new();
        composer.set_draft("hello");
        composer.begin_send().unwrap();

        // when (操作):
        composer.fail_send();

        // then (期待する結果):
        assert_eq!(composer.draft(), "hello");
        assert!(composer.begin_send().is_some());
    }

    #[test]
    fn test_empty_draft_is_not_sent() {
        // テスト項目: 空のドラフトでは送信が開始されない
        // given (前提条件):
        let mut composer = Composer::new();
        composer.set_draft("   ");

        // when (操作):
        let result = composer.begin_send();

        // then (期待する結果):
        assert!(result.is_none());
        assert!(!composer.is_in_flight());
    }
}
