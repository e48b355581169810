//! Typing signal logic: outbound debounce and inbound indicator expiry.
//!
//! Timestamps are passed in explicitly (Unix milliseconds) so both sides
//! test without timers; the session loop feeds them from its clock.

use std::collections::HashMap;

use super::value_object::{RoomId, UserId};

/// Idle window after the last keystroke before `typing=false` is emitted
pub const TYPING_IDLE_WINDOW_MS: i64 = 2_000;

/// How long an inbound typing indicator stays visible without a refresh
pub const TYPING_INDICATOR_TTL_MS: i64 = 3_000;

/// Outbound typing debounce.
///
/// The first keystroke of a burst is worth one `typing=true`; every
/// further keystroke only pushes the idle deadline. When the deadline
/// elapses, exactly one `typing=false` is due.
#[derive(Debug)]
pub struct TypingDebounce {
    idle_window_ms: i64,
    deadline: Option<i64>,
}

impl TypingDebounce {
    pub fn new(idle_window_ms: i64) -> Self {
        Self {
            idle_window_ms,
            deadline: None,
        }
    }

    /// Record a keystroke. Returns `true` if a `typing=true` emission is
    /// due (start of a burst).
    pub fn on_input(&mut self, now_millis: i64) -> bool {
        let starts_burst = self.deadline.is_none();
        self.deadline = Some(now_millis + self.idle_window_ms);
        starts_burst
    }

    /// Check the idle deadline. Returns `true` if a `typing=false`
    /// emission is due (the burst just ended).
    pub fn on_tick(&mut self, now_millis: i64) -> bool {
        match self.deadline {
            Some(deadline) if now_millis >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Whether a burst is currently active
    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drop the pending deadline without emitting (session teardown)
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Inbound typing indicators, per room, expiring after a fixed TTL if no
/// refresh signal arrives.
#[derive(Debug)]
pub struct TypingIndicators {
    ttl_ms: i64,
    entries: HashMap<(RoomId, UserId), IndicatorEntry>,
}

#[derive(Debug)]
struct IndicatorEntry {
    username: String,
    expires_at: i64,
}

impl TypingIndicators {
    pub fn new(ttl_ms: i64) -> Self {
        Self {
            ttl_ms,
            entries: HashMap::new(),
        }
    }

    /// Apply a `userTyping` push
    pub fn observe(
        &mut self,
        room_id: RoomId,
        user_id: UserId,
        username: String,
        is_typing: bool,
        now_millis: i64,
    ) {
        let key = (room_id, user_id);
        if is_typing {
            self.entries.insert(
                key,
                IndicatorEntry {
                    username,
                    expires_at: now_millis + self.ttl_ms,
                },
            );
        } else {
            self.entries.remove(&key);
        }
    }

    /// Usernames currently flagged typing in the given room, pruning
    /// expired entries on the way
    pub fn active_in(&mut self, room_id: &RoomId, now_millis: i64) -> Vec<String> {
        self.prune(now_millis);
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter(|((room, _), _)| room == room_id)
            .map(|(_, entry)| entry.username.clone())
            .collect();
        names.sort();
        names
    }

    fn prune(&mut self, now_millis: i64) {
        self.entries.retain(|_, entry| entry.expires_at > now_millis);
    }
}
