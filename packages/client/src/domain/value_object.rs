//! Value object 定義
//!
//! ドメイン層で使う識別子・トークン・メッセージ本文の newtype。
//! 生の `String` をそのまま引き回さず、境界で一度だけ検証します。

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("auth token must not be empty")]
    EmptyToken,

    #[error("message content must not be empty")]
    EmptyMessage,

    #[error("message content exceeds {max} characters (got {got})")]
    MessageTooLong { max: usize, got: usize },
}

/// Server-assigned user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, ValueError> {
        if value.trim().is_empty() {
            return Err(ValueError::EmptyUserId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Server-assigned chat room identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueError> {
        if value.trim().is_empty() {
            return Err(ValueError::EmptyRoomId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Bearer token issued by the auth endpoints.
///
/// This is the only piece of client state that survives a session; it is
/// persisted through `auth::token_store`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(value: String) -> Result<Self, ValueError> {
        if value.trim().is_empty() {
            return Err(ValueError::EmptyToken);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep the token itself out of logs
impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthToken(***)")
    }
}

/// Chat message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// Maximum accepted message length, matching the composer limit
    pub const MAX_LEN: usize = 2000;

    pub fn new(value: String) -> Result<Self, ValueError> {
        if value.trim().is_empty() {
            return Err(ValueError::EmptyMessage);
        }
        if value.chars().count() > Self::MAX_LEN {
            return Err(ValueError::MessageTooLong {
                max: Self::MAX_LEN,
                got: value.chars().count(),
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
