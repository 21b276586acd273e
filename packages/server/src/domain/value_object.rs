//! Value objects.
//!
//! Every identifier that ends up on the broadcast stream is validated here, so
//! that a nickname or room id can never break the newline-delimited framing.

use std::fmt;

use serde::Serialize;

use super::error::ValueObjectError;

/// Maximum nickname length (characters)
pub const NICKNAME_MAX_LENGTH: usize = 32;
/// Maximum room id length (characters)
pub const ROOM_ID_MAX_LENGTH: usize = 64;
/// Maximum room title length (characters)
pub const ROOM_TITLE_MAX_LENGTH: usize = 100;
/// Maximum message body length (characters)
pub const MESSAGE_MAX_LENGTH: usize = 1000;

/// Reject whitespace and control characters inside identifiers.
fn check_identifier(field: &'static str, value: &str) -> Result<(), ValueObjectError> {
    match value.chars().find(|c| c.is_whitespace() || c.is_control()) {
        Some(character) => Err(ValueObjectError::InvalidCharacter { field, character }),
        None => Ok(()),
    }
}

/// Reject control characters (line breaks included) in free text that is
/// printed one entry per line. Spaces are allowed.
fn check_single_line(field: &'static str, value: &str) -> Result<(), ValueObjectError> {
    match value.chars().find(|c| c.is_control()) {
        Some(character) => Err(ValueObjectError::InvalidCharacter { field, character }),
        None => Ok(()),
    }
}

/// Globally unique user nickname
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Nickname(String);

impl Nickname {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(ValueObjectError::NicknameEmpty);
        }
        let actual = value.chars().count();
        if actual > NICKNAME_MAX_LENGTH {
            return Err(ValueObjectError::NicknameTooLong {
                max: NICKNAME_MAX_LENGTH,
                actual,
            });
        }
        check_identifier("nickname", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Nickname {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique chatroom identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        let actual = value.chars().count();
        if actual > ROOM_ID_MAX_LENGTH {
            return Err(ValueObjectError::RoomIdTooLong {
                max: ROOM_ID_MAX_LENGTH,
                actual,
            });
        }
        check_identifier("room id", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human readable room title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoomTitle(String);

impl RoomTitle {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(ValueObjectError::RoomTitleEmpty);
        }
        let actual = value.chars().count();
        if actual > ROOM_TITLE_MAX_LENGTH {
            return Err(ValueObjectError::RoomTitleTooLong {
                max: ROOM_TITLE_MAX_LENGTH,
                actual,
            });
        }
        check_single_line("room title", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chat message body
///
/// Stored verbatim; line breaks are only neutralized when the body is
/// rendered onto the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageBody(String);

impl MessageBody {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::MessageEmpty);
        }
        let actual = value.chars().count();
        if actual > MESSAGE_MAX_LENGTH {
            return Err(ValueObjectError::MessageTooLong {
                max: MESSAGE_MAX_LENGTH,
                actual,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MessageBody {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nickname_is_trimmed() {
        // テスト項目: ニックネームの前後の空白が除去される
        // given (前提条件):
        let raw = "  alice  ".to_string();

        // when (操作):
        let nickname = Nickname::new(raw).unwrap();

        // then (期待する結果):
        assert_eq!(nickname.as_str(), "alice");
    }

    #[test]
    fn test_nickname_empty_is_rejected() {
        // テスト項目: 空のニックネームはエラーになる
        // given (前提条件):
        let raw = "   ".to_string();

        // when (操作):
        let result = Nickname::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::NicknameEmpty));
    }

    #[test]
    fn test_nickname_too_long_is_rejected() {
        // テスト項目: 最大長を超えるニックネームはエラーになる
        // given (前提条件):
        let raw = "a".repeat(NICKNAME_MAX_LENGTH + 1);

        // when (操作):
        let result = Nickname::new(raw);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::NicknameTooLong {
                max: NICKNAME_MAX_LENGTH,
                actual: NICKNAME_MAX_LENGTH + 1,
            })
        );
    }

    #[test]
    fn test_nickname_with_newline_is_rejected() {
        // テスト項目: 改行を含むニックネームはストリームの区切りを壊すため拒否される
        // given (前提条件):
        let raw = "ali\nce".to_string();

        // when (操作):
        let result = Nickname::new(raw);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::InvalidCharacter {
                field: "nickname",
                character: '\n',
            })
        );
    }

    #[test]
    fn test_room_id_with_space_is_rejected() {
        // テスト項目: 空白を含むルーム ID は拒否される
        // given (前提条件):
        let raw = "my room".to_string();

        // when (操作):
        let result = RoomId::new(raw);

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(ValueObjectError::InvalidCharacter { field: "room id", .. })
        ));
    }

    #[test]
    fn test_room_title_allows_spaces() {
        // テスト項目: ルームタイトルには空白を含められる
        // given (前提条件):
        let value = "  Rust Talk  ".to_string();

        // when (操作):
        let title = RoomTitle::new(value).unwrap();

        // then (期待する結果):
        assert_eq!(title.as_str(), "Rust Talk");
    }

    #[test]
    fn test_room_title_with_line_break_is_rejected() {
        // テスト項目: 改行を含むルームタイトルは一覧の行構造を壊すため拒否される
        // given (前提条件):
        let value = "Rust\nFake - Room".to_string();

        // when (操作):
        let result = RoomTitle::new(value);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::InvalidCharacter {
                field: "room title",
                character: '\n',
            })
        );
    }

    #[test]
    fn test_room_title_too_long_is_rejected() {
        // テスト項目: 最大長を超えるルームタイトルは拒否される
        // given (前提条件):
        let value = "a".repeat(ROOM_TITLE_MAX_LENGTH + 1);

        // when (操作):
        let result = RoomTitle::new(value);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::RoomTitleTooLong {
                max: ROOM_TITLE_MAX_LENGTH,
                actual: ROOM_TITLE_MAX_LENGTH + 1,
            })
        );
    }

    #[test]
    fn test_message_body_keeps_inner_whitespace() {
        // テスト項目: メッセージ本文は空白を含めてそのまま保持される
        // given (前提条件):
        let raw = " hello  world ".to_string();

        // when (操作):
        let body = MessageBody::new(raw.clone()).unwrap();

        // then (期待する結果):
        assert_eq!(body.as_str(), raw);
    }

    #[test]
    fn test_message_body_blank_is_rejected() {
        // テスト項目: 空白のみのメッセージは拒否される
        // given (前提条件):
        let raw = " \n ".to_string();

        // when (操作):
        let result = MessageBody::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::MessageEmpty));
    }

    #[test]
    fn test_message_body_too_long_is_rejected() {
        // テスト項目: 最大長を超えるメッセージは拒否される
        // given (前提条件):
        let raw = "x".repeat(MESSAGE_MAX_LENGTH + 1);

        // when (操作):
        let result = MessageBody::new(raw);

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(ValueObjectError::MessageTooLong { .. })
        ));
    }
}
