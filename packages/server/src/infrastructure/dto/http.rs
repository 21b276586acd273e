//! HTTP API request/response DTOs.

use serde::{Deserialize, Serialize};

use chatroom_shared::time::timestamp_to_rfc3339;

use crate::chatroom::{MemberInfo, RoomSnapshot};
use crate::domain::Message;

/// Room summary for `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub title: String,
    pub members: Vec<String>,
    pub message_count: usize,
}

/// Member detail inside a room detail response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDetailDto {
    pub nickname: String,
    pub subscriber_id: String,
    pub pending_frames: usize,
    pub dropped_frames: u64,
}

/// Message inside a room detail response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub author: String,
    pub body: String,
    pub created_at: String,
}

/// Room detail for `GET /api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub title: String,
    pub members: Vec<MemberDetailDto>,
    pub message_count: usize,
    /// The most recent messages, oldest first
    pub recent_messages: Vec<MessageDto>,
}

/// Request body for `POST /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub id: String,
    pub title: String,
}

impl From<&RoomSnapshot> for RoomSummaryDto {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            id: snapshot.id.to_string(),
            title: snapshot.title.to_string(),
            members: snapshot
                .members
                .iter()
                .map(|m| m.nickname.to_string())
                .collect(),
            message_count: snapshot.message_count,
        }
    }
}

impl From<&MemberInfo> for MemberDetailDto {
    fn from(member: &MemberInfo) -> Self {
        Self {
            nickname: member.nickname.to_string(),
            subscriber_id: member.subscriber_id.to_string(),
            pending_frames: member.pending_frames,
            dropped_frames: member.dropped_frames,
        }
    }
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            author: message.author.to_string(),
            body: message.body.as_str().to_string(),
            created_at: timestamp_to_rfc3339(message.created_at.value()),
        }
    }
}

impl From<&RoomSnapshot> for RoomDetailDto {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            id: snapshot.id.to_string(),
            title: snapshot.title.to_string(),
            members: snapshot.members.iter().map(MemberDetailDto::from).collect(),
            message_count: snapshot.message_count,
            recent_messages: snapshot
                .recent_messages
                .iter()
                .map(MessageDto::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageBody, Nickname, RoomId, RoomTitle, Timestamp};

    /// Snapshot of a room with `count` messages carrying the last `recent`
    fn snapshot_with_messages(count: usize, recent: usize) -> RoomSnapshot {
        let room_id = RoomId::new("general".to_string()).unwrap();
        RoomSnapshot {
            id: room_id.clone(),
            title: RoomTitle::new("General".to_string()).unwrap(),
            members: Vec::new(),
            message_count: count,
            recent_messages: (count - recent..count)
                .map(|i| {
                    Message::new(
                        Nickname::new("alice".to_string()).unwrap(),
                        room_id.clone(),
                        MessageBody::new(format!("msg {}", i)).unwrap(),
                        Timestamp::new(i as i64),
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_room_detail_carries_count_and_recent_messages() {
        // テスト項目: ルーム詳細には総件数と直近のメッセージが古い順で含まれる
        // given (前提条件):
        let snapshot = snapshot_with_messages(25, 3);

        // when (操作):
        let dto = RoomDetailDto::from(&snapshot);

        // then (期待する結果):
        assert_eq!(dto.message_count, 25);
        let bodies: Vec<&str> = dto.recent_messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["msg 22", "msg 23", "msg 24"]);
        assert_eq!(dto.recent_messages[0].created_at, "1970-01-01T00:00:00.022Z");
    }

    #[test]
    fn test_room_summary_from_snapshot() {
        // テスト項目: スナップショットからルーム概要が生成される
        // given (前提条件):
        let snapshot = snapshot_with_messages(3, 0);

        // when (操作):
        let dto = RoomSummaryDto::from(&snapshot);

        // then (期待する結果):
        assert_eq!(dto.id, "general");
        assert_eq!(dto.title, "General");
        assert!(dto.members.is_empty());
        assert_eq!(dto.message_count, 3);
    }
}
